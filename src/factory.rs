//! The bean factory: registry storage, lifecycle and type-based lookup.
//!
//! A factory goes through three phases. `load_beans` instantiates every discovered type and
//! the configuration bean, `apply_bean_post_processors` rewrites every stored bean once, and
//! from then on the factory only serves lookups, from any number of threads.
//!
//! Type-based lookups memoize the names matching each requested type. The memo is never
//! invalidated, which is sound because the set of names is fixed once loading is done.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use log::{debug, error, info, warn};
use parking_lot::{Mutex, RwLock, RwLockReadGuard};

use crate::{
    Bean, BeanError, BeanNameGenerator, BeanType, ConfigurationManager, ConfigurationSupplier,
    DecapitalizingNameGenerator, DescriptorInstantiator, Instantiator, InventoryCatalog, Marker,
    PassThroughResolver, PostProcessingError, PostProcessorResolver, RegistryEvent, TypeCatalog,
    TypeDescriptor, TypeMatcher,
};

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives every `RegistryEvent` emitted by the factory. It is invoked after
/// the factory's locks are released, but it must still not call back into a factory that
/// is in the middle of loading or post-processing.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

/// Lifecycle phase of a [`BeanFactory`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing loaded yet.
    Empty,
    /// All beans instantiated; post-processing pending.
    Loaded,
    /// Post-processing done; read-only from now on.
    Ready,
    /// Loading or post-processing failed. The factory must not be queried.
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Empty => f.write_str("empty"),
            Phase::Loaded => f.write_str("loaded"),
            Phase::Ready => f.write_str("ready"),
            Phase::Failed => f.write_str("failed"),
        }
    }
}

type Beans = IndexMap<String, Bean>;

/// Registry of named singleton beans.
///
/// # Examples
///
/// ```rust
/// use bean_registry::{bean_type, interface, BeanFactory, BeanType, Marker, TypeIndex};
/// use std::sync::Arc;
///
/// pub trait Animal: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
/// interface!(Animal);
///
/// #[derive(Default)]
/// pub struct Cat;
/// impl Animal for Cat {
///     fn name(&self) -> &'static str { "cat" }
/// }
/// bean_type!(Cat: Animal);
///
/// let factory = BeanFactory::builder()
///     .catalog(TypeIndex::new().with(Marker::Component, Cat::descriptor()))
///     .build();
///
/// factory.load_beans().unwrap();
/// factory.apply_bean_post_processors().unwrap();
///
/// let animal: Arc<dyn Animal> = factory.get_bean().unwrap();
/// assert_eq!(animal.name(), "cat");
/// assert!(factory.contains_bean("cat"));
/// ```
pub struct BeanFactory {
    catalog: Box<dyn TypeCatalog>,
    instantiator: Box<dyn Instantiator>,
    naming: Box<dyn BeanNameGenerator>,
    configuration: Box<dyn ConfigurationSupplier>,
    post_processors: Box<dyn PostProcessorResolver>,

    phase: RwLock<Phase>,
    beans: RwLock<Beans>,
    type_matches: DashMap<&'static str, Arc<[String]>>,
    trace: Mutex<Option<Arc<TraceCallback>>>,
}

impl BeanFactory {
    pub fn builder() -> BeanFactoryBuilder {
        BeanFactoryBuilder::default()
    }

    pub fn phase(&self) -> Phase {
        *self.phase.read()
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Set a tracing callback for factory operations.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        *self.trace.lock() = Some(Arc::new(callback));
    }

    /// Clear the tracing callback.
    pub fn clear_trace_callback(&self) {
        *self.trace.lock() = None;
    }

    fn emit_event(&self, event: &RegistryEvent) {
        // cloned out so the callback runs without the trace lock held
        let callback = self.trace.lock().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    fn emit_events(&self, events: &[RegistryEvent]) {
        for event in events {
            self.emit_event(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Load
    // -------------------------------------------------------------------------------------------------

    /// Instantiates every discovered type and registers the configuration bean.
    ///
    /// Components are named by the naming policy, controllers by their qualified type name
    /// and the configuration bean by `ConfigurationManager`'s qualified name. A name that is
    /// already taken is overwritten.
    ///
    /// # Errors
    ///
    /// - [`BeanError::Instantiation`] if any type fails to construct; the factory is then
    ///   [`Phase::Failed`] and must not be queried.
    /// - [`BeanError::Lifecycle`] unless the factory is [`Phase::Empty`].
    pub fn load_beans(&self) -> Result<(), BeanError> {
        let mut phase = self.phase.write();
        if *phase != Phase::Empty {
            return Err(BeanError::Lifecycle {
                operation: "load beans",
                phase: *phase,
            });
        }

        let mut events = Vec::new();
        match self.instantiate_all(&mut events) {
            Ok(beans) => {
                info!("loaded {} beans", beans.len());
                *self.beans.write() = beans;
                *phase = Phase::Loaded;
                drop(phase);
                self.emit_events(&events);
                Ok(())
            }
            Err(err) => {
                error!("loading beans failed: {err}");
                *phase = Phase::Failed;
                Err(err)
            }
        }
    }

    fn instantiate_all(&self, events: &mut Vec<RegistryEvent>) -> Result<Beans, BeanError> {
        let mut beans = Beans::new();

        for descriptor in self.catalog.types_marked(Marker::Component) {
            let bean_name = self.naming.bean_name(descriptor);
            let bean = self.construct(descriptor, events)?;
            Self::insert(&mut beans, bean_name, bean, events);
        }

        for descriptor in self.catalog.types_marked(Marker::Controller) {
            let bean = self.construct(descriptor, events)?;
            Self::insert(&mut beans, descriptor.name().to_owned(), bean, events);
        }

        let manager = ConfigurationManager::new(self.configuration.current_config());
        Self::insert(
            &mut beans,
            ConfigurationManager::descriptor().name().to_owned(),
            Bean::new(manager),
            events,
        );

        Ok(beans)
    }

    fn construct(
        &self,
        descriptor: &'static TypeDescriptor,
        events: &mut Vec<RegistryEvent>,
    ) -> Result<Bean, BeanError> {
        let bean = self.instantiator.construct(descriptor)?;
        events.push(RegistryEvent::Instantiate {
            type_name: descriptor.name(),
        });
        Ok(bean)
    }

    fn insert(beans: &mut Beans, bean_name: String, bean: Bean, events: &mut Vec<RegistryEvent>) {
        let type_name = bean.descriptor().name();
        debug!("registering bean `{bean_name}` of type `{type_name}`");

        if let Some(previous) = beans.insert(bean_name.clone(), bean) {
            warn!(
                "bean `{bean_name}` of type `{}` replaced by `{type_name}`",
                previous.descriptor().name()
            );
        }
        events.push(RegistryEvent::Register {
            bean_name,
            type_name,
        });
    }

    // -------------------------------------------------------------------------------------------------
    // Post-processing
    // -------------------------------------------------------------------------------------------------

    /// Replaces every bean with the output of its resolved post-processor.
    ///
    /// Every bean is visited exactly once. The whole pass runs under the registry write lock,
    /// so readers never observe a partially processed registry.
    ///
    /// # Errors
    ///
    /// - [`BeanError::PostProcessing`] if a processor fails; the factory is then
    ///   [`Phase::Failed`]. A processor that panics also leaves it [`Phase::Failed`].
    /// - [`BeanError::Lifecycle`] unless the factory is [`Phase::Loaded`].
    pub fn apply_bean_post_processors(&self) -> Result<(), BeanError> {
        let mut phase = self.phase.write();
        if *phase != Phase::Loaded {
            return Err(BeanError::Lifecycle {
                operation: "apply bean post-processors",
                phase: *phase,
            });
        }

        // a processor that panics leaves the factory failed, never loaded with no beans
        *phase = Phase::Failed;
        let mut beans = self.beans.write();
        let loaded = std::mem::take(&mut *beans);
        let mut processed = Beans::with_capacity(loaded.len());
        let mut events = Vec::with_capacity(loaded.len());

        for (bean_name, bean) in loaded {
            let type_name = bean.descriptor().name();
            let processor = self.post_processors.resolve(bean.descriptor());

            let bean = match processor.post_process_after_initialization(&bean_name, bean) {
                Ok(bean) => bean,
                Err(source) => {
                    error!("post-processing bean `{bean_name}` failed: {source}");
                    return Err(PostProcessingError {
                        bean_name,
                        type_name,
                        source,
                    }
                    .into());
                }
            };

            debug!(
                "post-processed bean `{bean_name}`: `{type_name}` -> `{}`",
                bean.descriptor().name()
            );
            events.push(RegistryEvent::PostProcess {
                bean_name: bean_name.clone(),
                type_name: bean.descriptor().name(),
            });
            processed.insert(bean_name, bean);
        }

        info!("post-processed {} beans", processed.len());
        *beans = processed;
        *phase = Phase::Ready;
        drop(beans);
        drop(phase);

        self.emit_events(&events);
        Ok(())
    }

    // -------------------------------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------------------------------

    fn serving(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Phase>, BeanError> {
        let phase = self.phase.read();
        match *phase {
            Phase::Loaded | Phase::Ready => Ok(phase),
            other => Err(BeanError::Lifecycle {
                operation,
                phase: other,
            }),
        }
    }

    /// Names of the beans matching `requested`, from the memo or from a registry scan.
    ///
    /// Returns the number of matches when a scan happened. Concurrent first lookups of the
    /// same type may both scan; the last result stored wins, and both are equal.
    fn bean_names_for_type(
        &self,
        beans: &Beans,
        requested: &'static TypeDescriptor,
    ) -> (Arc<[String]>, Option<usize>) {
        if let Some(names) = self.type_matches.get(requested.name()) {
            return (Arc::clone(names.value()), None);
        }

        let matcher = TypeMatcher::for_type(requested);
        let names: Arc<[String]> = beans
            .iter()
            .filter(|(_, bean)| matcher.matches(bean.descriptor()))
            .map(|(bean_name, _)| bean_name.clone())
            .collect();

        debug!("{} beans match `{}`", names.len(), requested.name());
        self.type_matches.insert(requested.name(), Arc::clone(&names));

        let matches = names.len();
        (names, Some(matches))
    }

    /// The single bean assignable to `T`.
    ///
    /// When several beans match, the first in registration order is returned.
    ///
    /// Lookups are accepted from [`Phase::Loaded`] on, but the names matched for `T` are
    /// memoized on first lookup and never recomputed. A lookup made before
    /// [`apply_bean_post_processors`](Self::apply_bean_post_processors) keeps the pre-proxy
    /// match set, so a proxy that no longer matches `T` is then reported as
    /// [`BeanError::NotFound`]. Query only a [`Phase::Ready`] factory unless that is intended.
    ///
    /// # Errors
    ///
    /// - [`BeanError::NotFound`] if no bean matches `T`, or the first match is not an
    ///   instance of `T`
    /// - [`BeanError::Lifecycle`] if the factory is not loaded
    pub fn get_bean<T: BeanType + ?Sized>(&self) -> Result<Arc<T>, BeanError> {
        let requested = T::descriptor();

        let (result, scanned) = {
            let _phase = self.serving("get a bean")?;
            let beans = self.beans.read();
            let (names, scanned) = self.bean_names_for_type(&beans, requested);

            let result = names
                .first()
                .and_then(|bean_name| beans.get(bean_name))
                .and_then(T::cast)
                .ok_or_else(|| BeanError::not_found(requested));
            (result, scanned)
        };

        if let Some(matches) = scanned {
            self.emit_event(&RegistryEvent::Scan {
                type_name: requested.name(),
                matches,
            });
        }
        self.emit_event(&RegistryEvent::Get {
            type_name: requested.name(),
            found: result.is_ok(),
        });

        result
    }

    /// All beans assignable to `T`, keyed by bean name, in registration order.
    ///
    /// Unlike [`get_bean`](Self::get_bean), no match is not an error. The same memo applies:
    /// a lookup made in [`Phase::Loaded`] fixes the matched names for `T` before proxies
    /// replace the beans.
    ///
    /// # Errors
    ///
    /// - [`BeanError::NotFound`] if a matching bean is not an instance of `T`
    /// - [`BeanError::Lifecycle`] if the factory is not loaded
    pub fn get_beans_of_type<T: BeanType + ?Sized>(
        &self,
    ) -> Result<IndexMap<String, Arc<T>>, BeanError> {
        let requested = T::descriptor();

        let (result, scanned) = {
            let _phase = self.serving("get beans of a type")?;
            let beans = self.beans.read();
            let (names, scanned) = self.bean_names_for_type(&beans, requested);

            let result = names
                .iter()
                .map(|bean_name| {
                    beans
                        .get(bean_name)
                        .and_then(T::cast)
                        .map(|bean| (bean_name.clone(), bean))
                        .ok_or_else(|| BeanError::not_found(requested))
                })
                .collect::<Result<IndexMap<_, _>, _>>();
            (result, scanned)
        };

        if let Some(matches) = scanned {
            self.emit_event(&RegistryEvent::Scan {
                type_name: requested.name(),
                matches,
            });
        }

        result
    }

    /// The bean registered under `bean_name`, as a `T`.
    ///
    /// # Errors
    ///
    /// - [`BeanError::NoSuchBean`] if no bean has that name
    /// - [`BeanError::TypeMismatch`] if the bean is not an instance of `T`
    /// - [`BeanError::Lifecycle`] if the factory is not loaded
    pub fn get_bean_by_name<T: BeanType + ?Sized>(
        &self,
        bean_name: &str,
    ) -> Result<Arc<T>, BeanError> {
        let _phase = self.serving("get a bean by name")?;
        let beans = self.beans.read();

        let bean = beans.get(bean_name).ok_or_else(|| BeanError::NoSuchBean {
            bean_name: bean_name.to_owned(),
        })?;
        T::cast(bean).ok_or_else(|| BeanError::TypeMismatch {
            bean_name: bean_name.to_owned(),
            type_name: T::descriptor().name(),
        })
    }

    pub fn contains_bean(&self, bean_name: &str) -> bool {
        self.beans.read().contains_key(bean_name)
    }

    /// Bean names in registration order.
    pub fn bean_names(&self) -> Vec<String> {
        self.beans.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.beans.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.beans.read().is_empty()
    }

    /// Drops every bean and memoized match and returns the factory to [`Phase::Empty`].
    ///
    /// Already-retrieved `Arc`s stay valid. Intended for tests.
    #[doc(hidden)]
    pub fn clear(&self) {
        {
            let mut phase = self.phase.write();
            self.beans.write().clear();
            self.type_matches.clear();
            *phase = Phase::Empty;
        }
        self.emit_event(&RegistryEvent::Clear {});
    }
}

impl Default for BeanFactory {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for BeanFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanFactory")
            .field("phase", &self.phase())
            .field("beans", &self.bean_names())
            .finish_non_exhaustive()
    }
}

// -------------------------------------------------------------------------------------------------
// Builder
// -------------------------------------------------------------------------------------------------

/// Builder for [`BeanFactory`].
///
/// Defaults: [`InventoryCatalog`], [`DescriptorInstantiator`],
/// [`DecapitalizingNameGenerator`], an empty configuration and [`PassThroughResolver`].
pub struct BeanFactoryBuilder {
    catalog: Box<dyn TypeCatalog>,
    instantiator: Box<dyn Instantiator>,
    naming: Box<dyn BeanNameGenerator>,
    configuration: Box<dyn ConfigurationSupplier>,
    post_processors: Box<dyn PostProcessorResolver>,
}

impl Default for BeanFactoryBuilder {
    fn default() -> Self {
        Self {
            catalog: Box::new(InventoryCatalog),
            instantiator: Box::new(DescriptorInstantiator),
            naming: Box::new(DecapitalizingNameGenerator),
            configuration: Box::new(crate::Configuration::new()),
            post_processors: Box::new(PassThroughResolver),
        }
    }
}

impl BeanFactoryBuilder {
    pub fn catalog(mut self, catalog: impl TypeCatalog + 'static) -> Self {
        self.catalog = Box::new(catalog);
        self
    }

    pub fn instantiator(mut self, instantiator: impl Instantiator + 'static) -> Self {
        self.instantiator = Box::new(instantiator);
        self
    }

    pub fn naming(mut self, naming: impl BeanNameGenerator + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    pub fn configuration(mut self, configuration: impl ConfigurationSupplier + 'static) -> Self {
        self.configuration = Box::new(configuration);
        self
    }

    pub fn post_processors(mut self, resolver: impl PostProcessorResolver + 'static) -> Self {
        self.post_processors = Box::new(resolver);
        self
    }

    pub fn build(self) -> BeanFactory {
        BeanFactory {
            catalog: self.catalog,
            instantiator: self.instantiator,
            naming: self.naming,
            configuration: self.configuration,
            post_processors: self.post_processors,
            phase: RwLock::new(Phase::Empty),
            beans: RwLock::new(Beans::new()),
            type_matches: DashMap::new(),
            trace: Mutex::new(None),
        }
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
