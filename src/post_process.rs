//! Post-processing contracts.
//!
//! The factory does not know what a post-processor does. It resolves one processor per bean
//! from the bean's runtime type and stores whatever the processor returns in place of the
//! original bean.

use std::sync::Arc;

use crate::{Bean, BoxError, TypeDescriptor};

/// Transforms a bean after construction, e.g. by wrapping it in a proxy.
pub trait BeanPostProcessor: Send + Sync {
    /// Returns the bean that replaces `bean` in the registry.
    fn post_process_after_initialization(
        &self,
        bean_name: &str,
        bean: Bean,
    ) -> Result<Bean, BoxError>;
}

impl<F> BeanPostProcessor for F
where
    F: Fn(&str, Bean) -> Result<Bean, BoxError> + Send + Sync,
{
    fn post_process_after_initialization(
        &self,
        bean_name: &str,
        bean: Bean,
    ) -> Result<Bean, BoxError> {
        self(bean_name, bean)
    }
}

/// Returns every bean unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl BeanPostProcessor for PassThrough {
    fn post_process_after_initialization(
        &self,
        _bean_name: &str,
        bean: Bean,
    ) -> Result<Bean, BoxError> {
        Ok(bean)
    }
}

/// Picks the post-processor for a bean's runtime type.
pub trait PostProcessorResolver: Send + Sync {
    fn resolve(&self, descriptor: &'static TypeDescriptor) -> Arc<dyn BeanPostProcessor>;
}

impl<F> PostProcessorResolver for F
where
    F: Fn(&'static TypeDescriptor) -> Arc<dyn BeanPostProcessor> + Send + Sync,
{
    fn resolve(&self, descriptor: &'static TypeDescriptor) -> Arc<dyn BeanPostProcessor> {
        self(descriptor)
    }
}

/// Resolves [`PassThrough`] for every type.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThroughResolver;

impl PostProcessorResolver for PassThroughResolver {
    fn resolve(&self, _descriptor: &'static TypeDescriptor) -> Arc<dyn BeanPostProcessor> {
        Arc::new(PassThrough)
    }
}

/// Resolves the same processor for every type.
#[derive(Clone)]
pub struct SharedProcessor(Arc<dyn BeanPostProcessor>);

impl SharedProcessor {
    pub fn new(processor: impl BeanPostProcessor + 'static) -> Self {
        Self(Arc::new(processor))
    }
}

impl PostProcessorResolver for SharedProcessor {
    fn resolve(&self, _descriptor: &'static TypeDescriptor) -> Arc<dyn BeanPostProcessor> {
        Arc::clone(&self.0)
    }
}

/// Chooses between two processors by whether the bean's type declares interfaces.
///
/// Types with interfaces can be replaced by an interface proxy; plain types need a
/// processor that knows how to wrap the concrete type.
#[derive(Clone)]
pub struct InterfaceAwareResolver {
    interface_based: Arc<dyn BeanPostProcessor>,
    class_based: Arc<dyn BeanPostProcessor>,
}

impl InterfaceAwareResolver {
    pub fn new(
        interface_based: impl BeanPostProcessor + 'static,
        class_based: impl BeanPostProcessor + 'static,
    ) -> Self {
        Self {
            interface_based: Arc::new(interface_based),
            class_based: Arc::new(class_based),
        }
    }
}

impl PostProcessorResolver for InterfaceAwareResolver {
    fn resolve(&self, descriptor: &'static TypeDescriptor) -> Arc<dyn BeanPostProcessor> {
        if descriptor.interfaces().next().is_some() {
            Arc::clone(&self.interface_based)
        } else {
            Arc::clone(&self.class_based)
        }
    }
}
