//! # Bean Registry
//!
//! A thread-safe registry of named singleton beans, discovered by marker, looked up by type
//! and rewritten once by a post-processing pass before it is used.
//!
//! Types are described statically: [`bean_type!`] and [`interface!`] produce the
//! [`TypeDescriptor`]s the registry matches against, and [`component!`] / [`controller!`]
//! additionally submit a type to the link-time catalog.
//!
//! ## Quick Start
//!
//! ```rust
//! use bean_registry::{component, interface, BeanFactory};
//! use std::sync::Arc;
//!
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//! interface!(Greeter);
//!
//! #[derive(Default)]
//! pub struct English;
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//! component!(English: Greeter);
//!
//! let factory = BeanFactory::default();
//! factory.load_beans().unwrap();
//! factory.apply_bean_post_processors().unwrap();
//!
//! let greeter: Arc<dyn Greeter> = factory.get_bean().unwrap();
//! assert_eq!(greeter.greet(), "hello");
//! ```
//!
//! ## Lifecycle
//!
//! 1. [`BeanFactory::load_beans`] instantiates every component and controller from the
//!    [`TypeCatalog`] and registers the [`ConfigurationManager`] bean.
//! 2. [`BeanFactory::apply_bean_post_processors`] replaces each bean with the output of its
//!    [`BeanPostProcessor`].
//! 3. [`BeanFactory::get_bean`] and [`BeanFactory::get_beans_of_type`] serve lookups from
//!    any thread.
//!
//! ## Main Types
//!
//! - [`BeanFactory`] - the registry and its lifecycle
//! - [`TypeIndex`] / [`InventoryCatalog`] - where discovered types come from
//! - [`Instantiator`] - how a discovered type is constructed
//! - [`BeanNameGenerator`] - how component beans are named
//! - [`PostProcessorResolver`] - which post-processor handles a bean
//! - [`RegistryEvent`] - events delivered to the trace callback

mod catalog;
mod config;
mod descriptor;
mod factory;
mod factory_error;
mod factory_event;
mod instantiate;
mod macros;
mod matcher;
mod naming;
mod post_process;

pub use catalog::{InventoryCatalog, MarkedType, Marker, TypeCatalog, TypeIndex};
pub use config::{
    Configuration, ConfigurationManager, ConfigurationSupplier, EnvConfigurationSupplier,
};
pub use descriptor::{
    Bean, BeanInstance, BeanType, BoxError, Constructor, Implementation, TypeDescriptor,
    TypeKind, Upcast,
};
pub use factory::{BeanFactory, BeanFactoryBuilder, Phase, TraceCallback};
pub use factory_error::{BeanError, InstantiationError, PostProcessingError};
pub use factory_event::RegistryEvent;
pub use instantiate::{default_constructor, DescriptorInstantiator, Instantiator};
pub use matcher::TypeMatcher;
pub use naming::{decapitalize, BeanNameGenerator, DecapitalizingNameGenerator};
pub use post_process::{
    BeanPostProcessor, InterfaceAwareResolver, PassThrough, PassThroughResolver,
    PostProcessorResolver, SharedProcessor,
};

#[doc(hidden)]
pub use descriptor::{downcast_concrete, upcast_interface};
#[doc(hidden)]
pub use instantiate::construct_with;
#[doc(hidden)]
pub use inventory;
