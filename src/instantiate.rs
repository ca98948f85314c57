//! Instantiation of discovered types.

use std::sync::Arc;

use crate::{Bean, BeanInstance, BoxError, InstantiationError, TypeDescriptor, TypeKind};

/// Produces a default-constructed instance of a described type.
pub trait Instantiator: Send + Sync {
    /// Constructs one instance of `descriptor`.
    ///
    /// # Errors
    ///
    /// Fails when the type cannot be constructed or its constructor reports an error.
    fn construct(&self, descriptor: &'static TypeDescriptor) -> Result<Bean, InstantiationError>;
}

/// Calls the constructor recorded in the descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorInstantiator;

impl Instantiator for DescriptorInstantiator {
    fn construct(&self, descriptor: &'static TypeDescriptor) -> Result<Bean, InstantiationError> {
        let constructor = match (descriptor.kind(), descriptor.constructor()) {
            (TypeKind::Concrete, Some(constructor)) => constructor,
            _ => {
                return Err(InstantiationError::NotConstructible {
                    type_name: descriptor.name(),
                    kind: descriptor.kind(),
                });
            }
        };

        let instance = constructor().map_err(|source| InstantiationError::Constructor {
            type_name: descriptor.name(),
            source,
        })?;

        Ok(Bean::from_parts(descriptor, instance))
    }
}

/// Constructor for types implementing `Default`.
pub fn default_constructor<T: Default + Send + Sync + 'static>() -> Result<BeanInstance, BoxError> {
    Ok(Arc::new(T::default()))
}

/// Adapts a fallible constructor result.
#[doc(hidden)]
pub fn construct_with<T, E>(result: Result<T, E>) -> Result<BeanInstance, BoxError>
where
    T: Send + Sync + 'static,
    E: Into<BoxError>,
{
    result
        .map(|value| Arc::new(value) as BeanInstance)
        .map_err(Into::into)
}
