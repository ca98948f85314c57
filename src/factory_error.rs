use thiserror::Error;

use crate::{BoxError, Phase, TypeDescriptor, TypeKind};

/// Errors surfaced by the bean factory.
#[derive(Debug, Error)]
pub enum BeanError {
    /// No bean is assignable to the requested type, or the cached match no longer is.
    #[error("no bean assignable to `{type_name}` was found")]
    NotFound { type_name: &'static str },

    #[error("no bean named `{bean_name}` is registered")]
    NoSuchBean { bean_name: String },

    #[error("bean `{bean_name}` is not an instance of `{type_name}`")]
    TypeMismatch {
        bean_name: String,
        type_name: &'static str,
    },

    #[error(transparent)]
    Instantiation(#[from] InstantiationError),

    #[error(transparent)]
    PostProcessing(#[from] PostProcessingError),

    /// An operation was attempted in the wrong lifecycle phase.
    #[error("cannot {operation} while the bean factory is {phase}")]
    Lifecycle {
        operation: &'static str,
        phase: Phase,
    },
}

impl BeanError {
    pub(crate) fn not_found(descriptor: &TypeDescriptor) -> Self {
        BeanError::NotFound {
            type_name: descriptor.name(),
        }
    }
}

/// A discovered type could not be constructed.
#[derive(Debug, Error)]
pub enum InstantiationError {
    #[error("`{type_name}` cannot be instantiated: {kind:?} type without a default constructor")]
    NotConstructible {
        type_name: &'static str,
        kind: TypeKind,
    },

    #[error("constructor of `{type_name}` failed")]
    Constructor {
        type_name: &'static str,
        #[source]
        source: BoxError,
    },
}

/// A post-processor rejected a bean.
#[derive(Debug, Error)]
#[error("post-processing bean `{bean_name}` of type `{type_name}` failed")]
pub struct PostProcessingError {
    pub bean_name: String,
    pub type_name: &'static str,
    #[source]
    pub source: BoxError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_not_found_display() {
        let err = BeanError::NotFound {
            type_name: "app::Animal",
        };
        assert_eq!(err.to_string(), "no bean assignable to `app::Animal` was found");
    }

    #[test]
    fn test_lifecycle_display() {
        let err = BeanError::Lifecycle {
            operation: "load beans",
            phase: Phase::Ready,
        };
        assert_eq!(
            err.to_string(),
            "cannot load beans while the bean factory is ready"
        );
    }

    #[test]
    fn test_instantiation_display() {
        let err = InstantiationError::NotConstructible {
            type_name: "app::Shape",
            kind: TypeKind::Interface,
        };
        assert_eq!(
            err.to_string(),
            "`app::Shape` cannot be instantiated: Interface type without a default constructor"
        );
    }

    #[test]
    fn test_instantiation_is_transparent() {
        let err: BeanError = InstantiationError::Constructor {
            type_name: "app::Socket",
            source: "port taken".into(),
        }
        .into();
        assert_eq!(err.to_string(), "constructor of `app::Socket` failed");
        assert_eq!(err.source().unwrap().to_string(), "port taken");
    }

    #[test]
    fn test_post_processing_source() {
        let err = PostProcessingError {
            bean_name: "cat".to_string(),
            type_name: "app::Cat",
            source: "proxy refused".into(),
        };
        assert_eq!(
            err.to_string(),
            "post-processing bean `cat` of type `app::Cat` failed"
        );
        assert_eq!(err.source().unwrap().to_string(), "proxy refused");
    }
}
