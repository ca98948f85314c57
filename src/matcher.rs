//! The two-case rule deciding whether a stored bean matches a requested type.

use crate::TypeDescriptor;

/// Matching rule for one requested type.
///
/// - `Interface`: the bean's runtime type must *directly* declare the interface; interfaces
///   declared by its supertypes do not count.
/// - `Concrete`: the bean's runtime type must be assignable from the requested type. This is
///   the reverse of the usual "bean is a requested" direction, so a bean whose type is a
///   supertype of the request is matched (and later rejected by the is-instance check) while
///   a bean of a subtype is not matched at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMatcher {
    Interface(&'static TypeDescriptor),
    Concrete(&'static TypeDescriptor),
}

impl TypeMatcher {
    pub fn for_type(requested: &'static TypeDescriptor) -> Self {
        if requested.is_interface() {
            TypeMatcher::Interface(requested)
        } else {
            TypeMatcher::Concrete(requested)
        }
    }

    pub fn requested(&self) -> &'static TypeDescriptor {
        match self {
            TypeMatcher::Interface(requested) | TypeMatcher::Concrete(requested) => requested,
        }
    }

    /// Whether a bean whose runtime type is `candidate` matches.
    pub fn matches(&self, candidate: &TypeDescriptor) -> bool {
        match self {
            TypeMatcher::Interface(interface) => candidate.declares_interface(interface),
            TypeMatcher::Concrete(requested) => candidate.is_assignable_from(requested),
        }
    }
}
