//! Bean naming policy for component types.

use crate::TypeDescriptor;

/// Derives the bean name of a component type.
pub trait BeanNameGenerator: Send + Sync {
    fn bean_name(&self, descriptor: &TypeDescriptor) -> String;
}

impl<F> BeanNameGenerator for F
where
    F: Fn(&TypeDescriptor) -> String + Send + Sync,
{
    fn bean_name(&self, descriptor: &TypeDescriptor) -> String {
        self(descriptor)
    }
}

/// Uses the declared bean name if any, otherwise the decapitalized simple type name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecapitalizingNameGenerator;

impl BeanNameGenerator for DecapitalizingNameGenerator {
    fn bean_name(&self, descriptor: &TypeDescriptor) -> String {
        match descriptor.bean_name() {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => decapitalize(descriptor.simple_name()),
        }
    }
}

/// Lower-cases the first character, unless the first two are both upper case.
///
/// ```rust
/// use bean_registry::decapitalize;
///
/// assert_eq!(decapitalize("UserService"), "userService");
/// assert_eq!(decapitalize("URLParser"), "URLParser");
/// ```
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_owned()
        }
        (Some(first), _) => first.to_lowercase().chain(name[first.len_utf8()..].chars()).collect(),
        (None, _) => String::new(),
    }
}
