//! Declaration macros.
//!
//! These macros produce the static descriptors the registry works from, and optionally
//! submit the declared type to the link-time catalog under a marker.

/// Implements [`BeanType`](crate::BeanType) for a trait object.
///
/// # Examples
///
/// ```rust
/// use bean_registry::{interface, BeanType};
///
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// interface!(Greeter);
///
/// assert!(<dyn Greeter>::descriptor().is_interface());
/// ```
#[macro_export]
macro_rules! interface {
    ($iface:ident) => {
        impl $crate::BeanType for dyn $iface {
            fn descriptor() -> &'static $crate::TypeDescriptor {
                static DESCRIPTOR: $crate::TypeDescriptor = $crate::TypeDescriptor::interface(
                    concat!(module_path!(), "::", stringify!($iface)),
                    stringify!($iface),
                );
                &DESCRIPTOR
            }

            fn cast(bean: &$crate::Bean) -> Option<::std::sync::Arc<Self>> {
                $crate::upcast_interface::<Self>(bean, <Self as $crate::BeanType>::descriptor())
            }
        }
    };
}

/// Implements [`BeanType`](crate::BeanType) for a concrete type.
///
/// The grammar is `Type [as "name"] [: Interface, ...] [=> constructor]`:
///
/// - `as "name"` overrides the bean name derived by the naming policy;
/// - `: Interface, ...` lists the interfaces the type declares directly, each of which
///   must have been declared with [`interface!`](crate::interface);
/// - `=> constructor` names a `fn() -> Result<Type, E>` used instead of `Default`.
///
/// `abstract Type [: Interface, ...]` describes a type the registry never constructs,
/// such as a proxy produced by a post-processor.
///
/// # Examples
///
/// ```rust
/// use bean_registry::{bean_type, interface, Bean, BeanType};
/// use std::sync::Arc;
///
/// pub trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// interface!(Greeter);
///
/// #[derive(Default)]
/// pub struct English;
///
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
///
/// bean_type!(English as "english": Greeter);
///
/// let bean = Bean::new(English);
/// let greeter: Arc<dyn Greeter> = bean.downcast().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// assert_eq!(English::descriptor().bean_name(), Some("english"));
/// ```
#[macro_export]
macro_rules! bean_type {
    (@constructor $ty:ident) => {
        $crate::default_constructor::<$ty>
    };
    (@constructor $ty:ident, $ctor:path) => {
        || $crate::construct_with($ctor())
    };
    (@interfaces $ty:ident $(, $iface:ident)*) => {
        &[$(
            $crate::Implementation {
                interface: <dyn $iface as $crate::BeanType>::descriptor,
                upcast: |instance| {
                    let concrete = instance.downcast::<$ty>().ok()?;
                    let upcast: ::std::sync::Arc<dyn $iface> = concrete;
                    Some(Box::new(upcast) as Box<dyn ::std::any::Any>)
                },
            },
        )*]
    };
    (@cast) => {
        fn cast(bean: &$crate::Bean) -> Option<::std::sync::Arc<Self>> {
            $crate::downcast_concrete::<Self>(bean)
        }
    };
    (abstract $ty:ident $(: $($iface:ident),+ $(,)?)?) => {
        impl $crate::BeanType for $ty {
            fn descriptor() -> &'static $crate::TypeDescriptor {
                const INTERFACES: &[$crate::Implementation] =
                    $crate::bean_type!(@interfaces $ty $($(, $iface)+)?);
                static DESCRIPTOR: $crate::TypeDescriptor = $crate::TypeDescriptor::abstract_type(
                    concat!(module_path!(), "::", stringify!($ty)),
                    stringify!($ty),
                )
                .implementing(INTERFACES);
                &DESCRIPTOR
            }

            $crate::bean_type!(@cast);
        }
    };
    ($ty:ident $(as $name:literal)? $(: $($iface:ident),+ $(,)?)? $(=> $ctor:path)?) => {
        impl $crate::BeanType for $ty {
            fn descriptor() -> &'static $crate::TypeDescriptor {
                const INTERFACES: &[$crate::Implementation] =
                    $crate::bean_type!(@interfaces $ty $($(, $iface)+)?);
                const CONSTRUCTOR: $crate::Constructor =
                    $crate::bean_type!(@constructor $ty $(, $ctor)?);
                static DESCRIPTOR: $crate::TypeDescriptor = $crate::TypeDescriptor::concrete(
                    concat!(module_path!(), "::", stringify!($ty)),
                    stringify!($ty),
                )
                .with_constructor(CONSTRUCTOR)
                .implementing(INTERFACES)
                $(.named($name))?;
                &DESCRIPTOR
            }

            $crate::bean_type!(@cast);
        }
    };
}

/// Declares a bean type and registers it under [`Marker::Component`](crate::Marker).
///
/// Accepts the same grammar as [`bean_type!`](crate::bean_type). Component beans are
/// named by the factory's naming policy.
#[macro_export]
macro_rules! component {
    ($ty:ident $($rest:tt)*) => {
        $crate::bean_type!($ty $($rest)*);

        $crate::inventory::submit! {
            $crate::MarkedType::new(
                $crate::Marker::Component,
                <$ty as $crate::BeanType>::descriptor,
            )
        }
    };
}

/// Declares a bean type and registers it under [`Marker::Controller`](crate::Marker).
///
/// Controller beans are keyed by their fully qualified type name.
#[macro_export]
macro_rules! controller {
    ($ty:ident $($rest:tt)*) => {
        $crate::bean_type!($ty $($rest)*);

        $crate::inventory::submit! {
            $crate::MarkedType::new(
                $crate::Marker::Controller,
                <$ty as $crate::BeanType>::descriptor,
            )
        }
    };
}
