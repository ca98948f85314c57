//! Static type descriptors.
//!
//! Rust has no runtime reflection, so every type the registry knows about carries a
//! `TypeDescriptor`: a build-time record of its qualified name, its kind, how to construct
//! it, and the interfaces (trait objects) it directly declares. Descriptors live in statics
//! and are normally produced by the [`bean_type!`](crate::bean_type) and
//! [`interface!`](crate::interface) macros.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A type-erased bean instance.
pub type BeanInstance = Arc<dyn Any + Send + Sync>;

/// Boxed error returned by constructors and post-processors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Zero-argument constructor stored in a descriptor.
pub type Constructor = fn() -> Result<BeanInstance, BoxError>;

/// Converts an instance of a concrete type into a boxed `Arc<dyn Interface>`.
///
/// Returns `None` when the instance is not of the concrete type the upcast was generated for.
pub type Upcast = fn(BeanInstance) -> Option<Box<dyn Any>>;

/// Shape of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// A plain struct or enum with a constructor.
    Concrete,
    /// A type the registry never constructs itself.
    Abstract,
    /// A trait object (`dyn Trait`).
    Interface,
}

/// One directly declared interface of a concrete type.
#[derive(Clone, Copy)]
pub struct Implementation {
    /// Descriptor accessor of the implemented interface.
    pub interface: fn() -> &'static TypeDescriptor,
    /// Upcast from the concrete instance to `Arc<dyn Interface>`.
    pub upcast: Upcast,
}

impl Implementation {
    /// Descriptor of the implemented interface.
    pub fn interface(&self) -> &'static TypeDescriptor {
        (self.interface)()
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Implementation")
            .field(&self.interface().name())
            .finish()
    }
}

/// Build-time description of a type known to the registry.
///
/// Two descriptors are equal when their qualified names are equal.
pub struct TypeDescriptor {
    name: &'static str,
    simple_name: &'static str,
    kind: TypeKind,
    constructor: Option<Constructor>,
    bean_name: Option<&'static str>,
    superclass: Option<fn() -> &'static TypeDescriptor>,
    interfaces: &'static [Implementation],
}

impl TypeDescriptor {
    const fn new(name: &'static str, simple_name: &'static str, kind: TypeKind) -> Self {
        Self {
            name,
            simple_name,
            kind,
            constructor: None,
            bean_name: None,
            superclass: None,
            interfaces: &[],
        }
    }

    /// Describes a concrete type.
    pub const fn concrete(name: &'static str, simple_name: &'static str) -> Self {
        Self::new(name, simple_name, TypeKind::Concrete)
    }

    /// Describes a type the registry must never construct.
    pub const fn abstract_type(name: &'static str, simple_name: &'static str) -> Self {
        Self::new(name, simple_name, TypeKind::Abstract)
    }

    /// Describes an interface (trait object).
    pub const fn interface(name: &'static str, simple_name: &'static str) -> Self {
        Self::new(name, simple_name, TypeKind::Interface)
    }

    /// Sets the zero-argument constructor.
    pub const fn with_constructor(self, constructor: Constructor) -> Self {
        Self {
            constructor: Some(constructor),
            ..self
        }
    }

    /// Overrides the bean name the naming policy would derive.
    pub const fn named(self, bean_name: &'static str) -> Self {
        Self {
            bean_name: Some(bean_name),
            ..self
        }
    }

    /// Declares the direct supertype.
    pub const fn extending(self, superclass: fn() -> &'static TypeDescriptor) -> Self {
        Self {
            superclass: Some(superclass),
            ..self
        }
    }

    /// Declares the directly implemented interfaces.
    pub const fn implementing(self, interfaces: &'static [Implementation]) -> Self {
        Self { interfaces, ..self }
    }

    /// Fully qualified name, e.g. `my_app::services::UserService`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn simple_name(&self) -> &'static str {
        self.simple_name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    /// Explicit bean name, if one was declared.
    pub fn bean_name(&self) -> Option<&'static str> {
        self.bean_name
    }

    pub fn constructor(&self) -> Option<Constructor> {
        self.constructor
    }

    pub fn superclass(&self) -> Option<&'static TypeDescriptor> {
        self.superclass.map(|superclass| superclass())
    }

    /// Directly declared interfaces, without those of supertypes.
    pub fn interfaces(&self) -> impl Iterator<Item = &'static TypeDescriptor> + '_ {
        self.interfaces.iter().map(Implementation::interface)
    }

    /// Whether `interface` is among the directly declared interfaces.
    pub fn declares_interface(&self, interface: &TypeDescriptor) -> bool {
        self.interfaces().any(|declared| declared == interface)
    }

    /// Whether a value of type `other` can be used where `self` is expected.
    ///
    /// True when `other` is `self`, or when `self` is reachable from `other` through its
    /// supertype chain or the interfaces declared along that chain.
    pub fn is_assignable_from(&self, other: &TypeDescriptor) -> bool {
        if self == other || other.declares_interface(self) {
            return true;
        }
        other
            .superclass()
            .is_some_and(|superclass| self.is_assignable_from(superclass))
    }

    /// Upcasts `instance` to the given interface.
    ///
    /// The returned box holds an `Arc<dyn Interface>`.
    pub fn upcast(
        &self,
        interface: &TypeDescriptor,
        instance: BeanInstance,
    ) -> Option<Box<dyn Any>> {
        self.interfaces
            .iter()
            .find(|implementation| implementation.interface() == interface)
            .and_then(|implementation| (implementation.upcast)(instance))
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeDescriptor {}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("bean_name", &self.bean_name)
            .field("interfaces", &self.interfaces)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// -------------------------------------------------------------------------------------------------
// Typed access
// -------------------------------------------------------------------------------------------------

/// A type that can be requested from the registry.
///
/// Implemented for concrete bean types by [`bean_type!`](crate::bean_type) and for trait
/// objects by [`interface!`](crate::interface).
pub trait BeanType: 'static {
    /// The static descriptor of this type.
    fn descriptor() -> &'static TypeDescriptor;

    /// The is-instance check: returns the bean as `Arc<Self>` when it is one.
    fn cast(bean: &Bean) -> Option<Arc<Self>>;
}

/// A stored bean: the instance paired with the descriptor of its runtime type.
#[derive(Clone)]
pub struct Bean {
    descriptor: &'static TypeDescriptor,
    instance: BeanInstance,
}

impl Bean {
    pub fn new<T: BeanType + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    pub fn from_arc<T: BeanType + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            descriptor: T::descriptor(),
            instance: value,
        }
    }

    /// Pairs an erased instance with its descriptor.
    ///
    /// The caller is responsible for `descriptor` describing the instance's actual type.
    pub fn from_parts(descriptor: &'static TypeDescriptor, instance: BeanInstance) -> Self {
        Self {
            descriptor,
            instance,
        }
    }

    pub fn descriptor(&self) -> &'static TypeDescriptor {
        self.descriptor
    }

    pub fn instance(&self) -> &BeanInstance {
        &self.instance
    }

    /// Returns the bean as `Arc<T>` if it is an instance of `T`.
    pub fn downcast<T: BeanType + ?Sized>(&self) -> Option<Arc<T>> {
        T::cast(self)
    }

    pub fn is_instance_of<T: BeanType + ?Sized>(&self) -> bool {
        self.downcast::<T>().is_some()
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("type", &self.descriptor.name())
            .finish_non_exhaustive()
    }
}

/// Is-instance check for concrete types.
#[doc(hidden)]
pub fn downcast_concrete<T: Any + Send + Sync>(bean: &Bean) -> Option<Arc<T>> {
    Arc::clone(&bean.instance).downcast::<T>().ok()
}

/// Is-instance check for interfaces, via the bean's declared upcasts.
#[doc(hidden)]
pub fn upcast_interface<I: ?Sized + 'static>(
    bean: &Bean,
    interface: &TypeDescriptor,
) -> Option<Arc<I>> {
    let boxed = bean
        .descriptor
        .upcast(interface, Arc::clone(&bean.instance))?;
    boxed.downcast::<Arc<I>>().ok().map(|arc| *arc)
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
