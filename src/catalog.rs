//! Type discovery.
//!
//! A [`TypeCatalog`] answers "which types carry this marker?". [`TypeIndex`] is an explicit,
//! in-memory index; [`InventoryCatalog`] reads the types submitted at link time by the
//! [`component!`](crate::component) and [`controller!`](crate::controller) macros.

use std::fmt;

use indexmap::IndexMap;

use crate::TypeDescriptor;

/// Marker categories a type can be discovered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Marker {
    /// A general-purpose bean, named by the naming policy.
    Component,
    /// A request-handling bean, keyed by its qualified type name.
    Controller,
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Component => f.write_str("component"),
            Marker::Controller => f.write_str("controller"),
        }
    }
}

/// Source of discovered types, queried once per marker during load.
pub trait TypeCatalog: Send + Sync {
    /// All types carrying `marker`, without duplicates, in a stable order.
    fn types_marked(&self, marker: Marker) -> Vec<&'static TypeDescriptor>;
}

// -------------------------------------------------------------------------------------------------
// TypeIndex
// -------------------------------------------------------------------------------------------------

/// Explicit marker → types index.
///
/// Types are kept in the order they were added; adding a type twice under the same marker
/// is a no-op.
///
/// # Examples
///
/// ```rust
/// use bean_registry::{bean_type, BeanType, Marker, TypeCatalog, TypeIndex};
///
/// #[derive(Default)]
/// struct Clock;
/// bean_type!(Clock);
///
/// let index = TypeIndex::new().with(Marker::Component, Clock::descriptor());
/// assert_eq!(index.types_marked(Marker::Component).len(), 1);
/// assert!(index.types_marked(Marker::Controller).is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    classes: IndexMap<Marker, Vec<&'static TypeDescriptor>>,
}

impl TypeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of another catalog.
    pub fn scan(catalog: &dyn TypeCatalog) -> Self {
        let mut index = Self::new();
        for marker in [Marker::Component, Marker::Controller] {
            for descriptor in catalog.types_marked(marker) {
                index.mark(marker, descriptor);
            }
        }
        index
    }

    /// Adds `descriptor` under `marker`.
    pub fn mark(&mut self, marker: Marker, descriptor: &'static TypeDescriptor) -> &mut Self {
        let types = self.classes.entry(marker).or_default();
        if !types.contains(&descriptor) {
            types.push(descriptor);
        }
        self
    }

    /// Builder form of [`mark`](Self::mark).
    pub fn with(mut self, marker: Marker, descriptor: &'static TypeDescriptor) -> Self {
        self.mark(marker, descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TypeCatalog for TypeIndex {
    fn types_marked(&self, marker: Marker) -> Vec<&'static TypeDescriptor> {
        self.classes.get(&marker).cloned().unwrap_or_default()
    }
}

// -------------------------------------------------------------------------------------------------
// Link-time catalog
// -------------------------------------------------------------------------------------------------

/// A marked type submitted through `inventory`.
pub struct MarkedType {
    marker: Marker,
    descriptor: fn() -> &'static TypeDescriptor,
}

impl MarkedType {
    pub const fn new(marker: Marker, descriptor: fn() -> &'static TypeDescriptor) -> Self {
        Self { marker, descriptor }
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    pub fn descriptor(&self) -> &'static TypeDescriptor {
        (self.descriptor)()
    }
}

inventory::collect!(MarkedType);

/// Catalog of every type declared with `component!` or `controller!` in the final binary.
///
/// Link order is not stable, so types are returned sorted by qualified name.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryCatalog;

impl TypeCatalog for InventoryCatalog {
    fn types_marked(&self, marker: Marker) -> Vec<&'static TypeDescriptor> {
        let mut types: Vec<&'static TypeDescriptor> = inventory::iter::<MarkedType>
            .into_iter()
            .filter(|marked| marked.marker() == marker)
            .map(MarkedType::descriptor)
            .collect();
        types.sort_by_key(|descriptor| descriptor.name());
        types.dedup();
        types
    }
}
