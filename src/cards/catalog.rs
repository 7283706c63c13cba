//! Descriptor catalog for lookup by identifier.
//!
//! A `DescriptorCatalog` stores the descriptors an application knows about.
//! Catalogs are owned values: embedders build one (usually starting from
//! `builtin()`), register their own descriptors, and hand it to whatever
//! needs lookup. There is no global registry.

use rustc_hash::FxHashMap;

use crate::core::{CardIdentifier, CardPath};

use super::builtin;
use super::descriptor::CardDescriptor;

/// Catalog of card descriptors.
///
/// ## Example
///
/// ```
/// use deckflow::cards::{ActionCardDescriptor, DescriptorCatalog};
/// use deckflow::core::CardIdentifier;
///
/// let mut catalog = DescriptorCatalog::builtin();
///
/// let timer = ActionCardDescriptor::new(
///     CardIdentifier::new("Action/Trigger/Time", "Timer"),
///     "Fires after a duration elapses",
/// );
/// catalog.register(timer.clone().into());
///
/// assert!(catalog.contains(&timer.identifier));
/// ```
#[derive(Clone, Debug, Default)]
pub struct DescriptorCatalog {
    descriptors: FxHashMap<CardIdentifier, CardDescriptor>,
}

impl DescriptorCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding every builtin descriptor.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog.register(builtin::boolean_and().into());
        catalog.register(builtin::boolean_or().into());
        catalog.register(builtin::boolean_not().into());
        catalog.register(builtin::branch().into());
        catalog.register(builtin::repeat().into());
        catalog.register(builtin::end_when_all_satisfied().into());
        catalog.register(builtin::end_when_any_satisfied().into());
        catalog.register(builtin::repeat_deck().into());
        catalog.register(builtin::terminate_deck().into());
        catalog
    }

    /// Register a descriptor.
    ///
    /// Panics if a descriptor with the same identifier already exists.
    pub fn register(&mut self, descriptor: CardDescriptor) {
        let identifier = descriptor.identifier().clone();
        if self.descriptors.contains_key(&identifier) {
            panic!("Descriptor {} already registered", identifier);
        }
        self.descriptors.insert(identifier, descriptor);
    }

    /// Get a descriptor by identifier.
    #[must_use]
    pub fn get(&self, identifier: &CardIdentifier) -> Option<&CardDescriptor> {
        self.descriptors.get(identifier)
    }

    /// Get a descriptor by identifier, panicking if not found.
    ///
    /// Use when you're certain the descriptor exists.
    #[must_use]
    pub fn get_unchecked(&self, identifier: &CardIdentifier) -> &CardDescriptor {
        self.descriptors
            .get(identifier)
            .expect("Descriptor not found in catalog")
    }

    /// Check if an identifier is registered.
    #[must_use]
    pub fn contains(&self, identifier: &CardIdentifier) -> bool {
        self.descriptors.contains_key(identifier)
    }

    /// Get the number of registered descriptors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate over all descriptors.
    pub fn iter(&self) -> impl Iterator<Item = &CardDescriptor> {
        self.descriptors.values()
    }

    /// Find descriptors whose path starts with `prefix`.
    pub fn find_by_path<'a>(
        &'a self,
        prefix: &'a CardPath,
    ) -> impl Iterator<Item = &'a CardDescriptor> {
        self.descriptors
            .values()
            .filter(move |d| d.identifier().path.starts_with(prefix))
    }

    /// Find descriptors matching a predicate.
    pub fn find<F>(&self, predicate: F) -> impl Iterator<Item = &CardDescriptor>
    where
        F: Fn(&CardDescriptor) -> bool,
    {
        self.descriptors.values().filter(move |d| predicate(d))
    }
}
