//! Card and container identities.
//!
//! The model distinguishes two kinds of identity:
//!
//! - **Descriptor identity** (`CardIdentifier`): names a card *type*, e.g.
//!   `Action/Trigger/Time/Timer (v0)`. Two cards built from the same
//!   descriptor share this.
//! - **Instance identity** (`CardInstanceId`): names one materialized card.
//!   Minted fresh (UUID v4) every time a descriptor is instantiated, so two
//!   copies of the same card in one hand stay distinguishable.
//!
//! Hands, card trees, and decks carry their own UUID newtypes (`HandId`,
//! `CardTreeId`, `DeckId`) because structural operations retire and mint
//! them independently of any card.
//!
//! ## Usage
//!
//! ```
//! use deckflow::core::{CardIdentifier, CardPath};
//!
//! let path = CardPath::from("Action/Trigger/Time");
//! let timer = CardIdentifier::new(path, "Timer");
//!
//! assert_eq!(timer.to_string(), "Action/Trigger/Time/Timer (v0)");
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ordered path naming a descriptor family, e.g. `Action/Trigger/Time`.
///
/// Paths group related descriptors for catalog lookups; they carry no
/// behavior of their own.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardPath(Vec<String>);

impl CardPath {
    /// Create a path from its segments.
    #[must_use]
    pub fn new(segments: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// The path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Check whether this path starts with `prefix`.
    ///
    /// Used by catalog lookups to select a descriptor family:
    /// `Action/Trigger/Time` starts with `Action/Trigger`.
    #[must_use]
    pub fn starts_with(&self, prefix: &CardPath) -> bool {
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }
}

impl From<&str> for CardPath {
    fn from(s: &str) -> Self {
        Self(s.split('/').filter(|seg| !seg.is_empty()).map(str::to_string).collect())
    }
}

impl std::fmt::Display for CardPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

/// Identity of a card type (descriptor).
///
/// Equality and hashing cover path, name, and version: bumping a
/// descriptor's version yields a distinct identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardIdentifier {
    /// Family path, e.g. `Action/Trigger/Time`.
    pub path: CardPath,
    /// Descriptor name within the family, e.g. `Timer`.
    pub name: String,
    /// Descriptor revision; 0 unless bumped.
    pub version: u32,
}

impl CardIdentifier {
    /// Create an identifier at version 0.
    #[must_use]
    pub fn new(path: impl Into<CardPath>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            version: 0,
        }
    }

    /// Set the version (builder pattern).
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

impl std::fmt::Display for CardIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} (v{})", self.path, self.name, self.version)
    }
}

/// Identity of one materialized card.
///
/// Fresh per instantiation; the satisfied-set the engine evaluates against
/// is a set of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardInstanceId(Uuid);

/// Identity of a hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandId(Uuid);

/// Identity of a card tree within a hand's forest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardTreeId(Uuid);

/// Identity of a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(Uuid);

macro_rules! uuid_id {
    ($name:ident, $label:literal) => {
        impl $name {
            /// Mint a fresh identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID (decoded data).
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Get the raw UUID.
            #[must_use]
            pub const fn raw(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

uuid_id!(CardInstanceId, "Instance");
uuid_id!(HandId, "Hand");
uuid_id!(CardTreeId, "Tree");
uuid_id!(DeckId, "Deck");

/// Index of a yield slot within a descriptor's declaration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YieldId(pub u32);

impl YieldId {
    /// Create a yield index.
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for YieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Yield({})", self.0)
    }
}

/// The set of action card instances that have completed successfully.
///
/// `im::HashSet` clones in O(1), so the engine snapshots it per evaluation
/// without copying.
pub type SatisfiedSet = im::HashSet<CardInstanceId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_path_from_str() {
        let path = CardPath::from("Action/Trigger/Time");
        assert_eq!(path.segments(), &["Action", "Trigger", "Time"]);
        assert_eq!(path.to_string(), "Action/Trigger/Time");
    }

    #[test]
    fn test_card_path_skips_empty_segments() {
        let path = CardPath::from("Hand//Logic/");
        assert_eq!(path.segments(), &["Hand", "Logic"]);
    }

    #[test]
    fn test_card_path_prefix() {
        let full = CardPath::from("Action/Trigger/Time");
        assert!(full.starts_with(&CardPath::from("Action")));
        assert!(full.starts_with(&CardPath::from("Action/Trigger")));
        assert!(full.starts_with(&CardPath::from("Action/Trigger/Time")));
        assert!(!full.starts_with(&CardPath::from("Action/Trigger/Time/Timer")));
        assert!(!full.starts_with(&CardPath::from("Hand")));
    }

    #[test]
    fn test_card_identifier_display() {
        let id = CardIdentifier::new("Action/Trigger/Time", "Timer");
        assert_eq!(id.to_string(), "Action/Trigger/Time/Timer (v0)");

        let v2 = id.clone().with_version(2);
        assert_eq!(v2.to_string(), "Action/Trigger/Time/Timer (v2)");
        assert_ne!(id, v2);
    }

    #[test]
    fn test_card_identifier_equality() {
        let a = CardIdentifier::new("Hand/Logic", "BooleanAnd");
        let b = CardIdentifier::new("Hand/Logic", "BooleanAnd");
        let c = CardIdentifier::new("Hand/Logic", "BooleanOr");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_instance_ids_unique() {
        let a = CardInstanceId::new();
        let b = CardInstanceId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_id_round_trips_through_uuid() {
        let id = HandId::new();
        assert_eq!(HandId::from_uuid(id.raw()), id);
    }

    #[test]
    fn test_yield_id() {
        let y = YieldId::new(3);
        assert_eq!(y.raw(), 3);
        assert_eq!(y.to_string(), "Yield(3)");
    }

    #[test]
    fn test_satisfied_set_clone_is_independent() {
        let a = CardInstanceId::new();
        let b = CardInstanceId::new();

        let mut set = SatisfiedSet::new();
        set.insert(a);

        let snapshot = set.clone();
        set.insert(b);

        assert!(snapshot.contains(&a));
        assert!(!snapshot.contains(&b));
        assert!(set.contains(&b));
    }

    #[test]
    fn test_serialization() {
        let id = CardIdentifier::new("Deck/Conclusion", "Terminate").with_version(1);
        let json = serde_json::to_string(&id).unwrap();
        let back: CardIdentifier = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);

        let hand = HandId::new();
        let json = serde_json::to_string(&hand).unwrap();
        let back: HandId = serde_json::from_str(&json).unwrap();
        assert_eq!(hand, back);
    }
}
