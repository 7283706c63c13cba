//! Core identity types shared by every layer.
//!
//! Everything here is a plain value: UUID newtypes for instances, hands,
//! trees, and decks, the descriptor identifier, and the satisfied-set alias
//! the satisfaction evaluator consumes.

pub mod identifier;

pub use identifier::{
    CardIdentifier, CardInstanceId, CardPath, CardTreeId, DeckId, HandId, SatisfiedSet, YieldId,
};
