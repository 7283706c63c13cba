//! Builtin descriptors.
//!
//! The structural layer mints cards of its own: logic operators for the
//! collapsing combine, branch cards for `Hand::add_branch`, end rules,
//! repeats, and deck conclusions. Their descriptors live here under the
//! `Hand/Logic`, `Hand/Next`, `Hand/End`, and `Deck/Conclusion` families,
//! and `DescriptorCatalog::builtin()` registers the lot.

use crate::core::CardIdentifier;

use super::deck_card::DeckCardKind;
use super::descriptor::{DeckCardDescriptor, HandCardDescriptor, HandCardKind};

/// AND over two subtrees.
#[must_use]
pub fn boolean_and() -> HandCardDescriptor {
    HandCardDescriptor::new(
        CardIdentifier::new("Hand/Logic", "LogicalAnd"),
        "Satisfied when both children are satisfied",
        HandCardKind::BooleanLogicAnd,
    )
}

/// OR over two subtrees.
#[must_use]
pub fn boolean_or() -> HandCardDescriptor {
    HandCardDescriptor::new(
        CardIdentifier::new("Hand/Logic", "LogicalOr"),
        "Satisfied when either child is satisfied",
        HandCardKind::BooleanLogicOr,
    )
}

/// NOT over one subtree.
#[must_use]
pub fn boolean_not() -> HandCardDescriptor {
    HandCardDescriptor::new(
        CardIdentifier::new("Hand/Logic", "LogicalNot"),
        "Satisfied when its child is not satisfied",
        HandCardKind::BooleanLogicNot,
    )
}

/// Jump to another hand on satisfaction.
#[must_use]
pub fn branch() -> HandCardDescriptor {
    HandCardDescriptor::new(
        CardIdentifier::new("Hand/Next", "Branch"),
        "Selects the next hand when its scope satisfies",
        HandCardKind::Branch,
    )
}

/// Re-run the hand.
#[must_use]
pub fn repeat() -> HandCardDescriptor {
    HandCardDescriptor::new(
        CardIdentifier::new("Hand/Next", "Repeat"),
        "Runs the hand additional times",
        HandCardKind::Repeat,
    )
}

/// End the hand when every tree satisfies.
#[must_use]
pub fn end_when_all_satisfied() -> HandCardDescriptor {
    HandCardDescriptor::new(
        CardIdentifier::new("Hand/End", "OnAll"),
        "Hand ends when all trees are satisfied",
        HandCardKind::EndWhenAllSatisfied,
    )
}

/// End the hand when any tree satisfies.
#[must_use]
pub fn end_when_any_satisfied() -> HandCardDescriptor {
    HandCardDescriptor::new(
        CardIdentifier::new("Hand/End", "OnAny"),
        "Hand ends when any tree is satisfied",
        HandCardKind::EndWhenAnySatisfied,
    )
}

/// Loop the deck back to its first hand.
#[must_use]
pub fn repeat_deck() -> DeckCardDescriptor {
    DeckCardDescriptor::new(
        CardIdentifier::new("Deck/Conclusion", "Repeat"),
        "Starts the deck over after the last hand",
        DeckCardKind::Repeat,
    )
}

/// Stop the deck after its last hand.
#[must_use]
pub fn terminate_deck() -> DeckCardDescriptor {
    DeckCardDescriptor::new(
        CardIdentifier::new("Deck/Conclusion", "Terminate"),
        "Stops the deck after the last hand",
        DeckCardKind::Terminate,
    )
}
