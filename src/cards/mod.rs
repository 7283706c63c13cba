//! Card system: descriptors, instances, bindings, and the catalog.
//!
//! ## Key Types
//!
//! - `CardIdentifier`: Identity of a card type (path + name + version)
//! - `ActionCardDescriptor` .. `DeckCardDescriptor`: Static metadata, one
//!   kind per card taxonomy role
//! - `ActionCard`, `HandCard`, `InputCard`, `TokenCard`, `DeckCard`:
//!   Materialized instances (fresh `CardInstanceId` each)
//! - `InputValue`/`InputBinding`: The typed value/binding vocabulary
//! - `DescriptorCatalog`: Descriptor lookup; `builtin()` preloads the
//!   standard logic/branch/end-rule/conclusion descriptors
//!
//! Descriptors are immutable; everything an instance learns during
//! authoring (bindings, targets, counts) lives on the instance.

pub mod action;
pub mod builtin;
pub mod catalog;
pub mod deck_card;
pub mod descriptor;
pub mod hand_card;
pub mod input;

pub use action::ActionCard;
pub use catalog::DescriptorCatalog;
pub use deck_card::{DeckCard, DeckCardKind, TokenCard};
pub use descriptor::{
    ActionCardDescriptor, CardDescriptor, DeckCardDescriptor, HandCardDescriptor, HandCardKind,
    InputCardDescriptor, TokenCardDescriptor,
};
pub use hand_card::{
    BranchHandCard, EndRule, EndRuleHandCard, HandCard, LogicHandCard, LogicOperation,
    RepeatHandCard,
};
pub use input::{
    BindError, Coordinate2D, InputBinding, InputCard, InputSlot, InputType, InputValue, TokenSlot,
    YieldSlot,
};
