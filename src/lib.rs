//! # deckflow
//!
//! A card-based programming engine: programs are decks of cards, not text.
//!
//! ## Design Principles
//!
//! 1. **Cards All The Way Down**: Actions, logic, control flow, inputs,
//!    and resources are all cards. A program is a composition of cards,
//!    never a syntax tree.
//!
//! 2. **Descriptors Mint Instances**: A descriptor is the reusable type
//!    of a card; instantiation stamps a fresh identity. Two instances of
//!    the same descriptor are distinct everywhere it matters.
//!
//! 3. **Satisfaction Over Sequencing**: A hand's actions run
//!    concurrently. Progress is judged by boolean trees over completed
//!    actions, so "done" is a property you compose, not a line you reach.
//!
//! ## Architecture
//!
//! - **Value-Semantic Model**: Hands, trees, and decks are plain values;
//!   structural edits rebuild rather than mutate in place, and
//!   `im`/`smallvec` keep the hot clones cheap.
//!
//! - **Async Execution**: The executor spawns every action in a hand as
//!   a tokio task and re-evaluates satisfaction on each completion;
//!   whatever is left gets interrupted and torn down when the hand ends.
//!
//! - **Static Validation**: Decks are checked before anything runs;
//!   broken bindings and dangling branches are findings, not mid-flight
//!   surprises.
//!
//! ## Modules
//!
//! - `core`: Identity types, the card identifier, the satisfied-set
//! - `cards`: Descriptors, instances, bindings, and builtins
//! - `tree`: Boolean satisfaction trees of action and logic cards
//! - `hand`: Concurrent groups of actions with a forest of trees
//! - `deck`: Hand sequences, conclusion cards, snapshots
//! - `exec`: The async executor and the `Executable` seam
//! - `validation`: Static checks run before execution

pub mod core;
pub mod cards;
pub mod tree;
pub mod hand;
pub mod deck;
pub mod exec;
pub mod validation;

// Re-export commonly used types
pub use crate::core::{
    CardIdentifier, CardInstanceId, CardPath, CardTreeId, DeckId, HandId, SatisfiedSet, YieldId,
};

pub use crate::cards::{
    ActionCard, ActionCardDescriptor, BranchHandCard, DeckCard, DeckCardKind, DescriptorCatalog,
    EndRule, EndRuleHandCard, HandCard, HandCardDescriptor, HandCardKind, InputBinding, InputCard,
    InputType, InputValue, LogicHandCard, LogicOperation, RepeatHandCard, TokenCard,
};

pub use crate::tree::{CardTree, CardTreeNode, TreeError};

pub use crate::hand::{
    BinaryLogic, Hand, SatisfactionError, SatisfactionResult,
};

pub use crate::deck::{Deck, DeckBuilder, DeckConclusion, SnapshotError};

pub use crate::exec::{
    ActionContext, ActionError, CompletionFlag, DeckExecutor, DeckState, Executable,
    ExecutableRegistry, ExecutionConfig, ExecutionError, ExecutionReport, HaltHandle, HandRecord,
    YieldBatch, YieldStore,
};

pub use crate::validation::{validate_deck, Issue, Scope, Severity, ValidationError};
