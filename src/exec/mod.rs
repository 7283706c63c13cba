//! Concurrent execution of decks.
//!
//! Three pieces: [`Executable`] is the seam where card behavior is
//! implemented, [`ExecutableRegistry`] maps card types to factories for
//! it, and [`DeckExecutor`] drives a deck through its hands, spawning
//! every action in a hand concurrently and ending each round the moment
//! the hand's trees are satisfied.

pub mod engine;
pub mod executable;
pub mod registry;

pub use engine::{
    DeckExecutor, DeckState, ExecutionConfig, ExecutionError, ExecutionReport, HaltHandle,
    HandRecord, YieldStore,
};
pub use executable::{ActionContext, ActionError, CompletionFlag, Executable, YieldBatch};
pub use registry::{ExecutableFactory, ExecutableRegistry};
