//! The seam between the card model and real behavior.
//!
//! An [`Executable`] is what an action card *does*: the model layer
//! carries descriptors and bindings, and the executor hands each action
//! card's resolved inputs to an executable and awaits its completion.
//! Implementors live outside this crate (drive a motor, take a photo,
//! wait out a timer); the engine only cares about the lifecycle.
//!
//! The lifecycle is `setup` (receive inputs), `execute` (run to
//! completion, returning yielded values), and `teardown` (release
//! resources). `interrupt` may arrive at any point after setup when the
//! hand ends early; a well-behaved executable unblocks its `execute`
//! future promptly and reports [`ActionError::Interrupted`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::cards::{Coordinate2D, InputValue, TokenCard};
use crate::core::YieldId;

/// Values an action produced, keyed by the descriptor's yield slots.
pub type YieldBatch = Vec<(YieldId, InputValue)>;

/// Why an action did not complete.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The action ran and failed.
    #[error("action failed: {0}")]
    Failed(String),

    /// The action was interrupted before finishing.
    #[error("action interrupted")]
    Interrupted,

    /// The action needed an input its context did not carry.
    #[error("missing input {0:?}")]
    MissingInput(String),
}

/// The behavior behind an action card.
#[async_trait]
pub trait Executable: Send + Sync {
    /// Receive the card's resolved inputs. Called once, before
    /// [`execute`](Executable::execute).
    fn setup(&self, context: ActionContext);

    /// Run the action to completion, yielding any produced values.
    async fn execute(&self) -> Result<YieldBatch, ActionError>;

    /// Ask the action to stop early. The `execute` future is still
    /// awaited afterwards, so implementors must unblock it.
    fn interrupt(&self);

    /// Release resources. Called once per round, after `execute` has
    /// settled.
    fn teardown(&self);

    /// Whether `execute` has settled. Drives interrupt targeting during
    /// wind-down.
    fn is_finished(&self) -> bool;
}

/// Shared completion marker for [`Executable::is_finished`].
///
/// Clone one flag into the execute future and mark it on every exit
/// path; the engine reads it when deciding whom to interrupt.
#[derive(Clone, Debug, Default)]
pub struct CompletionFlag(Arc<AtomicBool>);

impl CompletionFlag {
    /// A fresh, unset flag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the work as settled.
    pub fn mark(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the work has settled.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Resolved inputs and tokens for one execution of one action card.
///
/// Built by the executor from the card's bindings: literal values and
/// input cards directly, yield bindings from earlier hands' output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActionContext {
    inputs: FxHashMap<String, InputValue>,
    tokens: FxHashMap<String, TokenCard>,
}

impl ActionContext {
    /// An empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a value in an input slot.
    pub fn set_input(&mut self, slot: impl Into<String>, value: InputValue) {
        self.inputs.insert(slot.into(), value);
    }

    /// Put a token card in a token slot.
    pub fn set_token(&mut self, slot: impl Into<String>, token: TokenCard) {
        self.tokens.insert(slot.into(), token);
    }

    /// The value in an input slot, if bound.
    #[must_use]
    pub fn input(&self, slot: &str) -> Option<&InputValue> {
        self.inputs.get(slot)
    }

    /// An input as a whole number.
    #[must_use]
    pub fn input_int(&self, slot: &str) -> Option<i64> {
        self.input(slot)?.as_int()
    }

    /// An input as a floating-point measurement.
    #[must_use]
    pub fn input_real(&self, slot: &str) -> Option<f64> {
        self.input(slot)?.as_real()
    }

    /// An input as a flag.
    #[must_use]
    pub fn input_bool(&self, slot: &str) -> Option<bool> {
        self.input(slot)?.as_bool()
    }

    /// An input as text.
    #[must_use]
    pub fn input_text(&self, slot: &str) -> Option<&str> {
        self.input(slot)?.as_text()
    }

    /// An input as a coordinate.
    #[must_use]
    pub fn input_coordinate(&self, slot: &str) -> Option<Coordinate2D> {
        self.input(slot)?.as_coordinate()
    }

    /// An input as a time span.
    #[must_use]
    pub fn input_duration(&self, slot: &str) -> Option<Duration> {
        self.input(slot)?.as_duration()
    }

    /// The token card in a token slot, if bound.
    #[must_use]
    pub fn token(&self, slot: &str) -> Option<&TokenCard> {
        self.tokens.get(slot)
    }

    /// How many inputs are bound.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }
}
