//! The deck executor.
//!
//! [`DeckExecutor`] runs a deck hand by hand: every round it builds
//! fresh executables for the hand's action cards, resolves their
//! bindings, spawns every `execute` future as a tokio task, and
//! re-evaluates the hand's satisfaction after each completion. A
//! satisfied hand ends its round immediately; whatever is still running
//! gets interrupted, joined, and torn down before the executor moves on.
//!
//! Control flow follows the satisfaction result: a winning tree with a
//! branch target jumps to that hand, otherwise execution advances
//! sequentially, and past the last hand the deck's conclusion card
//! decides between repeating and terminating. Yields committed after
//! each round feed the input bindings of later hands through the
//! executor's [`YieldStore`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use futures_util::{FutureExt, StreamExt};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Notify;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::cards::{ActionCard, InputBinding, InputValue};
use crate::core::{CardIdentifier, CardInstanceId, CardTreeId, HandId, SatisfiedSet, YieldId};
use crate::deck::{Deck, DeckConclusion};
use crate::exec::executable::{ActionContext, ActionError, Executable, YieldBatch};
use crate::exec::registry::ExecutableRegistry;
use crate::hand::{Hand, SatisfactionError, SatisfactionResult};
use crate::validation::{validate_deck, ValidationError};

/// Knobs for one executor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExecutionConfig {
    /// Abort a round that runs longer than this. `None` waits forever.
    pub hand_timeout: Option<Duration>,
}

impl ExecutionConfig {
    /// Limit how long any single round may run.
    #[must_use]
    pub fn with_hand_timeout(mut self, timeout: Duration) -> Self {
        self.hand_timeout = Some(timeout);
        self
    }
}

/// Where the executor currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeckState {
    /// Not executing.
    Idle,
    /// Running the named hand's rounds.
    RunningHand(HandId),
    /// Last hand satisfied without a target; moving to the next in
    /// sequence.
    AdvancingSequential,
    /// Last hand satisfied with a branch target; jumping there.
    Branching(HandId),
    /// Past the last hand; consulting the deck's conclusion card.
    Concluding,
}

/// Why execution stopped without finishing the deck.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The validation pass found blocking problems.
    #[error("deck failed validation with {} finding(s)", .0.len())]
    ValidationFailed(Vec<ValidationError>),

    /// An action card's type has no registered executable.
    #[error("no executable registered for {identifier} (card {card})")]
    MissingExecutable {
        /// The card that could not run.
        card: CardInstanceId,
        /// Its descriptor identity.
        identifier: CardIdentifier,
    },

    /// A mandatory input slot reached execution unbound.
    #[error("mandatory input slot {slot:?} on card {card} is unbound")]
    UnboundInput {
        /// The card that could not run.
        card: CardInstanceId,
        /// The unbound slot.
        slot: String,
    },

    /// A yield binding pointed at a value no earlier hand produced.
    #[error("input slot {slot:?} on card {card} names a yield that was never produced")]
    UnresolvedYield {
        /// The card that could not run.
        card: CardInstanceId,
        /// The slot awaiting the yield.
        slot: String,
    },

    /// Every action settled and the hand still was not satisfied.
    #[error("hand {hand} ran out of actions before its trees satisfied")]
    Unsatisfiable {
        /// The hand that stalled.
        hand: HandId,
    },

    /// A round outlived the configured window.
    #[error("hand {hand} exceeded its execution window")]
    TimedOut {
        /// The hand that timed out.
        hand: HandId,
    },

    /// The hand's forest could not be judged.
    #[error(transparent)]
    Satisfaction(#[from] SatisfactionError),
}

/// What one finished hand did, for the final report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandRecord {
    /// The hand that ran.
    pub hand: HandId,
    /// Rounds executed, counting repeats.
    pub rounds: u32,
    /// The tree that decided satisfaction, if one was singled out.
    pub winning_tree: Option<CardTreeId>,
    /// Where execution went next, if not sequential.
    pub target: Option<HandId>,
}

/// Journal of a deck run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReport {
    /// Every hand that finished, in execution order.
    pub hands: Vec<HandRecord>,
    /// How many times a Repeat conclusion restarted the deck.
    pub loops: u32,
    /// Whether a halt cut the run short.
    pub halted: bool,
}

/// Remote stop signal for a running executor.
///
/// Cheap to clone and safe to trigger from any task. Halting is sticky:
/// once signalled, the executor winds down its current round, reports,
/// and will not run again on this handle.
#[derive(Clone, Debug)]
pub struct HaltHandle {
    halted: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl HaltHandle {
    fn new() -> Self {
        Self {
            halted: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Stop the executor at the next opportunity.
    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Whether a halt has been requested.
    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }

    /// Completes once a halt has been requested.
    pub async fn halted(&self) {
        // Arm the listener before re-checking the flag so a signal
        // landing in between cannot be lost.
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_halted() {
            return;
        }
        notified.await;
    }
}

/// Yielded values accumulated across the whole deck run.
///
/// Written after each round's wind-down, read while resolving the input
/// bindings of later hands.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct YieldStore {
    values: FxHashMap<(CardInstanceId, YieldId), InputValue>,
}

impl YieldStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one yielded value. A later round of the same producer
    /// overwrites.
    pub fn record(&mut self, producer: CardInstanceId, yield_id: YieldId, value: InputValue) {
        self.values.insert((producer, yield_id), value);
    }

    /// Look up a produced value.
    #[must_use]
    pub fn get(&self, producer: CardInstanceId, yield_id: YieldId) -> Option<&InputValue> {
        self.values.get(&(producer, yield_id))
    }

    /// How many values have been produced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing has been produced yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

type Completion = (
    CardInstanceId,
    Result<Result<YieldBatch, ActionError>, JoinError>,
);
type InFlight = FuturesUnordered<BoxFuture<'static, Completion>>;

struct RoundUnit {
    card: CardInstanceId,
    executable: Arc<dyn Executable>,
}

enum RoundEnd {
    Satisfied(SatisfactionResult),
    Halted,
}

enum HandOutcome {
    Satisfied {
        rounds: u32,
        result: SatisfactionResult,
    },
    Halted,
}

/// Runs one deck to its conclusion.
pub struct DeckExecutor {
    deck: Deck,
    registry: ExecutableRegistry,
    config: ExecutionConfig,
    state: DeckState,
    halt: HaltHandle,
    yields: YieldStore,
}

impl DeckExecutor {
    /// An executor with default configuration.
    #[must_use]
    pub fn new(deck: Deck, registry: ExecutableRegistry) -> Self {
        Self::with_config(deck, registry, ExecutionConfig::default())
    }

    /// An executor with explicit configuration.
    #[must_use]
    pub fn with_config(deck: Deck, registry: ExecutableRegistry, config: ExecutionConfig) -> Self {
        Self {
            deck,
            registry,
            config,
            state: DeckState::Idle,
            halt: HaltHandle::new(),
            yields: YieldStore::new(),
        }
    }

    /// The deck this executor runs.
    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    /// Where execution currently is.
    #[must_use]
    pub fn state(&self) -> DeckState {
        self.state
    }

    /// A handle that can stop this executor from anywhere.
    #[must_use]
    pub fn halt_handle(&self) -> HaltHandle {
        self.halt.clone()
    }

    /// Values produced so far.
    #[must_use]
    pub fn yields(&self) -> &YieldStore {
        &self.yields
    }

    /// Run the deck to its conclusion.
    ///
    /// Validates first and refuses to start on any blocking finding.
    /// Returns `Ok` both for a completed deck and for a halted one; the
    /// report distinguishes them.
    pub async fn execute(&mut self) -> Result<ExecutionReport, ExecutionError> {
        let findings = validate_deck(&self.deck);
        for finding in findings.iter().filter(|finding| !finding.is_error()) {
            warn!(%finding, "deck validation warning");
        }
        if findings.iter().any(ValidationError::is_error) {
            return Err(ExecutionError::ValidationFailed(findings));
        }

        let hands = self.deck.all_hands();
        let mut report = ExecutionReport::default();
        if hands.is_empty() {
            return Ok(report);
        }

        info!(deck = %self.deck.id(), hands = hands.len(), "deck execution started");

        let mut index = 0;
        while index < hands.len() {
            if self.halt.is_halted() {
                info!("halt requested between hands");
                report.halted = true;
                self.state = DeckState::Idle;
                return Ok(report);
            }

            let hand = &hands[index];
            self.state = DeckState::RunningHand(hand.id());
            info!(hand = %hand.id(), position = index, "hand started");

            match self.run_hand(hand).await? {
                HandOutcome::Halted => {
                    info!("deck execution halted");
                    report.halted = true;
                    self.state = DeckState::Idle;
                    return Ok(report);
                }
                HandOutcome::Satisfied { rounds, result } => {
                    report.hands.push(HandRecord {
                        hand: hand.id(),
                        rounds,
                        winning_tree: result.winning_tree,
                        target: result.target,
                    });
                    match result.target {
                        Some(target) => {
                            self.state = DeckState::Branching(target);
                            info!(from = %hand.id(), to = %target, "branching");
                            // Validation admits only targets inside the
                            // execution sequence.
                            index = match hands
                                .iter()
                                .position(|candidate| candidate.id() == target)
                            {
                                Some(position) => position,
                                None => panic!(
                                    "branch target {target} not in the deck's execution sequence"
                                ),
                            };
                        }
                        None => {
                            self.state = DeckState::AdvancingSequential;
                            index += 1;
                        }
                    }
                }
            }

            if index >= hands.len() {
                self.state = DeckState::Concluding;
                match self.deck.conclusion() {
                    DeckConclusion::Repeat => {
                        report.loops += 1;
                        info!(loops = report.loops, "deck repeating");
                        index = 0;
                    }
                    DeckConclusion::Terminate => break,
                }
            }
        }

        self.state = DeckState::Idle;
        info!(
            hands_run = report.hands.len(),
            loops = report.loops,
            "deck execution finished"
        );
        Ok(report)
    }

    /// Run every round a hand asks for. Each round gets fresh
    /// executables; the final round's outcome governs the transition.
    async fn run_hand(&mut self, hand: &Hand) -> Result<HandOutcome, ExecutionError> {
        let rounds = hand.execution_count();
        for round in 1..rounds {
            match self.run_round(hand, round).await? {
                RoundEnd::Halted => return Ok(HandOutcome::Halted),
                RoundEnd::Satisfied(_) => {}
            }
        }
        match self.run_round(hand, rounds).await? {
            RoundEnd::Halted => Ok(HandOutcome::Halted),
            RoundEnd::Satisfied(result) => Ok(HandOutcome::Satisfied { rounds, result }),
        }
    }

    async fn run_round(&mut self, hand: &Hand, round: u32) -> Result<RoundEnd, ExecutionError> {
        debug!(
            hand = %hand.id(),
            round,
            actions = hand.action_cards().len(),
            "round started"
        );

        let mut units = Vec::with_capacity(hand.action_cards().len());
        let mut pending_setup = Vec::with_capacity(hand.action_cards().len());
        for card in hand.action_cards() {
            let Some(executable) = self.registry.instantiate(card) else {
                return Err(ExecutionError::MissingExecutable {
                    card: card.id(),
                    identifier: card.identifier().clone(),
                });
            };
            let context = self.resolve_context(card)?;
            units.push(RoundUnit {
                card: card.id(),
                executable: Arc::clone(&executable),
            });
            pending_setup.push((executable, context));
        }

        // No setup happens until every card has resolved its bindings.
        for (executable, context) in pending_setup {
            executable.setup(context);
        }

        let mut in_flight: InFlight = FuturesUnordered::new();
        for unit in &units {
            let card = unit.card;
            let executable = Arc::clone(&unit.executable);
            debug!(card = %card, "action spawned");
            let handle = tokio::spawn(async move { executable.execute().await });
            in_flight.push(async move { (card, handle.await) }.boxed());
        }

        let window = self.config.hand_timeout;
        let timeout = async move {
            match window {
                Some(window) => tokio::time::sleep(window).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(timeout);

        let halt = self.halt.clone();
        let mut satisfied = SatisfiedSet::default();
        let mut stashed: Vec<(CardInstanceId, YieldBatch)> = Vec::new();

        let result = loop {
            match hand.satisfaction_result(&satisfied) {
                Ok(result) if result.satisfied => break result,
                Ok(_) => {}
                Err(error) => {
                    wind_down(&units, &mut in_flight, &mut stashed).await;
                    self.commit_yields(stashed);
                    return Err(error.into());
                }
            }

            tokio::select! {
                completion = in_flight.next() => {
                    match completion {
                        Some((card, Ok(Ok(batch)))) => {
                            debug!(card = %card, yields = batch.len(), "action completed");
                            satisfied.insert(card);
                            stashed.push((card, batch));
                        }
                        // A failed or panicked action can never satisfy a
                        // tree; the hand may still satisfy without it.
                        Some((card, Ok(Err(error)))) => {
                            warn!(card = %card, %error, "action failed");
                        }
                        Some((card, Err(join_error))) => {
                            warn!(card = %card, error = %join_error, "action panicked");
                        }
                        None => {
                            wind_down(&units, &mut in_flight, &mut stashed).await;
                            self.commit_yields(stashed);
                            return Err(ExecutionError::Unsatisfiable { hand: hand.id() });
                        }
                    }
                }
                () = halt.halted() => {
                    info!(hand = %hand.id(), "halt requested");
                    wind_down(&units, &mut in_flight, &mut stashed).await;
                    self.commit_yields(stashed);
                    return Ok(RoundEnd::Halted);
                }
                () = &mut timeout => {
                    warn!(hand = %hand.id(), "hand timed out");
                    wind_down(&units, &mut in_flight, &mut stashed).await;
                    self.commit_yields(stashed);
                    return Err(ExecutionError::TimedOut { hand: hand.id() });
                }
            }
        };

        wind_down(&units, &mut in_flight, &mut stashed).await;
        self.commit_yields(stashed);
        info!(
            hand = %hand.id(),
            round,
            winning_tree = ?result.winning_tree,
            "hand satisfied"
        );
        Ok(RoundEnd::Satisfied(result))
    }

    /// Resolve a card's bindings into the context its executable will
    /// receive.
    fn resolve_context(&self, card: &ActionCard) -> Result<ActionContext, ExecutionError> {
        let mut context = ActionContext::new();
        for slot in &card.descriptor().input_slots {
            match card.input_binding(&slot.name) {
                Some(InputBinding::Value(value)) => {
                    context.set_input(&slot.name, value.clone());
                }
                Some(InputBinding::Card(input_card)) => match &input_card.value {
                    Some(value) => context.set_input(&slot.name, value.clone()),
                    None if slot.mandatory => {
                        return Err(ExecutionError::UnboundInput {
                            card: card.id(),
                            slot: slot.name.clone(),
                        });
                    }
                    None => {}
                },
                Some(InputBinding::YieldOf { producer, yield_id }) => {
                    let Some(value) = self.yields.get(*producer, *yield_id) else {
                        return Err(ExecutionError::UnresolvedYield {
                            card: card.id(),
                            slot: slot.name.clone(),
                        });
                    };
                    context.set_input(&slot.name, value.clone());
                }
                None if slot.mandatory => {
                    return Err(ExecutionError::UnboundInput {
                        card: card.id(),
                        slot: slot.name.clone(),
                    });
                }
                None => {}
            }
        }

        for (slot, token_id) in card.token_bindings() {
            match self
                .deck
                .token_cards()
                .iter()
                .find(|token| token.id == token_id)
            {
                Some(token) => context.set_token(slot, token.clone()),
                None => {
                    warn!(
                        card = %card.id(),
                        token = %token_id,
                        "token binding names a card the deck does not hold"
                    );
                }
            }
        }

        Ok(context)
    }

    fn commit_yields(&mut self, stashed: Vec<(CardInstanceId, YieldBatch)>) {
        for (card, batch) in stashed {
            for (yield_id, value) in batch {
                self.yields.record(card, yield_id, value);
            }
        }
    }
}

/// Interrupt what is still running, join everything, tear everything
/// down. Completions that arrive during the drain keep their yields but
/// no longer count toward satisfaction.
async fn wind_down(
    units: &[RoundUnit],
    in_flight: &mut InFlight,
    stashed: &mut Vec<(CardInstanceId, YieldBatch)>,
) {
    let unfinished = units
        .iter()
        .filter(|unit| !unit.executable.is_finished())
        .count();
    if unfinished > 0 {
        debug!(count = unfinished, "interrupting unfinished actions");
        for unit in units {
            if !unit.executable.is_finished() {
                unit.executable.interrupt();
            }
        }
    }

    while let Some((card, joined)) = in_flight.next().await {
        match joined {
            Ok(Ok(batch)) => {
                debug!(card = %card, "action completed during wind-down");
                stashed.push((card, batch));
            }
            Ok(Err(error)) => {
                debug!(card = %card, %error, "action ended during wind-down");
            }
            Err(join_error) => {
                warn!(card = %card, error = %join_error, "action panicked during wind-down");
            }
        }
    }

    for unit in units {
        unit.executable.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_sets_the_window() {
        let config = ExecutionConfig::default();
        assert_eq!(config.hand_timeout, None);

        let config = config.with_hand_timeout(Duration::from_millis(250));
        assert_eq!(config.hand_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn yield_store_round_trips_values() {
        let producer = CardInstanceId::new();
        let mut store = YieldStore::new();
        assert!(store.is_empty());

        store.record(producer, YieldId::new(0), InputValue::Int(7));
        store.record(producer, YieldId::new(1), InputValue::Text("done".into()));

        assert_eq!(store.len(), 2);
        assert_eq!(
            store.get(producer, YieldId::new(0)),
            Some(&InputValue::Int(7))
        );
        assert_eq!(store.get(CardInstanceId::new(), YieldId::new(0)), None);
    }

    #[test]
    fn yield_store_overwrites_reproduced_values() {
        let producer = CardInstanceId::new();
        let mut store = YieldStore::new();
        store.record(producer, YieldId::new(0), InputValue::Int(1));
        store.record(producer, YieldId::new(0), InputValue::Int(2));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get(producer, YieldId::new(0)),
            Some(&InputValue::Int(2))
        );
    }

    #[tokio::test]
    async fn halt_wakes_waiters() {
        let handle = HaltHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move {
            waiter.halted().await;
            true
        });

        handle.halt();
        assert!(handle.is_halted());
        assert!(task.await.unwrap());
    }

    #[tokio::test]
    async fn halt_signalled_before_waiting_returns_immediately() {
        let handle = HaltHandle::new();
        handle.halt();
        // Must not hang even though the signal predates the wait.
        handle.halted().await;
    }

    #[test]
    fn executor_starts_idle() {
        let executor = DeckExecutor::new(Deck::new(), ExecutableRegistry::new());
        assert_eq!(executor.state(), DeckState::Idle);
        assert!(executor.yields().is_empty());
    }
}
