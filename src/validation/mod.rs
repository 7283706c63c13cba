//! Static deck checks run before execution.
//!
//! [`validate_deck`] walks a deck without executing anything and reports
//! every structural problem it can find: duplicate identities, branch
//! cards pointing at hands the deck does not contain, hands that can
//! never finish, and input bindings that can never resolve. Each finding
//! carries a [`Severity`]; the executor refuses to run a deck with any
//! error-severity finding and merely logs warnings.
//!
//! The walk is deterministic: deck-scope findings come first, then each
//! hand in execution order, then cards in member order within the hand.
//! Callers can diff successive reports without sorting.

use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use crate::cards::{ActionCard, BranchHandCard, EndRule, HandCard, InputBinding};
use crate::core::{CardInstanceId, CardTreeId, DeckId, HandId, YieldId};
use crate::deck::Deck;
use crate::hand::Hand;

/// How bad a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The deck cannot execute correctly.
    Error,
    /// Suspicious but runnable.
    Warning,
}

/// Where in the deck a finding points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// The deck as a whole.
    Deck(DeckId),
    /// A specific hand.
    Hand(HandId),
    /// A specific card instance.
    Card(CardInstanceId),
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Deck(id) => write!(f, "deck {id}"),
            Scope::Hand(id) => write!(f, "hand {id}"),
            Scope::Card(id) => write!(f, "card {id}"),
        }
    }
}

/// What went wrong.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Issue {
    /// Two top-level hands share an id, so branch targets and execution
    /// records become ambiguous.
    #[error("hand id appears more than once among the deck's hands")]
    DuplicateHandId,

    /// The same card instance appears in more than one place.
    #[error("card instance appears more than once in the deck")]
    DuplicateCardInstance,

    /// A branch card points at a hand the deck does not contain.
    #[error("branch targets hand {target}, which is not in the deck")]
    DanglingBranchTarget {
        /// The missing hand.
        target: HandId,
    },

    /// A tree-scoped branch card watches a tree its hand does not hold.
    #[error("branch watches tree {tree}, which is not in its hand")]
    BranchTreeMissing {
        /// The missing tree.
        tree: CardTreeId,
    },

    /// A hand has satisfaction trees but no end-rule card, so its
    /// satisfaction can never be judged.
    #[error("hand has satisfaction trees but no end rule")]
    MissingEndRule,

    /// A mandatory input slot has no binding.
    #[error("mandatory input slot {slot:?} is unbound")]
    UnboundMandatoryInput {
        /// The slot name from the descriptor.
        slot: String,
    },

    /// An input binds another card's yield, but that card does not run
    /// in a strictly earlier hand.
    #[error("input slot {slot:?} consumes a yield of {producer}, which does not run earlier")]
    YieldBeforeProduction {
        /// The consuming slot.
        slot: String,
        /// The producing card the binding names.
        producer: CardInstanceId,
    },

    /// An input binds a yield index the producer never declares.
    #[error("input slot {slot:?} names {yield_id} of {producer}, which declares no such yield")]
    UnknownYieldSlot {
        /// The consuming slot.
        slot: String,
        /// The producing card the binding names.
        producer: CardInstanceId,
        /// The undeclared yield index.
        yield_id: YieldId,
    },

    /// The deck has no hands at all.
    #[error("deck has no hands")]
    EmptyDeck,
}

/// One finding from [`validate_deck`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{scope}: {issue}")]
pub struct ValidationError {
    /// Whether execution must refuse the deck.
    pub severity: Severity,
    /// Where the finding points.
    pub scope: Scope,
    /// What went wrong.
    pub issue: Issue,
}

impl ValidationError {
    /// Whether this finding blocks execution.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

fn error(scope: Scope, issue: Issue) -> ValidationError {
    ValidationError {
        severity: Severity::Error,
        scope,
        issue,
    }
}

/// Check a deck for structural problems without executing it.
///
/// Hands are visited in the same order [`Deck::all_hands`] would run
/// them, so yield-ordering findings match what the executor will see.
#[must_use]
pub fn validate_deck(deck: &Deck) -> Vec<ValidationError> {
    let mut findings = Vec::new();
    let hands = deck.all_hands();

    if hands.is_empty() {
        findings.push(ValidationError {
            severity: Severity::Warning,
            scope: Scope::Deck(deck.id()),
            issue: Issue::EmptyDeck,
        });
        return findings;
    }

    let mut seen_hands = FxHashSet::default();
    for hand in deck.top_level_hands() {
        if !seen_hands.insert(hand.id()) {
            findings.push(error(Scope::Hand(hand.id()), Issue::DuplicateHandId));
        }
    }

    // Position of every hand in the execution sequence, for yield
    // ordering and branch-target checks.
    let position: FxHashMap<HandId, usize> = hands
        .iter()
        .enumerate()
        .map(|(index, hand)| (hand.id(), index))
        .collect();

    // First occurrence of every action card, as the yield producer.
    let mut producers: FxHashMap<CardInstanceId, (usize, &ActionCard)> = FxHashMap::default();
    for (index, hand) in hands.iter().enumerate() {
        for card in hand.action_cards() {
            producers.entry(card.id()).or_insert((index, card));
        }
    }

    let mut seen_cards = FxHashSet::default();
    for (index, hand) in hands.iter().enumerate() {
        check_hand(
            hand,
            index,
            &position,
            &producers,
            &mut seen_cards,
            &mut findings,
        );
    }

    findings
}

fn check_hand(
    hand: &Hand,
    index: usize,
    position: &FxHashMap<HandId, usize>,
    producers: &FxHashMap<CardInstanceId, (usize, &ActionCard)>,
    seen_cards: &mut FxHashSet<CardInstanceId>,
    findings: &mut Vec<ValidationError>,
) {
    if !hand.trees().is_empty() && hand.end_rule() == EndRule::Indeterminate {
        findings.push(error(Scope::Hand(hand.id()), Issue::MissingEndRule));
    }

    for card in hand.action_cards() {
        if !seen_cards.insert(card.id()) {
            findings.push(error(Scope::Card(card.id()), Issue::DuplicateCardInstance));
        }
        check_action(card, index, producers, findings);
    }

    for card in hand.hand_cards() {
        if !seen_cards.insert(card.id()) {
            findings.push(error(Scope::Card(card.id()), Issue::DuplicateCardInstance));
        }
        if let HandCard::Branch(branch) = card {
            check_branch(hand, branch, position, findings);
        }
    }
}

fn check_action(
    card: &ActionCard,
    index: usize,
    producers: &FxHashMap<CardInstanceId, (usize, &ActionCard)>,
    findings: &mut Vec<ValidationError>,
) {
    for slot in card.unbound_mandatory_slots() {
        findings.push(error(
            Scope::Card(card.id()),
            Issue::UnboundMandatoryInput {
                slot: slot.name.clone(),
            },
        ));
    }

    // Walk slots in declaration order so findings come out stable.
    for slot in &card.descriptor().input_slots {
        let Some(InputBinding::YieldOf { producer, yield_id }) = card.input_binding(&slot.name)
        else {
            continue;
        };
        match producers.get(producer) {
            None => {
                findings.push(error(
                    Scope::Card(card.id()),
                    Issue::YieldBeforeProduction {
                        slot: slot.name.clone(),
                        producer: *producer,
                    },
                ));
            }
            Some((produced_at, producing)) => {
                // Producers in the same hand race the consumer, so only a
                // strictly earlier hand counts.
                if *produced_at >= index {
                    findings.push(error(
                        Scope::Card(card.id()),
                        Issue::YieldBeforeProduction {
                            slot: slot.name.clone(),
                            producer: *producer,
                        },
                    ));
                }
                if producing
                    .yields()
                    .iter()
                    .all(|declared| declared.id != *yield_id)
                {
                    findings.push(error(
                        Scope::Card(card.id()),
                        Issue::UnknownYieldSlot {
                            slot: slot.name.clone(),
                            producer: *producer,
                            yield_id: *yield_id,
                        },
                    ));
                }
            }
        }
    }
}

fn check_branch(
    hand: &Hand,
    branch: &BranchHandCard,
    position: &FxHashMap<HandId, usize>,
    findings: &mut Vec<ValidationError>,
) {
    if let Some(target) = branch.target {
        if !position.contains_key(&target) {
            findings.push(error(
                Scope::Card(branch.id),
                Issue::DanglingBranchTarget { target },
            ));
        }
    }
    if let Some(tree) = branch.card_tree {
        if hand.tree(tree).is_none() {
            findings.push(error(
                Scope::Card(branch.id),
                Issue::BranchTreeMissing { tree },
            ));
        }
    }
}
