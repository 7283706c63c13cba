//! Decks.
//!
//! A deck sequences hands: the engine runs them in order, branches
//! rerouting the sequence when a satisfied hand names a target. The deck
//! also carries token cards (hardware and other shared resources its
//! actions bind) and deck cards, of which the conclusion card decides
//! what happens when the last hand finishes.
//!
//! ## Example
//!
//! ```
//! use deckflow::deck::{Deck, DeckBuilder, DeckConclusion};
//! use deckflow::hand::Hand;
//!
//! let deck = DeckBuilder::new().hand(Hand::new()).build();
//! assert_eq!(deck.hand_count(), 1);
//! assert_eq!(deck.conclusion(), DeckConclusion::Terminate);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cards::{builtin, DeckCard, DeckCardKind, TokenCard};
use crate::core::{DeckId, HandId};
use crate::hand::Hand;

/// What the deck does after its last hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckConclusion {
    /// Start over from the first hand.
    Repeat,
    /// Stop.
    Terminate,
}

/// Errors from encoding or decoding deck snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot bytes could not be produced or read back.
    #[error("deck snapshot codec failed: {0}")]
    Codec(#[from] bincode::Error),
}

/// An ordered program of hands.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    id: DeckId,
    hands: Vec<Hand>,
    deck_cards: Vec<DeckCard>,
    token_cards: Vec<TokenCard>,
}

impl Deck {
    /// An empty deck with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Deck {
            id: DeckId::new(),
            hands: Vec::new(),
            deck_cards: Vec::new(),
            token_cards: Vec::new(),
        }
    }

    /// The deck's id.
    #[must_use]
    pub fn id(&self) -> DeckId {
        self.id
    }

    /// Append a hand to the sequence.
    pub fn add_hand(&mut self, hand: Hand) {
        self.hands.push(hand);
    }

    /// Append several hands.
    pub fn add_hands(&mut self, hands: impl IntoIterator<Item = Hand>) {
        self.hands.extend(hands);
    }

    /// Builder form of [`Deck::add_hand`].
    #[must_use]
    pub fn with_hand(mut self, hand: Hand) -> Self {
        self.add_hand(hand);
        self
    }

    /// Register a token card with the deck.
    pub fn add_token_card(&mut self, card: TokenCard) {
        self.token_cards.push(card);
    }

    /// Add a deck card. A conclusion card replaces any existing one.
    pub fn add_deck_card(&mut self, card: DeckCard) {
        self.deck_cards.retain(|existing| {
            !matches!(
                existing.kind,
                DeckCardKind::Repeat | DeckCardKind::Terminate
            )
        });
        self.deck_cards.push(card);
    }

    /// What happens after the last hand; `Terminate` when no card says.
    #[must_use]
    pub fn conclusion(&self) -> DeckConclusion {
        self.deck_cards
            .iter()
            .rev()
            .find_map(|card| match card.kind {
                DeckCardKind::Repeat => Some(DeckConclusion::Repeat),
                DeckCardKind::Terminate => Some(DeckConclusion::Terminate),
            })
            .unwrap_or(DeckConclusion::Terminate)
    }

    /// The top-level hand sequence, in order.
    #[must_use]
    pub fn top_level_hands(&self) -> &[Hand] {
        &self.hands
    }

    /// Registered token cards.
    #[must_use]
    pub fn token_cards(&self) -> &[TokenCard] {
        &self.token_cards
    }

    /// Deck cards.
    #[must_use]
    pub fn deck_cards(&self) -> &[DeckCard] {
        &self.deck_cards
    }

    /// Number of top-level hands.
    #[must_use]
    pub fn hand_count(&self) -> usize {
        self.hands.len()
    }

    /// Find a hand anywhere in the deck, branch targets included.
    #[must_use]
    pub fn hand(&self, id: HandId) -> Option<Hand> {
        self.all_hands().into_iter().find(|hand| hand.id() == id)
    }

    /// The execution universe: each top-level hand in order, followed by
    /// its nested subhands depth-first, deduplicated by hand id (first
    /// occurrence wins).
    #[must_use]
    pub fn all_hands(&self) -> Vec<Hand> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut out = Vec::new();
        for hand in &self.hands {
            if seen.insert(hand.id()) {
                out.push(hand.clone());
            }
            for sub in hand.nested_subhands() {
                if seen.insert(sub.id()) {
                    out.push(sub);
                }
            }
        }
        out
    }

    /// Encode the deck for storage or transfer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a deck produced by [`Deck::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Deck, SnapshotError> {
        Ok(bincode::deserialize(bytes)?)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent deck construction.
///
/// ```
/// use deckflow::deck::{DeckBuilder, DeckConclusion};
/// use deckflow::hand::Hand;
///
/// let deck = DeckBuilder::new()
///     .hand(Hand::new())
///     .repeating()
///     .build();
/// assert_eq!(deck.conclusion(), DeckConclusion::Repeat);
/// ```
#[derive(Debug, Default)]
pub struct DeckBuilder {
    deck: Deck,
}

impl DeckBuilder {
    /// Start from an empty deck.
    #[must_use]
    pub fn new() -> Self {
        DeckBuilder { deck: Deck::new() }
    }

    /// Append a hand.
    #[must_use]
    pub fn hand(mut self, hand: Hand) -> Self {
        self.deck.add_hand(hand);
        self
    }

    /// Append several hands.
    #[must_use]
    pub fn hands(mut self, hands: impl IntoIterator<Item = Hand>) -> Self {
        self.deck.add_hands(hands);
        self
    }

    /// Register a token card.
    #[must_use]
    pub fn token(mut self, card: TokenCard) -> Self {
        self.deck.add_token_card(card);
        self
    }

    /// Conclude by repeating the deck.
    #[must_use]
    pub fn repeating(mut self) -> Self {
        self.deck.add_deck_card(builtin::repeat_deck().instantiate());
        self
    }

    /// Conclude by terminating (the default).
    #[must_use]
    pub fn terminating(mut self) -> Self {
        self.deck.add_deck_card(builtin::terminate_deck().instantiate());
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Deck {
        self.deck
    }
}
