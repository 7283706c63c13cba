//! Deck-level cards: conclusions and tokens.
//!
//! A deck carries at most one *conclusion* card deciding what happens after
//! the last hand (loop back or stop), plus the token cards standing in for
//! the physical resources its actions bind.

use serde::{Deserialize, Serialize};

use crate::core::{CardIdentifier, CardInstanceId};

/// What a deck does after its last hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeckCardKind {
    /// Start over at the first hand.
    Repeat,
    /// Stop.
    Terminate,
}

/// A deck conclusion card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCard {
    /// Instance identity.
    pub id: CardInstanceId,
    /// Descriptor identity.
    pub identifier: CardIdentifier,
    /// Conclusion this card selects.
    pub kind: DeckCardKind,
}

/// A token card: a handle on one physical resource.
///
/// The engine treats tokens structurally; driving real hardware is the
/// embedder's concern.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCard {
    /// Instance identity.
    pub id: CardInstanceId,
    /// Descriptor identity.
    pub identifier: CardIdentifier,
    /// Whether only one action may hold this resource at a time.
    pub consumed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization() {
        let card = DeckCard {
            id: CardInstanceId::new(),
            identifier: CardIdentifier::new("Deck/Conclusion", "Repeat"),
            kind: DeckCardKind::Repeat,
        };

        let json = serde_json::to_string(&card).unwrap();
        let back: DeckCard = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }

    #[test]
    fn test_token_card() {
        let token = TokenCard {
            id: CardInstanceId::new(),
            identifier: CardIdentifier::new("Token", "Camera"),
            consumed: true,
        };
        assert!(token.consumed);
    }
}
