//! Card descriptors - static card metadata.
//!
//! A descriptor holds the immutable properties of a card type: its
//! identifier, what it consumes and produces, and how it behaves inside a
//! hand or deck. Instance-specific data (bindings, branch targets, repeat
//! counts) lives on the instances minted by `instantiate`.
//!
//! ## Example
//!
//! ```
//! use deckflow::cards::{ActionCardDescriptor, InputType};
//! use deckflow::core::CardIdentifier;
//!
//! let timer = ActionCardDescriptor::new(
//!     CardIdentifier::new("Action/Trigger/Time", "Timer"),
//!     "Fires after a duration elapses",
//! )
//! .with_input_slot("duration", InputType::Duration, true)
//! .with_yield(InputType::Duration);
//!
//! let card = timer.instantiate();
//! assert_eq!(card.identifier(), &timer.identifier);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::{CardIdentifier, CardInstanceId, YieldId};

use super::action::ActionCard;
use super::deck_card::{DeckCard, DeckCardKind, TokenCard};
use super::hand_card::{
    BranchHandCard, EndRule, EndRuleHandCard, HandCard, LogicHandCard, LogicOperation,
    RepeatHandCard,
};
use super::input::{InputCard, InputSlot, InputType, TokenSlot, YieldSlot};

/// Descriptor for an executable action card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCardDescriptor {
    /// Descriptor identity.
    pub identifier: CardIdentifier,

    /// Human-readable description.
    pub description: String,

    /// Inputs the action consumes.
    pub input_slots: Vec<InputSlot>,

    /// Resources the action holds while running.
    pub token_slots: Vec<TokenSlot>,

    /// Values the action produces for later hands.
    pub yields: Vec<YieldSlot>,

    /// Whether the action finishes on its own. A timer does; a continuous
    /// sensor feed runs until the hand satisfies around it.
    pub ends: bool,
}

impl ActionCardDescriptor {
    /// Create a descriptor with no slots that ends on its own.
    #[must_use]
    pub fn new(identifier: CardIdentifier, description: impl Into<String>) -> Self {
        Self {
            identifier,
            description: description.into(),
            input_slots: Vec::new(),
            token_slots: Vec::new(),
            yields: Vec::new(),
            ends: true,
        }
    }

    /// Declare an input slot (builder pattern).
    #[must_use]
    pub fn with_input_slot(
        mut self,
        name: impl Into<String>,
        expects: InputType,
        mandatory: bool,
    ) -> Self {
        self.input_slots.push(InputSlot::new(name, expects, mandatory));
        self
    }

    /// Declare a token slot (builder pattern).
    #[must_use]
    pub fn with_token_slot(mut self, name: impl Into<String>) -> Self {
        self.token_slots.push(TokenSlot::new(name));
        self
    }

    /// Declare the next yield slot (builder pattern). Yield ids are assigned
    /// in declaration order.
    #[must_use]
    pub fn with_yield(mut self, expects: InputType) -> Self {
        let id = YieldId::new(self.yields.len() as u32);
        self.yields.push(YieldSlot::new(id, expects));
        self
    }

    /// Mark whether the action finishes on its own (builder pattern).
    #[must_use]
    pub fn with_ends(mut self, ends: bool) -> Self {
        self.ends = ends;
        self
    }

    /// Look up an input slot by name.
    #[must_use]
    pub fn input_slot(&self, name: &str) -> Option<&InputSlot> {
        self.input_slots.iter().find(|slot| slot.name == name)
    }

    /// Look up a token slot by name.
    #[must_use]
    pub fn token_slot(&self, name: &str) -> Option<&TokenSlot> {
        self.token_slots.iter().find(|slot| slot.name == name)
    }

    /// Look up a yield slot by id.
    #[must_use]
    pub fn yield_slot(&self, id: YieldId) -> Option<&YieldSlot> {
        self.yields.iter().find(|slot| slot.id == id)
    }

    /// Mint an unbound card of this type with a fresh instance identity.
    #[must_use]
    pub fn instantiate(&self) -> ActionCard {
        ActionCard::new(self.clone())
    }
}

/// Role a hand card descriptor plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandCardKind {
    /// Both subtrees must satisfy.
    BooleanLogicAnd,
    /// Either subtree satisfies.
    BooleanLogicOr,
    /// The subtree must not satisfy.
    BooleanLogicNot,
    /// Jump to another hand on satisfaction.
    Branch,
    /// Re-run the hand.
    Repeat,
    /// End when every tree satisfies.
    EndWhenAllSatisfied,
    /// End when any tree satisfies.
    EndWhenAnySatisfied,
}

/// Descriptor for a hand-level card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandCardDescriptor {
    /// Descriptor identity.
    pub identifier: CardIdentifier,

    /// Human-readable description.
    pub description: String,

    /// Role cards of this type play in a hand.
    pub kind: HandCardKind,
}

impl HandCardDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        identifier: CardIdentifier,
        description: impl Into<String>,
        kind: HandCardKind,
    ) -> Self {
        Self {
            identifier,
            description: description.into(),
            kind,
        }
    }

    /// Mint a card of this type with a fresh instance identity.
    ///
    /// Branch targets, repeat counts, and logic wiring are instance state;
    /// they start unset/zero.
    #[must_use]
    pub fn instantiate(&self) -> HandCard {
        let id = CardInstanceId::new();
        let identifier = self.identifier.clone();
        match self.kind {
            HandCardKind::BooleanLogicAnd => HandCard::Logic(LogicHandCard {
                id,
                identifier,
                operation: LogicOperation::BooleanAnd,
            }),
            HandCardKind::BooleanLogicOr => HandCard::Logic(LogicHandCard {
                id,
                identifier,
                operation: LogicOperation::BooleanOr,
            }),
            HandCardKind::BooleanLogicNot => HandCard::Logic(LogicHandCard {
                id,
                identifier,
                operation: LogicOperation::BooleanNot,
            }),
            HandCardKind::Branch => HandCard::Branch(BranchHandCard {
                id,
                identifier,
                card_tree: None,
                target: None,
            }),
            HandCardKind::Repeat => HandCard::Repeat(RepeatHandCard {
                id,
                identifier,
                count: 0,
            }),
            HandCardKind::EndWhenAllSatisfied => HandCard::EndRule(EndRuleHandCard {
                id,
                identifier,
                rule: EndRule::EndWhenAllSatisfied,
            }),
            HandCardKind::EndWhenAnySatisfied => HandCard::EndRule(EndRuleHandCard {
                id,
                identifier,
                rule: EndRule::EndWhenAnySatisfied,
            }),
        }
    }
}

/// Descriptor for an input card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCardDescriptor {
    /// Descriptor identity.
    pub identifier: CardIdentifier,

    /// Human-readable description.
    pub description: String,

    /// Type cards of this kind carry.
    pub expects: InputType,
}

impl InputCardDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        identifier: CardIdentifier,
        description: impl Into<String>,
        expects: InputType,
    ) -> Self {
        Self {
            identifier,
            description: description.into(),
            expects,
        }
    }

    /// Mint an unbound card of this type with a fresh instance identity.
    #[must_use]
    pub fn instantiate(&self) -> InputCard {
        InputCard {
            id: CardInstanceId::new(),
            identifier: self.identifier.clone(),
            expects: self.expects,
            value: None,
        }
    }
}

/// Descriptor for a token card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCardDescriptor {
    /// Descriptor identity.
    pub identifier: CardIdentifier,

    /// Human-readable description.
    pub description: String,

    /// Whether only one action may hold the resource at a time.
    pub consumed: bool,
}

impl TokenCardDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        identifier: CardIdentifier,
        description: impl Into<String>,
        consumed: bool,
    ) -> Self {
        Self {
            identifier,
            description: description.into(),
            consumed,
        }
    }

    /// Mint a card of this type with a fresh instance identity.
    #[must_use]
    pub fn instantiate(&self) -> TokenCard {
        TokenCard {
            id: CardInstanceId::new(),
            identifier: self.identifier.clone(),
            consumed: self.consumed,
        }
    }
}

/// Descriptor for a deck conclusion card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckCardDescriptor {
    /// Descriptor identity.
    pub identifier: CardIdentifier,

    /// Human-readable description.
    pub description: String,

    /// Conclusion cards of this type select.
    pub kind: DeckCardKind,
}

impl DeckCardDescriptor {
    /// Create a descriptor.
    #[must_use]
    pub fn new(
        identifier: CardIdentifier,
        description: impl Into<String>,
        kind: DeckCardKind,
    ) -> Self {
        Self {
            identifier,
            description: description.into(),
            kind,
        }
    }

    /// Mint a card of this type with a fresh instance identity.
    #[must_use]
    pub fn instantiate(&self) -> DeckCard {
        DeckCard {
            id: CardInstanceId::new(),
            identifier: self.identifier.clone(),
            kind: self.kind,
        }
    }
}

/// Any descriptor. The card taxonomy is closed; catalogs store this.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CardDescriptor {
    /// Executable action.
    Action(ActionCardDescriptor),
    /// Hand-level card.
    Hand(HandCardDescriptor),
    /// Input value card.
    Input(InputCardDescriptor),
    /// Token resource card.
    Token(TokenCardDescriptor),
    /// Deck conclusion card.
    Deck(DeckCardDescriptor),
}

impl CardDescriptor {
    /// Descriptor identity.
    #[must_use]
    pub fn identifier(&self) -> &CardIdentifier {
        match self {
            CardDescriptor::Action(d) => &d.identifier,
            CardDescriptor::Hand(d) => &d.identifier,
            CardDescriptor::Input(d) => &d.identifier,
            CardDescriptor::Token(d) => &d.identifier,
            CardDescriptor::Deck(d) => &d.identifier,
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            CardDescriptor::Action(d) => &d.description,
            CardDescriptor::Hand(d) => &d.description,
            CardDescriptor::Input(d) => &d.description,
            CardDescriptor::Token(d) => &d.description,
            CardDescriptor::Deck(d) => &d.description,
        }
    }

    /// Get as action descriptor if this is one.
    #[must_use]
    pub fn as_action(&self) -> Option<&ActionCardDescriptor> {
        match self {
            CardDescriptor::Action(d) => Some(d),
            _ => None,
        }
    }

    /// Get as hand descriptor if this is one.
    #[must_use]
    pub fn as_hand(&self) -> Option<&HandCardDescriptor> {
        match self {
            CardDescriptor::Hand(d) => Some(d),
            _ => None,
        }
    }
}

impl From<ActionCardDescriptor> for CardDescriptor {
    fn from(d: ActionCardDescriptor) -> Self {
        CardDescriptor::Action(d)
    }
}

impl From<HandCardDescriptor> for CardDescriptor {
    fn from(d: HandCardDescriptor) -> Self {
        CardDescriptor::Hand(d)
    }
}

impl From<InputCardDescriptor> for CardDescriptor {
    fn from(d: InputCardDescriptor) -> Self {
        CardDescriptor::Input(d)
    }
}

impl From<TokenCardDescriptor> for CardDescriptor {
    fn from(d: TokenCardDescriptor) -> Self {
        CardDescriptor::Token(d)
    }
}

impl From<DeckCardDescriptor> for CardDescriptor {
    fn from(d: DeckCardDescriptor) -> Self {
        CardDescriptor::Deck(d)
    }
}
