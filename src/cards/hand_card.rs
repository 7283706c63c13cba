//! Hand-level cards: logic operators, branches, repetition, end rules.
//!
//! Hand cards never execute. They shape how a hand's action cards are
//! grouped and judged:
//!
//! - **Logic** cards become interior tree nodes (AND/OR/NOT over subtrees).
//! - **Branch** cards name the hand to jump to when a tree (or the whole
//!   hand) satisfies.
//! - **Repeat** cards re-run the hand extra times.
//! - **EndRule** cards pick ALL vs ANY over the hand's forest.
//!
//! Logic cards live inside trees; the other three are plain members of the
//! hand, with Repeat and EndRule limited to one each (adding another
//! replaces it).

use serde::{Deserialize, Serialize};

use crate::core::{CardIdentifier, CardInstanceId, CardTreeId, HandId};

/// Boolean operation a logic card applies to its children.
///
/// `Indeterminate` marks a card decoded from data that never had its
/// operation set; evaluation refuses it rather than guessing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicOperation {
    /// Both children must be satisfied.
    BooleanAnd,
    /// At least one child must be satisfied.
    BooleanOr,
    /// The single child must not be satisfied.
    BooleanNot,
    /// Unset; refused at evaluation time.
    Indeterminate,
}

impl LogicOperation {
    /// Number of child slots a tree node with this operation carries.
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            LogicOperation::BooleanAnd | LogicOperation::BooleanOr => 2,
            LogicOperation::BooleanNot => 1,
            LogicOperation::Indeterminate => 0,
        }
    }
}

/// How a hand judges its forest of trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndRule {
    /// Every tree must be satisfied.
    EndWhenAllSatisfied,
    /// Any one satisfied tree ends the hand.
    EndWhenAnySatisfied,
    /// No end-rule card present; satisfaction refuses to guess.
    Indeterminate,
}

/// A boolean operator card; becomes an interior node of a card tree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicHandCard {
    /// Instance identity.
    pub id: CardInstanceId,
    /// Descriptor identity.
    pub identifier: CardIdentifier,
    /// Operation applied to child subtrees.
    pub operation: LogicOperation,
}

/// A branch card: "when satisfied, go to that hand".
///
/// Scoped either to one tree (`card_tree = Some`) or to the whole hand
/// (`card_tree = None`). The target starts unset and is wired by
/// `Hand::add_branch`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchHandCard {
    /// Instance identity.
    pub id: CardInstanceId,
    /// Descriptor identity.
    pub identifier: CardIdentifier,
    /// Tree this branch watches; `None` means the whole hand.
    pub card_tree: Option<CardTreeId>,
    /// Hand to jump to when the watched scope satisfies.
    pub target: Option<HandId>,
}

impl BranchHandCard {
    /// Point this branch at a hand.
    pub fn set_target(&mut self, target: HandId) {
        self.target = Some(target);
    }
}

/// A repeat card: run the hand `count` extra times.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatHandCard {
    /// Instance identity.
    pub id: CardInstanceId,
    /// Descriptor identity.
    pub identifier: CardIdentifier,
    /// Extra executions beyond the first.
    pub count: u32,
}

impl RepeatHandCard {
    /// Set the repeat count (builder pattern).
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }
}

/// An end-rule card: ALL vs ANY over the hand's forest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndRuleHandCard {
    /// Instance identity.
    pub id: CardInstanceId,
    /// Descriptor identity.
    pub identifier: CardIdentifier,
    /// The rule this card selects.
    pub rule: EndRule,
}

/// Any hand-level card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandCard {
    /// Boolean operator card.
    Logic(LogicHandCard),
    /// Branch-on-satisfaction card.
    Branch(BranchHandCard),
    /// Repeat card.
    Repeat(RepeatHandCard),
    /// End-rule card.
    EndRule(EndRuleHandCard),
}

impl HandCard {
    /// Instance identity.
    #[must_use]
    pub fn id(&self) -> CardInstanceId {
        match self {
            HandCard::Logic(c) => c.id,
            HandCard::Branch(c) => c.id,
            HandCard::Repeat(c) => c.id,
            HandCard::EndRule(c) => c.id,
        }
    }

    /// Descriptor identity.
    #[must_use]
    pub fn identifier(&self) -> &CardIdentifier {
        match self {
            HandCard::Logic(c) => &c.identifier,
            HandCard::Branch(c) => &c.identifier,
            HandCard::Repeat(c) => &c.identifier,
            HandCard::EndRule(c) => &c.identifier,
        }
    }

    /// Get as logic card if this is one.
    #[must_use]
    pub fn as_logic(&self) -> Option<&LogicHandCard> {
        match self {
            HandCard::Logic(c) => Some(c),
            _ => None,
        }
    }

    /// Get as branch card if this is one.
    #[must_use]
    pub fn as_branch(&self) -> Option<&BranchHandCard> {
        match self {
            HandCard::Branch(c) => Some(c),
            _ => None,
        }
    }

    /// Get as repeat card if this is one.
    #[must_use]
    pub fn as_repeat(&self) -> Option<&RepeatHandCard> {
        match self {
            HandCard::Repeat(c) => Some(c),
            _ => None,
        }
    }

    /// Get as end-rule card if this is one.
    #[must_use]
    pub fn as_end_rule(&self) -> Option<&EndRuleHandCard> {
        match self {
            HandCard::EndRule(c) => Some(c),
            _ => None,
        }
    }
}

impl From<LogicHandCard> for HandCard {
    fn from(card: LogicHandCard) -> Self {
        HandCard::Logic(card)
    }
}

impl From<BranchHandCard> for HandCard {
    fn from(card: BranchHandCard) -> Self {
        HandCard::Branch(card)
    }
}

impl From<RepeatHandCard> for HandCard {
    fn from(card: RepeatHandCard) -> Self {
        HandCard::Repeat(card)
    }
}

impl From<EndRuleHandCard> for HandCard {
    fn from(card: EndRuleHandCard) -> Self {
        HandCard::EndRule(card)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logic(op: LogicOperation) -> LogicHandCard {
        LogicHandCard {
            id: CardInstanceId::new(),
            identifier: CardIdentifier::new("Hand/Logic", "LogicalAnd"),
            operation: op,
        }
    }

    #[test]
    fn test_arity() {
        assert_eq!(LogicOperation::BooleanAnd.arity(), 2);
        assert_eq!(LogicOperation::BooleanOr.arity(), 2);
        assert_eq!(LogicOperation::BooleanNot.arity(), 1);
        assert_eq!(LogicOperation::Indeterminate.arity(), 0);
    }

    #[test]
    fn test_hand_card_accessors() {
        let card = logic(LogicOperation::BooleanAnd);
        let id = card.id;
        let wrapped: HandCard = card.into();

        assert_eq!(wrapped.id(), id);
        assert!(wrapped.as_logic().is_some());
        assert!(wrapped.as_branch().is_none());
        assert!(wrapped.as_end_rule().is_none());
    }

    #[test]
    fn test_branch_retarget() {
        let mut branch = BranchHandCard {
            id: CardInstanceId::new(),
            identifier: CardIdentifier::new("Hand/Next", "Branch"),
            card_tree: None,
            target: None,
        };
        assert_eq!(branch.target, None);

        let hand = HandId::new();
        branch.set_target(hand);
        assert_eq!(branch.target, Some(hand));
    }

    #[test]
    fn test_repeat_with_count() {
        let repeat = RepeatHandCard {
            id: CardInstanceId::new(),
            identifier: CardIdentifier::new("Hand/Next", "Repeat"),
            count: 0,
        }
        .with_count(3);
        assert_eq!(repeat.count, 3);
    }

    #[test]
    fn test_serialization() {
        let card: HandCard = EndRuleHandCard {
            id: CardInstanceId::new(),
            identifier: CardIdentifier::new("Hand/End", "OnAny"),
            rule: EndRule::EndWhenAnySatisfied,
        }
        .into();

        let json = serde_json::to_string(&card).unwrap();
        let back: HandCard = serde_json::from_str(&json).unwrap();
        assert_eq!(card, back);
    }
}
