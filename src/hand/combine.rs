//! Merging and combining hands.
//!
//! Two ways to put hands together. `merged` is the union: both forests
//! side by side under a fresh hand id. `combined` collapses: each side's
//! forest folds into a single tree via its own end rule's operator, and
//! the two folded trees meet under a freshly minted AND/OR node. The
//! `+`, `&`, and `|` operators spell these for deck-authoring code.

use std::ops::{Add, BitAnd, BitOr};

use serde::{Deserialize, Serialize};

use crate::cards::{builtin, ActionCard, EndRule, HandCard, LogicHandCard, LogicOperation};
use crate::core::CardInstanceId;
use crate::tree::{CardTree, CardTreeNode};

use super::Hand;

/// The two operators a combine can put at the top of the folded tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryLogic {
    /// Both sides must be satisfied.
    And,
    /// Either side suffices.
    Or,
}

fn mint_logic(op: BinaryLogic, minted: &mut Vec<LogicHandCard>) -> LogicHandCard {
    let (identifier, operation) = match op {
        BinaryLogic::And => (builtin::boolean_and().identifier, LogicOperation::BooleanAnd),
        BinaryLogic::Or => (builtin::boolean_or().identifier, LogicOperation::BooleanOr),
    };
    let card = LogicHandCard {
        id: CardInstanceId::new(),
        identifier,
        operation,
    };
    minted.push(card.clone());
    card
}

/// Fold a forest into one root via the operator the end rule implies.
///
/// `EndWhenAnySatisfied` folds with OR, everything else with AND. Empty
/// roots stay as empty slots so their vacuous truth survives the fold;
/// an empty forest folds to `None`.
fn fold_forest(
    trees: &[CardTree],
    rule: EndRule,
    minted: &mut Vec<LogicHandCard>,
) -> Option<CardTreeNode> {
    let op = match rule {
        EndRule::EndWhenAnySatisfied => BinaryLogic::Or,
        EndRule::EndWhenAllSatisfied | EndRule::Indeterminate => BinaryLogic::And,
    };

    let mut roots = trees.iter().map(|tree| tree.root().cloned());
    let first = roots.next()?;
    let Some(second) = roots.next() else {
        return first;
    };

    let card = mint_logic(op, minted);
    let mut acc = CardTreeNode::Binary {
        card,
        left: first.map(Box::new),
        right: second.map(Box::new),
    };
    for root in roots {
        let card = mint_logic(op, minted);
        acc = CardTreeNode::Binary {
            card,
            left: Some(Box::new(acc)),
            right: root.map(Box::new),
        };
    }
    Some(acc)
}

impl Hand {
    /// Union of two hands under a fresh id.
    ///
    /// Membership is deduped by instance id and trees by tree id; both
    /// forests survive side by side. For the singleton roles (End-Rule,
    /// Repeat) `other` wins when both hands carry one. Subhands are
    /// carried over, deduped by hand id.
    #[must_use]
    pub fn merged(&self, other: &Hand) -> Hand {
        let mut merged = Hand::new();
        merged.action_cards = self.action_cards.clone();
        merged.hand_cards = self.hand_cards.clone();
        merged.trees = self.trees.clone();
        merged.subhands = self.subhands.clone();

        for card in &other.action_cards {
            if !merged.contains(card.id()) {
                merged.action_cards.push(card.clone());
            }
        }
        for card in &other.hand_cards {
            if merged.contains(card.id()) {
                continue;
            }
            match card {
                HandCard::EndRule(_) | HandCard::Repeat(_) => merged.replace_role(card.clone()),
                _ => merged.hand_cards.push(card.clone()),
            }
        }
        for tree in &other.trees {
            if merged.trees.iter().all(|existing| existing.id() != tree.id()) {
                merged.trees.push(tree.clone());
            }
        }
        for sub in &other.subhands {
            if merged.subhands.iter().all(|existing| existing.id() != sub.id()) {
                merged.subhands.push(sub.clone());
            }
        }
        merged
    }

    /// Collapse two hands into one single-tree hand under a fresh id.
    ///
    /// Each side's forest folds via its own end rule's operator; the two
    /// folded roots become the children of a fresh `op` node. Branch
    /// cards and subhands are dropped (the collapsed tree has no stable
    /// scopes for them); End-Rule and Repeat follow `other`-wins.
    #[must_use]
    pub fn combined(&self, other: &Hand, op: BinaryLogic) -> Hand {
        let mut minted = Vec::new();
        let left = fold_forest(&self.trees, self.end_rule(), &mut minted);
        let right = fold_forest(&other.trees, other.end_rule(), &mut minted);
        let top = mint_logic(op, &mut minted);
        let root = CardTreeNode::Binary {
            card: top,
            left: left.map(Box::new),
            right: right.map(Box::new),
        };

        let mut combined = Hand::new();
        for card in self.action_cards.iter().chain(&other.action_cards) {
            if !combined.contains(card.id()) {
                combined.action_cards.push(card.clone());
            }
        }
        for card in self.hand_cards.iter().chain(&other.hand_cards) {
            if combined.contains(card.id()) {
                continue;
            }
            match card {
                HandCard::Logic(_) => combined.hand_cards.push(card.clone()),
                HandCard::EndRule(_) | HandCard::Repeat(_) => combined.replace_role(card.clone()),
                HandCard::Branch(_) => {}
            }
        }
        for card in minted {
            combined.hand_cards.push(HandCard::Logic(card));
        }
        combined.trees = vec![CardTree::from_root(root)];
        combined
    }
}

/// `lhs + rhs` is [`Hand::merged`].
impl Add for Hand {
    type Output = Hand;

    fn add(self, rhs: Hand) -> Hand {
        self.merged(&rhs)
    }
}

/// `hand + card` adds an action card.
impl Add<ActionCard> for Hand {
    type Output = Hand;

    fn add(mut self, rhs: ActionCard) -> Hand {
        self.add_action(rhs);
        self
    }
}

/// `hand + card` adds a hand card.
impl Add<HandCard> for Hand {
    type Output = Hand;

    fn add(mut self, rhs: HandCard) -> Hand {
        self.add_hand_card(rhs);
        self
    }
}

/// `lhs & rhs` is [`Hand::combined`] with AND on top.
impl BitAnd for Hand {
    type Output = Hand;

    fn bitand(self, rhs: Hand) -> Hand {
        self.combined(&rhs, BinaryLogic::And)
    }
}

/// `lhs | rhs` is [`Hand::combined`] with OR on top.
impl BitOr for Hand {
    type Output = Hand;

    fn bitor(self, rhs: Hand) -> Hand {
        self.combined(&rhs, BinaryLogic::Or)
    }
}
