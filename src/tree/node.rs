//! Card tree nodes.
//!
//! A card tree is the boolean shape of a hand: action cards at the leaves,
//! logic cards at the interior nodes. Nodes are immutable values; every
//! structural operation returns a rebuilt tree and leaves the original
//! untouched. Card identities survive rebuilds.
//!
//! ## Empty slots
//!
//! Logic nodes may have unfilled child slots (authoring is incremental).
//! An empty slot evaluates as *satisfied*: no constraint there means
//! nothing left to wait for. This makes `NOT` with no child true, and
//! `AND`/`OR` treat a missing side as true.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::cards::{ActionCard, LogicHandCard, LogicOperation};
use crate::core::{CardInstanceId, SatisfiedSet};

/// Errors from building or evaluating tree nodes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A logic card's operation does not fit the node shape holding it.
    ///
    /// Possible for decoded data; evaluation refuses it rather than
    /// silently returning false.
    #[error("logic card {card} has operation {operation:?}, which does not fit a {variant} node")]
    OperationMismatch {
        /// The offending card.
        card: CardInstanceId,
        /// Its operation.
        operation: LogicOperation,
        /// The node shape it was found in ("unary" or "binary").
        variant: &'static str,
    },
}

/// One node of a card tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CardTreeNode {
    /// Leaf: an executable action card.
    Action(ActionCard),

    /// Interior node with one child slot (`NOT`).
    Unary {
        /// The logic card at this node.
        card: LogicHandCard,
        /// Its child, if filled.
        child: Option<Box<CardTreeNode>>,
    },

    /// Interior node with two child slots (`AND`/`OR`), filled left first.
    Binary {
        /// The logic card at this node.
        card: LogicHandCard,
        /// Left child, if filled.
        left: Option<Box<CardTreeNode>>,
        /// Right child, if filled.
        right: Option<Box<CardTreeNode>>,
    },
}

impl CardTreeNode {
    /// Wrap an action card as a leaf.
    #[must_use]
    pub fn action(card: ActionCard) -> Self {
        CardTreeNode::Action(card)
    }

    /// Build an empty unary node. The card must carry `BooleanNot`.
    pub fn unary(card: LogicHandCard) -> Result<Self, TreeError> {
        if card.operation != LogicOperation::BooleanNot {
            return Err(TreeError::OperationMismatch {
                card: card.id,
                operation: card.operation,
                variant: "unary",
            });
        }
        Ok(CardTreeNode::Unary { card, child: None })
    }

    /// Build an empty binary node. The card must carry `BooleanAnd` or
    /// `BooleanOr`.
    pub fn binary(card: LogicHandCard) -> Result<Self, TreeError> {
        match card.operation {
            LogicOperation::BooleanAnd | LogicOperation::BooleanOr => Ok(CardTreeNode::Binary {
                card,
                left: None,
                right: None,
            }),
            operation => Err(TreeError::OperationMismatch {
                card: card.id,
                operation,
                variant: "binary",
            }),
        }
    }

    /// Build the empty node shape a logic card's operation calls for.
    pub fn for_logic(card: LogicHandCard) -> Result<Self, TreeError> {
        match card.operation {
            LogicOperation::BooleanNot => Self::unary(card),
            _ => Self::binary(card),
        }
    }

    /// The card at this node.
    #[must_use]
    pub fn card_id(&self) -> CardInstanceId {
        match self {
            CardTreeNode::Action(card) => card.id(),
            CardTreeNode::Unary { card, .. } => card.id,
            CardTreeNode::Binary { card, .. } => card.id,
        }
    }

    /// Whether the subtree is satisfied against a set of completed actions.
    ///
    /// - Leaf: the action has completed.
    /// - `NOT`: negation of the child; true when the slot is empty.
    /// - `AND`/`OR`: over the children, an empty slot counting as true.
    pub fn is_satisfied(&self, satisfied: &SatisfiedSet) -> Result<bool, TreeError> {
        match self {
            CardTreeNode::Action(card) => Ok(satisfied.contains(&card.id())),

            CardTreeNode::Unary { card, child } => {
                if card.operation != LogicOperation::BooleanNot {
                    return Err(TreeError::OperationMismatch {
                        card: card.id,
                        operation: card.operation,
                        variant: "unary",
                    });
                }
                match child {
                    None => Ok(true),
                    Some(inner) => Ok(!inner.is_satisfied(satisfied)?),
                }
            }

            CardTreeNode::Binary { card, left, right } => {
                let eval = |slot: &Option<Box<CardTreeNode>>| match slot {
                    None => Ok(true),
                    Some(inner) => inner.is_satisfied(satisfied),
                };
                match card.operation {
                    LogicOperation::BooleanAnd => Ok(eval(left)? && eval(right)?),
                    LogicOperation::BooleanOr => Ok(eval(left)? || eval(right)?),
                    operation => Err(TreeError::OperationMismatch {
                        card: card.id,
                        operation,
                        variant: "binary",
                    }),
                }
            }
        }
    }

    /// Rebuild with `node` attached under the logic card `to`.
    ///
    /// Unary slots fill directly; binary slots fill left first. Returns the
    /// rebuilt tree and, if no slot accepted the node (target absent, or
    /// its slots occupied), the node back to the caller.
    #[must_use]
    pub fn attached(
        &self,
        to: CardInstanceId,
        node: CardTreeNode,
    ) -> (CardTreeNode, Option<CardTreeNode>) {
        match self {
            CardTreeNode::Action(_) => (self.clone(), Some(node)),

            CardTreeNode::Unary { card, child } => {
                if card.id == to {
                    match child {
                        None => (
                            CardTreeNode::Unary {
                                card: card.clone(),
                                child: Some(Box::new(node)),
                            },
                            None,
                        ),
                        Some(_) => (self.clone(), Some(node)),
                    }
                } else {
                    match child {
                        None => (self.clone(), Some(node)),
                        Some(inner) => {
                            let (rebuilt, leftover) = inner.attached(to, node);
                            (
                                CardTreeNode::Unary {
                                    card: card.clone(),
                                    child: Some(Box::new(rebuilt)),
                                },
                                leftover,
                            )
                        }
                    }
                }
            }

            CardTreeNode::Binary { card, left, right } => {
                if card.id == to {
                    if left.is_none() {
                        (
                            CardTreeNode::Binary {
                                card: card.clone(),
                                left: Some(Box::new(node)),
                                right: right.clone(),
                            },
                            None,
                        )
                    } else if right.is_none() {
                        (
                            CardTreeNode::Binary {
                                card: card.clone(),
                                left: left.clone(),
                                right: Some(Box::new(node)),
                            },
                            None,
                        )
                    } else {
                        (self.clone(), Some(node))
                    }
                } else {
                    let (new_left, leftover) = match left {
                        Some(inner) => {
                            let (rebuilt, leftover) = inner.attached(to, node);
                            (Some(Box::new(rebuilt)), leftover)
                        }
                        None => (None, Some(node)),
                    };
                    match leftover {
                        None => (
                            CardTreeNode::Binary {
                                card: card.clone(),
                                left: new_left,
                                right: right.clone(),
                            },
                            None,
                        ),
                        Some(node) => {
                            let (new_right, leftover) = match right {
                                Some(inner) => {
                                    let (rebuilt, leftover) = inner.attached(to, node);
                                    (Some(Box::new(rebuilt)), leftover)
                                }
                                None => (None, Some(node)),
                            };
                            (
                                CardTreeNode::Binary {
                                    card: card.clone(),
                                    left: new_left,
                                    right: new_right,
                                },
                                leftover,
                            )
                        }
                    }
                }
            }
        }
    }

    /// Rebuild without the action card `id`. The parent keeps an empty
    /// slot; removing the root leaf yields `None`.
    #[must_use]
    pub fn without_action(&self, id: CardInstanceId) -> Option<CardTreeNode> {
        match self {
            CardTreeNode::Action(card) => {
                if card.id() == id {
                    None
                } else {
                    Some(self.clone())
                }
            }
            CardTreeNode::Unary { card, child } => Some(CardTreeNode::Unary {
                card: card.clone(),
                child: child
                    .as_ref()
                    .and_then(|inner| inner.without_action(id))
                    .map(Box::new),
            }),
            CardTreeNode::Binary { card, left, right } => Some(CardTreeNode::Binary {
                card: card.clone(),
                left: left
                    .as_ref()
                    .and_then(|inner| inner.without_action(id))
                    .map(Box::new),
                right: right
                    .as_ref()
                    .and_then(|inner| inner.without_action(id))
                    .map(Box::new),
            }),
        }
    }

    /// Rebuild without the logic card `id`, returning its former children
    /// as orphans (at most two; the excised node's slot becomes empty).
    #[must_use]
    pub fn without_logic(
        &self,
        id: CardInstanceId,
    ) -> (Option<CardTreeNode>, SmallVec<[CardTreeNode; 2]>) {
        match self {
            CardTreeNode::Action(_) => (Some(self.clone()), SmallVec::new()),

            CardTreeNode::Unary { card, child } => {
                if card.id == id {
                    let mut orphans = SmallVec::new();
                    if let Some(inner) = child {
                        orphans.push((**inner).clone());
                    }
                    (None, orphans)
                } else {
                    match child {
                        None => (Some(self.clone()), SmallVec::new()),
                        Some(inner) => {
                            let (rebuilt, orphans) = inner.without_logic(id);
                            (
                                Some(CardTreeNode::Unary {
                                    card: card.clone(),
                                    child: rebuilt.map(Box::new),
                                }),
                                orphans,
                            )
                        }
                    }
                }
            }

            CardTreeNode::Binary { card, left, right } => {
                if card.id == id {
                    let mut orphans = SmallVec::new();
                    if let Some(inner) = left {
                        orphans.push((**inner).clone());
                    }
                    if let Some(inner) = right {
                        orphans.push((**inner).clone());
                    }
                    (None, orphans)
                } else {
                    let (new_left, mut orphans) = match left {
                        Some(inner) => {
                            let (rebuilt, orphans) = inner.without_logic(id);
                            (rebuilt.map(Box::new), orphans)
                        }
                        None => (None, SmallVec::new()),
                    };
                    let (new_right, right_orphans) = match right {
                        Some(inner) => {
                            let (rebuilt, orphans) = inner.without_logic(id);
                            (rebuilt.map(Box::new), orphans)
                        }
                        None => (None, SmallVec::new()),
                    };
                    orphans.extend(right_orphans);
                    (
                        Some(CardTreeNode::Binary {
                            card: card.clone(),
                            left: new_left,
                            right: new_right,
                        }),
                        orphans,
                    )
                }
            }
        }
    }

    /// Remove and return the whole subtree rooted at `id`.
    ///
    /// Returns `(remaining, subtree)`; the subtree's former slot becomes
    /// empty. Extracting the root leaves `None` behind.
    #[must_use]
    pub fn extracted(
        &self,
        id: CardInstanceId,
    ) -> (Option<CardTreeNode>, Option<CardTreeNode>) {
        if self.card_id() == id {
            return (None, Some(self.clone()));
        }
        match self {
            CardTreeNode::Action(_) => (Some(self.clone()), None),

            CardTreeNode::Unary { card, child } => match child {
                None => (Some(self.clone()), None),
                Some(inner) => {
                    let (rebuilt, subtree) = inner.extracted(id);
                    (
                        Some(CardTreeNode::Unary {
                            card: card.clone(),
                            child: rebuilt.map(Box::new),
                        }),
                        subtree,
                    )
                }
            },

            CardTreeNode::Binary { card, left, right } => {
                let (new_left, subtree) = match left {
                    Some(inner) => {
                        let (rebuilt, subtree) = inner.extracted(id);
                        (rebuilt.map(Box::new), subtree)
                    }
                    None => (None, None),
                };
                if subtree.is_some() {
                    return (
                        Some(CardTreeNode::Binary {
                            card: card.clone(),
                            left: new_left,
                            right: right.clone(),
                        }),
                        subtree,
                    );
                }
                let (new_right, subtree) = match right {
                    Some(inner) => {
                        let (rebuilt, subtree) = inner.extracted(id);
                        (rebuilt.map(Box::new), subtree)
                    }
                    None => (None, None),
                };
                (
                    Some(CardTreeNode::Binary {
                        card: card.clone(),
                        left: new_left,
                        right: new_right,
                    }),
                    subtree,
                )
            }
        }
    }

    /// Whether the subtree contains a card.
    #[must_use]
    pub fn contains(&self, id: CardInstanceId) -> bool {
        if self.card_id() == id {
            return true;
        }
        match self {
            CardTreeNode::Action(_) => false,
            CardTreeNode::Unary { child, .. } => {
                child.as_ref().is_some_and(|inner| inner.contains(id))
            }
            CardTreeNode::Binary { left, right, .. } => {
                left.as_ref().is_some_and(|inner| inner.contains(id))
                    || right.as_ref().is_some_and(|inner| inner.contains(id))
            }
        }
    }

    /// The filled children of the card `id`, left-then-right.
    ///
    /// `None` if the card is not in this subtree; leaves have no children.
    #[must_use]
    pub fn children_of(&self, id: CardInstanceId) -> Option<SmallVec<[CardInstanceId; 2]>> {
        if self.card_id() == id {
            let mut out = SmallVec::new();
            match self {
                CardTreeNode::Action(_) => {}
                CardTreeNode::Unary { child, .. } => {
                    if let Some(inner) = child {
                        out.push(inner.card_id());
                    }
                }
                CardTreeNode::Binary { left, right, .. } => {
                    if let Some(inner) = left {
                        out.push(inner.card_id());
                    }
                    if let Some(inner) = right {
                        out.push(inner.card_id());
                    }
                }
            }
            return Some(out);
        }
        match self {
            CardTreeNode::Action(_) => None,
            CardTreeNode::Unary { child, .. } => {
                child.as_ref().and_then(|inner| inner.children_of(id))
            }
            CardTreeNode::Binary { left, right, .. } => left
                .as_ref()
                .and_then(|inner| inner.children_of(id))
                .or_else(|| right.as_ref().and_then(|inner| inner.children_of(id))),
        }
    }

    /// All action cards in the subtree, depth-first.
    #[must_use]
    pub fn action_cards(&self) -> Vec<&ActionCard> {
        let mut out = Vec::new();
        self.collect_actions(&mut out);
        out
    }

    fn collect_actions<'a>(&'a self, out: &mut Vec<&'a ActionCard>) {
        match self {
            CardTreeNode::Action(card) => out.push(card),
            CardTreeNode::Unary { child, .. } => {
                if let Some(inner) = child {
                    inner.collect_actions(out);
                }
            }
            CardTreeNode::Binary { left, right, .. } => {
                if let Some(inner) = left {
                    inner.collect_actions(out);
                }
                if let Some(inner) = right {
                    inner.collect_actions(out);
                }
            }
        }
    }

    /// All logic cards in the subtree, depth-first.
    #[must_use]
    pub fn logic_cards(&self) -> Vec<&LogicHandCard> {
        let mut out = Vec::new();
        self.collect_logic(&mut out);
        out
    }

    fn collect_logic<'a>(&'a self, out: &mut Vec<&'a LogicHandCard>) {
        match self {
            CardTreeNode::Action(_) => {}
            CardTreeNode::Unary { card, child } => {
                out.push(card);
                if let Some(inner) = child {
                    inner.collect_logic(out);
                }
            }
            CardTreeNode::Binary { card, left, right } => {
                out.push(card);
                if let Some(inner) = left {
                    inner.collect_logic(out);
                }
                if let Some(inner) = right {
                    inner.collect_logic(out);
                }
            }
        }
    }

    /// All card ids in the subtree, depth-first.
    #[must_use]
    pub fn card_ids(&self) -> Vec<CardInstanceId> {
        let mut out = Vec::new();
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<CardInstanceId>) {
        out.push(self.card_id());
        match self {
            CardTreeNode::Action(_) => {}
            CardTreeNode::Unary { child, .. } => {
                if let Some(inner) = child {
                    inner.collect_ids(out);
                }
            }
            CardTreeNode::Binary { left, right, .. } => {
                if let Some(inner) = left {
                    inner.collect_ids(out);
                }
                if let Some(inner) = right {
                    inner.collect_ids(out);
                }
            }
        }
    }

    /// Number of cards in the subtree.
    #[must_use]
    pub fn card_count(&self) -> usize {
        match self {
            CardTreeNode::Action(_) => 1,
            CardTreeNode::Unary { child, .. } => {
                1 + child.as_ref().map_or(0, |inner| inner.card_count())
            }
            CardTreeNode::Binary { left, right, .. } => {
                1 + left.as_ref().map_or(0, |inner| inner.card_count())
                    + right.as_ref().map_or(0, |inner| inner.card_count())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{builtin, ActionCardDescriptor, HandCard};
    use crate::core::CardIdentifier;

    fn action(name: &str) -> ActionCard {
        ActionCardDescriptor::new(
            CardIdentifier::new("Action/Test", name),
            "test action",
        )
        .instantiate()
    }

    fn logic(descriptor: crate::cards::HandCardDescriptor) -> LogicHandCard {
        match descriptor.instantiate() {
            HandCard::Logic(card) => card,
            other => panic!("expected logic card, got {:?}", other),
        }
    }

    fn satisfied_with(ids: &[CardInstanceId]) -> SatisfiedSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_leaf_satisfaction() {
        let a = action("A");
        let id = a.id();
        let leaf = CardTreeNode::action(a);

        assert!(!leaf.is_satisfied(&SatisfiedSet::new()).unwrap());
        assert!(leaf.is_satisfied(&satisfied_with(&[id])).unwrap());
    }

    #[test]
    fn test_variant_checked_constructors() {
        let and = logic(builtin::boolean_and());
        let not = logic(builtin::boolean_not());

        assert!(CardTreeNode::binary(and.clone()).is_ok());
        assert!(CardTreeNode::unary(not.clone()).is_ok());

        let err = CardTreeNode::unary(and).unwrap_err();
        assert!(matches!(err, TreeError::OperationMismatch { variant: "unary", .. }));

        let err = CardTreeNode::binary(not).unwrap_err();
        assert!(matches!(err, TreeError::OperationMismatch { variant: "binary", .. }));
    }

    #[test]
    fn test_empty_not_is_vacuously_true() {
        let node = CardTreeNode::unary(logic(builtin::boolean_not())).unwrap();
        assert!(node.is_satisfied(&SatisfiedSet::new()).unwrap());
    }

    #[test]
    fn test_not_negates_child() {
        let a = action("A");
        let a_id = a.id();

        let not = logic(builtin::boolean_not());
        let not_id = not.id;
        let (node, leftover) =
            CardTreeNode::unary(not).unwrap().attached(not_id, CardTreeNode::action(a));
        assert!(leftover.is_none());

        assert!(node.is_satisfied(&SatisfiedSet::new()).unwrap());
        assert!(!node.is_satisfied(&satisfied_with(&[a_id])).unwrap());
    }

    #[test]
    fn test_and_truth_table() {
        let a = action("A");
        let b = action("B");
        let (a_id, b_id) = (a.id(), b.id());

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, CardTreeNode::action(a));
        let (node, _) = node.attached(and_id, CardTreeNode::action(b));

        assert!(!node.is_satisfied(&SatisfiedSet::new()).unwrap());
        assert!(!node.is_satisfied(&satisfied_with(&[a_id])).unwrap());
        assert!(!node.is_satisfied(&satisfied_with(&[b_id])).unwrap());
        assert!(node.is_satisfied(&satisfied_with(&[a_id, b_id])).unwrap());
    }

    #[test]
    fn test_or_truth_table() {
        let a = action("A");
        let b = action("B");
        let (a_id, b_id) = (a.id(), b.id());

        let or = logic(builtin::boolean_or());
        let or_id = or.id;
        let (node, _) = CardTreeNode::binary(or).unwrap().attached(or_id, CardTreeNode::action(a));
        let (node, _) = node.attached(or_id, CardTreeNode::action(b));

        assert!(!node.is_satisfied(&SatisfiedSet::new()).unwrap());
        assert!(node.is_satisfied(&satisfied_with(&[a_id])).unwrap());
        assert!(node.is_satisfied(&satisfied_with(&[b_id])).unwrap());
        assert!(node.is_satisfied(&satisfied_with(&[a_id, b_id])).unwrap());
    }

    #[test]
    fn test_half_filled_binary_counts_missing_side_as_true() {
        let a = action("A");
        let a_id = a.id();

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, CardTreeNode::action(a));

        // AND with one filled slot behaves like that slot alone.
        assert!(!node.is_satisfied(&SatisfiedSet::new()).unwrap());
        assert!(node.is_satisfied(&satisfied_with(&[a_id])).unwrap());

        let b = action("B");
        let or = logic(builtin::boolean_or());
        let or_id = or.id;
        let (node, _) = CardTreeNode::binary(or).unwrap().attached(or_id, CardTreeNode::action(b));

        // OR with an empty slot is already satisfied.
        assert!(node.is_satisfied(&SatisfiedSet::new()).unwrap());
    }

    #[test]
    fn test_empty_binary_is_vacuously_true() {
        let node = CardTreeNode::binary(logic(builtin::boolean_and())).unwrap();
        assert!(node.is_satisfied(&SatisfiedSet::new()).unwrap());
    }

    #[test]
    fn test_mismatched_operation_errors_at_evaluation() {
        // Decoded data can carry shapes the constructors would refuse.
        let and = logic(builtin::boolean_and());
        let node = CardTreeNode::Unary {
            card: and.clone(),
            child: None,
        };

        let err = node.is_satisfied(&SatisfiedSet::new()).unwrap_err();
        assert_eq!(
            err,
            TreeError::OperationMismatch {
                card: and.id,
                operation: LogicOperation::BooleanAnd,
                variant: "unary",
            }
        );
    }

    #[test]
    fn test_nested_evaluation() {
        // AND(OR(A, B), NOT(C))
        let (a, b, c) = (action("A"), action("B"), action("C"));
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());

        let or = logic(builtin::boolean_or());
        let or_id = or.id;
        let (or_node, _) = CardTreeNode::binary(or).unwrap().attached(or_id, CardTreeNode::action(a));
        let (or_node, _) = or_node.attached(or_id, CardTreeNode::action(b));

        let not = logic(builtin::boolean_not());
        let not_id = not.id;
        let (not_node, _) = CardTreeNode::unary(not).unwrap().attached(not_id, CardTreeNode::action(c));

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, or_node);
        let (node, _) = node.attached(and_id, not_node);

        assert!(!node.is_satisfied(&SatisfiedSet::new()).unwrap());
        assert!(node.is_satisfied(&satisfied_with(&[a_id])).unwrap());
        assert!(node.is_satisfied(&satisfied_with(&[b_id])).unwrap());
        assert!(!node.is_satisfied(&satisfied_with(&[a_id, c_id])).unwrap());
        assert!(!node.is_satisfied(&satisfied_with(&[c_id])).unwrap());
    }

    #[test]
    fn test_attach_fills_left_then_right() {
        let a = action("A");
        let b = action("B");
        let (a_id, b_id) = (a.id(), b.id());

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, CardTreeNode::action(a));
        let (node, _) = node.attached(and_id, CardTreeNode::action(b));

        let children = node.children_of(and_id).unwrap();
        assert_eq!(children.as_slice(), &[a_id, b_id]);
    }

    #[test]
    fn test_attach_to_full_node_returns_leftover() {
        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, CardTreeNode::action(action("A")));
        let (node, _) = node.attached(and_id, CardTreeNode::action(action("B")));

        let before = node.clone();
        let extra = CardTreeNode::action(action("C"));
        let (after, leftover) = node.attached(and_id, extra.clone());

        assert_eq!(after, before);
        assert_eq!(leftover, Some(extra));
    }

    #[test]
    fn test_attach_to_absent_target_returns_leftover() {
        let leaf = CardTreeNode::action(action("A"));
        let extra = CardTreeNode::action(action("B"));
        let (after, leftover) = leaf.attached(CardInstanceId::new(), extra.clone());

        assert_eq!(after, leaf);
        assert_eq!(leftover, Some(extra));
    }

    #[test]
    fn test_without_action_leaves_empty_slot() {
        let a = action("A");
        let b = action("B");
        let a_id = a.id();

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, CardTreeNode::action(a));
        let (node, _) = node.attached(and_id, CardTreeNode::action(b));

        let pruned = node.without_action(a_id).unwrap();
        assert!(!pruned.contains(a_id));
        let children = pruned.children_of(and_id).unwrap();
        assert_eq!(children.len(), 1);
    }

    #[test]
    fn test_without_action_root_leaf_empties_tree() {
        let a = action("A");
        let id = a.id();
        let leaf = CardTreeNode::action(a);
        assert!(leaf.without_action(id).is_none());
    }

    #[test]
    fn test_without_logic_returns_orphans() {
        let a = action("A");
        let b = action("B");
        let (a_id, b_id) = (a.id(), b.id());

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, CardTreeNode::action(a));
        let (node, _) = node.attached(and_id, CardTreeNode::action(b));

        let (remaining, orphans) = node.without_logic(and_id);
        assert!(remaining.is_none());
        assert_eq!(orphans.len(), 2);
        assert_eq!(orphans[0].card_id(), a_id);
        assert_eq!(orphans[1].card_id(), b_id);
    }

    #[test]
    fn test_without_nested_logic_keeps_outer_shape() {
        // AND(NOT(A), B); excising NOT orphans A and leaves AND(_, B).
        let a = action("A");
        let b = action("B");
        let (a_id, b_id) = (a.id(), b.id());

        let not = logic(builtin::boolean_not());
        let not_id = not.id;
        let (not_node, _) = CardTreeNode::unary(not).unwrap().attached(not_id, CardTreeNode::action(a));

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, not_node);
        let (node, _) = node.attached(and_id, CardTreeNode::action(b));

        let (remaining, orphans) = node.without_logic(not_id);
        let remaining = remaining.unwrap();

        assert_eq!(orphans.len(), 1);
        assert_eq!(orphans[0].card_id(), a_id);
        assert!(!remaining.contains(not_id));
        assert!(!remaining.contains(a_id));
        assert!(remaining.contains(b_id));
        assert_eq!(remaining.children_of(and_id).unwrap().as_slice(), &[b_id]);
    }

    #[test]
    fn test_extracted_moves_whole_subtree() {
        // AND(OR(A, B), C); extracting OR keeps AND(_, C).
        let (a, b, c) = (action("A"), action("B"), action("C"));
        let (a_id, b_id, c_id) = (a.id(), b.id(), c.id());

        let or = logic(builtin::boolean_or());
        let or_id = or.id;
        let (or_node, _) = CardTreeNode::binary(or).unwrap().attached(or_id, CardTreeNode::action(a));
        let (or_node, _) = or_node.attached(or_id, CardTreeNode::action(b));

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, or_node);
        let (node, _) = node.attached(and_id, CardTreeNode::action(c));

        let (remaining, subtree) = node.extracted(or_id);
        let remaining = remaining.unwrap();
        let subtree = subtree.unwrap();

        assert_eq!(subtree.card_id(), or_id);
        assert!(subtree.contains(a_id));
        assert!(subtree.contains(b_id));
        assert!(!remaining.contains(or_id));
        assert!(remaining.contains(c_id));
        assert_eq!(remaining.children_of(and_id).unwrap().as_slice(), &[c_id]);
    }

    #[test]
    fn test_extracted_root_empties_tree() {
        let leaf = CardTreeNode::action(action("A"));
        let id = leaf.card_id();
        let (remaining, subtree) = leaf.extracted(id);
        assert!(remaining.is_none());
        assert_eq!(subtree, Some(leaf));
    }

    #[test]
    fn test_card_collections() {
        let a = action("A");
        let b = action("B");

        let and = logic(builtin::boolean_and());
        let and_id = and.id;
        let (node, _) = CardTreeNode::binary(and).unwrap().attached(and_id, CardTreeNode::action(a));
        let (node, _) = node.attached(and_id, CardTreeNode::action(b));

        assert_eq!(node.action_cards().len(), 2);
        assert_eq!(node.logic_cards().len(), 1);
        assert_eq!(node.card_count(), 3);
        assert_eq!(node.card_ids().len(), 3);
        assert_eq!(node.card_ids()[0], and_id);
    }

    #[test]
    fn test_serialization() {
        let a = action("A");
        let not = logic(builtin::boolean_not());
        let not_id = not.id;
        let (node, _) = CardTreeNode::unary(not).unwrap().attached(not_id, CardTreeNode::action(a));

        let json = serde_json::to_string(&node).unwrap();
        let back: CardTreeNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }
}
