//! Card trees.
//!
//! A [`CardTree`] pairs a stable [`CardTreeId`] with an optional root
//! [`CardTreeNode`]. The id survives every structural edit, so hands can
//! track trees across attach/detach/remove churn; a tree whose root has
//! been emptied out persists and counts as satisfied.

pub mod node;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cards::{ActionCard, LogicHandCard};
use crate::core::{CardInstanceId, CardTreeId, SatisfiedSet};

pub use node::{CardTreeNode, TreeError};

/// An identified boolean tree of cards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardTree {
    id: CardTreeId,
    root: Option<CardTreeNode>,
}

impl CardTree {
    /// A tree holding a single action leaf.
    #[must_use]
    pub fn singleton_action(card: ActionCard) -> Self {
        Self::from_root(CardTreeNode::action(card))
    }

    /// A tree holding a single, childless logic node.
    pub fn singleton_logic(card: LogicHandCard) -> Result<Self, TreeError> {
        Ok(Self::from_root(CardTreeNode::for_logic(card)?))
    }

    /// Wrap an existing node under a fresh tree id.
    #[must_use]
    pub fn from_root(root: CardTreeNode) -> Self {
        CardTree {
            id: CardTreeId::new(),
            root: Some(root),
        }
    }

    /// The tree's id.
    #[must_use]
    pub fn id(&self) -> CardTreeId {
        self.id
    }

    /// The root node, if any card remains.
    #[must_use]
    pub fn root(&self) -> Option<&CardTreeNode> {
        self.root.as_ref()
    }

    /// Whether every card has been removed from the tree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Whether the tree is satisfied against a set of completed actions.
    ///
    /// An emptied tree constrains nothing and is satisfied.
    pub fn is_satisfied(&self, satisfied: &SatisfiedSet) -> Result<bool, TreeError> {
        match &self.root {
            None => Ok(true),
            Some(root) => root.is_satisfied(satisfied),
        }
    }

    /// Whether the tree contains a card.
    #[must_use]
    pub fn contains(&self, id: CardInstanceId) -> bool {
        self.root.as_ref().is_some_and(|root| root.contains(id))
    }

    /// All action cards, depth-first.
    #[must_use]
    pub fn action_cards(&self) -> Vec<&ActionCard> {
        self.root.as_ref().map_or_else(Vec::new, |root| root.action_cards())
    }

    /// All logic cards, depth-first.
    #[must_use]
    pub fn logic_cards(&self) -> Vec<&LogicHandCard> {
        self.root.as_ref().map_or_else(Vec::new, |root| root.logic_cards())
    }

    /// All card ids, depth-first.
    #[must_use]
    pub fn card_ids(&self) -> Vec<CardInstanceId> {
        self.root.as_ref().map_or_else(Vec::new, |root| root.card_ids())
    }

    /// The filled children of a card, or `None` if it is not here.
    #[must_use]
    pub fn children_of(&self, id: CardInstanceId) -> Option<SmallVec<[CardInstanceId; 2]>> {
        self.root.as_ref().and_then(|root| root.children_of(id))
    }

    /// Number of cards in the tree.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.card_count())
    }

    /// Rebuild with `node` attached under the logic card `to`, keeping this
    /// tree's id. Returns the node back if no slot accepted it.
    #[must_use]
    pub fn attached(
        &self,
        to: CardInstanceId,
        node: CardTreeNode,
    ) -> (CardTree, Option<CardTreeNode>) {
        match &self.root {
            None => (self.clone(), Some(node)),
            Some(root) => {
                let (rebuilt, leftover) = root.attached(to, node);
                (
                    CardTree {
                        id: self.id,
                        root: Some(rebuilt),
                    },
                    leftover,
                )
            }
        }
    }

    /// Rebuild without an action card, keeping this tree's id.
    #[must_use]
    pub fn without_action(&self, id: CardInstanceId) -> CardTree {
        CardTree {
            id: self.id,
            root: self.root.as_ref().and_then(|root| root.without_action(id)),
        }
    }

    /// Rebuild without a logic card, keeping this tree's id. The excised
    /// node's children come back as freshly-identified trees.
    #[must_use]
    pub fn without_logic(&self, id: CardInstanceId) -> (CardTree, Vec<CardTree>) {
        match &self.root {
            None => (self.clone(), Vec::new()),
            Some(root) => {
                let (remaining, orphans) = root.without_logic(id);
                (
                    CardTree {
                        id: self.id,
                        root: remaining,
                    },
                    orphans.into_iter().map(CardTree::from_root).collect(),
                )
            }
        }
    }

    /// Remove and return the whole subtree rooted at a card, keeping this
    /// tree's id for the remainder.
    #[must_use]
    pub fn extracted(&self, id: CardInstanceId) -> (CardTree, Option<CardTreeNode>) {
        match &self.root {
            None => (self.clone(), None),
            Some(root) => {
                let (remaining, subtree) = root.extracted(id);
                (
                    CardTree {
                        id: self.id,
                        root: remaining,
                    },
                    subtree,
                )
            }
        }
    }
}
