//! Hands.
//!
//! A hand is the unit of concurrent execution: a set of action cards, the
//! hand cards that shape them, and a forest of card trees giving the set
//! its boolean structure. Every member action card and every member logic
//! card sits in exactly one tree; Branch, Repeat, and End-Rule cards are
//! members beside the forest, never nodes in it.
//!
//! ## Silent structural no-ops
//!
//! Attaching into a full slot, attaching a card above itself, or removing
//! a card that is not here leave the hand unchanged rather than failing.
//! Callers that need confirmation check membership and occupancy first;
//! the cases are `debug!`-logged.
//!
//! ## Example
//!
//! ```
//! use deckflow::cards::{builtin, ActionCardDescriptor};
//! use deckflow::core::CardIdentifier;
//! use deckflow::hand::Hand;
//!
//! let ping = ActionCardDescriptor::new(
//!     CardIdentifier::new("Action/Net", "Ping"),
//!     "ping a host",
//! )
//! .instantiate();
//!
//! let mut hand = Hand::new();
//! hand.add_action(ping);
//! hand.add_hand_card(builtin::end_when_all_satisfied().instantiate());
//! assert_eq!(hand.card_count(), 2);
//! ```

pub mod combine;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cards::{
    builtin, ActionCard, BranchHandCard, EndRule, HandCard, LogicHandCard,
};
use crate::core::{CardIdentifier, CardInstanceId, CardTreeId, HandId, SatisfiedSet};
use crate::tree::{CardTree, TreeError};

pub use combine::BinaryLogic;

/// Errors from evaluating a hand's satisfaction.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SatisfactionError {
    /// The hand holds trees but no end-rule card says how to judge them.
    #[error("hand {hand} has no end rule; cannot evaluate satisfaction")]
    IndeterminateEndRule {
        /// The hand missing its end rule.
        hand: HandId,
    },

    /// A tree refused evaluation.
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Outcome of evaluating a hand against a set of completed actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionResult {
    /// Whether the hand's end rule is met.
    pub satisfied: bool,
    /// The first satisfied tree, when the hand is satisfied and has trees.
    pub winning_tree: Option<CardTreeId>,
    /// Branch target supplied by the winning tree's branch card, or by a
    /// hand-wide branch card. `None` means sequential flow.
    pub target: Option<HandId>,
}

/// A set of cards executing concurrently, judged by an end rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    id: HandId,
    action_cards: Vec<ActionCard>,
    hand_cards: Vec<HandCard>,
    trees: Vec<CardTree>,
    subhands: Vec<Hand>,
}

impl Hand {
    /// An empty hand with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Hand {
            id: HandId::new(),
            action_cards: Vec::new(),
            hand_cards: Vec::new(),
            trees: Vec::new(),
            subhands: Vec::new(),
        }
    }

    /// The hand's id.
    #[must_use]
    pub fn id(&self) -> HandId {
        self.id
    }

    // ---------------------------------------------------------------- adds

    /// Add an action card as its own singleton tree.
    ///
    /// Idempotent: re-adding a card already here is a no-op.
    pub fn add_action(&mut self, card: ActionCard) {
        if self.contains(card.id()) {
            return;
        }
        self.trees.push(CardTree::singleton_action(card.clone()));
        self.action_cards.push(card);
    }

    /// Add several action cards.
    pub fn add_actions(&mut self, cards: impl IntoIterator<Item = ActionCard>) {
        for card in cards {
            self.add_action(card);
        }
    }

    /// Add a hand card.
    ///
    /// Idempotent by instance id. A logic card becomes its own empty
    /// singleton tree. End-Rule and Repeat are at-most-one roles: adding
    /// one replaces any card already filling that role. Branch cards
    /// accumulate (see [`Hand::add_branch`] for scoped replacement).
    pub fn add_hand_card(&mut self, card: impl Into<HandCard>) {
        let card = card.into();
        if self.contains(card.id()) {
            return;
        }
        match card {
            HandCard::Logic(logic) => match CardTree::singleton_logic(logic.clone()) {
                Ok(tree) => {
                    self.trees.push(tree);
                    self.hand_cards.push(HandCard::Logic(logic));
                }
                Err(_) => {
                    debug!(card = %logic.id, "logic card without a boolean operation ignored");
                }
            },
            HandCard::EndRule(_) | HandCard::Repeat(_) => self.replace_role(card),
            HandCard::Branch(_) => self.hand_cards.push(card),
        }
    }

    /// Add several hand cards.
    pub fn add_hand_cards(&mut self, cards: impl IntoIterator<Item = HandCard>) {
        for card in cards {
            self.add_hand_card(card);
        }
    }

    fn replace_role(&mut self, card: HandCard) {
        self.hand_cards.retain(|existing| {
            !matches!(
                (existing, &card),
                (HandCard::EndRule(_), HandCard::EndRule(_))
                    | (HandCard::Repeat(_), HandCard::Repeat(_))
            )
        });
        self.hand_cards.push(card);
    }

    // ------------------------------------------------------------- attach

    /// Add `card` if missing, then move it (with its subtree, if any)
    /// under the logic card `to`.
    ///
    /// The tree containing `to` absorbs the moved subtree. A singleton
    /// source tree is retired; a deeper source keeps an empty slot. With
    /// no free slot at `to`, or `to` missing from the forest, membership
    /// still happens but the forest is unchanged.
    pub fn attach_action(&mut self, card: ActionCard, to: CardInstanceId) {
        let card_id = card.id();
        self.add_action(card);
        self.attach_member(card_id, to);
    }

    /// Add `card` if missing, then move it (with its subtree, if any)
    /// under the logic card `to`. Same policy as [`Hand::attach_action`].
    pub fn attach_logic(&mut self, card: LogicHandCard, to: CardInstanceId) {
        let card_id = card.id;
        self.add_hand_card(HandCard::Logic(card));
        self.attach_member(card_id, to);
    }

    fn attach_member(&mut self, card: CardInstanceId, to: CardInstanceId) {
        let Some(source) = self.trees.iter().position(|tree| tree.contains(card)) else {
            debug!(%card, "attach source is not in the forest; hand unchanged");
            return;
        };
        let Some(target) = self.trees.iter().position(|tree| tree.contains(to)) else {
            debug!(%to, "attach target is not in the forest; hand unchanged");
            return;
        };

        if source == target {
            let (remaining, subtree) = self.trees[source].extracted(card);
            let Some(subtree) = subtree else {
                return;
            };
            if subtree.contains(to) {
                debug!(%card, %to, "attach would nest a card inside its own subtree; hand unchanged");
                return;
            }
            let (rebuilt, leftover) = remaining.attached(to, subtree);
            if leftover.is_some() {
                debug!(%card, %to, "attach target has no free slot; hand unchanged");
                return;
            }
            self.trees[source] = rebuilt;
        } else {
            let (remaining, subtree) = self.trees[source].extracted(card);
            let Some(subtree) = subtree else {
                return;
            };
            let (rebuilt, leftover) = self.trees[target].attached(to, subtree);
            if leftover.is_some() {
                debug!(%card, %to, "attach target has no free slot; hand unchanged");
                return;
            }
            self.trees[target] = rebuilt;
            if remaining.is_empty() {
                // Singleton source: its id is retired with it.
                self.trees.remove(source);
            } else {
                self.trees[source] = remaining;
            }
        }
    }

    // ------------------------------------------------------ detach/remove

    /// Pull a card out of its tree, keeping its membership.
    ///
    /// The card becomes its own fresh singleton tree. Detaching a logic
    /// card promotes each former child to a freshly-identified tree.
    /// Detaching a card that is already standalone, or one that never
    /// sits in trees (Branch/Repeat/End-Rule), is a no-op.
    pub fn detach(&mut self, id: CardInstanceId) {
        let Some(index) = self.trees.iter().position(|tree| tree.contains(id)) else {
            return;
        };
        if self.trees[index].card_count() == 1 {
            return;
        }

        if let Some(card) = self.action_card(id).cloned() {
            let pruned = self.trees[index].without_action(id);
            self.trees[index] = pruned;
            self.trees.push(CardTree::singleton_action(card));
        } else if let Some(card) = self.logic_card(id).cloned() {
            let (remaining, orphans) = self.trees[index].without_logic(id);
            self.trees[index] = remaining;
            self.trees.extend(orphans);
            if let Ok(tree) = CardTree::singleton_logic(card) {
                self.trees.push(tree);
            }
        }
    }

    /// Remove a card from the hand entirely.
    ///
    /// Detach semantics without the fresh singleton: the membership entry
    /// is dropped, and orphans of a removed logic card are still promoted.
    /// Removing a non-member is a no-op.
    pub fn remove(&mut self, id: CardInstanceId) {
        if let Some(position) = self.action_cards.iter().position(|card| card.id() == id) {
            self.action_cards.remove(position);
            if let Some(index) = self.trees.iter().position(|tree| tree.contains(id)) {
                let pruned = self.trees[index].without_action(id);
                self.trees[index] = pruned;
            }
            return;
        }
        let Some(position) = self.hand_cards.iter().position(|card| card.id() == id) else {
            debug!(card = %id, "remove of a card not in the hand; no-op");
            return;
        };
        let card = self.hand_cards.remove(position);
        if matches!(card, HandCard::Logic(_)) {
            if let Some(index) = self.trees.iter().position(|tree| tree.contains(id)) {
                let (remaining, orphans) = self.trees[index].without_logic(id);
                self.trees[index] = remaining;
                self.trees.extend(orphans);
            }
        }
    }

    // ------------------------------------------------------------ queries

    /// Whether a card is a member of this hand.
    #[must_use]
    pub fn contains(&self, id: CardInstanceId) -> bool {
        self.action_cards.iter().any(|card| card.id() == id)
            || self.hand_cards.iter().any(|card| card.id() == id)
    }

    /// Look up a member action card.
    #[must_use]
    pub fn action_card(&self, id: CardInstanceId) -> Option<&ActionCard> {
        self.action_cards.iter().find(|card| card.id() == id)
    }

    /// Look up a member hand card.
    #[must_use]
    pub fn hand_card(&self, id: CardInstanceId) -> Option<&HandCard> {
        self.hand_cards.iter().find(|card| card.id() == id)
    }

    fn logic_card(&self, id: CardInstanceId) -> Option<&LogicHandCard> {
        self.hand_cards
            .iter()
            .find(|card| card.id() == id)
            .and_then(HandCard::as_logic)
    }

    /// All member cards minted from a descriptor identity.
    #[must_use]
    pub fn cards_matching(&self, identifier: &CardIdentifier) -> Vec<CardInstanceId> {
        self.action_cards
            .iter()
            .filter(|card| card.identifier() == identifier)
            .map(ActionCard::id)
            .chain(
                self.hand_cards
                    .iter()
                    .filter(|card| card.identifier() == identifier)
                    .map(HandCard::id),
            )
            .collect()
    }

    /// The filled tree children of a card, left-then-right. Empty for
    /// leaves and for cards not in the forest.
    #[must_use]
    pub fn children(&self, of: CardInstanceId) -> Vec<CardInstanceId> {
        self.trees
            .iter()
            .find_map(|tree| tree.children_of(of))
            .map_or_else(Vec::new, |children| children.into_vec())
    }

    /// Look up a tree by id.
    #[must_use]
    pub fn tree(&self, id: CardTreeId) -> Option<&CardTree> {
        self.trees.iter().find(|tree| tree.id() == id)
    }

    /// The tree holding a card.
    #[must_use]
    pub fn tree_containing(&self, card: CardInstanceId) -> Option<&CardTree> {
        self.trees.iter().find(|tree| tree.contains(card))
    }

    /// The forest, in insertion order.
    #[must_use]
    pub fn trees(&self) -> &[CardTree] {
        &self.trees
    }

    /// Member action cards, in insertion order.
    #[must_use]
    pub fn action_cards(&self) -> &[ActionCard] {
        &self.action_cards
    }

    /// Member hand cards, in insertion order.
    #[must_use]
    pub fn hand_cards(&self) -> &[HandCard] {
        &self.hand_cards
    }

    /// Number of member cards, action and hand together.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.action_cards.len() + self.hand_cards.len()
    }

    // -------------------------------------------------------- projections

    /// The end rule in force, or `Indeterminate` when no card sets one.
    #[must_use]
    pub fn end_rule(&self) -> EndRule {
        self.hand_cards
            .iter()
            .find_map(HandCard::as_end_rule)
            .map_or(EndRule::Indeterminate, |card| card.rule)
    }

    /// Extra executions requested by a Repeat card, 0 without one.
    #[must_use]
    pub fn repeat_count(&self) -> u32 {
        self.hand_cards
            .iter()
            .find_map(HandCard::as_repeat)
            .map_or(0, |card| card.count)
    }

    /// Total executions this hand asks for.
    #[must_use]
    pub fn execution_count(&self) -> u32 {
        1 + self.repeat_count()
    }

    /// Member branch cards, in insertion order.
    #[must_use]
    pub fn branch_cards(&self) -> Vec<&BranchHandCard> {
        self.hand_cards.iter().filter_map(HandCard::as_branch).collect()
    }

    // ----------------------------------------------------------- branches

    /// Branch the whole hand to `target` when satisfied.
    ///
    /// Mints a builtin Branch card, or retargets the existing hand-wide
    /// one (last write wins, instance id kept). A deep copy of `target`
    /// is recorded as a subhand.
    pub fn add_branch(&mut self, target: &Hand) {
        self.add_branch_scoped(None, target);
    }

    /// Branch to `target` when the given tree is the satisfied one.
    pub fn add_branch_for_tree(&mut self, tree: CardTreeId, target: &Hand) {
        self.add_branch_scoped(Some(tree), target);
    }

    fn add_branch_scoped(&mut self, scope: Option<CardTreeId>, target: &Hand) {
        let existing = self.hand_cards.iter_mut().find_map(|card| match card {
            HandCard::Branch(branch) if branch.card_tree == scope => Some(branch),
            _ => None,
        });
        match existing {
            Some(branch) => branch.target = Some(target.id()),
            None => {
                let branch = BranchHandCard {
                    id: CardInstanceId::new(),
                    identifier: builtin::branch().identifier,
                    card_tree: scope,
                    target: Some(target.id()),
                };
                self.hand_cards.push(HandCard::Branch(branch));
            }
        }
        match self.subhands.iter_mut().find(|hand| hand.id() == target.id()) {
            Some(stale) => *stale = target.clone(),
            None => self.subhands.push(target.clone()),
        }
    }

    /// Recorded branch-target hands, in recording order.
    #[must_use]
    pub fn subhands(&self) -> &[Hand] {
        &self.subhands
    }

    /// Transitive closure of subhands.
    ///
    /// Branch graphs may be cyclic; each hand id is visited once.
    #[must_use]
    pub fn nested_subhands(&self) -> Vec<Hand> {
        let mut seen = rustc_hash::FxHashSet::default();
        seen.insert(self.id);
        let mut out = Vec::new();
        self.collect_subhands(&mut seen, &mut out);
        out
    }

    fn collect_subhands(&self, seen: &mut rustc_hash::FxHashSet<HandId>, out: &mut Vec<Hand>) {
        for sub in &self.subhands {
            if seen.insert(sub.id()) {
                out.push(sub.clone());
                sub.collect_subhands(seen, out);
            }
        }
    }

    // ------------------------------------------------------- satisfaction

    /// Judge the forest against a set of completed actions.
    ///
    /// A hand with zero trees is vacuously satisfied with no target.
    /// Otherwise the end rule governs: all trees, or any tree. When
    /// satisfied, the branch target comes from a branch card scoped to
    /// the first satisfied tree, falling back to the hand-wide branch
    /// card, falling back to sequential flow.
    pub fn satisfaction_result(
        &self,
        satisfied: &SatisfiedSet,
    ) -> Result<SatisfactionResult, SatisfactionError> {
        if self.trees.is_empty() {
            return Ok(SatisfactionResult {
                satisfied: true,
                winning_tree: None,
                target: None,
            });
        }

        let mut states = Vec::with_capacity(self.trees.len());
        for tree in &self.trees {
            states.push(tree.is_satisfied(satisfied)?);
        }

        let done = match self.end_rule() {
            EndRule::EndWhenAllSatisfied => states.iter().all(|state| *state),
            EndRule::EndWhenAnySatisfied => states.iter().any(|state| *state),
            EndRule::Indeterminate => {
                return Err(SatisfactionError::IndeterminateEndRule { hand: self.id })
            }
        };
        if !done {
            return Ok(SatisfactionResult {
                satisfied: false,
                winning_tree: None,
                target: None,
            });
        }

        // A branch card scoped to a satisfied tree picks the winner.
        for (tree, state) in self.trees.iter().zip(&states) {
            if !*state {
                continue;
            }
            let scoped = self
                .branch_cards()
                .into_iter()
                .find(|branch| branch.card_tree == Some(tree.id()));
            if let Some(branch) = scoped {
                return Ok(SatisfactionResult {
                    satisfied: true,
                    winning_tree: Some(tree.id()),
                    target: branch.target,
                });
            }
        }

        let target = self
            .branch_cards()
            .into_iter()
            .find(|branch| branch.card_tree.is_none())
            .and_then(|branch| branch.target);
        let winning_tree = self
            .trees
            .iter()
            .zip(&states)
            .find(|(_, state)| **state)
            .map(|(tree, _)| tree.id());
        Ok(SatisfactionResult {
            satisfied: true,
            winning_tree,
            target,
        })
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new()
    }
}
