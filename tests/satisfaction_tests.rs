//! Satisfaction and hand-composition scenarios.
//!
//! These tests drive the model layer the way deck-authoring code would:
//! growing trees inside hands, judging them against completed actions,
//! and composing hands into decks with branches.

use deckflow::cards::{builtin, ActionCard, ActionCardDescriptor, HandCard, LogicHandCard};
use deckflow::core::{CardIdentifier, CardInstanceId, SatisfiedSet};
use deckflow::deck::DeckBuilder;
use deckflow::hand::{Hand, SatisfactionError};

fn action(name: &str) -> ActionCard {
    ActionCardDescriptor::new(CardIdentifier::new("Action/Test", name), "test action")
        .instantiate()
}

fn logic(descriptor: deckflow::HandCardDescriptor) -> LogicHandCard {
    match descriptor.instantiate() {
        HandCard::Logic(card) => card,
        other => panic!("expected logic card, got {other:?}"),
    }
}

fn satisfied_with(ids: &[CardInstanceId]) -> SatisfiedSet {
    ids.iter().copied().collect()
}

fn satisfied(hand: &Hand, ids: &[CardInstanceId]) -> bool {
    hand.satisfaction_result(&satisfied_with(ids))
        .unwrap()
        .satisfied
}

/// Grow AND(OR(photo, video), NOT(abort)) through hand edits, then walk
/// the satisfaction states a mission would pass through.
#[test]
fn test_survey_mission_progression() {
    let photo = action("TakePhoto");
    let video = action("RecordVideo");
    let abort = action("SignalAbort");
    let (photo_id, video_id, abort_id) = (photo.id(), video.id(), abort.id());

    let or = logic(builtin::boolean_or());
    let and = logic(builtin::boolean_and());
    let not = logic(builtin::boolean_not());

    // Slots fill left to right: the OR takes the AND's first slot, the
    // NOT its second.
    let mut hand = Hand::new();
    hand.add_hand_card(HandCard::Logic(and.clone()));
    hand.attach_logic(or.clone(), and.id);
    hand.attach_action(photo, or.id);
    hand.attach_action(video, or.id);
    hand.attach_logic(not.clone(), and.id);
    hand.attach_action(abort, not.id);
    hand.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    assert_eq!(hand.trees().len(), 1);
    assert_eq!(hand.trees()[0].card_count(), 6);

    // Nothing captured yet: the OR side is still unsatisfied.
    assert!(!satisfied(&hand, &[]));
    // Either capture alone satisfies, as long as no abort landed.
    assert!(satisfied(&hand, &[photo_id]));
    assert!(satisfied(&hand, &[video_id]));
    // An abort flips the NOT and unsatisfies the whole tree.
    assert!(!satisfied(&hand, &[photo_id, abort_id]));
    assert!(!satisfied(&hand, &[photo_id, video_id, abort_id]));
}

/// A branch scoped to the satisfied tree names the winner; the
/// hand-wide branch is only a fallback.
#[test]
fn test_scoped_branch_beats_hand_wide() {
    let high_road = action("FlyHigh");
    let low_road = action("FlyLow");
    let (high_id, low_id) = (high_road.id(), low_road.id());

    let mut hand = Hand::new();
    hand.add_action(high_road);
    hand.add_action(low_road);
    hand.add_hand_card(builtin::end_when_any_satisfied().instantiate());

    let high_tree = hand.tree_containing(high_id).unwrap().id();
    let low_tree = hand.tree_containing(low_id).unwrap().id();

    let glide_home = Hand::new();
    let spiral_home = Hand::new();
    hand.add_branch_for_tree(low_tree, &spiral_home);
    hand.add_branch(&glide_home);

    // The low road satisfied: its scoped branch wins.
    let result = hand
        .satisfaction_result(&satisfied_with(&[low_id]))
        .unwrap();
    assert!(result.satisfied);
    assert_eq!(result.winning_tree, Some(low_tree));
    assert_eq!(result.target, Some(spiral_home.id()));

    // The high road satisfied: no scoped branch for it, so the
    // hand-wide branch supplies the target.
    let result = hand
        .satisfaction_result(&satisfied_with(&[high_id]))
        .unwrap();
    assert!(result.satisfied);
    assert_eq!(result.winning_tree, Some(high_tree));
    assert_eq!(result.target, Some(glide_home.id()));
}

/// Attach, detach, and remove keep every member action in exactly one
/// tree, and children reflect the current shape.
#[test]
fn test_hand_editing_keeps_membership_consistent() {
    let a = action("A");
    let b = action("B");
    let (a_id, b_id) = (a.id(), b.id());
    let and = logic(builtin::boolean_and());

    let mut hand = Hand::new();
    hand.add_hand_card(HandCard::Logic(and.clone()));
    hand.attach_action(a, and.id);
    hand.attach_action(b, and.id);

    assert_eq!(hand.trees().len(), 1);
    let children = hand.children(and.id);
    assert!(children.contains(&a_id) && children.contains(&b_id));

    // Detach keeps membership but splits the forest.
    hand.detach(b_id);
    assert_eq!(hand.trees().len(), 2);
    assert!(hand.contains(b_id));
    assert_eq!(hand.children(and.id), vec![a_id]);

    // Remove drops membership entirely.
    hand.remove(b_id);
    assert!(!hand.contains(b_id));
    assert_eq!(hand.trees().len(), 1);

    // Removing the logic card promotes its remaining child.
    hand.remove(and.id);
    assert!(hand.contains(a_id));
    assert_eq!(hand.trees().len(), 1);
    assert!(hand.tree_containing(a_id).is_some());
}

/// The end rule decides how the forest is judged; swapping the rule
/// card re-judges the same forest.
#[test]
fn test_end_rule_swap_changes_judgement() {
    let a = action("A");
    let b = action("B");
    let a_id = a.id();

    let mut hand = Hand::new();
    hand.add_action(a);
    hand.add_action(b);
    hand.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    assert!(!satisfied(&hand, &[a_id]));

    hand.add_hand_card(builtin::end_when_any_satisfied().instantiate());
    assert!(satisfied(&hand, &[a_id]));
}

/// Judging a non-empty forest without an end rule is an error, not a
/// guess; an empty forest needs no rule at all.
#[test]
fn test_judgement_requires_an_end_rule() {
    let mut hand = Hand::new();
    hand.add_action(action("A"));
    let hand_id = hand.id();

    match hand.satisfaction_result(&SatisfiedSet::new()) {
        Err(SatisfactionError::IndeterminateEndRule { hand }) => assert_eq!(hand, hand_id),
        other => panic!("expected IndeterminateEndRule, got {other:?}"),
    }

    let empty = Hand::new();
    let result = empty.satisfaction_result(&SatisfiedSet::new()).unwrap();
    assert!(result.satisfied);
    assert_eq!(result.winning_tree, None);
    assert_eq!(result.target, None);
}

/// Authoring flow: merge two fragments, then gate the union behind a
/// third requirement with `&`.
#[test]
fn test_merge_then_combine_pipeline() {
    let scan = action("Scan");
    let log = action("Log");
    let upload = action("Upload");
    let (scan_id, log_id, upload_id) = (scan.id(), log.id(), upload.id());

    let mut sensing = Hand::new();
    sensing.add_action(scan);
    sensing.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    let mut recording = Hand::new();
    recording.add_action(log);
    recording.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    // Union first: two singleton trees under ALL.
    let mission = sensing + recording;
    assert_eq!(mission.trees().len(), 2);
    assert!(!satisfied(&mission, &[scan_id]));
    assert!(satisfied(&mission, &[scan_id, log_id]));

    let mut delivery = Hand::new();
    delivery.add_action(upload);
    delivery.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    // Gate the union behind the delivery step.
    let gated = mission & delivery;
    assert_eq!(gated.trees().len(), 1);
    assert!(!satisfied(&gated, &[scan_id, log_id]));
    assert!(satisfied(&gated, &[scan_id, log_id, upload_id]));
}

/// A deck's execution sequence interleaves each top-level hand with its
/// transitive branch targets, deduplicated on first occurrence.
#[test]
fn test_deck_sequences_nested_branch_targets() {
    let mut landing = Hand::new();
    landing.add_action(action("Land"));
    landing.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    let mut descent = Hand::new();
    descent.add_action(action("Descend"));
    descent.add_hand_card(builtin::end_when_all_satisfied().instantiate());
    descent.add_branch(&landing);

    let mut cruise = Hand::new();
    cruise.add_action(action("Cruise"));
    cruise.add_hand_card(builtin::end_when_all_satisfied().instantiate());
    cruise.add_branch(&descent);

    let mut checklist = Hand::new();
    checklist.add_action(action("Checklist"));
    checklist.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    let deck = DeckBuilder::new().hand(cruise.clone()).hand(checklist.clone()).build();
    let sequence: Vec<_> = deck.all_hands().iter().map(Hand::id).collect();
    assert_eq!(
        sequence,
        vec![cruise.id(), descent.id(), landing.id(), checklist.id()]
    );

    // A hand reachable twice appears once, at its first position.
    let mut twice = Hand::new();
    twice.add_branch(&landing);
    let deck = DeckBuilder::new().hand(twice.clone()).hand(cruise.clone()).build();
    let sequence: Vec<_> = deck.all_hands().iter().map(Hand::id).collect();
    assert_eq!(
        sequence,
        vec![twice.id(), landing.id(), cruise.id(), descent.id()]
    );
}

/// Emptying a tree leaves a vacuously satisfied slot in the forest
/// rather than deleting the tree.
#[test]
fn test_emptied_tree_satisfies_vacuously() {
    let a = action("A");
    let b = action("B");
    let (a_id, b_id) = (a.id(), b.id());

    let mut hand = Hand::new();
    hand.add_action(a);
    hand.add_action(b);
    hand.add_hand_card(builtin::end_when_all_satisfied().instantiate());

    let emptied = hand.tree_containing(a_id).unwrap().id();
    hand.remove(a_id);

    // The emptied tree keeps its id and judges true.
    assert_eq!(hand.trees().len(), 2);
    assert!(hand.tree(emptied).is_some());
    assert!(satisfied(&hand, &[b_id]));
    assert!(!satisfied(&hand, &[]));
}
