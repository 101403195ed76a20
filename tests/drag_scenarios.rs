//! End-to-end drag scenarios through the public library API: a board is
//! flattened, a drag is applied, and the result is submitted to an
//! in-memory order store.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use tasktree::io::order_store::MemoryOrderStore;
use tasktree::model::{Board, Node};
use tasktree::ops::drag::{DragEvent, DropOutcome, apply_drag};
use tasktree::ops::flatten::{flatten, restore_hidden};
use tasktree::ops::gesture::{DEFAULT_THRESHOLD, Zone};
use tasktree::ops::reorganize::reorganize;
use tasktree::ops::resolve::{DragError, RuleKind};
use tasktree::ops::submit::Submitter;

fn ids(seq: &[Node]) -> Vec<&str> {
    seq.iter().map(|n| n.id.as_str()).collect()
}

fn parent_of<'a>(seq: &'a [Node], id: &str) -> Option<&'a str> {
    seq.iter().find(|n| n.id == id).and_then(|n| n.parent.as_deref())
}

fn expanded(list_ids: &[&str]) -> HashSet<String> {
    list_ids.iter().map(|s| s.to_string()).collect()
}

fn drag(seq: &[Node], active: &str, over: Option<&str>, dx: f64) -> DropOutcome {
    let event = DragEvent {
        active_id: active.to_string(),
        over_id: over.map(str::to_string),
        delta_x: dx,
    };
    apply_drag(seq, &event, DEFAULT_THRESHOLD)
}

/// No list has a parent, every parent is a list present in the sequence,
/// and every child sits in the contiguous block right after its list.
fn assert_well_formed(seq: &[Node]) {
    let mut current_list: Option<&str> = None;
    for node in seq {
        match node.parent.as_deref() {
            None => {
                current_list = node.is_list().then_some(node.id.as_str());
            }
            Some(parent) => {
                assert!(node.is_task(), "list {} has a parent", node.id);
                assert!(
                    seq.iter().any(|n| n.id == parent && n.is_list()),
                    "{} points at non-list {}",
                    node.id,
                    parent
                );
                assert_eq!(
                    current_list,
                    Some(parent),
                    "{} is detached from its list in {:?}",
                    node.id,
                    ids(seq)
                );
            }
        }
    }
}

fn fixture_board() -> Board {
    Board::from_nodes(vec![
        Node::list("A", "inbox"),
        Node::task("A1", "a1").with_parent("A"),
        Node::task("A2", "a2").with_parent("A"),
        Node::task("R1", "r1"),
        Node::list("B", "later"),
        Node::task("B1", "b1").with_parent("B"),
        Node::task("R2", "r2"),
        Node::list("C", "empty"),
    ])
    .unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn every_drop_yields_a_well_formed_permutation() {
    let board = fixture_board();
    for open in [&["A", "B", "C"][..], &["A"][..], &[][..]] {
        let seq = flatten(&board, &expanded(open));
        let mut before: Vec<&str> = ids(&seq);
        before.sort_unstable();

        for active in &seq {
            let overs = std::iter::once(None).chain(seq.iter().map(|n| Some(n.id.as_str())));
            for over in overs {
                for dx in [-80.0, -50.0, 0.0, 49.9, 50.0, 80.0] {
                    let outcome = drag(&seq, &active.id, over, dx);
                    let result = outcome.sequence();

                    let mut after = ids(result);
                    after.sort_unstable();
                    assert_eq!(before, after);
                    assert_well_formed(result);
                    assert_eq!(reorganize(result), result.to_vec());

                    let full = reorganize(&restore_hidden(result, &board));
                    assert_eq!(full.len(), board.len());
                    assert_well_formed(&full);
                }
            }
        }
    }
}

#[test]
fn reorganize_is_idempotent_on_scrambled_input() {
    let scrambled = vec![
        Node::task("A2", "a2").with_parent("A"),
        Node::task("R1", "r1"),
        Node::task("B1", "b1").with_parent("B"),
        Node::list("A", "a"),
        Node::list("B", "b"),
        Node::task("A1", "a1").with_parent("A"),
    ];
    let once = reorganize(&scrambled);
    assert_eq!(ids(&once), vec!["R1", "A", "A2", "A1", "B", "B1"]);
    assert_eq!(reorganize(&once), once);
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn outdent_last_child_in_place() {
    let board = Board::from_nodes(vec![
        Node::list("A", "a"),
        Node::task("T1", "t1").with_parent("A"),
        Node::task("T2", "t2").with_parent("A"),
    ])
    .unwrap();
    let seq = flatten(&board, &expanded(&["A"]));

    let outcome = drag(&seq, "T2", None, -50.0);
    let DropOutcome::Moved { sequence, rule, reparented } = outcome else {
        panic!("expected a move, got {:?}", outcome);
    };
    assert_eq!(rule, RuleKind::OutdentLastChildInPlace);
    assert!(reparented);
    assert_eq!(ids(&sequence), vec!["A", "T1", "T2"]);
    assert_eq!(parent_of(&sequence, "T2"), None);
    assert_eq!(parent_of(&sequence, "T1"), Some("A"));
}

#[test]
fn indent_root_task_into_expanded_list() {
    let board = Board::from_nodes(vec![
        Node::list("A", "a"),
        Node::task("T1", "t1").with_parent("A"),
        Node::task("T2", "t2"),
    ])
    .unwrap();
    let seq = flatten(&board, &expanded(&["A"]));

    let onto_child = drag(&seq, "T2", Some("T1"), 60.0);
    assert_eq!(ids(onto_child.sequence()), vec!["A", "T2", "T1"]);
    assert_eq!(parent_of(onto_child.sequence(), "T2"), Some("A"));

    let in_place = drag(&seq, "T2", None, 60.0);
    let DropOutcome::Moved { sequence, rule, .. } = in_place else {
        panic!("expected a move, got {:?}", in_place);
    };
    assert_eq!(rule, RuleKind::IndentUnderChildInPlace);
    assert_eq!(ids(&sequence), vec!["A", "T1", "T2"]);
    assert_eq!(parent_of(&sequence, "T2"), Some("A"));
}

#[test]
fn indent_blocked_by_collapsed_list() {
    let board = Board::from_nodes(vec![
        Node::task("T2", "t2"),
        Node::list("A", "a"),
        Node::task("T1", "t1").with_parent("A"),
    ])
    .unwrap();
    let seq = flatten(&board, &expanded(&[]));
    assert_eq!(ids(&seq), vec!["T2", "A"]);

    let outcome = drag(&seq, "T2", Some("A"), 60.0);
    let DropOutcome::Moved { sequence, rule, reparented } = outcome else {
        panic!("expected a move, got {:?}", outcome);
    };
    assert_eq!(rule, RuleKind::SlotIntoCollapsedList);
    assert!(!reparented);
    assert_eq!(ids(&sequence), vec!["A", "T2"]);
    assert_eq!(parent_of(&sequence, "T2"), None);

    let full = reorganize(&restore_hidden(&sequence, &board));
    assert_eq!(ids(&full), vec!["A", "T1", "T2"]);
    assert_eq!(parent_of(&full, "T1"), Some("A"));
}

#[test]
fn drop_onto_collapsed_list_from_below_moves_above_it() {
    // T2 starts below the collapsed list; the remove-then-insert move puts
    // it in A's slot, above A, and no rule fires past a linear reorder.
    let board = Board::from_nodes(vec![
        Node::list("A", "a"),
        Node::task("T1", "t1").with_parent("A"),
        Node::task("T2", "t2"),
    ])
    .unwrap();
    let seq = flatten(&board, &expanded(&[]));
    assert_eq!(ids(&seq), vec!["A", "T2"]);

    let outcome = drag(&seq, "T2", Some("A"), 60.0);
    let DropOutcome::Moved { sequence, rule, reparented } = outcome else {
        panic!("expected a move, got {:?}", outcome);
    };
    assert_eq!(rule, RuleKind::LinearOnly);
    assert!(!reparented);
    assert_eq!(ids(&sequence), vec!["T2", "A"]);
    assert_eq!(parent_of(&sequence, "T2"), None);

    let full = reorganize(&restore_hidden(&sequence, &board));
    assert_eq!(ids(&full), vec!["T2", "A", "T1"]);
    assert_eq!(parent_of(&full, "T1"), Some("A"));
}

#[test]
fn dragged_list_keeps_its_children() {
    let board = fixture_board();
    let seq = flatten(&board, &expanded(&["A", "B"]));

    let outcome = drag(&seq, "A", Some("R2"), 0.0);
    let result = outcome.sequence();
    assert_eq!(ids(result), vec!["R1", "B", "B1", "R2", "A", "A1", "A2", "C"]);
    assert!(result.iter().find(|n| n.id == "A").unwrap().is_expanded);
}

// ---------------------------------------------------------------------------
// Gesture thresholds
// ---------------------------------------------------------------------------

#[test]
fn threshold_bounds_are_inclusive() {
    assert_eq!(Zone::classify_with(30.0, 30.0), Zone::Right);
    assert_eq!(Zone::classify_with(29.9, 30.0), Zone::Default);
    assert_eq!(Zone::classify_with(-30.0, 30.0), Zone::Left);
    assert_eq!(Zone::classify_with(-29.9, 30.0), Zone::Default);
}

#[test]
fn custom_threshold_changes_the_outcome() {
    let board = Board::from_nodes(vec![
        Node::list("A", "a"),
        Node::task("T1", "t1").with_parent("A"),
        Node::task("T2", "t2"),
    ])
    .unwrap();
    let seq = flatten(&board, &expanded(&["A"]));
    let event = DragEvent {
        active_id: "T2".into(),
        over_id: None,
        delta_x: 30.0,
    };

    assert!(matches!(
        apply_drag(&seq, &event, DEFAULT_THRESHOLD),
        DropOutcome::Unchanged { .. }
    ));
    assert!(matches!(
        apply_drag(&seq, &event, 30.0),
        DropOutcome::Moved { .. }
    ));
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rejected_drop_never_reaches_the_store() {
    let board = Board::from_nodes(vec![
        Node::list("L1", "one"),
        Node::task("C", "c").with_parent("L1"),
        Node::list("L2", "two"),
    ])
    .unwrap();
    let seq = flatten(&board, &expanded(&["L1"]));
    let submitter = Submitter::new(MemoryOrderStore::new(), "org");

    let outcome = drag(&seq, "L2", Some("C"), 60.0);
    let DropOutcome::Rejected { sequence, error } = &outcome else {
        panic!("expected a rejection, got {:?}", outcome);
    };
    assert_eq!(
        error,
        &DragError::NestedList {
            list_id: "L2".into()
        }
    );
    assert_eq!(error.to_string(), "Lists cannot be nested within other lists.");
    assert_eq!(sequence, &reorganize(&seq));

    if outcome.needs_submit() {
        submitter.submit(outcome.sequence(), None).await.unwrap();
    }
    assert!(submitter.store().batches().is_empty());
}

#[tokio::test]
async fn submitted_batch_is_dense_and_complete() {
    let board = fixture_board();
    let seq = flatten(&board, &expanded(&["B"]));
    let submitter = Submitter::new(MemoryOrderStore::new(), "org-1");

    let outcome = drag(&seq, "R2", Some("B1"), 60.0);
    assert!(outcome.needs_submit());
    let full = reorganize(&restore_hidden(outcome.sequence(), &board));
    let message = submitter.submit(&full, None).await.unwrap();
    assert_eq!(message, "Tasks updated!");

    let batch = submitter.store().last_batch().unwrap();
    assert_eq!(batch.len(), board.len());
    let orders: Vec<&str> = batch.iter().map(|o| o.order.as_str()).collect();
    assert_eq!(orders, vec!["1", "2", "3", "4", "5", "6", "7", "8"]);
    assert!(batch.iter().all(|o| o.organization_id == "org-1"));

    let r2 = batch.iter().find(|o| o.task_id == "R2").unwrap();
    assert_eq!(r2.parent_id.as_deref(), Some("B"));
    let a2 = batch.iter().find(|o| o.task_id == "A2").unwrap();
    assert_eq!(a2.parent_id.as_deref(), Some("A"));
    assert!(!submitter.is_updating_task_order());
}
