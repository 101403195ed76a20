//! One drag from pointer-down to drop.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Node;
use crate::ops::gesture::{DEFAULT_THRESHOLD, Zone};
use crate::ops::reorganize::reorganize;
use crate::ops::resolve::{DragError, RuleKind, resolve};

/// A finished drag as reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragEvent {
    pub active_id: String,
    /// Node under the pointer at drop time, `None` when dropped outside
    pub over_id: Option<String>,
    /// Horizontal displacement from the drag origin
    pub delta_x: f64,
}

/// What a drop did to the sequence
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Order or hierarchy changed; `sequence` is reorganized and ready to
    /// render and submit.
    Moved {
        sequence: Vec<Node>,
        rule: RuleKind,
        reparented: bool,
    },
    /// The drop was refused; `sequence` is the reorganized pre-drag state.
    Rejected { sequence: Vec<Node>, error: DragError },
    /// Nothing to do
    Unchanged { sequence: Vec<Node> },
}

impl DropOutcome {
    pub fn sequence(&self) -> &[Node] {
        match self {
            DropOutcome::Moved { sequence, .. }
            | DropOutcome::Rejected { sequence, .. }
            | DropOutcome::Unchanged { sequence } => sequence,
        }
    }

    /// True when the result should be persisted
    pub fn needs_submit(&self) -> bool {
        matches!(self, DropOutcome::Moved { .. })
    }
}

/// State held between drag start and drop.
///
/// Starting a drag on a list marks it collapsed for the rest of the drag, so
/// it cannot be chosen as the adopting list of anything dropped around it.
#[derive(Debug, Clone)]
pub struct DragSession {
    active_id: String,
    original: Vec<Node>,
    working: Vec<Node>,
    threshold: f64,
    zone: Zone,
}

impl DragSession {
    pub fn start(sequence: &[Node], active_id: impl Into<String>) -> Self {
        Self::start_with(sequence, active_id, DEFAULT_THRESHOLD)
    }

    pub fn start_with(sequence: &[Node], active_id: impl Into<String>, threshold: f64) -> Self {
        let active_id = active_id.into();
        let mut working = sequence.to_vec();
        if let Some(node) = working.iter_mut().find(|n| n.id == active_id)
            && node.is_list()
        {
            node.is_expanded = false;
        }
        debug!(active = %active_id, "drag started");
        DragSession {
            active_id,
            original: sequence.to_vec(),
            working,
            threshold,
            zone: Zone::Default,
        }
    }

    pub fn active_id(&self) -> &str {
        &self.active_id
    }

    /// Sequence as shown while the drag is in progress
    pub fn sequence(&self) -> &[Node] {
        &self.working
    }

    /// Zone from the most recent move event
    pub fn zone(&self) -> Zone {
        self.zone
    }

    /// Record a move event; the last zone seen is the one used at drop.
    pub fn on_move(&mut self, delta_x: f64) -> Zone {
        self.zone = Zone::classify_with(delta_x, self.threshold);
        self.zone
    }

    /// Finish the drag over `over_id`. `None` (dropped outside any node) is
    /// treated like a drop onto the dragged node itself.
    pub fn finish(self, over_id: Option<&str>) -> DropOutcome {
        let over = over_id.unwrap_or(&self.active_id);
        match resolve(&self.working, &self.active_id, over, self.zone) {
            Ok(resolution) => match resolution.rule {
                Some(rule) => {
                    let mut sequence = reorganize(&resolution.sequence);
                    self.restore_expansion(&mut sequence);
                    DropOutcome::Moved {
                        sequence,
                        rule,
                        reparented: resolution.reparented,
                    }
                }
                None => DropOutcome::Unchanged {
                    sequence: self.original,
                },
            },
            Err(error) => DropOutcome::Rejected {
                sequence: reorganize(&self.original),
                error,
            },
        }
    }

    fn restore_expansion(&self, sequence: &mut [Node]) {
        let expanded = self
            .original
            .iter()
            .find(|n| n.id == self.active_id)
            .is_some_and(|n| n.is_expanded);
        if let Some(node) = sequence.iter_mut().find(|n| n.id == self.active_id) {
            node.is_expanded = expanded;
        }
    }
}

/// Run a whole drag from a single host event.
pub fn apply_drag(sequence: &[Node], event: &DragEvent, threshold: f64) -> DropOutcome {
    let mut session = DragSession::start_with(sequence, event.active_id.clone(), threshold);
    session.on_move(event.delta_x);
    session.finish(event.over_id.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expanded(mut node: Node) -> Node {
        node.is_expanded = true;
        node
    }

    fn ids(seq: &[Node]) -> Vec<&str> {
        seq.iter().map(|n| n.id.as_str()).collect()
    }

    fn seq() -> Vec<Node> {
        vec![
            expanded(Node::list("A", "a")),
            Node::task("A1", "a1").with_parent("A"),
            Node::task("R1", "r1"),
            expanded(Node::list("B", "b")),
            Node::task("B1", "b1").with_parent("B"),
        ]
    }

    #[test]
    fn dragging_a_list_collapses_it() {
        let session = DragSession::start(&seq(), "A");
        assert!(!session.sequence()[0].is_expanded);
        assert!(session.sequence()[3].is_expanded);

        let session = DragSession::start(&seq(), "R1");
        assert_eq!(session.sequence(), seq().as_slice());
    }

    #[test]
    fn last_move_event_wins() {
        let mut session = DragSession::start(&seq(), "R1");
        assert_eq!(session.on_move(-80.0), Zone::Left);
        assert_eq!(session.on_move(10.0), Zone::Default);
        assert_eq!(session.on_move(55.0), Zone::Right);
        assert_eq!(session.zone(), Zone::Right);
    }

    #[test]
    fn custom_threshold_applies_to_moves() {
        let mut session = DragSession::start_with(&seq(), "R1", 20.0);
        assert_eq!(session.on_move(25.0), Zone::Right);
    }

    #[test]
    fn dragged_list_keeps_children_and_expansion() {
        let mut session = DragSession::start(&seq(), "A");
        session.on_move(0.0);
        let outcome = session.finish(Some("B1"));
        assert!(outcome.needs_submit());
        assert_eq!(ids(outcome.sequence()), vec!["R1", "B", "B1", "A", "A1"]);
        let a = outcome.sequence().iter().find(|n| n.id == "A").unwrap();
        assert!(a.is_expanded);
        assert!(a.is_root());
    }

    #[test]
    fn rejected_drop_restores_pre_drag_sequence() {
        let start = vec![
            Node::list("L1", "one"),
            Node::task("R1", "r1"),
            Node::list("L2", "two"),
        ];
        let event = DragEvent {
            active_id: "L2".into(),
            over_id: Some("R1".into()),
            delta_x: 120.0,
        };
        let outcome = apply_drag(&start, &event, DEFAULT_THRESHOLD);
        assert!(!outcome.needs_submit());
        match outcome {
            DropOutcome::Rejected { sequence, error } => {
                assert_eq!(sequence, start);
                assert_eq!(error.to_string(), "Lists cannot be nested within other lists.");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn drop_outside_uses_in_place_rules() {
        let event = DragEvent {
            active_id: "A1".into(),
            over_id: None,
            delta_x: -60.0,
        };
        let outcome = apply_drag(&seq(), &event, DEFAULT_THRESHOLD);
        let a1 = outcome.sequence().iter().find(|n| n.id == "A1").unwrap();
        assert!(a1.is_root());
        assert!(outcome.needs_submit());
    }

    #[test]
    fn in_place_drop_without_gesture_is_unchanged() {
        let session = DragSession::start(&seq(), "R1");
        let outcome = session.finish(Some("R1"));
        assert_eq!(outcome, DropOutcome::Unchanged { sequence: seq() });
    }
}
