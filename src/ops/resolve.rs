//! Hierarchy resolution for a finished drag.
//!
//! A drop is first applied as a plain array move. The moved sequence is then
//! run through an ordered table of rules; the first rule whose predicate holds
//! decides whether the dragged node changes parent (or, for a few rules, where
//! exactly it lands). A drop onto the dragged node itself uses a smaller table
//! that only looks at the node's neighbours.

use serde::Serialize;
use tracing::{debug, warn};

use crate::model::Node;
use crate::ops::gesture::Zone;
use crate::ops::topology::{index_of, is_last_child, last_child_index, nearest_parent_list};

/// Error type for drop resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("Lists cannot be nested within other lists.")]
    NestedList { list_id: String },
}

/// Name of the rule that decided a drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Child dragged left between two children of another list
    OutdentBetweenForeignChildren,
    /// Child dragged above everything
    OutdentToTop,
    /// Child dropped among root items, or dragged left past a child or list
    OutdentAtBoundary,
    /// Task dropped inside a list's child block
    IndentMidList,
    /// Last child dragged left out of its list
    ExtractLastChild,
    /// Child dropped after a child of another list
    ReassociateAfterChild,
    /// Child dropped right after another list's header
    ReassociateAfterHeader,
    /// Child dragged left away from its list
    OutdentLeft,
    /// Root item dropped on a collapsed list
    SlotAfterCollapsedList,
    /// Root task dragged right onto a collapsed list
    SlotIntoCollapsedList,
    /// Root task dragged right onto an expanded list
    IndentIntoExpandedList,
    /// Root task dragged right in front of a list's child
    IndentBeforeChild,
    /// List normalized back to root level
    NormalizeRootList,
    /// List dragged right under another list
    RejectNestedList,
    /// Root task dragged right after a list's last child
    IndentAfterLastChild,
    /// Task dropped between two children of a list
    DropBetweenChildren,
    /// Root task dragged right after a list header or child
    IndentAfterList,
    /// Order changed, hierarchy did not
    LinearOnly,
    /// Last child dragged left without moving
    OutdentLastChildInPlace,
    /// Root task dragged right under the child above it
    IndentUnderChildInPlace,
    /// Root task dragged right under the list header above it
    IndentUnderHeaderInPlace,
}

/// What a matching rule does to the moved sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep the linear move only
    Keep,
    /// Parent becomes `None`
    Detach,
    /// Parent becomes the nearest list, if that list accepts children
    AdoptNearest,
    /// Move the node right after the nearest list's last child (or header)
    SlotAfterNearest { adopt: bool },
    /// Refuse the drop
    Reject,
}

/// One entry of a decision table
pub struct Rule {
    pub kind: RuleKind,
    pub action: Action,
    applies: fn(&DropContext<'_>) -> bool,
}

impl Rule {
    pub fn matches(&self, ctx: &DropContext<'_>) -> bool {
        (self.applies)(ctx)
    }
}

/// Rules for a drop onto another node, in priority order.
pub const REORDER_RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::OutdentBetweenForeignChildren,
        action: Action::AdoptNearest,
        applies: outdent_between_foreign_children,
    },
    Rule {
        kind: RuleKind::OutdentToTop,
        action: Action::Detach,
        applies: outdent_to_top,
    },
    Rule {
        kind: RuleKind::OutdentAtBoundary,
        action: Action::Detach,
        applies: outdent_at_boundary,
    },
    Rule {
        kind: RuleKind::IndentMidList,
        action: Action::AdoptNearest,
        applies: indent_mid_list,
    },
    Rule {
        kind: RuleKind::ExtractLastChild,
        action: Action::Detach,
        applies: extract_last_child,
    },
    Rule {
        kind: RuleKind::ReassociateAfterChild,
        action: Action::AdoptNearest,
        applies: reassociate_after_child,
    },
    Rule {
        kind: RuleKind::ReassociateAfterHeader,
        action: Action::AdoptNearest,
        applies: reassociate_after_header,
    },
    Rule {
        kind: RuleKind::OutdentLeft,
        action: Action::Detach,
        applies: outdent_left,
    },
    Rule {
        kind: RuleKind::SlotAfterCollapsedList,
        action: Action::SlotAfterNearest { adopt: false },
        applies: slot_after_collapsed_list,
    },
    Rule {
        kind: RuleKind::SlotIntoCollapsedList,
        action: Action::SlotAfterNearest { adopt: true },
        applies: slot_into_collapsed_list,
    },
    Rule {
        kind: RuleKind::IndentIntoExpandedList,
        action: Action::AdoptNearest,
        applies: indent_into_expanded_list,
    },
    Rule {
        kind: RuleKind::IndentBeforeChild,
        action: Action::AdoptNearest,
        applies: indent_before_child,
    },
    Rule {
        kind: RuleKind::NormalizeRootList,
        action: Action::Detach,
        applies: normalize_root_list,
    },
    Rule {
        kind: RuleKind::RejectNestedList,
        action: Action::Reject,
        applies: nested_list,
    },
    Rule {
        kind: RuleKind::IndentAfterLastChild,
        action: Action::AdoptNearest,
        applies: indent_after_last_child,
    },
    Rule {
        kind: RuleKind::DropBetweenChildren,
        action: Action::AdoptNearest,
        applies: drop_between_children,
    },
    Rule {
        kind: RuleKind::IndentAfterList,
        action: Action::AdoptNearest,
        applies: indent_after_list,
    },
    Rule {
        kind: RuleKind::LinearOnly,
        action: Action::Keep,
        applies: always,
    },
];

/// Rules for a drop onto the dragged node itself, in priority order.
/// When none matches, the drop changes nothing.
pub const IN_PLACE_RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::OutdentLastChildInPlace,
        action: Action::Detach,
        applies: outdent_last_child_in_place,
    },
    Rule {
        kind: RuleKind::IndentUnderChildInPlace,
        action: Action::AdoptNearest,
        applies: indent_under_child_in_place,
    },
    Rule {
        kind: RuleKind::IndentUnderHeaderInPlace,
        action: Action::AdoptNearest,
        applies: indent_under_header_in_place,
    },
];

/// Everything a rule may look at
#[derive(Debug, Clone, Copy)]
pub struct DropContext<'a> {
    pub sequence: &'a [Node],
    pub index: usize,
    pub active: &'a Node,
    pub prev: Option<&'a Node>,
    pub next: Option<&'a Node>,
    pub nearest: Option<&'a Node>,
    pub over_id: &'a str,
    pub zone: Zone,
}

impl<'a> DropContext<'a> {
    /// Context for the node at `index`. Panics if `index` is out of bounds.
    pub fn new(sequence: &'a [Node], index: usize, over_id: &'a str, zone: Zone) -> Self {
        let active = &sequence[index];
        DropContext {
            sequence,
            index,
            active,
            prev: index.checked_sub(1).and_then(|i| sequence.get(i)),
            next: sequence.get(index + 1),
            nearest: nearest_parent_list(sequence, &active.id),
            over_id,
            zone,
        }
    }

    fn active_parent(&self) -> Option<&'a str> {
        self.active.parent_id()
    }

    fn prev_parent(&self) -> Option<&'a str> {
        self.prev.and_then(Node::parent_id)
    }

    fn next_parent(&self) -> Option<&'a str> {
        self.next.and_then(Node::parent_id)
    }

    fn nearest_id(&self) -> Option<&'a str> {
        self.nearest.map(|n| n.id.as_str())
    }

    fn prev_is_list(&self) -> bool {
        self.prev.is_some_and(Node::is_list)
    }

    fn is_root_task(&self) -> bool {
        self.active.is_task() && self.active.is_root()
    }

    fn nearest_is_over(&self) -> bool {
        self.nearest_id() == Some(self.over_id)
    }
}

// ---------------------------------------------------------------------------
// Predicates (drop onto another node)
// ---------------------------------------------------------------------------

fn outdent_between_foreign_children(c: &DropContext<'_>) -> bool {
    let Some(parent) = c.active_parent() else {
        return false;
    };
    c.nearest_id() != Some(parent)
        && c.prev_parent().is_some()
        && c.prev_parent() == c.next_parent()
        && c.zone == Zone::Left
}

fn outdent_to_top(c: &DropContext<'_>) -> bool {
    c.active_parent().is_some() && c.nearest.is_none() && c.prev.is_none()
}

fn outdent_at_boundary(c: &DropContext<'_>) -> bool {
    if c.active_parent().is_none() {
        return false;
    }
    let between_root_items = c.prev.is_some_and(|p| p.is_task() && p.is_root())
        && c.next.is_none_or(Node::is_root);
    let left_past_child = c.prev_parent().is_some() && c.zone == Zone::Left;
    let left_past_list = c.prev_is_list() && c.zone == Zone::Left;
    between_root_items || left_past_child || left_past_list
}

fn indent_mid_list(c: &DropContext<'_>) -> bool {
    let Some(next_parent) = c.next_parent() else {
        return false;
    };
    c.nearest.is_some()
        && c.active.is_task()
        && (c.prev_parent() == Some(next_parent) || c.prev.is_some_and(|p| p.id == next_parent))
}

fn extract_last_child(c: &DropContext<'_>) -> bool {
    c.zone == Zone::Left
        && c.active_parent().is_some()
        && c.active.is_task()
        && (is_last_child(c.sequence, &c.active.id) || is_last_child(c.sequence, c.over_id))
}

fn reassociate_after_child(c: &DropContext<'_>) -> bool {
    let Some(parent) = c.active_parent() else {
        return false;
    };
    c.nearest_id() != Some(parent)
        && c.prev_parent().is_some()
        && c.prev_parent() == c.nearest_id()
        && matches!(c.zone, Zone::Default | Zone::Right)
}

fn reassociate_after_header(c: &DropContext<'_>) -> bool {
    let Some(parent) = c.active_parent() else {
        return false;
    };
    c.nearest_id() != Some(parent)
        && c.prev_is_list()
        && matches!(c.zone, Zone::Default | Zone::Right)
}

fn outdent_left(c: &DropContext<'_>) -> bool {
    let Some(parent) = c.active_parent() else {
        return false;
    };
    c.active.is_task() && c.nearest_id() != Some(parent) && c.zone == Zone::Left
}

fn slot_after_collapsed_list(c: &DropContext<'_>) -> bool {
    c.active.is_root()
        && c.nearest.is_some_and(|l| !l.is_expanded)
        && c.nearest_is_over()
        && c.zone == Zone::Default
}

fn slot_into_collapsed_list(c: &DropContext<'_>) -> bool {
    c.active.is_root()
        && !c.active.is_list()
        && c.nearest.is_some_and(|l| !l.is_expanded)
        && c.nearest_is_over()
        && c.zone == Zone::Right
}

fn indent_into_expanded_list(c: &DropContext<'_>) -> bool {
    c.active.is_root()
        && !c.active.is_list()
        && c.nearest.is_some_and(|l| l.is_expanded)
        && c.nearest_is_over()
        && c.zone == Zone::Right
}

fn indent_before_child(c: &DropContext<'_>) -> bool {
    c.nearest.is_some()
        && c.next_parent() == c.nearest_id()
        && c.active.is_task()
        && c.zone == Zone::Right
}

fn normalize_root_list(c: &DropContext<'_>) -> bool {
    let Some(parent) = c.active_parent() else {
        return false;
    };
    c.active.is_list()
        && c.nearest_id() == Some(parent)
        && c.prev.is_some_and(Node::is_root)
        && c.zone == Zone::Default
}

fn nested_list(c: &DropContext<'_>) -> bool {
    let under_child = c.prev_parent().is_some() && c.prev_parent() == c.nearest_id();
    c.active.is_list() && (under_child || c.prev_is_list()) && c.zone == Zone::Right
}

fn indent_after_last_child(c: &DropContext<'_>) -> bool {
    c.is_root_task()
        && c.prev_parent().is_some()
        && c.nearest_id() == c.prev_parent()
        && c.prev.is_some_and(Node::is_task)
        && c.zone == Zone::Right
}

fn drop_between_children(c: &DropContext<'_>) -> bool {
    c.active.is_task()
        && c.nearest.is_some()
        && c.prev_parent() == c.nearest_id()
        && c.next_parent() == c.nearest_id()
}

fn indent_after_list(c: &DropContext<'_>) -> bool {
    let (Some(list), Some(prev)) = (c.nearest, c.prev) else {
        return false;
    };
    c.is_root_task() && (prev.is_child_of(&list.id) || prev.id == list.id) && c.zone == Zone::Right
}

fn always(_: &DropContext<'_>) -> bool {
    true
}

// ---------------------------------------------------------------------------
// Predicates (drop in place)
// ---------------------------------------------------------------------------

fn outdent_last_child_in_place(c: &DropContext<'_>) -> bool {
    c.active_parent().is_some()
        && c.active.is_task()
        && c.zone == Zone::Left
        && is_last_child(c.sequence, &c.active.id)
}

fn indent_under_child_in_place(c: &DropContext<'_>) -> bool {
    c.is_root_task()
        && c.zone == Zone::Right
        && c.nearest.is_some()
        && c.prev_parent().is_some()
        && c.nearest_id() == c.prev_parent()
}

fn indent_under_header_in_place(c: &DropContext<'_>) -> bool {
    c.is_root_task() && c.prev_is_list() && c.zone == Zone::Right
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of resolving a drop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// New sequence; not yet reorganized
    pub sequence: Vec<Node>,
    /// Whether the dragged node's parent changed
    pub reparented: bool,
    /// Rule that decided the drop, `None` when nothing changed
    pub rule: Option<RuleKind>,
}

impl Resolution {
    fn unchanged(sequence: &[Node]) -> Self {
        Resolution {
            sequence: sequence.to_vec(),
            reparented: false,
            rule: None,
        }
    }

    /// True when the drop changed neither order nor hierarchy
    pub fn is_noop(&self) -> bool {
        self.rule.is_none()
    }
}

/// Resolve a drop of `dragged_id` onto `drop_target_id`.
///
/// Unknown ids resolve to a no-op. A list dragged right under another list is
/// rejected with [`DragError::NestedList`]; the caller keeps its pre-drag
/// sequence in that case.
pub fn resolve(
    sequence: &[Node],
    dragged_id: &str,
    drop_target_id: &str,
    zone: Zone,
) -> Result<Resolution, DragError> {
    let Some(old_index) = index_of(sequence, dragged_id) else {
        debug!(dragged = dragged_id, "dragged node not in sequence");
        return Ok(Resolution::unchanged(sequence));
    };

    if dragged_id == drop_target_id {
        let ctx = DropContext::new(sequence, old_index, drop_target_id, zone);
        return match select_rule(IN_PLACE_RULES, &ctx) {
            Some(rule) => apply(rule, &ctx),
            None => {
                debug!(dragged = dragged_id, %zone, "no sorting or hierarchy change");
                Ok(Resolution::unchanged(sequence))
            }
        };
    }

    let Some(new_index) = index_of(sequence, drop_target_id) else {
        debug!(over = drop_target_id, "drop target not in sequence");
        return Ok(Resolution::unchanged(sequence));
    };

    let mut moved = array_move(sequence, old_index, new_index);
    if sequence[old_index].is_list() {
        moved = move_children_after_parent(&moved, dragged_id);
    }
    let Some(index) = index_of(&moved, dragged_id) else {
        return Ok(Resolution::unchanged(sequence));
    };

    let ctx = DropContext::new(&moved, index, drop_target_id, zone);
    match select_rule(REORDER_RULES, &ctx) {
        Some(rule) => apply(rule, &ctx),
        None => Ok(Resolution {
            sequence: moved.clone(),
            reparented: false,
            rule: Some(RuleKind::LinearOnly),
        }),
    }
}

/// First rule of `rules` whose predicate holds.
pub fn select_rule<'r>(rules: &'r [Rule], ctx: &DropContext<'_>) -> Option<&'r Rule> {
    rules.iter().find(|rule| rule.matches(ctx))
}

fn apply(rule: &Rule, ctx: &DropContext<'_>) -> Result<Resolution, DragError> {
    debug!(
        rule = ?rule.kind,
        dragged = %ctx.active.id,
        over = ctx.over_id,
        zone = %ctx.zone,
        "hierarchy rule selected"
    );
    let old_parent = ctx.active.parent.clone();

    let (sequence, new_parent) = match rule.action {
        Action::Keep => (ctx.sequence.to_vec(), old_parent.clone()),
        Action::Detach => (ctx.sequence.to_vec(), None),
        Action::AdoptNearest => (ctx.sequence.to_vec(), adoptive_parent(ctx)),
        Action::SlotAfterNearest { adopt } => {
            let Some(list) = ctx.nearest else {
                return Ok(Resolution::unchanged(ctx.sequence));
            };
            let slotted = slot_after(ctx.sequence, ctx.index, &list.id);
            let parent = if adopt { adoptive_parent(ctx) } else { old_parent.clone() };
            (slotted, parent)
        }
        Action::Reject => {
            warn!(list = %ctx.active.id, "rejected nesting a list inside a list");
            return Err(DragError::NestedList {
                list_id: ctx.active.id.clone(),
            });
        }
    };

    let reparented = new_parent != old_parent;
    let sequence = set_parent(sequence, &ctx.active.id, new_parent);
    Ok(Resolution {
        sequence,
        reparented,
        rule: Some(rule.kind),
    })
}

/// Parent for an adoption: the nearest list, but only if it is expanded and
/// the dragged node is a task. Otherwise the node stays at root level.
fn adoptive_parent(ctx: &DropContext<'_>) -> Option<String> {
    if ctx.active.is_list() {
        return None;
    }
    ctx.nearest
        .filter(|list| list.is_expanded)
        .map(|list| list.id.clone())
}

fn set_parent(mut sequence: Vec<Node>, id: &str, parent: Option<String>) -> Vec<Node> {
    if let Some(node) = sequence.iter_mut().find(|n| n.id == id) {
        node.parent = parent;
    }
    sequence
}

/// Move the node at `index` right after the last child of `list_id`, or right
/// after the list itself when it shows no children.
fn slot_after(sequence: &[Node], index: usize, list_id: &str) -> Vec<Node> {
    let anchor = last_child_index(sequence, list_id).or_else(|| index_of(sequence, list_id));
    let Some(anchor) = anchor else {
        return sequence.to_vec();
    };
    let to = if index < anchor { anchor } else { anchor + 1 };
    array_move(sequence, index, to)
}

/// Remove the element at `from` and insert it at `to`.
pub fn array_move(sequence: &[Node], from: usize, to: usize) -> Vec<Node> {
    let mut out = sequence.to_vec();
    if from >= out.len() {
        return out;
    }
    let node = out.remove(from);
    out.insert(to.min(out.len()), node);
    out
}

/// Pull every child of `list_id` directly behind the list, keeping their order.
pub fn move_children_after_parent(sequence: &[Node], list_id: &str) -> Vec<Node> {
    let (children, mut rest): (Vec<Node>, Vec<Node>) =
        sequence.iter().cloned().partition(|n| n.is_child_of(list_id));
    if let Some(pos) = index_of(&rest, list_id) {
        rest.splice(pos + 1..pos + 1, children);
        rest
    } else {
        sequence.to_vec()
    }
}
