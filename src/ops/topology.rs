//! Read-only queries over a flattened sequence.
//!
//! None of these assume the sequence is well formed: they are called on
//! intermediate sequences where a child may sit away from its list.

use crate::model::Node;

/// Index of `id` in the sequence
pub fn index_of(sequence: &[Node], id: &str) -> Option<usize> {
    sequence.iter().position(|n| n.id == id)
}

/// The list that could adopt the node at its current position.
///
/// Scans backward from the node: the first list reached is the answer, and
/// a child task reached first answers with its own list. A root task in
/// between is a boundary, as is the start of the sequence.
pub fn nearest_parent_list<'a>(sequence: &'a [Node], id: &str) -> Option<&'a Node> {
    let idx = index_of(sequence, id)?;
    let prev = sequence.get(idx.checked_sub(1)?)?;
    if prev.is_list() {
        return Some(prev);
    }
    let pid = prev.parent_id()?;
    sequence.iter().find(|n| n.id == pid && n.is_list())
}

/// True if the node has a parent and no sibling follows it in the sequence.
pub fn is_last_child(sequence: &[Node], id: &str) -> bool {
    let Some(idx) = index_of(sequence, id) else {
        return false;
    };
    let Some(pid) = sequence[idx].parent_id() else {
        return false;
    };
    !sequence[idx + 1..].iter().any(|n| n.is_child_of(pid))
}

/// Index of the final child of `list_id`, `None` if the sequence shows no
/// children for it.
pub fn last_child_index(sequence: &[Node], list_id: &str) -> Option<usize> {
    sequence.iter().rposition(|n| n.is_child_of(list_id))
}
