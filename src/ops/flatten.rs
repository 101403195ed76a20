use std::collections::HashSet;

use crate::model::{Board, Node};

/// Flatten the board into the visible sequence used for hit-testing.
///
/// Root items appear in board order; a list is followed by its children only
/// when its id is in `expanded`. Collapsed lists keep their children on the
/// board, they are just not part of this sequence.
pub fn flatten(board: &Board, expanded: &HashSet<String>) -> Vec<Node> {
    let mut items = Vec::with_capacity(board.len());
    flatten_inner(board, expanded, false, &mut items);
    items
}

/// Flatten every node, including children of collapsed lists.
pub fn flatten_all(board: &Board, expanded: &HashSet<String>) -> Vec<Node> {
    let mut items = Vec::with_capacity(board.len());
    flatten_inner(board, expanded, true, &mut items);
    items
}

fn flatten_inner(
    board: &Board,
    expanded: &HashSet<String>,
    include_hidden: bool,
    items: &mut Vec<Node>,
) {
    for root in board.roots() {
        let mut node = root.clone();
        node.is_expanded = node.is_list() && expanded.contains(&node.id);
        let show_children = node.is_list() && (node.is_expanded || include_hidden);
        items.push(node);

        if show_children {
            items.extend(board.children(&root.id).cloned());
        }
    }
}

/// Re-insert children that the board holds but `sequence` does not show.
///
/// Hidden children are placed right after the visible block of their list,
/// in board order, so an order batch built from the result covers them too.
/// Lists absent from `sequence` contribute nothing.
pub fn restore_hidden(sequence: &[Node], board: &Board) -> Vec<Node> {
    let present: HashSet<&str> = sequence.iter().map(|n| n.id.as_str()).collect();
    let mut flushed: HashSet<&str> = HashSet::new();
    let mut out = Vec::with_capacity(board.len().max(sequence.len()));

    for (i, node) in sequence.iter().enumerate() {
        out.push(node.clone());

        let owner = if node.is_list() {
            Some(node.id.as_str())
        } else {
            node.parent_id()
        };
        let Some(owner) = owner else {
            continue;
        };
        let block_continues = sequence
            .get(i + 1)
            .is_some_and(|next| next.is_child_of(owner));
        if block_continues || !present.contains(owner) || !flushed.insert(owner) {
            continue;
        }
        out.extend(
            board
                .children(owner)
                .filter(|c| !present.contains(c.id.as_str()))
                .cloned(),
        );
    }
    out
}
