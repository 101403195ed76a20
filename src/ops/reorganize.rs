use std::collections::{HashMap, HashSet};

use crate::model::Node;

/// Regroup every child directly after its list.
///
/// Root items keep their relative order, and so do the children of each
/// list. A child whose list is not in the sequence is kept in place as if it
/// were a root item. Running it twice gives the same result as running it once.
pub fn reorganize(sequence: &[Node]) -> Vec<Node> {
    let lists: HashSet<&str> = sequence
        .iter()
        .filter(|n| n.is_list())
        .map(|n| n.id.as_str())
        .collect();

    let mut children: HashMap<&str, Vec<&Node>> = HashMap::new();
    let mut top_level: Vec<&Node> = Vec::with_capacity(sequence.len());
    for node in sequence {
        match node.parent_id() {
            Some(pid) if lists.contains(pid) && !node.is_list() => {
                children.entry(pid).or_default().push(node)
            }
            _ => top_level.push(node),
        }
    }

    let mut out = Vec::with_capacity(sequence.len());
    for node in top_level {
        out.push(node.clone());
        if node.is_list()
            && let Some(kids) = children.remove(node.id.as_str())
        {
            out.extend(kids.into_iter().cloned());
        }
    }
    out
}
