use std::collections::HashMap;

use indexmap::IndexMap;

use super::node::{Node, NodeKind};
use super::order::TaskOrder;

/// Error type for board construction and updates
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    #[error("duplicate node id: {0}")]
    DuplicateId(String),
    #[error("{child} refers to missing parent {parent}")]
    MissingParent { child: String, parent: String },
    #[error("list {child} cannot be nested inside {parent}")]
    NestedList { child: String, parent: String },
    #[error("{child} cannot be owned by task {parent}")]
    TaskParent { child: String, parent: String },
    #[error("node not found: {0}")]
    NotFound(String),
    #[error("invalid order {order:?} for {task_id}")]
    InvalidOrder { task_id: String, order: String },
}

/// The authoritative set of nodes, keyed by id, in persisted order.
///
/// Parents are plain ids resolved through the map, so a board can never hold
/// a reference cycle. Construction validates the single-level nesting rules.
#[derive(Debug, Clone, Default)]
pub struct Board {
    nodes: IndexMap<String, Node>,
}

impl Board {
    /// Build a board, rejecting the first structural problem found.
    pub fn from_nodes(nodes: Vec<Node>) -> Result<Self, BoardError> {
        if let Some(err) = validate(&nodes).into_iter().next() {
            return Err(err);
        }
        Ok(Self::from_valid(nodes))
    }

    /// Build from nodes already known to satisfy `validate`.
    pub(crate) fn from_valid(nodes: Vec<Node>) -> Self {
        let nodes = nodes
            .into_iter()
            .map(|mut n| {
                n.is_expanded = false;
                (n.id.clone(), n)
            })
            .collect();
        Board { nodes }
    }

    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in persisted order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Root-level items (lists and parentless tasks) in persisted order
    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(|n| n.is_root())
    }

    /// Children of a list, derived from the `parent` fields
    pub fn children<'a>(&'a self, list_id: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.nodes.values().filter(move |n| n.is_child_of(list_id))
    }

    pub fn into_nodes(self) -> Vec<Node> {
        self.nodes.into_values().collect()
    }

    /// Append a node at the end of the board (or at the end of its list).
    pub fn insert(&mut self, node: Node) -> Result<(), BoardError> {
        let mut nodes: Vec<Node> = self.nodes.values().cloned().collect();
        let at = match node.parent_id() {
            Some(pid) => nodes
                .iter()
                .rposition(|n| n.id == pid || n.is_child_of(pid))
                .map_or(nodes.len(), |i| i + 1),
            None => nodes.len(),
        };
        nodes.insert(at, node);
        *self = Board::from_nodes(nodes)?;
        Ok(())
    }

    /// Next free id of the form `PREFIX-NNN`.
    pub fn next_id(&self, prefix: &str) -> String {
        let prefix_dash = format!("{}-", prefix);
        let max = self
            .nodes
            .keys()
            .filter_map(|id| id.strip_prefix(&prefix_dash))
            .filter_map(|num| num.parse::<usize>().ok())
            .max()
            .unwrap_or(0);
        format!("{}-{:03}", prefix, max + 1)
    }

    /// Apply a persisted order batch: parents are replaced and nodes are
    /// re-sorted by their new position. Nodes missing from the batch keep
    /// their relative order after the batched ones. All-or-nothing.
    pub fn apply_orders(&mut self, batch: &[TaskOrder]) -> Result<(), BoardError> {
        let mut positions: HashMap<&str, (usize, Option<&str>)> = HashMap::new();
        for entry in batch {
            if !self.contains(&entry.task_id) {
                return Err(BoardError::NotFound(entry.task_id.clone()));
            }
            let pos = entry.position().ok_or_else(|| BoardError::InvalidOrder {
                task_id: entry.task_id.clone(),
                order: entry.order.clone(),
            })?;
            positions.insert(entry.task_id.as_str(), (pos, entry.parent_id.as_deref()));
        }

        let mut batched = Vec::with_capacity(positions.len());
        let mut rest = Vec::new();
        for node in self.nodes.values() {
            match positions.get(node.id.as_str()) {
                Some((pos, parent)) => {
                    let mut node = node.clone();
                    node.parent = parent.map(str::to_string);
                    batched.push((*pos, node));
                }
                None => rest.push(node.clone()),
            }
        }
        batched.sort_by_key(|(pos, _)| *pos);

        let mut nodes: Vec<Node> = batched.into_iter().map(|(_, n)| n).collect();
        nodes.extend(rest);
        *self = Board::from_nodes(nodes)?;
        Ok(())
    }
}

/// Every structural problem in a node set, in node order.
pub fn validate(nodes: &[Node]) -> Vec<BoardError> {
    let mut errors = Vec::new();
    let mut kinds: HashMap<&str, NodeKind> = HashMap::new();
    for node in nodes {
        if kinds.insert(&node.id, node.kind).is_some() {
            errors.push(BoardError::DuplicateId(node.id.clone()));
        }
    }

    for node in nodes {
        let Some(parent) = node.parent_id() else {
            continue;
        };
        let err = match (node.kind, kinds.get(parent)) {
            (_, None) => BoardError::MissingParent {
                child: node.id.clone(),
                parent: parent.to_string(),
            },
            (NodeKind::List, Some(_)) => BoardError::NestedList {
                child: node.id.clone(),
                parent: parent.to_string(),
            },
            (NodeKind::Task, Some(NodeKind::Task)) => BoardError::TaskParent {
                child: node.id.clone(),
                parent: parent.to_string(),
            },
            (NodeKind::Task, Some(NodeKind::List)) => continue,
        };
        errors.push(err);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Board {
        Board::from_nodes(vec![
            Node::list("L-001", "Groceries"),
            Node::task("T-001", "Milk").with_parent("L-001"),
            Node::task("T-002", "Bread").with_parent("L-001"),
            Node::task("T-003", "Call mom"),
        ])
        .unwrap()
    }

    fn order(id: &str, parent: Option<&str>, pos: usize) -> TaskOrder {
        TaskOrder {
            task_id: id.into(),
            parent_id: parent.map(str::to_string),
            order: pos.to_string(),
            organization_id: "org".into(),
        }
    }

    #[test]
    fn children_are_derived_from_parent_ids() {
        let board = sample();
        let kids: Vec<&str> = board.children("L-001").map(|n| n.id.as_str()).collect();
        assert_eq!(kids, vec!["T-001", "T-002"]);
        let roots: Vec<&str> = board.roots().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["L-001", "T-003"]);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Board::from_nodes(vec![Node::task("T-001", "a"), Node::task("T-001", "b")])
            .unwrap_err();
        assert_eq!(err, BoardError::DuplicateId("T-001".into()));
    }

    #[test]
    fn rejects_list_inside_list() {
        let err = Board::from_nodes(vec![
            Node::list("L-001", "outer"),
            Node::list("L-002", "inner").with_parent("L-001"),
        ])
        .unwrap_err();
        assert!(matches!(err, BoardError::NestedList { .. }));
    }

    #[test]
    fn rejects_task_owned_by_task() {
        let err = Board::from_nodes(vec![
            Node::task("T-001", "a"),
            Node::task("T-002", "b").with_parent("T-001"),
        ])
        .unwrap_err();
        assert!(matches!(err, BoardError::TaskParent { .. }));
    }

    #[test]
    fn validate_reports_every_problem() {
        let errors = validate(&[
            Node::task("T-001", "a").with_parent("L-404"),
            Node::task("T-001", "dup"),
        ]);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn insert_child_lands_after_its_siblings() {
        let mut board = sample();
        board
            .insert(Node::task("T-004", "Eggs").with_parent("L-001"))
            .unwrap();
        let ids: Vec<&str> = board.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["L-001", "T-001", "T-002", "T-004", "T-003"]);
    }

    #[test]
    fn next_id_skips_existing_numbers() {
        let board = sample();
        assert_eq!(board.next_id("T"), "T-004");
        assert_eq!(board.next_id("L"), "L-002");
        assert_eq!(Board::default().next_id("T"), "T-001");
    }

    #[test]
    fn apply_orders_reparents_and_resorts() {
        let mut board = sample();
        board
            .apply_orders(&[
                order("T-003", None, 1),
                order("L-001", None, 2),
                order("T-001", Some("L-001"), 3),
                order("T-002", None, 4),
            ])
            .unwrap();
        let ids: Vec<&str> = board.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["T-003", "L-001", "T-001", "T-002"]);
        assert!(board.get("T-002").unwrap().is_root());
    }

    #[test]
    fn apply_orders_keeps_unlisted_nodes_at_the_end() {
        let mut board = sample();
        board
            .apply_orders(&[order("T-003", None, 1), order("L-001", None, 2)])
            .unwrap();
        let ids: Vec<&str> = board.nodes().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["T-003", "L-001", "T-001", "T-002"]);
    }

    #[test]
    fn apply_orders_is_all_or_nothing() {
        let mut board = sample();
        let err = board
            .apply_orders(&[order("T-001", Some("T-003"), 1)])
            .unwrap_err();
        assert!(matches!(err, BoardError::TaskParent { .. }));
        assert!(board.get("T-001").unwrap().is_child_of("L-001"));

        let err = board.apply_orders(&[order("T-404", None, 1)]).unwrap_err();
        assert_eq!(err, BoardError::NotFound("T-404".into()));
    }
}
