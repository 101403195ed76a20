use std::collections::HashSet;

use crate::model::{Board, Node, Priority, TaskStatus};

/// Client-side visibility filter, applied before flattening.
///
/// Every criterion is decided on root items. A list is judged by its
/// children: it stays while at least one child passes (or while it has no
/// children at all). Children of a surviving list are never filtered
/// individually, and children of a removed list go with it.
///
/// `exclude_priority` is applied even when `show_completed` is set, so
/// showing completed tasks never brings back an excluded priority.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub show_completed: bool,
    /// Keep only items with this custom status
    pub status_id: Option<String>,
    /// Drop items with this custom status
    pub exclude_status_id: Option<String>,
    pub exclude_priority: Option<Priority>,
}

impl TaskFilter {
    /// A filter that hides nothing
    pub fn show_all() -> Self {
        TaskFilter {
            show_completed: true,
            ..Default::default()
        }
    }

    pub fn is_noop(&self) -> bool {
        self.show_completed
            && self.status_id.is_none()
            && self.exclude_status_id.is_none()
            && self.exclude_priority.is_none()
    }

    /// Board restricted to the root items this filter keeps.
    pub fn apply(&self, board: &Board) -> Board {
        if self.is_noop() {
            return board.clone();
        }
        let kept: HashSet<&str> = board
            .roots()
            .filter(|root| self.keeps_root(board, root))
            .map(|root| root.id.as_str())
            .collect();

        let nodes = board
            .nodes()
            .filter(|n| match n.parent_id() {
                Some(pid) => kept.contains(pid),
                None => kept.contains(n.id.as_str()),
            })
            .cloned()
            .collect();
        Board::from_valid(nodes)
    }

    fn keeps_root(&self, board: &Board, root: &Node) -> bool {
        let children: Vec<&Node> = board.children(&root.id).collect();
        let is_list = root.is_list();

        if let Some(status_id) = self.status_id.as_deref() {
            let own = root.status_id.as_deref() == Some(status_id);
            let child = is_list
                && children
                    .iter()
                    .any(|c| c.status_id.as_deref() == Some(status_id));
            if !own && !child {
                return false;
            }
        }

        if let Some(excluded) = self.exclude_status_id.as_deref() {
            let passes = if is_list {
                children.is_empty()
                    || children
                        .iter()
                        .any(|c| c.status_id.as_deref() != Some(excluded))
            } else {
                root.status_id.as_deref() != Some(excluded)
            };
            if !passes {
                return false;
            }
        }

        if !self.show_completed {
            if root.status == TaskStatus::Completed {
                return false;
            }
            if is_list
                && !children.is_empty()
                && children.iter().all(|c| c.status == TaskStatus::Completed)
            {
                return false;
            }
        }

        if let Some(excluded) = self.exclude_priority {
            let passes = if is_list {
                children.is_empty() || children.iter().any(|c| c.priority != Some(excluded))
            } else {
                root.priority != Some(excluded)
            };
            if !passes {
                return false;
            }
        }

        true
    }
}
