use serde::Serialize;

use crate::io::state::UiState;
use crate::model::board::{BoardError, validate};
use crate::model::config::BoardConfig;
use crate::model::node::Node;
use crate::ops::reorganize::reorganize;

/// Structured result from `tt check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (the board will not load until it is fixed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    #[serde(rename = "duplicate_id")]
    DuplicateId { node_id: String },
    #[serde(rename = "missing_parent")]
    MissingParent { node_id: String, parent_id: String },
    /// A list with a parent
    #[serde(rename = "nested_list")]
    NestedList { node_id: String, parent_id: String },
    /// A task owned by another task
    #[serde(rename = "task_parent")]
    TaskParent { node_id: String, parent_id: String },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// A child stored away from its list's block
    #[serde(rename = "detached_child")]
    DetachedChild { node_id: String, parent_id: String },
    /// Expansion state names something that is not a list on the board
    #[serde(rename = "stale_expanded")]
    StaleExpanded { list_id: String },
    /// Order batches will carry an empty organization id
    #[serde(rename = "missing_organization_id")]
    MissingOrganizationId,
}

/// Validate raw board nodes together with config and expansion state.
///
/// Read-only.
pub fn check_board(nodes: &[Node], config: &BoardConfig, ui_state: &UiState) -> CheckResult {
    let mut result = CheckResult::default();

    for err in validate(nodes) {
        let mapped = match err {
            BoardError::DuplicateId(node_id) => CheckError::DuplicateId { node_id },
            BoardError::MissingParent { child, parent } => CheckError::MissingParent {
                node_id: child,
                parent_id: parent,
            },
            BoardError::NestedList { child, parent } => CheckError::NestedList {
                node_id: child,
                parent_id: parent,
            },
            BoardError::TaskParent { child, parent } => CheckError::TaskParent {
                node_id: child,
                parent_id: parent,
            },
            BoardError::NotFound(_) | BoardError::InvalidOrder { .. } => continue,
        };
        result.errors.push(mapped);
    }

    if result.errors.is_empty() {
        let regrouped = reorganize(nodes);
        for (stored, expected) in nodes.iter().zip(&regrouped) {
            if stored.id != expected.id
                && let Some(parent_id) = stored.parent_id()
            {
                result.warnings.push(CheckWarning::DetachedChild {
                    node_id: stored.id.clone(),
                    parent_id: parent_id.to_string(),
                });
                break;
            }
        }
    }

    for list_id in &ui_state.expanded {
        let is_list = nodes.iter().any(|n| &n.id == list_id && n.is_list());
        if !is_list {
            result.warnings.push(CheckWarning::StaleExpanded {
                list_id: list_id.clone(),
            });
        }
    }

    if config.board.organization_id.is_empty() {
        result.warnings.push(CheckWarning::MissingOrganizationId);
    }

    result.valid = result.errors.is_empty();
    result
}
