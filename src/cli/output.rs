use serde::Serialize;

use crate::model::{Node, NodeKind, Priority, TaskStatus};
use crate::ops::gesture::Zone;
use crate::ops::resolve::RuleKind;
use crate::ops::search::{MatchField, SearchHit};

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct NodeJson {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub parent: Option<String>,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expanded: Option<bool>,
}

#[derive(Serialize)]
pub struct ShowJson {
    pub board: String,
    pub nodes: Vec<NodeJson>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragStatus {
    Moved,
    Rejected,
    Unchanged,
}

#[derive(Serialize)]
pub struct DragJson {
    pub status: DragStatus,
    pub zone: Zone,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<RuleKind>,
    pub reparented: bool,
    pub stored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub nodes: Vec<NodeJson>,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub node_id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub field: String,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn node_to_json(node: &Node) -> NodeJson {
    NodeJson {
        id: node.id.clone(),
        kind: node.kind,
        title: node.title.clone(),
        parent: node.parent.clone(),
        status: node.status,
        priority: node.priority,
        status_id: node.status_id.clone(),
        expanded: node.is_list().then_some(node.is_expanded),
    }
}

pub fn field_name(field: MatchField) -> &'static str {
    match field {
        MatchField::Id => "id",
        MatchField::Title => "title",
        MatchField::StatusId => "status_id",
    }
}

pub fn search_hit_to_json(hit: &SearchHit, title: &str) -> SearchHitJson {
    SearchHitJson {
        node_id: hit.node_id.clone(),
        parent_id: hit.parent_id.clone(),
        title: title.to_string(),
        field: field_name(hit.field).to_string(),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn priority_str(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
        Priority::Urgent => "urgent",
    }
}

/// Format a single node as a one-line summary
pub fn format_node_line(node: &Node) -> String {
    let marker = match node.kind {
        NodeKind::List if node.is_expanded => "v".to_string(),
        NodeKind::List => ">".to_string(),
        NodeKind::Task => format!("[{}]", node.status.checkbox_char()),
    };
    let mut line = format!("{} {} {}", marker, node.id, node.title);
    if let Some(p) = node.priority {
        line.push_str(&format!(" !{}", priority_str(p)));
    }
    if let Some(s) = &node.status_id {
        line.push_str(&format!(" @{}", s));
    }
    line
}

/// Format a flattened sequence, children indented under their list
pub fn format_sequence(sequence: &[Node]) -> Vec<String> {
    sequence
        .iter()
        .map(|node| {
            let indent = if node.is_root() { "" } else { "  " };
            format!("{}{}", indent, format_node_line(node))
        })
        .collect()
}
