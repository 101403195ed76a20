use serde::{Deserialize, Serialize};

/// Whether a node is a plain task or a list that can own tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Task,
    List,
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Task => write!(f, "task"),
            NodeKind::List => write!(f, "list"),
        }
    }
}

/// Task progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// The character used inside the checkbox `[ ]`
    pub fn checkbox_char(self) -> char {
        match self {
            TaskStatus::Todo => ' ',
            TaskStatus::InProgress => '>',
            TaskStatus::Completed => 'x',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

/// A task or task list at one point in time.
///
/// `parent` is a lookup key into the board, never an owning reference; the
/// children of a list are always derived from the `parent` fields of the
/// other nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub title: String,
    /// Id of the owning list, `None` for root items
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    /// Custom status id assigned by the workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Presentation flag for lists, filled in from the expansion state
    #[serde(skip)]
    pub is_expanded: bool,
}

impl Node {
    pub fn task(id: impl Into<String>, title: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            kind: NodeKind::Task,
            title: title.into(),
            parent: None,
            status: TaskStatus::Todo,
            status_id: None,
            priority: None,
            is_expanded: false,
        }
    }

    pub fn list(id: impl Into<String>, title: impl Into<String>) -> Self {
        Node {
            kind: NodeKind::List,
            ..Node::task(id, title)
        }
    }

    /// Builder-style parent assignment
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn is_list(&self) -> bool {
        self.kind == NodeKind::List
    }

    pub fn is_task(&self) -> bool {
        self.kind == NodeKind::Task
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// True if this node is owned by the list `list_id`
    pub fn is_child_of(&self, list_id: &str) -> bool {
        self.parent_id() == Some(list_id)
    }
}
