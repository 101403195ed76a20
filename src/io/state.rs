use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Persisted expansion state (written to .state.json)
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiState {
    /// Ids of expanded lists, in the order they were expanded
    #[serde(default)]
    pub expanded: Vec<String>,
}

impl UiState {
    pub fn is_expanded(&self, list_id: &str) -> bool {
        self.expanded.iter().any(|id| id == list_id)
    }

    /// Returns false if the list was already expanded.
    pub fn expand(&mut self, list_id: &str) -> bool {
        if self.is_expanded(list_id) {
            return false;
        }
        self.expanded.push(list_id.to_string());
        true
    }

    /// Returns false if the list was not expanded.
    pub fn collapse(&mut self, list_id: &str) -> bool {
        let before = self.expanded.len();
        self.expanded.retain(|id| id != list_id);
        self.expanded.len() != before
    }

    pub fn expanded_set(&self) -> HashSet<String> {
        self.expanded.iter().cloned().collect()
    }
}

/// Read .state.json from the board directory
pub fn read_ui_state(board_dir: &Path) -> Option<UiState> {
    let path = board_dir.join(".state.json");
    let content = fs::read_to_string(&path).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the board directory
pub fn write_ui_state(board_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let path = board_dir.join(".state.json");
    let content = serde_json::to_string_pretty(state)?;
    fs::write(&path, content)
}
