use serde::{Deserialize, Serialize};

use crate::ops::gesture::DEFAULT_THRESHOLD;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: BoardInfo,
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardInfo {
    #[serde(default)]
    pub name: String,
    /// Sent with every order batch
    #[serde(default)]
    pub organization_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureConfig {
    /// Horizontal distance (in pixels) that counts as an indent/outdent gesture
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    /// Confirmation shown after an order batch is stored
    #[serde(default = "default_success")]
    pub success: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        MessagesConfig {
            success: default_success(),
        }
    }
}

fn default_success() -> String {
    "Tasks updated!".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: BoardConfig = toml::from_str("").unwrap();
        assert_eq!(config.gesture.threshold, 50.0);
        assert_eq!(config.messages.success, "Tasks updated!");
        assert!(config.board.organization_id.is_empty());
    }

    #[test]
    fn partial_sections_fill_in() {
        let config: BoardConfig = toml::from_str(
            r#"
[board]
name = "Home"
organization_id = "org-1"

[gesture]
threshold = 30.0
"#,
        )
        .unwrap();
        assert_eq!(config.board.name, "Home");
        assert_eq!(config.board.organization_id, "org-1");
        assert_eq!(config.gesture.threshold, 30.0);
        assert_eq!(config.messages.success, "Tasks updated!");
    }
}
