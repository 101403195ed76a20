use std::fs;
use std::path::Path;

use crate::io::board_io::{CONFIG_FILE, ProjectError};
use crate::model::config::BoardConfig;

/// Read config.toml from the board directory.
pub fn read_config(board_dir: &Path) -> Result<BoardConfig, ProjectError> {
    let config_path = board_dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&config_text)?)
}
