use std::path::PathBuf;

use super::board::Board;
use super::config::BoardConfig;
use crate::io::state::UiState;

/// A fully loaded board project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of `tasktree/`)
    pub root: PathBuf,
    /// Path to the `tasktree/` directory
    pub board_dir: PathBuf,
    /// Parsed config.toml
    pub config: BoardConfig,
    /// Loaded board.json
    pub board: Board,
    /// Expansion state from .state.json (default when missing)
    pub ui_state: UiState,
}
