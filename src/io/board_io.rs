use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::config_io::read_config;
use crate::io::recovery::atomic_write;
use crate::io::state::read_ui_state;
use crate::model::board::{Board, BoardError};
use crate::model::node::Node;
use crate::model::project::Project;

pub const BOARD_DIR: &str = "tasktree";
pub const BOARD_FILE: &str = "board.json";
pub const CONFIG_FILE: &str = "config.toml";

/// Error type for board I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a tasktree board: no tasktree/ directory found")]
    NotAProject,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not parse board.json: {0}")]
    BoardParseError(#[from] serde_json::Error),
    #[error("invalid board: {0}")]
    InvalidBoard(#[from] BoardError),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// On-disk shape of board.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardFile {
    #[serde(default)]
    pub nodes: Vec<Node>,
}

/// Discover the board by walking up from the given directory, looking for a
/// `tasktree/` subdirectory with a config file.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        let board_dir = current.join(BOARD_DIR);
        if board_dir.is_dir() && board_dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load config, board and expansion state from the given root directory.
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let board_dir = root.join(BOARD_DIR);
    if !board_dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }

    let config = read_config(&board_dir)?;
    let board = read_board(&board_dir)?;
    let ui_state = read_ui_state(&board_dir).unwrap_or_default();

    Ok(Project {
        root: root.to_path_buf(),
        board_dir,
        config,
        board,
        ui_state,
    })
}

/// Read board.json without validating it. A missing file is an empty board.
pub fn read_raw_nodes(board_dir: &Path) -> Result<Vec<Node>, ProjectError> {
    let path = board_dir.join(BOARD_FILE);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = fs::read_to_string(&path).map_err(|e| ProjectError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let file: BoardFile = serde_json::from_str(&text)?;
    Ok(file.nodes)
}

/// Read and validate board.json
pub fn read_board(board_dir: &Path) -> Result<Board, ProjectError> {
    let nodes = read_raw_nodes(board_dir)?;
    Ok(Board::from_nodes(nodes)?)
}

/// Write the board back to disk atomically
pub fn save_board(board_dir: &Path, board: &Board) -> Result<(), ProjectError> {
    let path = board_dir.join(BOARD_FILE);
    let file = BoardFile {
        nodes: board.nodes().cloned().collect(),
    };
    let mut content = serde_json::to_string_pretty(&file)?;
    content.push('\n');
    atomic_write(&path, content.as_bytes()).map_err(|e| ProjectError::WriteError { path, source: e })
}
