use std::fs;
use std::path::PathBuf;

use crate::cli::commands::InitArgs;
use crate::io::board_io::{self, BOARD_DIR, BOARD_FILE, BoardFile, CONFIG_FILE};

const CONFIG_TOML_TEMPLATE: &str = r##"[board]
name = "{name}"
# Sent as organizationId with every order batch
organization_id = "{org}"

# --- Drag gestures ---
# Horizontal distance (pixels) a drag must travel to count as an
# indent (right) or outdent (left). Both bounds are inclusive.
[gesture]
threshold = 50.0

# --- Messages ---
[messages]
success = "Tasks updated!"
"##;

/// Infer a board name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_config_toml(name: &str, org: &str) -> String {
    CONFIG_TOML_TEMPLATE
        .replace("{name}", &name.replace('"', "\\\""))
        .replace("{org}", &org.replace('"', "\\\""))
}

pub fn cmd_init(args: InitArgs, project_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match project_dir {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };
    let board_dir = root.join(BOARD_DIR);

    if board_dir.join(CONFIG_FILE).exists() && !args.force {
        return Err("board already exists in ./tasktree/ (use --force to reinitialize)".into());
    }

    if let Some(parent) = root.parent()
        && let Ok(parent_root) = board_io::discover_project(parent)
    {
        eprintln!(
            "Note: parent board found at {}/",
            parent_root.join(BOARD_DIR).display()
        );
        eprintln!("Creating new board in ./tasktree/");
    }

    let name = args.name.unwrap_or_else(|| {
        root.canonicalize()
            .ok()
            .and_then(|p| p.file_name().and_then(|n| n.to_str()).map(infer_name))
            .unwrap_or_else(|| "Untitled".to_string())
    });
    let org = args.org.unwrap_or_default();

    fs::create_dir_all(&board_dir)?;
    fs::write(board_dir.join(CONFIG_FILE), render_config_toml(&name, &org))?;
    if !board_dir.join(BOARD_FILE).exists() {
        let empty = serde_json::to_string_pretty(&BoardFile::default())?;
        fs::write(board_dir.join(BOARD_FILE), empty + "\n")?;
    }

    println!("Initialized tasktree board: {}", name);
    Ok(())
}
