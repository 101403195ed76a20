mod init;
pub use init::cmd_init;

use std::path::PathBuf;

use regex::Regex;
use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::board_io::{self, BOARD_DIR};
use crate::io::config_io::read_config;
use crate::io::lock::FileLock;
use crate::io::order_store::FileOrderStore;
use crate::io::recovery::read_recovery_entries;
use crate::io::state::{read_ui_state, write_ui_state};
use crate::model::{BoardError, Node, Project};
use crate::ops::check::{self, CheckError, CheckWarning};
use crate::ops::drag::{DragEvent, DropOutcome, apply_drag};
use crate::ops::filter::TaskFilter;
use crate::ops::flatten::{flatten, flatten_all, restore_hidden};
use crate::ops::gesture::Zone;
use crate::ops::reorganize::reorganize;
use crate::ops::search;
use crate::ops::submit::Submitter;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;
    let dir = cli.project_dir.as_deref();

    match cli.command {
        Commands::Init(args) => cmd_init(args, dir),
        Commands::Add(args) => cmd_add(args, dir),
        Commands::Show(args) => cmd_show(args, dir, json),
        Commands::Expand(args) => cmd_set_expanded(&args.id, true, dir),
        Commands::Collapse(args) => cmd_set_expanded(&args.id, false, dir),
        Commands::Drag(args) => cmd_drag(args, dir, json),
        Commands::Search(args) => cmd_search(args, dir, json),
        Commands::Check => cmd_check(dir, json),
        Commands::Recovery(args) => cmd_recovery(args, dir, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn project_root(dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let start = match dir {
        Some(d) => std::fs::canonicalize(d)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", d, e))?,
        None => std::env::current_dir()?,
    };
    Ok(board_io::discover_project(&start)?)
}

fn load_project(dir: Option<&str>) -> Result<Project, Box<dyn std::error::Error>> {
    let root = project_root(dir)?;
    Ok(board_io::load_project(&root)?)
}

fn require_list(project: &Project, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    match project.board.get(id) {
        Some(node) if node.is_list() => Ok(()),
        Some(_) => Err(format!("{} is a task, not a list", id).into()),
        None => Err(BoardError::NotFound(id.to_string()).into()),
    }
}

fn print_sequence(title: &str, sequence: &[Node]) {
    println!("== {} ==", title);
    for line in format_sequence(sequence) {
        println!("{}", line);
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_show(args: ShowArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let project = load_project(dir)?;
    let filter = TaskFilter {
        show_completed: args.show_completed,
        status_id: args.status,
        exclude_status_id: args.exclude_status,
        exclude_priority: args.exclude_priority,
    };
    let board = filter.apply(&project.board);
    let expanded = project.ui_state.expanded_set();
    let sequence = if args.all {
        flatten_all(&board, &expanded)
    } else {
        flatten(&board, &expanded)
    };

    if json {
        let out = ShowJson {
            board: project.config.board.name.clone(),
            nodes: sequence.iter().map(node_to_json).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_sequence(&project.config.board.name, &sequence);
    }
    Ok(())
}

fn cmd_search(args: SearchArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let project = load_project(dir)?;
    let re = Regex::new(&args.pattern).map_err(|e| format!("invalid regex: {}", e))?;
    let hits = search::search_nodes(&project.board, &re);

    let title_of = |id: &str| project.board.get(id).map(|n| n.title.clone()).unwrap_or_default();
    if json {
        let out: Vec<SearchHitJson> = hits
            .iter()
            .map(|h| search_hit_to_json(h, &title_of(&h.node_id)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if hits.is_empty() {
        println!("no matches");
    }
    for hit in &hits {
        let location = hit
            .parent_id
            .as_deref()
            .map(|p| format!(" (in {})", p))
            .unwrap_or_default();
        println!(
            "{} {} [{}]{}",
            hit.node_id,
            title_of(&hit.node_id),
            field_name(hit.field),
            location
        );
    }
    Ok(())
}

fn cmd_check(dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let root = project_root(dir)?;
    let board_dir = root.join(BOARD_DIR);
    let config = read_config(&board_dir)?;
    let nodes = board_io::read_raw_nodes(&board_dir)?;
    let ui_state = read_ui_state(&board_dir).unwrap_or_default();
    let result = check::check_board(&nodes, &config, &ui_state);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.errors.is_empty() {
        println!("Errors:");
        for err in &result.errors {
            match err {
                CheckError::DuplicateId { node_id } => {
                    println!("  {} is used more than once", node_id);
                }
                CheckError::MissingParent { node_id, parent_id } => {
                    println!("  {} refers to missing list {}", node_id, parent_id);
                }
                CheckError::NestedList { node_id, parent_id } => {
                    println!("  list {} is nested inside {}", node_id, parent_id);
                }
                CheckError::TaskParent { node_id, parent_id } => {
                    println!("  {} is owned by task {}", node_id, parent_id);
                }
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            println!();
        }
        println!("Warnings:");
        for warn in &result.warnings {
            match warn {
                CheckWarning::DetachedChild { node_id, parent_id } => {
                    println!("  {} is stored away from its list {}", node_id, parent_id);
                }
                CheckWarning::StaleExpanded { list_id } => {
                    println!("  expansion state names unknown list {}", list_id);
                }
                CheckWarning::MissingOrganizationId => {
                    println!("  [board] organization_id is not set");
                }
            }
        }
    }
    if result.valid {
        println!("✓ board is valid");
    } else {
        println!("✗ board has errors");
    }
    Ok(())
}

fn cmd_recovery(args: RecoveryArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let root = project_root(dir)?;
    let entries = read_recovery_entries(&root.join(BOARD_DIR), args.limit);

    if json {
        let out: Vec<serde_json::Value> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "timestamp": e.timestamp.to_rfc3339(),
                    "category": e.category.to_string(),
                    "description": e.description,
                    "fields": e.fields.iter().cloned().collect::<std::collections::BTreeMap<_, _>>(),
                    "body": e.body,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("recovery log is empty");
    }
    for entry in &entries {
        println!(
            "{} {}: {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.category,
            entry.description
        );
        for (key, value) in &entry.fields {
            println!("  {}: {}", key, value);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write command handlers
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = project_root(dir)?;
    let board_dir = root.join(BOARD_DIR);
    let _lock = FileLock::acquire_default(&board_dir)?;
    let mut board = board_io::read_board(&board_dir)?;

    let mut node = if args.list {
        Node::list(board.next_id("L"), args.title)
    } else {
        Node::task(board.next_id("T"), args.title)
    };
    node.priority = args.priority;
    if let Some(parent) = args.parent {
        node = node.with_parent(parent);
    }
    let id = node.id.clone();
    board.insert(node)?;
    board_io::save_board(&board_dir, &board)?;

    println!("{}", id);
    Ok(())
}

fn cmd_set_expanded(id: &str, expand: bool, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let mut project = load_project(dir)?;
    require_list(&project, id)?;
    let changed = if expand {
        project.ui_state.expand(id)
    } else {
        project.ui_state.collapse(id)
    };
    if changed {
        write_ui_state(&project.board_dir, &project.ui_state)?;
    }
    debug!(list = id, expand, changed, "expansion state updated");
    Ok(())
}

fn cmd_drag(args: DragArgs, dir: Option<&str>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let project = load_project(dir)?;
    let expanded = project.ui_state.expanded_set();
    let visible = flatten(&project.board, &expanded);

    for id in std::iter::once(&args.active).chain(args.over.as_ref()) {
        if !visible.iter().any(|n| &n.id == id) {
            return Err(format!("{} is not visible (inside a collapsed list?)", id).into());
        }
    }

    let threshold = project.config.gesture.threshold;
    let event = DragEvent {
        active_id: args.active,
        over_id: args.over,
        delta_x: args.dx,
    };
    let zone = Zone::classify_with(event.delta_x, threshold);
    let outcome = apply_drag(&visible, &event, threshold);

    let mut report = DragJson {
        status: DragStatus::Unchanged,
        zone,
        rule: None,
        reparented: false,
        stored: false,
        message: None,
        nodes: outcome.sequence().iter().map(node_to_json).collect(),
    };

    match &outcome {
        DropOutcome::Moved {
            sequence,
            rule,
            reparented,
        } => {
            report.status = DragStatus::Moved;
            report.rule = Some(*rule);
            report.reparented = *reparented;
            if !args.dry_run {
                let full = reorganize(&restore_hidden(sequence, &project.board));
                let message = submit_order(&project, &full)?;
                report.stored = true;
                report.message = Some(message);
            }
        }
        DropOutcome::Rejected { error, .. } => {
            report.status = DragStatus::Rejected;
            if json {
                report.message = Some(error.to_string());
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            return Err(error.clone().into());
        }
        DropOutcome::Unchanged { .. } => {}
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &report.message {
            Some(message) => println!("{}", message),
            None if report.rule.is_none() => println!("no change"),
            None => {}
        }
        print_sequence(&project.config.board.name, outcome.sequence());
    }
    Ok(())
}

fn submit_order(project: &Project, sequence: &[Node]) -> Result<String, Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let submitter = Submitter::new(
        FileOrderStore::new(&project.board_dir),
        project.config.board.organization_id.clone(),
    )
    .with_success_message(project.config.messages.success.clone());
    Ok(runtime.block_on(submitter.submit(sequence, None))?)
}
