use clap::{Args, Parser, Subcommand};

use crate::model::Priority;

#[derive(Parser)]
#[command(name = "tt", about = concat!("tasktree v", env!("CARGO_PKG_VERSION"), " - drag tasks between lists"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different project directory
    #[arg(short = 'C', long = "project-dir", global = true)]
    pub project_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new board in the current directory
    Init(InitArgs),
    /// Add a task or a list at the bottom of the board (or of a list)
    Add(AddArgs),
    /// Show the visible tree
    Show(ShowArgs),
    /// Expand a list so its children are shown and can receive drops
    Expand(ListIdArg),
    /// Collapse a list
    Collapse(ListIdArg),
    /// Drop one node onto another
    Drag(DragArgs),
    /// Search nodes by regex
    Search(SearchArgs),
    /// Validate board integrity
    Check,
    /// Show order batches that could not be stored
    Recovery(RecoveryArgs),
}

#[derive(Args)]
pub struct InitArgs {
    /// Board name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Organization id sent with every order batch
    #[arg(long)]
    pub org: Option<String>,
    /// Reinitialize even if tasktree/ already exists
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct AddArgs {
    /// Title of the new node
    pub title: String,
    /// Create a list instead of a task
    #[arg(long, conflicts_with = "parent")]
    pub list: bool,
    /// Add the task to this list
    #[arg(long = "in", value_name = "LIST")]
    pub parent: Option<String>,
    #[arg(long, value_enum)]
    pub priority: Option<Priority>,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Include children of collapsed lists
    #[arg(long)]
    pub all: bool,
    /// Include completed tasks
    #[arg(long)]
    pub show_completed: bool,
    /// Only items with this custom status id
    #[arg(long, value_name = "STATUS_ID")]
    pub status: Option<String>,
    /// Hide items with this custom status id
    #[arg(long, value_name = "STATUS_ID")]
    pub exclude_status: Option<String>,
    /// Hide items with this priority
    #[arg(long, value_enum)]
    pub exclude_priority: Option<Priority>,
}

#[derive(Args)]
pub struct ListIdArg {
    /// List ID
    pub id: String,
}

#[derive(Args)]
pub struct DragArgs {
    /// ID of the node being dragged
    pub active: String,
    /// ID of the node it is dropped on (default: dropped in place)
    #[arg(long)]
    pub over: Option<String>,
    /// Horizontal displacement at drop time
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub dx: f64,
    /// Print the result without storing it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Regex pattern
    pub pattern: String,
}

#[derive(Args)]
pub struct RecoveryArgs {
    /// Show at most this many entries
    #[arg(long)]
    pub limit: Option<usize>,
}
