use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use sprintboard_domain::{
    ContainerId, EpicId, ItemId, ItemKind, ItemStatus, Priority, SprintId, UserId,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sprintboard")]
#[command(about = "Sprint and backlog board for a remote task tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to <config dir>/sprintboard/config.toml)
    #[arg(long, value_name = "FILE", env = "SPRINTBOARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the remote API
    #[arg(long, value_name = "URL", env = "SPRINTBOARD_API", global = true)]
    pub api: Option<String>,

    /// Project to work on
    #[arg(long, value_name = "ID", env = "SPRINTBOARD_PROJECT", global = true)]
    pub project: Option<u64>,

    /// Bearer token (defaults to the variable named by `token_env`)
    #[arg(long, value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// Signed-in user id, checked against project membership
    #[arg(long, value_name = "ID", env = "SPRINTBOARD_USER", global = true)]
    pub user: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the backlog and sprints, optionally filtered
    Board(BoardArgs),
    /// Item operations
    Item(ItemCommand),
    /// Sprint operations
    Sprint(SprintCommand),
    /// Backlog operations
    Backlog(BacklogCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args, Default)]
pub struct BoardArgs {
    /// Match against title or identifier
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long, value_parser = parse_status)]
    pub status: Vec<ItemStatus>,
    #[arg(long, value_parser = parse_priority)]
    pub priority: Vec<Priority>,
    #[arg(long)]
    pub assignee: Vec<UserId>,
    /// Include unassigned items
    #[arg(long)]
    pub unassigned: bool,
    #[arg(long, value_parser = parse_kind)]
    pub kind: Vec<ItemKind>,
    /// Only list sprints of this epic
    #[arg(long)]
    pub epic: Option<EpicId>,
    /// Only show items of these epics
    #[arg(long)]
    pub item_epic: Vec<EpicId>,
}

// Item commands
#[derive(Args)]
pub struct ItemCommand {
    #[command(subcommand)]
    pub action: ItemAction,
}

#[derive(Subcommand)]
pub enum ItemAction {
    /// Move an item to another container, or reorder it
    Move(ItemMoveArgs),
    /// Set one field (status, assignee, due-date, story-points, description,
    /// sprint, priority, title); an empty value or "none" clears it
    Set {
        id: ItemId,
        field: String,
        value: String,
    },
    /// Create an item
    Create(ItemCreateArgs),
    /// Delete an item and its subtasks
    Delete { id: ItemId },
    /// Create a subtask under a parent item
    Subtask { parent: ItemId, title: String },
    /// List the subtasks of an item
    Subtasks { parent: ItemId },
}

#[derive(Args)]
pub struct ItemMoveArgs {
    pub id: ItemId,
    /// Target container: "backlog" or "sprint:<id>"
    #[arg(long)]
    pub to: ContainerId,
    /// Expected current container; the move is skipped if it no longer matches
    #[arg(long)]
    pub from: Option<ContainerId>,
    /// Position in the target container
    #[arg(long, conflicts_with = "before")]
    pub index: Option<usize>,
    /// Insert in front of this item
    #[arg(long)]
    pub before: Option<ItemId>,
    /// Read --index as a position in the list filtered by this search
    #[arg(long, requires = "index")]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct ItemCreateArgs {
    pub title: String,
    /// "backlog" or "sprint:<id>"
    #[arg(long, default_value = "backlog")]
    pub container: ContainerId,
    #[arg(long, value_parser = parse_kind)]
    pub kind: Option<ItemKind>,
    #[arg(long, value_parser = parse_status)]
    pub status: Option<ItemStatus>,
    #[arg(long, value_parser = parse_priority)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub epic: Option<EpicId>,
}

// Sprint commands
#[derive(Args)]
pub struct SprintCommand {
    #[command(subcommand)]
    pub action: SprintAction,
}

#[derive(Subcommand)]
pub enum SprintAction {
    /// Create a sprint
    Create(SprintCreateArgs),
    /// Update a sprint
    Update(SprintUpdateArgs),
    /// Start a sprint; any other active sprint is stopped
    Start { id: SprintId },
    /// Complete the active sprint, moving open items elsewhere
    Complete {
        id: SprintId,
        /// Where open items go: "backlog" or "sprint:<id>"
        #[arg(long, default_value = "backlog")]
        to: ContainerId,
    },
    /// Delete a sprint; its items return to the backlog
    Delete { id: SprintId },
}

#[derive(Args)]
pub struct SprintCreateArgs {
    pub name: String,
    #[arg(long, default_value = "")]
    pub goal: String,
    /// YYYY-MM-DD
    #[arg(long)]
    pub start: Option<NaiveDate>,
    /// YYYY-MM-DD
    #[arg(long)]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub epic: Option<EpicId>,
}

#[derive(Args)]
pub struct SprintUpdateArgs {
    pub id: SprintId,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub goal: Option<String>,
    #[arg(long, conflicts_with = "clear_start")]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub clear_start: bool,
    #[arg(long, conflicts_with = "clear_end")]
    pub end: Option<NaiveDate>,
    #[arg(long)]
    pub clear_end: bool,
    #[arg(long, conflicts_with = "clear_epic")]
    pub epic: Option<EpicId>,
    #[arg(long)]
    pub clear_epic: bool,
}

// Backlog commands
#[derive(Args)]
pub struct BacklogCommand {
    #[command(subcommand)]
    pub action: BacklogAction,
}

#[derive(Subcommand)]
pub enum BacklogAction {
    /// Rename the backlog
    Rename { name: String },
}

fn parse_status(s: &str) -> Result<ItemStatus, String> {
    ItemStatus::parse(s).ok_or_else(|| {
        format!(
            "Invalid status '{}'. Valid values: to do, in progress, in review, done, testing (or 1-5)",
            s
        )
    })
}

fn parse_priority(s: &str) -> Result<Priority, String> {
    Priority::normalize(s).ok_or_else(|| {
        format!(
            "Invalid priority '{}'. Valid values: highest, high, medium, low, lowest",
            s
        )
    })
}

fn parse_kind(s: &str) -> Result<ItemKind, String> {
    ItemKind::parse(s).ok_or_else(|| {
        format!(
            "Invalid kind '{}'. Valid values: story, task, bug, subtask",
            s
        )
    })
}
