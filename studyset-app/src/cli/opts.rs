use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, ValueEnum)]
pub enum StoreKind {
    Json,
    Sqlite,
    Pg,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "studyset", version, about = "studyset CLI/TUI/API")]
pub struct Cli {
    /// Storage backend (applies to CLI/TUI/API unless overridden)
    #[arg(long, value_enum, default_value_t = StoreKind::Json)]
    pub store: StoreKind,

    /// SQLite DB path when --store sqlite (defaults to app data dir)
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Postgres URL when --store pg
    #[arg(long)]
    pub pg_url: Option<String>,

    /// Act as this user instead of the local profile identity
    #[arg(long)]
    pub user: Option<Uuid>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Study set operations (CLI)
    #[command(subcommand)]
    Set(SetCmd),
    /// Card operations on a set (CLI)
    #[command(subcommand)]
    Card(CardCmd),
    /// Flip through a set's cards (CLI)
    Study(StudyCmd),
    /// Bulk import cards into a set from a file or stdin
    Import(ImportCmd),
    /// Export data (CLI)
    #[command(subcommand)]
    Export(ExportCmd),
    /// Launch Terminal UI
    Tui,
    /// Launch Axum HTTP API
    Api(ApiCmd),
}

#[derive(Debug, Subcommand, Clone)]
pub enum SetCmd {
    Create(SetCreate),
    List {
        /// List every user's sets, not just yours
        #[arg(long)]
        all: bool,
        /// Keep only sets whose title or description matches
        #[arg(long)]
        filter: Option<String>,
    },
    Show {
        set: String,
    },
    Rename(SetRename),
    Rm {
        set: String,
    },
}

#[derive(Debug, Args, Clone)]
pub struct SetCreate {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: Option<String>,
    /// Card spec, repeatable: "Term | Definition | Image URL (optional)"
    #[arg(long = "card")]
    pub cards: Vec<String>,
    /// Read additional card lines from a file
    #[arg(long)]
    pub from: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct SetRename {
    pub set: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CardCmd {
    Add(CardAdd),
    List {
        #[arg(long)]
        set: String,
    },
    Rm {
        #[arg(long)]
        set: String,
        term_id: String,
    },
}

#[derive(Debug, Args, Clone)]
pub struct CardAdd {
    #[arg(long)]
    pub set: String,
    #[arg(long)]
    pub term: String,
    #[arg(long)]
    pub definition: String,
    #[arg(long)]
    pub image: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct StudyCmd {
    pub set: String,
}

#[derive(Debug, Args, Clone)]
pub struct ImportCmd {
    pub set: String,
    /// Source file; stdin when omitted
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum ExportCmd {
    Json {
        path: PathBuf,
        #[arg(long)]
        set: Option<String>,
    },
    Csv {
        path: PathBuf,
        #[arg(long)]
        set: String,
    },
    /// Delimiter text the import command round-trips
    Text {
        path: PathBuf,
        #[arg(long)]
        set: String,
    },
}

#[derive(Debug, Args, Clone)]
pub struct ApiCmd {
    /// Bind address (host:port)
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub addr: String,
}
