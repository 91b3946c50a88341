use clap::{Args, Parser, Subcommand, ValueEnum};

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "rollmacro", bin_name = "rollmacro", version = get_version())]
#[command(about = "Dice macro libraries with variables for online sessions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Entity (character, token, user) whose macros to use
    #[arg(short, long, global = true, default_value = "default")]
    pub entity: String,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve a formula (or a stored macro) and print what would be rolled
    Roll {
        /// Formula words, joined with spaces
        formula: Vec<String>,

        /// Roll a stored macro instead (id or id prefix)
        #[arg(short = 'm', long = "macro")]
        macro_ref: Option<String>,
    },

    /// Apply a change command such as ":hp-3"
    Change {
        #[arg(allow_hyphen_values = true)]
        command: String,
    },

    /// Show the entity's variables
    Vars {
        /// Show values with references expanded
        #[arg(short = 'x', long)]
        expanded: bool,

        /// Print the raw variable text
        #[arg(long, conflicts_with = "expanded")]
        raw: bool,
    },

    /// Replace the entity's variable text (from the argument or stdin)
    SetVars { text: Option<String> },

    /// Import macro text as a new tab (from --file or stdin)
    Import(ImportArgs),

    /// Show the entity's macro tree
    Tree,

    #[command(subcommand)]
    Tab(TabCommands),

    #[command(subcommand)]
    Header(HeaderCommands),

    #[command(subcommand, name = "macro")]
    Macro(MacroCommands),

    /// Original tables, shared by all entities
    #[command(subcommand)]
    Table(TableCommands),

    /// Exchange values with a character sheet (JSON file)
    #[command(subcommand)]
    Sync(SyncCommands),

    /// Get or set configuration values
    Config {
        key: Option<String>,
        value: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum OrderArg {
    Left,
    Right,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Name of the new tab
    #[arg(short, long, default_value = "New Tab")]
    pub tab: String,

    /// Read macro text from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<std::path::PathBuf>,

    /// Move variable lines into the entity's variables
    #[arg(short, long)]
    pub split: bool,

    #[arg(long)]
    pub header_start: Option<String>,

    #[arg(long)]
    pub header_end: Option<String>,

    #[arg(long, value_enum)]
    pub order: Option<OrderArg>,

    #[arg(long)]
    pub splitter: Option<String>,

    #[arg(long)]
    pub variable_marker: Option<String>,

    /// Left replacement delimiter used in the text
    #[arg(long)]
    pub left: Option<String>,

    /// Right replacement delimiter used in the text
    #[arg(long)]
    pub right: Option<String>,
}

impl ImportArgs {
    pub fn has_overrides(&self) -> bool {
        self.header_start.is_some()
            || self.header_end.is_some()
            || self.order.is_some()
            || self.splitter.is_some()
            || self.variable_marker.is_some()
            || self.left.is_some()
            || self.right.is_some()
    }
}

/// Tab commands
#[derive(Subcommand, Debug)]
pub enum TabCommands {
    Add { name: Option<String> },
    Rename { tab: String, name: String },
    Delete { tab: String },
}

/// Header commands
#[derive(Subcommand, Debug)]
pub enum HeaderCommands {
    Add { tab: String, name: Option<String> },
    Delete { header: String },
    /// Open or close a header
    Toggle { header: String },
}

/// Macro commands
#[derive(Subcommand, Debug)]
pub enum MacroCommands {
    Add {
        header: String,
        #[arg(short, long)]
        display: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        formula: Option<String>,
    },
    Update {
        id: String,
        #[arg(short, long)]
        display: Option<String>,
        #[arg(short, long, allow_hyphen_values = true)]
        formula: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TableCommands {
    List,
    /// Create or replace a table (body from --file or stdin)
    Save {
        command: String,
        #[arg(short, long)]
        file: Option<std::path::PathBuf>,
    },
    Delete { command: String },
    /// Print every table as JSON
    Backup,
    /// Replace every table from a JSON backup (--file or stdin)
    Restore {
        #[arg(short, long)]
        file: Option<std::path::PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SyncCommands {
    /// Copy sheet values into existing variables
    Pull {
        #[arg(short, long)]
        sheet: std::path::PathBuf,
    },
    /// Show (or with --write, apply) the sheet updates for a variable
    Push {
        key: String,
        #[arg(short, long)]
        sheet: std::path::PathBuf,
        #[arg(short, long)]
        write: bool,
    },
}
