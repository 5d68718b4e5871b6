use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
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
#[command(name = "projstore", version = get_version())]
#[command(about = "File-per-record project store", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Data directory (defaults to $PROJSTORE_HOME, then the OS data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every project
    #[command(alias = "ls")]
    List,

    /// Print one project
    Get {
        /// Project id (e.g. 100001)
        id: String,
    },

    /// Create a project and report its new id ("Project created: <id>")
    #[command(alias = "new")]
    Create {
        /// JSON payload; read from stdin when omitted
        payload: Option<String>,
    },

    /// Replace a project; the payload must carry its id
    Update {
        /// JSON payload; read from stdin when omitted
        payload: Option<String>,
    },

    /// Delete the file of a project
    #[command(alias = "rm")]
    Delete {
        /// Project id
        id: String,
    },

    /// Recover or clean up writes interrupted mid-commit
    Doctor,

    /// Get or set configuration
    Config {
        /// Configuration key (file-ext, id-offset, commit-mode, evict-on-delete)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Create the data directory and default config
    Init,
}
