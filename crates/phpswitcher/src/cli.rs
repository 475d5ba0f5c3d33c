use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "phpswitcher", version)]
#[command(about = "Install and switch between PHP versions", long_about = None)]
pub struct Cli {
    /// Show debug output on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the one in the config directory
    #[arg(long, global = true, env = "PHPSWITCHER_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Terminal log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, env = "PHPSWITCHER_LOG", value_name = "LEVEL")]
    pub log_level: Option<LevelFilter>,

    /// Where the last switched-to version is recorded
    #[arg(long, global = true, env = "PHPSWITCHER_MARKER_FILE", value_name = "PATH")]
    pub marker_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Install a PHP version (X.Y or X.Y.Z); detected from the current directory when omitted
    Install {
        version: Option<String>,
    },
    /// Make a PHP version (X.Y) the active one; detected from the current directory when omitted
    Use {
        version: Option<String>,
    },
    /// List installed PHP versions
    List,
    /// Print the version last switched to
    Current,
    /// Print the version pinned for a directory or its nearest ancestor
    Detect {
        /// Directory to start from (defaults to the current directory)
        #[arg(long, value_name = "PATH")]
        dir: Option<PathBuf>,
    },
}
