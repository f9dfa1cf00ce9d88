//! Command-line interface definitions for dupdirs.
//!
//! Global options (verbosity, color, config and state files) apply to every
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # Compare the immediate children of two roots
//! dupdirs scan /mnt/old /mnt/new
//!
//! # Add a root to the remembered list, then scan everything remembered
//! dupdirs roots add /mnt/backup
//! dupdirs scan --format json
//!
//! # Compare only these roots, leaving the remembered list untouched
//! dupdirs scan --only /a /b
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::Config;

/// Find same-named subdirectories across several root directories.
///
/// dupdirs compares the immediate children of every root and reports each
/// name that appears under more than one root, with the size and
/// modification time of both directories.
#[derive(Debug, Parser)]
#[command(name = "dupdirs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Configuration file to use instead of the platform default
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// State file holding the remembered roots
    ///
    /// Defaults to `state.toml` in the platform data directory.
    #[arg(long, global = true, value_name = "PATH", env = "DUPDIRS_STATE_FILE")]
    pub state_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compare the children of the root directories
    Scan(ScanArgs),
    /// Manage the remembered root directories
    Roots(RootsArgs),
    /// Show or set the directory to start from when choosing roots
    InitDir(InitDirArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Root directories to add before scanning
    #[arg(value_name = "ROOTS")]
    pub roots: Vec<PathBuf>,

    /// Compare only ROOTS, ignoring (and not updating) the remembered list
    #[arg(long, requires = "roots")]
    pub only: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Show sizes as raw byte counts
    #[arg(long)]
    pub bytes: bool,

    /// Ignore subdirectories whose name starts with `.`
    #[arg(long)]
    pub skip_hidden: bool,

    /// Treat symbolic links to directories as subdirectories
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Do not compute directory sizes
    #[arg(long)]
    pub no_sizes: bool,

    /// Do not update the remembered roots
    #[arg(long)]
    pub no_save: bool,
}

impl ScanArgs {
    /// Apply the flags that override configuration values.
    pub fn apply_to(&self, config: &mut Config) {
        if self.bytes {
            config.show_size_in_bytes = true;
        }
        if self.skip_hidden {
            config.skip_hidden = true;
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if self.no_sizes {
            config.compute_sizes = false;
        }
    }

    /// Whether the remembered roots may be written.
    #[must_use]
    pub fn saves_roots(&self) -> bool {
        !(self.no_save || self.only)
    }
}

/// Arguments for the roots subcommand.
#[derive(Debug, Args)]
pub struct RootsArgs {
    /// Action on the remembered list
    #[command(subcommand)]
    pub command: RootsCommand,
}

/// Actions on the remembered roots.
#[derive(Debug, Subcommand)]
pub enum RootsCommand {
    /// Print the remembered roots
    List {
        /// Also compute and show each root's size
        #[arg(long)]
        sizes: bool,
    },
    /// Add directories to the list
    Add {
        /// Directories to add
        #[arg(value_name = "PATHS", required = true)]
        paths: Vec<PathBuf>,
    },
    /// Remove one directory from the list
    Remove {
        /// Directory to remove
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Forget every root
    Clear,
}

/// Arguments for the init-dir subcommand.
#[derive(Debug, Args)]
pub struct InitDirArgs {
    /// New initial directory; prints the current one when omitted
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable report
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
