//! Subcommand enum definitions for CLI

use clap::Subcommand;
use std::path::PathBuf;

/// Package commands
#[derive(Subcommand)]
pub enum Commands {
    /// Extract every entry of a package as `name.bin`
    Extract {
        /// Header file (.~h)
        header: PathBuf,

        /// Data file (.~p)
        data: PathBuf,

        /// Output directory
        destination: PathBuf,

        /// Record layout: a/obfuscated or b/plain
        #[arg(short, long)]
        profile: Option<String>,

        /// TOML file with package options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Suffix appended to extracted file names
        #[arg(long)]
        suffix: Option<String>,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Replace package entries with files from a directory
    Insert {
        /// Header file (.~h), rewritten in place
        header: PathBuf,

        /// Data file (.~p), rewritten in place
        data: PathBuf,

        /// Directory of replacement files (`name` plus any extension)
        source: PathBuf,

        /// Record layout: a/obfuscated or b/plain
        #[arg(short, long)]
        profile: Option<String>,

        /// TOML file with package options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Compress replacements one at a time
        #[arg(long)]
        sequential: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// List the entries of a package
    List {
        /// Header file (.~h)
        header: PathBuf,

        /// Record layout: a/obfuscated or b/plain
        #[arg(short, long)]
        profile: Option<String>,

        /// TOML file with package options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Show sizes, offsets and compression
        #[arg(short, long)]
        detailed: bool,

        /// Only show entries whose name contains this text
        #[arg(short = 'f', long)]
        filter: Option<String>,

        /// Only show count of matching entries
        #[arg(long)]
        count: bool,
    },

    /// Show aggregate info about a package
    Info {
        /// Header file (.~h)
        header: PathBuf,

        /// Record layout: a/obfuscated or b/plain
        #[arg(short, long)]
        profile: Option<String>,

        /// TOML file with package options
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
