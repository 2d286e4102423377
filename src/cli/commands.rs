//! CLI commands and argument parsing

use crate::types::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reddit API client
#[derive(Parser, Debug)]
#[command(name = "rsnoo")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short = 'C', long, global = true, default_value = "rsnoo.yaml")]
    pub config: PathBuf,

    /// Named profile inside the configuration file
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Default log level; RUST_LOG takes precedence
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub log_level: LogLevel,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Paginate a listing endpoint, e.g. /r/rust/new
    List {
        endpoint: String,

        /// Maximum items; unbounded when omitted
        #[arg(short, long)]
        limit: Option<usize>,

        /// Only keep items of these kinds (t1, t3, modaction, ...)
        #[arg(short, long = "kind")]
        kinds: Vec<String>,
    },

    /// Print new items of a listing endpoint as they appear
    Stream {
        endpoint: String,

        /// Do not print items that already exist when the stream starts
        #[arg(long)]
        skip_existing: bool,

        /// Stop after this many items
        #[arg(long)]
        max_items: Option<usize>,
    },

    /// Fetch a submission and its comment tree
    Comments {
        /// Submission id, with or without the t3_ prefix
        id: String,

        /// Resolve every "more comments" placeholder
        #[arg(long)]
        expand: bool,
    },

    /// Show the authenticated account
    Me,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// Indented JSON
    Pretty,
}
