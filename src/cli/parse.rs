//! CLI parse: clap types for Draftline. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Draftline CLI - Template-driven document synthesis
#[derive(Parser)]
#[command(name = "draftline")]
#[command(about = "Generate proposals, emails and estimates from a short project description")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a document and stream it to stdout
    Generate {
        /// Document category (proposal, email, estimate)
        #[arg(long, short = 't', default_value = "proposal")]
        category: String,
        /// Client name (optional)
        #[arg(long)]
        client: Option<String>,
        /// Project description
        #[arg(long, conflicts_with = "use_example")]
        details: Option<String>,
        /// Use the category's example project description
        #[arg(long)]
        use_example: bool,
        /// Copy the finished document to the clipboard
        #[arg(long)]
        copy: bool,
        /// Save the finished document as a Markdown file
        #[arg(long)]
        download: bool,
        /// Directory to save downloads into (overrides config)
        #[arg(long)]
        download_dir: Option<PathBuf>,
        /// Milliseconds between chunks (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List document categories
    Categories {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the active template for a category
    Template {
        /// Document category (proposal, email, estimate)
        category: String,
    },
    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate the effective configuration
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration as TOML
    Show,
}
