//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::categories::CategoryId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// WealthTrack - quarterly personal wealth tracker
///
/// Record your holdings per quarter, see where your money sits and how it
/// moves over time, and ask an AI advisor for a second opinion.
///
/// Examples:
///   wealthtrack dashboard
///   wealthtrack dashboard --advice
///   wealthtrack record add --category bitcoin --label "Cold wallet" --value 45000
///   wealthtrack record save
///   wealthtrack trends --format json --output trends.json
///   wealthtrack init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .wealthtrack.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Records file to read and write
    #[arg(long, value_name = "FILE", env = "WEALTHTRACK_DATA", global = true)]
    pub data: Option<PathBuf>,

    /// Gemini model used for advice
    #[arg(long, value_name = "MODEL", env = "WEALTHTRACK_MODEL", global = true)]
    pub model: Option<String>,

    /// Advice request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// Do not start with demo data when no records exist
    #[arg(long, global = true)]
    pub no_seed: bool,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show metrics and distributions for the latest quarter
    Dashboard {
        /// Ask the AI advisor for insights
        #[arg(long)]
        advice: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Edit the quarter draft and save it as a record
    Record {
        #[command(subcommand)]
        action: RecordCommand,
    },

    /// Show how the totals moved across quarters
    Trends {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate a default .wealthtrack.toml configuration file
    InitConfig,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecordCommand {
    /// Show the draft as an entry form
    Show {
        /// Only list rows of this category
        #[arg(long, value_name = "CATEGORY")]
        category: Option<CategoryId>,
    },

    /// Add a row to a category
    Add {
        #[arg(long, value_name = "CATEGORY")]
        category: CategoryId,

        /// Row label, e.g. "Salary card"
        #[arg(long, default_value = "")]
        label: String,

        /// Amount; separators and a leading currency sign are ignored
        #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// Change the label or value of a row
    Edit {
        #[arg(long, value_name = "CATEGORY")]
        category: CategoryId,

        #[arg(long)]
        id: String,

        #[arg(long)]
        label: Option<String>,

        #[arg(long, value_name = "AMOUNT", allow_hyphen_values = true)]
        value: Option<String>,
    },

    /// Remove a row
    Delete {
        #[arg(long, value_name = "CATEGORY")]
        category: CategoryId,

        #[arg(long)]
        id: String,
    },

    /// Set the quarter label the draft is saved under
    Quarter {
        /// Label such as 2024-Q3
        label: String,
    },

    /// Copy a saved quarter into the draft
    Load {
        label: String,
    },

    /// Save the draft, replacing any record with the same label
    Save,

    /// Throw the draft away
    Discard,
}

/// Output format and destination for report commands.
#[derive(clap::Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref model) = self.model {
            if model.trim().is_empty() {
                return Err("Model name must not be empty".to_string());
            }
        }

        match self.command {
            Command::Record {
                action: RecordCommand::Edit {
                    ref label,
                    ref value,
                    ..
                },
            } if label.is_none() && value.is_none() => {
                Err("Nothing to change: pass --label and/or --value".to_string())
            }
            Command::Record {
                action: RecordCommand::Quarter { ref label } | RecordCommand::Load { ref label },
            } if label.trim().is_empty() => Err("Quarter label must not be empty".to_string()),
            _ => Ok(()),
        }
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `verbose_by_default` comes from the config file; `--quiet` overrides it.
    pub fn log_level(&self, verbose_by_default: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || verbose_by_default {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
