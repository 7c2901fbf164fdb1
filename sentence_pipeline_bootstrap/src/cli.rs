// /////////////////////////////////////////////////////////////////////////////
// Sentence Pipeline
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface
//!
//! Bootstrap-layer CLI parsing and validation.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. Cli::parse()                    │  clap derive parsing
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  config-path existence check
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  safe, validated config
//! └─────────────────────────────────────┘
//! ```
//!
//! `TableArg`/`StageArg` are this layer's own enums rather than the domain
//! crate's `SentenceTable`/`ProcessingStage` — the bootstrap crate has no
//! domain dependency beyond what [`crate::exit_code`] needs, and clap's
//! `ValueEnum` derive needs to live on types it owns. The composition root
//! maps these to their domain counterparts.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating already-parsed CLI arguments.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid value for {arg}: {reason}")]
    InvalidValue { arg: String, reason: String },
}

#[derive(Parser, Debug)]
#[command(name = "sentence-pipeline")]
#[command(about = "Five-stage content evaluation pipeline for resume and cover-letter sentences")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path (TOML or YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Which sentence table a command applies to. `None` (the CLI default)
/// means both.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum TableArg {
    Resume,
    CoverLetter,
}

/// Which stage to restart a session from, skipping every stage before it.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum StageArg {
    KeywordFilter,
    Truthfulness,
    CanadianSpelling,
    ToneAnalysis,
    SkillAnalysis,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one evaluation session over pending sentences
    Process {
        /// Restrict to one table; both tables run when omitted
        #[arg(long, value_enum)]
        table: Option<TableArg>,

        /// Restrict to specific sentence ids (comma-separated UUIDs)
        #[arg(long, value_delimiter = ',')]
        ids: Option<Vec<String>>,

        /// Resume from a specific stage instead of the keyword filter
        #[arg(long, value_enum)]
        restart_from: Option<StageArg>,
    },

    /// Print the orchestrator's current status
    Status,

    /// Scheduler controls
    Scheduler {
        #[command(subcommand)]
        action: SchedulerAction,
    },

    /// Report process health
    Health,
}

#[derive(Subcommand, Debug)]
pub enum SchedulerAction {
    /// Print per-task scheduler status
    Status,
    /// Start the scheduler's background loop
    Start,
    /// Stop the scheduler's background loop
    Stop,
    /// Enable a disabled task
    Enable { task_id: String },
    /// Disable a task without removing it
    Disable { task_id: String },
    /// Force a task to run immediately, outside its cadence
    Run { task_id: String },
}

/// Validated CLI configuration: `Cli` plus a confirmed-to-exist config path.
#[derive(Debug)]
pub struct ValidatedCli {
    pub command: Commands,
    pub verbose: bool,
    pub config: Option<PathBuf>,
}

/// Parses `std::env::args()` and validates the result.
///
/// # Errors
///
/// Returns [`ParseError`] if the config path was given but doesn't exist, or
/// an id list contains a non-UUID value. Clap handles `--help`/`--version`
/// and malformed flags itself and exits the process before this is reached.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = Cli::parse();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    if let Some(ref path) = cli.config {
        if !path.exists() {
            return Err(ParseError::ConfigNotFound(path.clone()));
        }
    }

    if let Commands::Process { ids: Some(ref ids), .. } = cli.command {
        for id in ids {
            if uuid::Uuid::parse_str(id).is_err() {
                return Err(ParseError::InvalidValue { arg: "ids".to_string(), reason: format!("not a UUID: {id}") });
            }
        }
    }

    Ok(ValidatedCli { command: cli.command, verbose: cli.verbose, config: cli.config })
}
