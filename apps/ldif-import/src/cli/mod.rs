//! # ldif-import CLI Module
//!
//! Command-line surface of the importer.
//!
//! ## Modes
//!
//! - default: full import (Pass 0 to Pass 4) against the store
//! - `--parse-only`: Pass 1 and the report, no store access

mod commands;

use crate::config::Config;
use crate::error::AppError;
use clap::Parser;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// ldif-import - LDIF to LLDAP migration
///
/// Reads a directory export and reconciles its users, groups and memberships
/// into an LLDAP server. The admin password is read from LLDAP_PASS.
#[derive(Parser, Debug, Default)]
#[command(name = "ldif-import")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long)]
    pub quiet: bool,

    /// LLDAP base URL (overrides the config file)
    #[arg(long)]
    pub url: Option<String>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub summary: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Admin account used to log in
    #[arg(long)]
    pub admin: Option<String>,

    /// Path of the lldap_set_password executable
    #[arg(long, value_name = "PATH")]
    pub set_password_bin: Option<PathBuf>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Output the report in JSON format
    #[arg(long)]
    pub json: bool,

    /// Parse and report only, without contacting the store
    #[arg(long)]
    pub parse_only: bool,

    /// Skip the create/delete round trip of Pass 0
    #[arg(long)]
    pub skip_self_test: bool,

    /// LDIF input file ("-" or absent for stdin)
    pub input: Option<PathBuf>,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);

    if cli.parse_only {
        cmd_parse_only(&cli)
    } else {
        cmd_import(&cli, &config).await
    }
}
