//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::Cli;
use crate::config::{Config, admin_password_from_env};
use crate::engine::Importer;
use crate::error::AppError;
use crate::gateway::{CommandPasswordSetter, LldapClient};
use crate::report::emit_report;
use ldif_import_core::{AttributeNameCache, ImportSummary, ParsedDirectory, parse_ldif};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

// =============================================================================
// INPUT
// =============================================================================

/// Open the LDIF input; `None` or `-` selects stdin.
fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>, AppError> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path).map_err(|e| {
                AppError::Io(std::io::Error::new(
                    e.kind(),
                    format!("cannot open '{}': {e}", path.display()),
                ))
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(std::io::stdin().lock())),
    }
}

/// Pass 1 over the configured input.
fn parse_input(cli: &Cli, cache: &AttributeNameCache) -> Result<ParsedDirectory, AppError> {
    tracing::info!("Pass 1: Parsing & Schema Inference...");
    let reader = open_input(cli.input.as_deref())?;
    let parsed = parse_ldif(reader, cache)?;
    tracing::info!(
        records = parsed.records.len(),
        user_attributes = parsed.user_schema.len(),
        group_attributes = parsed.group_schema.len(),
        "Parsed {} records",
        parsed.records.len()
    );
    Ok(parsed)
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Parse the input and print the report without touching the store.
pub fn cmd_parse_only(cli: &Cli) -> Result<(), AppError> {
    let cache = AttributeNameCache::new();
    let parsed = parse_input(cli, &cache)?;
    let summary = ImportSummary {
        records_parsed: parsed.records.len(),
        ..ImportSummary::default()
    };
    emit_report(&parsed.stats, &summary, cli.summary.as_deref(), cli.json)
}

/// Full import: login, Pass 0 to Pass 4, report.
pub async fn cmd_import(cli: &Cli, config: &Config) -> Result<(), AppError> {
    let password = admin_password_from_env()?;

    let mut client = LldapClient::new(&config.base_url, config.accept_invalid_certs)?;
    tracing::info!(url = %client.base_url(), "Connecting to {}", client.base_url());
    let token = client
        .login(&config.admin_username, &password)
        .await
        .map_err(AppError::Login)?;

    let passwords = CommandPasswordSetter::new(&config.set_password_bin, client.base_url(), &token);
    let settings = config.import_settings();
    let mut importer = Importer::new(&client, &passwords, &settings);

    tracing::info!("Pass 0: Introspection & Validation...");
    importer.prepare(!cli.skip_self_test).await?;

    let parsed = parse_input(cli, importer.attribute_cache())?;
    let summary = importer.run(&parsed).await;

    tracing::info!(
        users = summary.users_created,
        groups = summary.groups_created,
        links = summary.links_created,
        capability_links = importer.state().totals.capability_links,
        "Import finished"
    );
    emit_report(&parsed.stats, &summary, cli.summary.as_deref(), cli.json)
}
