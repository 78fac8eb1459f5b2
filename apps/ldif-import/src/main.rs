//! # ldif-import
//!
//! Migrates an LDIF directory export into an LLDAP server.
//!
//! ## Usage
//!
//! ```bash
//! # Full import
//! LLDAP_PASS=secret ldif-import --url https://id.example.com export.ldif
//!
//! # Inspect an export without contacting the store
//! ldif-import --parse-only -s report.txt export.ldif
//! ```

use clap::Parser;
use ldif_import::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // Parse CLI arguments first: -v selects the default filter.
    let cli = cli::Cli::parse();

    // LDIF_IMPORT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LDIF_IMPORT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "ldif_import=debug"
    } else {
        "ldif_import=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner (stderr, stdout carries the report).
fn print_banner() {
    eprintln!(
        r#"
  ldif-import v{}

  LDIF -> LLDAP migration
"#,
        env!("CARGO_PKG_VERSION")
    );
}
