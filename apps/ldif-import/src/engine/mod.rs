//! # Import Engine
//!
//! Drives the store through the passes that follow parsing:
//!
//! | Pass | Work                                                          |
//! |------|---------------------------------------------------------------|
//! | 0    | self-test, schema/group warmup, capability groups (`prepare`) |
//! | 2    | register custom attributes (`sync_schema`)                    |
//! | 3    | reconcile persons, ensure groups (`inject`)                   |
//! | 4    | membership links (`link_memberships`)                         |
//!
//! Pass 1 (parsing) happens in the core crate between `prepare` and `run`,
//! using [`Importer::attribute_cache`] seeded in Pass 0.
//!
//! All state lives in [`ImportState`], owned by the [`Importer`]. Requests are
//! strictly sequential: a record is fully reconciled before the next starts.

mod bootstrap;
mod link;
mod reconcile;

pub use reconcile::UpsertOutcome;

use crate::error::AppError;
use crate::gateway::{DirectoryStore, PasswordSetter};
use ldif_import_core::primitives::{DEFAULT_ADMIN_USERNAME, POSIX_USER_GROUP, SERVICE_GROUP};
use ldif_import_core::{AttributeNameCache, ImportSummary, ParsedDirectory, ProfileDefaults};
use std::collections::BTreeMap;
use std::time::Duration;

// =============================================================================
// SETTINGS & STATE
// =============================================================================

/// Engine knobs derived from the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    /// Account whose password is never touched.
    pub admin_username: String,
    pub profile: ProfileDefaults,
    /// Pause between creation and verification.
    pub settle_delay: Duration,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            profile: ProfileDefaults::default(),
            settle_delay: Duration::ZERO,
        }
    }
}

/// Run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportTotals {
    pub users_created: usize,
    pub groups_created: usize,
    /// Membership links made in Pass 4.
    pub links_created: usize,
    /// `posixUser`/`service` tags made in Pass 3, reported apart from
    /// membership links.
    pub capability_links: usize,
}

/// Mutable state of one run.
#[derive(Debug, Clone, Default)]
pub struct ImportState {
    /// Lower-cased group name -> store id.
    pub group_ids: BTreeMap<String, i64>,
    /// Attribute names registered in the store.
    pub attributes: AttributeNameCache,
    pub totals: ImportTotals,
}

// =============================================================================
// IMPORTER
// =============================================================================

/// The reconciliation engine bound to one store and one password tool.
pub struct Importer<'a, S, P> {
    store: &'a S,
    passwords: &'a P,
    settings: &'a ImportSettings,
    state: ImportState,
}

impl<'a, S: DirectoryStore, P: PasswordSetter> Importer<'a, S, P> {
    pub fn new(store: &'a S, passwords: &'a P, settings: &'a ImportSettings) -> Self {
        Self {
            store,
            passwords,
            settings,
            state: ImportState::default(),
        }
    }

    /// Current run state.
    pub fn state(&self) -> &ImportState {
        &self.state
    }

    /// Attribute cache to resolve names against during parsing.
    pub fn attribute_cache(&self) -> &AttributeNameCache {
        &self.state.attributes
    }

    /// Pass 0: optional self-test, warmups and capability groups.
    pub async fn prepare(&mut self, self_test: bool) -> Result<(), AppError> {
        if self_test {
            self.self_test().await?;
        }
        self.warmup_schema().await;
        self.warmup_groups().await;
        self.ensure_group(POSIX_USER_GROUP).await;
        self.ensure_group(SERVICE_GROUP).await;
        Ok(())
    }

    /// Passes 2 to 4 over a parsed directory.
    pub async fn run(&mut self, parsed: &ParsedDirectory) -> ImportSummary {
        tracing::info!("Pass 2: Schema Sync...");
        self.sync_schema(parsed).await;

        tracing::info!("Pass 3: Injecting Objects...");
        self.inject(parsed).await;

        tracing::info!("Pass 4: Relational Linking...");
        self.link_memberships(parsed).await;

        self.summary(parsed.records.len())
    }

    /// Totals of the run so far.
    pub fn summary(&self, records_parsed: usize) -> ImportSummary {
        let totals = self.state.totals;
        ImportSummary {
            records_parsed,
            users_created: totals.users_created,
            groups_created: totals.groups_created,
            links_created: totals.links_created,
        }
    }
}
