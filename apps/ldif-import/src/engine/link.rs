//! Pass 4: membership links.
//!
//! Links are idempotent: a duplicate-key answer means the link already exists
//! and counts as success.

use super::Importer;
use crate::gateway::{DirectoryStore, PasswordSetter, StoreError};
use ldif_import_core::ParsedDirectory;
use ldif_import_core::primitives::{CN_ATTRIBUTE, MEMBER_DN_ATTRIBUTE, MEMBER_UID_ATTRIBUTES};

impl<S: DirectoryStore, P: PasswordSetter> Importer<'_, S, P> {
    /// Link a user to a group known by name. Returns `true` when the link
    /// exists afterwards.
    pub async fn link(&self, user_id: &str, group: &str) -> bool {
        let Some(&group_id) = self.state.group_ids.get(&group.to_lowercase()) else {
            tracing::debug!(user = user_id, group, "unknown group, link skipped");
            return false;
        };

        match self.store.add_user_to_group(user_id, group_id).await {
            Ok(()) => {
                tracing::debug!(user = user_id, group, "linked");
                true
            }
            Err(StoreError::DuplicateKey(_)) => true,
            Err(e) => {
                tracing::warn!(user = user_id, group, "Link failed: {}", e);
                false
            }
        }
    }

    /// Pass 4: link the literal members and resolvable member DNs of every
    /// group record.
    pub async fn link_memberships(&mut self, parsed: &ParsedDirectory) {
        for record in parsed.records.iter().filter(|r| r.is_group) {
            let Some(group) = record.first(CN_ATTRIBUTE).filter(|cn| !cn.is_empty()) else {
                continue;
            };
            let group = group.to_lowercase();

            let literal = MEMBER_UID_ATTRIBUTES
                .iter()
                .flat_map(|name| record.values(name))
                .map(|uid| uid.to_lowercase());
            let by_dn = record
                .values(MEMBER_DN_ATTRIBUTE)
                .iter()
                .filter_map(|dn| parsed.dn_index.resolve(dn))
                .map(str::to_string);
            let members: Vec<String> = literal.chain(by_dn).collect();

            for member in members {
                if self.link(&member, &group).await {
                    self.state.totals.links_created += 1;
                }
            }
        }
    }
}
