//! Pass 3: person reconciliation and group injection.
//!
//! A person goes through: profile derivation, the bounded creation loop
//! (merge on a findable duplicate, otherwise address rotation), a settle and
//! verify step, the password, capability links and the remaining attributes.

use super::Importer;
use crate::gateway::{AttributeValue, DirectoryStore, NewUser, PasswordSetter, StoreError};
use ldif_import_core::primitives::{
    AVATAR_ATTRIBUTE, CN_ATTRIBUTE, JPEG_PHOTO_ATTRIBUTE, LEGACY_DN_ATTRIBUTE, MAX_AVATAR_BYTES,
    MAX_CREATE_ATTEMPTS, POSIX_USER_GROUP, SERVICE_GROUP, is_core_attribute,
};
use ldif_import_core::{ParsedDirectory, PasswordSource, Record, UserProfile, rotate_email};

/// Result of reconciling one person record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    /// The user was created or merged with an existing identity.
    pub created: bool,
    /// Capability links added.
    pub links: usize,
}

/// How the creation loop ended.
enum Creation {
    /// Stored under this identifier.
    Stored(String),
    Abandoned,
}

impl<S: DirectoryStore, P: PasswordSetter> Importer<'_, S, P> {
    /// Pass 3: reconcile every person and ensure every named group.
    pub async fn inject(&mut self, parsed: &ParsedDirectory) {
        for record in &parsed.records {
            if record.is_person {
                let outcome = self.upsert_user(record).await;
                if outcome.created {
                    self.state.totals.users_created += 1;
                }
                self.state.totals.capability_links += outcome.links;
            } else if record.is_group
                && let Some(name) = record.first(CN_ATTRIBUTE).filter(|cn| !cn.is_empty())
                && self.ensure_group(name).await
            {
                self.state.totals.groups_created += 1;
            }
        }
    }

    /// Reconcile one person record against the store.
    ///
    /// Password and attribute failures are logged without revoking success.
    pub async fn upsert_user(&self, record: &Record) -> UpsertOutcome {
        let Some(profile) = UserProfile::derive(record, &self.settings.profile) else {
            tracing::debug!(dn = %record.dn, "no usable identifier, skipping");
            return UpsertOutcome::default();
        };

        match profile.password_source {
            PasswordSource::Imported => {}
            PasswordSource::FallbackMissing => {
                tracing::debug!(user = %profile.id, "no imported password, using fallback");
            }
            PasswordSource::FallbackTooShort(len) => {
                tracing::debug!(user = %profile.id, len, "imported password too short, using fallback");
            }
        }

        let id = match self.create_with_rotation(&profile).await {
            Creation::Stored(id) => id,
            Creation::Abandoned => return UpsertOutcome::default(),
        };

        tokio::time::sleep(self.settings.settle_delay).await;
        match self.store.find_user(&id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::error!(user = %id, "CRITICAL: user created but not findable, skipping");
                return UpsertOutcome::default();
            }
            Err(e) => {
                tracing::error!(user = %id, "CRITICAL: user created but lookup failed: {}", e);
                return UpsertOutcome::default();
            }
        }

        if !id.eq_ignore_ascii_case(&self.settings.admin_username) {
            self.apply_password(&id, &profile.password).await;
        }

        let mut links = 0;
        if profile.has_uid && self.link(&id, POSIX_USER_GROUP).await {
            links += 1;
        }
        if profile.is_service && self.link(&id, SERVICE_GROUP).await {
            links += 1;
        }

        self.apply_attributes(&id, record).await;

        UpsertOutcome {
            created: true,
            links,
        }
    }

    /// Submit creation requests until one succeeds, a merge is found, or a
    /// non-collision error ends the record.
    async fn create_with_rotation(&self, profile: &UserProfile) -> Creation {
        let mut request = NewUser {
            id: profile.id.clone(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        };

        for attempt in 0..MAX_CREATE_ATTEMPTS {
            match self.store.create_user(&request).await {
                Ok(()) => {
                    tracing::info!(user = %request.id, email = %request.email, "USER: {}", request.id);
                    return Creation::Stored(request.id);
                }
                Err(StoreError::DuplicateKey(detail)) => {
                    if let Ok(Some(canonical)) = self.store.find_user(&profile.id).await {
                        tracing::info!(user = %profile.id, canonical = %canonical, "MERGE: {} already present", profile.id);
                        return Creation::Stored(canonical);
                    }
                    request.email = rotate_email(
                        &profile.email,
                        &profile.last_name,
                        attempt,
                        &self.settings.profile.import_domain,
                    );
                    tracing::warn!(
                        user = %profile.id,
                        attempt,
                        email = %request.email,
                        "Address collision, rotating: {}",
                        detail
                    );
                }
                Err(e) => {
                    tracing::error!(user = %profile.id, "Create failed: {}", e);
                    return Creation::Abandoned;
                }
            }
        }

        tracing::error!(user = %profile.id, attempts = MAX_CREATE_ATTEMPTS, "Create failed: attempts exhausted");
        Creation::Abandoned
    }

    /// Set the derived password, retrying once with the fallback.
    async fn apply_password(&self, id: &str, password: &str) {
        let Err(first) = self.passwords.set_password(id, password).await else {
            return;
        };
        tracing::warn!(user = %id, "Password rejected, retrying with fallback: {}", first);

        let fallback = &self.settings.profile.fallback_password;
        if let Err(second) = self.passwords.set_password(id, fallback).await {
            tracing::error!(user = %id, "Password fallback failed: {}", second);
        }
    }

    /// Submit every non-core attribute of a record, plus its legacy DN.
    async fn apply_attributes(&self, id: &str, record: &Record) {
        for (name, values) in &record.attributes {
            if is_core_attribute(name) {
                continue;
            }
            let Some(first) = values.first() else {
                continue;
            };

            if name == AVATAR_ATTRIBUTE || name == JPEG_PHOTO_ATTRIBUTE {
                self.apply_avatar(id, first).await;
                continue;
            }

            let value = AttributeValue::from_values(values);
            if let Err(e) = self.store.insert_user_attribute(id, name, &value).await {
                tracing::warn!(user = %id, attribute = %name, "Attribute update failed: {}", e);
            }
        }

        if !record.dn.is_empty() {
            let value = AttributeValue::Single(record.dn.clone());
            if let Err(e) = self
                .store
                .insert_user_attribute(id, LEGACY_DN_ATTRIBUTE, &value)
                .await
            {
                tracing::warn!(user = %id, "Legacy DN update failed: {}", e);
            }
        }
    }

    async fn apply_avatar(&self, id: &str, raw: &str) {
        let cleaned: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.len() > MAX_AVATAR_BYTES {
            tracing::warn!(
                user = %id,
                bytes = cleaned.len(),
                max = MAX_AVATAR_BYTES,
                "Avatar too large, skipping"
            );
            return;
        }
        if let Err(e) = self.store.update_avatar(id, &cleaned).await {
            tracing::warn!(user = %id, "Avatar update failed: {}", e);
        }
    }
}
