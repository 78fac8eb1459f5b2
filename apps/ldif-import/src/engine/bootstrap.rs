//! Pass 0 and Pass 2: store introspection, capability groups, self-test and
//! custom attribute registration.

use super::Importer;
use crate::error::AppError;
use crate::gateway::{DirectoryStore, NewUser, PasswordSetter};
use ldif_import_core::primitives::LEGACY_DN_ATTRIBUTE;
use ldif_import_core::{ParsedDirectory, SchemaTarget};

/// Identifier of the throwaway account used by the self-test.
pub const SELF_TEST_USER: &str = "_import_test_user";

impl<S: DirectoryStore, P: PasswordSetter> Importer<'_, S, P> {
    /// Create, set a password on, read back and delete a throwaway user.
    ///
    /// Any failure except the final cleanup is fatal for the run.
    pub async fn self_test(&mut self) -> Result<(), AppError> {
        tracing::info!("Running self-test (Create -> Set PW -> Read -> Delete)...");

        // Leftover from an interrupted run; absence is fine.
        let _ = self.store.delete_user(SELF_TEST_USER).await;

        let user = NewUser {
            id: SELF_TEST_USER.to_string(),
            email: "test@local.test".to_string(),
            display_name: "Test User".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        };
        self.store
            .create_user(&user)
            .await
            .map_err(|e| AppError::SelfTest(format!("could not create test user: {e}")))?;

        self.passwords
            .set_password(SELF_TEST_USER, &self.settings.profile.fallback_password)
            .await
            .map_err(|e| AppError::SelfTest(format!("could not set password: {e}")))?;

        match self.store.find_user(SELF_TEST_USER).await {
            Ok(Some(id)) if id.eq_ignore_ascii_case(SELF_TEST_USER) => {}
            Ok(_) => {
                return Err(AppError::SelfTest(
                    "test user not found after creation".to_string(),
                ));
            }
            Err(e) => {
                return Err(AppError::SelfTest(format!(
                    "could not retrieve test user: {e}"
                )));
            }
        }

        match self.store.delete_user(SELF_TEST_USER).await {
            Ok(()) => tracing::info!("Self-test OK"),
            Err(e) => tracing::warn!("Could not delete test user: {}", e),
        }
        Ok(())
    }

    /// Seed the attribute cache from the store's schemas.
    pub async fn warmup_schema(&mut self) {
        match self.store.list_attribute_names().await {
            Ok(names) => {
                for name in names {
                    self.state.attributes.insert(name);
                }
                tracing::debug!(count = self.state.attributes.len(), "schema warmup done");
            }
            Err(e) => tracing::warn!("Schema warmup failed: {}", e),
        }
    }

    /// Seed the group map from the store's existing groups.
    pub async fn warmup_groups(&mut self) {
        match self.store.list_groups().await {
            Ok(groups) => {
                for group in groups {
                    self.state
                        .group_ids
                        .insert(group.display_name.to_lowercase(), group.id);
                }
                tracing::debug!(count = self.state.group_ids.len(), "group warmup done");
            }
            Err(e) => tracing::warn!("Group warmup failed: {}", e),
        }
    }

    /// Make sure a group exists. Returns `true` only when it was created now.
    pub async fn ensure_group(&mut self, name: &str) -> bool {
        let key = name.to_lowercase();
        if self.state.group_ids.contains_key(&key) {
            return false;
        }
        match self.store.create_group(name).await {
            Ok(id) => {
                self.state.group_ids.insert(key, id);
                tracing::info!(group = name, id, "GROUP: {}", name);
                true
            }
            Err(e) => {
                tracing::warn!(group = name, "Could not create group: {}", e);
                false
            }
        }
    }

    /// Register a custom attribute unless any spelling of it exists.
    ///
    /// Existing definitions are never updated. Returns `true` when the
    /// attribute was registered now.
    pub async fn ensure_attribute(&mut self, target: SchemaTarget, name: &str, is_list: bool) -> bool {
        if self.state.attributes.contains(name) {
            return false;
        }
        match self.store.add_attribute(target, name, is_list).await {
            Ok(()) => {
                self.state.attributes.insert(name);
                tracing::info!(%target, attribute = name, is_list, "ATTR: {}", name);
                true
            }
            Err(e) => {
                tracing::warn!(%target, attribute = name, "Could not register attribute: {}", e);
                false
            }
        }
    }

    /// Pass 2: declare the legacy DN attribute and every catalog attribute.
    pub async fn sync_schema(&mut self, parsed: &ParsedDirectory) {
        self.ensure_attribute(SchemaTarget::User, LEGACY_DN_ATTRIBUTE, false)
            .await;
        for attr in parsed.user_schema.iter() {
            self.ensure_attribute(SchemaTarget::User, &attr.name, attr.is_list)
                .await;
        }
        for attr in parsed.group_schema.iter() {
            self.ensure_attribute(SchemaTarget::Group, &attr.name, attr.is_list)
                .await;
        }
    }
}
