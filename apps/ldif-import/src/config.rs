//! # Configuration
//!
//! Run settings, layered as: built-in defaults < TOML file (`--config`) <
//! command-line flags.
//!
//! ```toml
//! base_url = "https://id.example.com"
//! admin_username = "admin"
//! fallback_password = "ChangeMe!2025"
//! service_domain = "example.com"
//! import_domain = "imported.local"
//! set_password_bin = "/usr/local/bin/lldap_set_password"
//! settle_delay_ms = 50
//! accept_invalid_certs = false
//! ```
//!
//! The admin password is deliberately absent: it is read from
//! [`PASSWORD_ENV_VAR`] only.

use crate::cli::Cli;
use crate::engine::ImportSettings;
use crate::error::AppError;
use ldif_import_core::ProfileDefaults;
use ldif_import_core::primitives::{
    DEFAULT_ADMIN_USERNAME, DEFAULT_BASE_URL, DEFAULT_FALLBACK_PASSWORD, DEFAULT_IMPORT_DOMAIN,
    DEFAULT_SERVICE_DOMAIN, DEFAULT_SET_PASSWORD_BIN, DEFAULT_SETTLE_DELAY_MS,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the admin password.
pub const PASSWORD_ENV_VAR: &str = "LLDAP_PASS";

/// Effective run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Store base URL (the API lives under `/api/graphql`).
    pub base_url: String,
    /// Account used to log in; its password is never changed.
    pub admin_username: String,
    pub fallback_password: String,
    pub service_domain: String,
    pub import_domain: String,
    /// Path of the `lldap_set_password` executable.
    pub set_password_bin: PathBuf,
    /// Pause between creating a user and re-reading it.
    pub settle_delay_ms: u64,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            admin_username: DEFAULT_ADMIN_USERNAME.to_string(),
            fallback_password: DEFAULT_FALLBACK_PASSWORD.to_string(),
            service_domain: DEFAULT_SERVICE_DOMAIN.to_string(),
            import_domain: DEFAULT_IMPORT_DOMAIN.to_string(),
            set_password_bin: PathBuf::from(DEFAULT_SET_PASSWORD_BIN),
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            accept_invalid_certs: false,
        }
    }
}

impl Config {
    /// Parse a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    AppError::Config(format!("cannot read '{}': {e}", path.display()))
                })?;
                Self::from_toml_str(&text)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref url) = cli.url {
            self.base_url.clone_from(url);
        }
        if let Some(ref admin) = cli.admin {
            self.admin_username.clone_from(admin);
        }
        if let Some(ref bin) = cli.set_password_bin {
            self.set_password_bin.clone_from(bin);
        }
        if cli.insecure {
            self.accept_invalid_certs = true;
        }
    }

    /// Settings consumed by the import engine.
    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            admin_username: self.admin_username.clone(),
            profile: ProfileDefaults {
                service_domain: self.service_domain.clone(),
                import_domain: self.import_domain.clone(),
                fallback_password: self.fallback_password.clone(),
            },
            settle_delay: Duration::from_millis(self.settle_delay_ms),
        }
    }
}

/// Read the admin password from the environment.
pub fn admin_password_from_env() -> Result<String, AppError> {
    std::env::var(PASSWORD_ENV_VAR)
        .ok()
        .filter(|p| !p.is_empty())
        .ok_or(AppError::MissingCredential(PASSWORD_ENV_VAR))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml_str("base_url = \"https://id.example.com\"\n").expect("config");
        assert_eq!(config.base_url, "https://id.example.com");
        assert_eq!(config.admin_username, DEFAULT_ADMIN_USERNAME);
        assert_eq!(config.settle_delay_ms, DEFAULT_SETTLE_DELAY_MS);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Config::from_toml_str("admin_password = \"hunter2\"\n");
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn import_settings_carry_profile_defaults() {
        let config = Config {
            service_domain: "corp.example".to_string(),
            settle_delay_ms: 0,
            ..Config::default()
        };
        let settings = config.import_settings();
        assert_eq!(settings.profile.service_domain, "corp.example");
        assert_eq!(settings.settle_delay, Duration::ZERO);
    }
}
