//! # Password Tool
//!
//! [`PasswordSetter`] that shells out to LLDAP's `lldap_set_password`
//! executable. Passwords never go through the GraphQL API.

use super::{PasswordError, PasswordSetter};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Runs `<bin> --base-url <url> --token <jwt> --username <id> --password <pw>`.
#[derive(Debug, Clone)]
pub struct CommandPasswordSetter {
    bin: PathBuf,
    base_url: String,
    token: String,
}

impl CommandPasswordSetter {
    pub fn new(bin: &Path, base_url: &str, token: &str) -> Self {
        Self {
            bin: bin.to_path_buf(),
            base_url: base_url.to_string(),
            token: token.to_string(),
        }
    }
}

impl PasswordSetter for CommandPasswordSetter {
    async fn set_password(&self, user_id: &str, password: &str) -> Result<(), PasswordError> {
        let output = Command::new(&self.bin)
            .arg("--base-url")
            .arg(&self.base_url)
            .arg("--token")
            .arg(&self.token)
            .arg("--username")
            .arg(user_id)
            .arg("--password")
            .arg(password)
            .output()
            .await
            .map_err(|e| PasswordError::Unavailable(format!("{}: {e}", self.bin.display())))?;

        if output.status.success() {
            return Ok(());
        }

        let mut detail = String::from_utf8_lossy(&output.stdout).into_owned();
        detail.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(PasswordError::Failed(format!(
            "{}: {}",
            output.status,
            detail.trim()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let setter = CommandPasswordSetter::new(
            Path::new("/nonexistent/lldap_set_password"),
            "http://localhost:17170",
            "token",
        );
        let result = setter.set_password("bob", "secret-password").await;
        assert!(matches!(result, Err(PasswordError::Unavailable(_))));
    }
}
