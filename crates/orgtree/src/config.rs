//! Credential and store configuration.
//!
//! The tool is pointed at its store by a *credential file*, located via the
//! `--credentials` flag or the `ORGTREE_CREDENTIALS` environment variable:
//!
//! ```yaml
//! project-id: acme-org
//! data-dir: data          # relative to this file's directory
//! collections:            # optional
//!   managers: managers
//!   profiles: users
//!   accounts: accounts
//! ```
//!
//! JSON credential files are accepted as well.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Environment variable holding the credential file path.
pub const CREDENTIALS_ENV: &str = "ORGTREE_CREDENTIALS";

/// Default name of the managers collection.
pub const DEFAULT_MANAGERS_COLLECTION: &str = "managers";

/// Default name of the user profile collection.
pub const DEFAULT_PROFILES_COLLECTION: &str = "users";

/// Default name of the auth account collection.
pub const DEFAULT_ACCOUNTS_COLLECTION: &str = "accounts";

/// Pick the credential file path: the CLI flag wins over the environment.
///
/// Empty values count as unset.
///
/// # Errors
///
/// Returns [`ConfigError::MissingCredentials`] if neither source is set.
pub fn resolve_locator(
    flag: Option<&Path>,
    env_value: Option<OsString>,
) -> Result<PathBuf, ConfigError> {
    if let Some(path) = flag.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path.to_path_buf());
    }
    env_value
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingCredentials)
}

/// Contents of a credential file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Credentials {
    /// Project the store belongs to; used for logging.
    pub project_id: String,

    /// Directory holding the collection files.
    pub data_dir: PathBuf,

    /// Collection names.
    #[serde(default)]
    pub collections: Collections,
}

/// Names of the collections the tool touches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Collections {
    /// Manager records forming the hierarchy.
    pub managers: String,
    /// User profile records.
    pub profiles: String,
    /// Auth service accounts.
    pub accounts: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            managers: DEFAULT_MANAGERS_COLLECTION.to_string(),
            profiles: DEFAULT_PROFILES_COLLECTION.to_string(),
            accounts: DEFAULT_ACCOUNTS_COLLECTION.to_string(),
        }
    }
}

impl Credentials {
    /// Load and validate a credential file.
    ///
    /// A relative `data-dir` is resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Unreadable`] if the file can't be read and
    /// [`ConfigError::Invalid`] if it doesn't parse or has empty values.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Unreadable {
                path: path.to_path_buf(),
                source,
            })?;

        let invalid = |message: String| ConfigError::Invalid {
            path: path.to_path_buf(),
            message,
        };

        let mut credentials: Self =
            serde_yaml::from_str(&content).map_err(|e| invalid(e.to_string()))?;

        if credentials.project_id.trim().is_empty() {
            return Err(invalid("project-id must not be empty".to_string()));
        }
        if credentials.data_dir.as_os_str().is_empty() {
            return Err(invalid("data-dir must not be empty".to_string()));
        }
        for (key, name) in [
            ("managers", &credentials.collections.managers),
            ("profiles", &credentials.collections.profiles),
            ("accounts", &credentials.collections.accounts),
        ] {
            if name.trim().is_empty() {
                return Err(invalid(format!("collections.{key} must not be empty")));
            }
        }

        if credentials.data_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            credentials.data_dir = base.join(&credentials.data_dir);
        }

        Ok(credentials)
    }
}
