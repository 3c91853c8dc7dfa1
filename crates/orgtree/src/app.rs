//! Application context for CLI command execution.
//!
//! `App` resolves credentials, opens the configured store and auth directory,
//! and hands them to the commands.
//!
//! # Example
//!
//! ```no_run
//! use orgtree::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_locator(Path::new("credentials.yaml")).await?;
//!     println!("managers live in '{}'", app.collections().managers);
//!     Ok(())
//! }
//! ```

use crate::config::{Collections, Credentials};
use crate::error::{ConfigError, Error, Result};
use crate::provision::{AuthDirectory, StoreAuthDirectory};
use crate::store::{DocumentStore, JsonlStore};
use std::path::Path;

/// Application context for CLI operations.
pub struct App {
    /// The storage backend (trait object for polymorphism)
    store: Box<dyn DocumentStore>,

    /// Auth accounts, kept in their own collection
    directory: StoreAuthDirectory,

    /// Loaded credentials
    credentials: Credentials,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("credentials", &self.credentials)
            .field("store", &"<dyn DocumentStore>")
            .field("directory", &self.directory)
            .finish()
    }
}

impl App {
    /// Create an App from a credential file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The credential file cannot be read or is invalid
    /// - The data directory it names does not exist
    pub async fn from_locator(locator: &Path) -> Result<Self> {
        let credentials = Credentials::load(locator).await?;
        tracing::debug!(
            project = %credentials.project_id,
            data_dir = %credentials.data_dir.display(),
            "Loaded credentials"
        );

        let store = open_data_dir(locator, &credentials).await?;
        let directory =
            StoreAuthDirectory::new(Box::new(store.clone()), &credentials.collections.accounts);

        Ok(Self {
            store: Box::new(store),
            directory,
            credentials,
        })
    }

    /// Get a mutable reference to the store.
    pub fn store_mut(&mut self) -> &mut dyn DocumentStore {
        self.store.as_mut()
    }

    /// Get an immutable reference to the store.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Borrow the auth directory and the store together, for provisioning.
    pub fn provisioning_parts(&mut self) -> (&mut dyn AuthDirectory, &mut dyn DocumentStore) {
        (&mut self.directory, self.store.as_mut())
    }

    /// Collection names from the credentials.
    pub fn collections(&self) -> &Collections {
        &self.credentials.collections
    }

    /// Project id from the credentials.
    pub fn project_id(&self) -> &str {
        &self.credentials.project_id
    }
}

/// Open the JSONL store under the credentials' data directory.
///
/// The store and the auth directory share one handle on the same directory.
async fn open_data_dir(locator: &Path, credentials: &Credentials) -> Result<JsonlStore> {
    JsonlStore::open(credentials.data_dir.clone())
        .await
        .map_err(|e| {
            Error::Config(ConfigError::Invalid {
                path: locator.to_path_buf(),
                message: e.to_string(),
            })
        })
}
