//! Auth account directory.

use crate::domain::{timestamp, CREATED_AT_FIELD, DISPLAY_NAME_FIELD, UPDATED_AT_FIELD};
use crate::error::{Error, Result};
use crate::id_generation::{hash_password, UidGenerator};
use crate::store::{Document, DocumentPatch, DocumentStore};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Field holding an account's login email.
pub const EMAIL_FIELD: &str = "email";

/// Field holding an account's password hash.
pub const PASSWORD_HASH_FIELD: &str = "passwordHash";

/// Field holding an account's custom claims.
pub const CLAIMS_FIELD: &str = "claims";

/// An auth service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    /// Account uid.
    pub uid: String,
    /// Login email.
    pub email: String,
    /// Name shown for the account.
    pub display_name: Option<String>,
}

impl Account {
    fn from_document(doc: &Document) -> Self {
        Self {
            uid: doc.id.clone(),
            email: doc.str_field(EMAIL_FIELD).unwrap_or_default().to_string(),
            display_name: doc.str_field(DISPLAY_NAME_FIELD).map(str::to_string),
        }
    }
}

/// Data for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount<'a> {
    /// Login email.
    pub email: &'a str,
    /// Plain-text password; only its hash is stored.
    pub password: &'a str,
    /// Name shown for the account.
    pub display_name: &'a str,
    /// Custom claims attached to the account.
    pub claims: Map<String, Value>,
}

/// Changes to an existing account. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate<'a> {
    /// New plain-text password.
    pub password: Option<&'a str>,
    /// New display name.
    pub display_name: Option<&'a str>,
    /// Replacement custom claims.
    pub claims: Option<Map<String, Value>>,
}

/// An auth service holding login accounts.
#[async_trait]
pub trait AuthDirectory: Send + Sync {
    /// Look up an account by email, ignoring ASCII case.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Create an account and return it with its new uid.
    async fn create_account(&mut self, account: NewAccount<'_>) -> Result<Account>;

    /// Apply changes to an existing account.
    async fn update_account(&mut self, uid: &str, update: AccountUpdate<'_>) -> Result<()>;
}

/// [`AuthDirectory`] kept in a collection of a [`DocumentStore`].
pub struct StoreAuthDirectory {
    store: Box<dyn DocumentStore>,
    collection: String,
}

impl std::fmt::Debug for StoreAuthDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreAuthDirectory")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl StoreAuthDirectory {
    /// Keep accounts in `collection` of `store`.
    pub fn new(store: Box<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    async fn accounts(&self) -> Result<Vec<Document>> {
        self.store
            .list(&self.collection)
            .await
            .map_err(|source| Error::StoreRead {
                collection: self.collection.clone(),
                source,
            })
    }

    fn write_error(&self, id: &str) -> impl FnOnce(crate::error::StoreError) -> Error {
        let collection = self.collection.clone();
        let id = id.to_string();
        move |source| Error::StoreWrite {
            collection,
            id,
            source,
        }
    }
}

#[async_trait]
impl AuthDirectory for StoreAuthDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts()
            .await?
            .iter()
            .find(|doc| {
                doc.str_field(EMAIL_FIELD)
                    .is_some_and(|e| e.eq_ignore_ascii_case(email))
            })
            .map(Account::from_document))
    }

    async fn create_account(&mut self, account: NewAccount<'_>) -> Result<Account> {
        let mut generator = UidGenerator::new();
        for doc in self.accounts().await? {
            generator.register(doc.id);
        }
        let uid = generator
            .generate(account.email)
            .map_err(|e| Error::Provision(e.to_string()))?;

        let now = timestamp(Utc::now());
        let doc = Document::new(uid.clone())
            .with_field(EMAIL_FIELD, account.email)
            .with_field(DISPLAY_NAME_FIELD, account.display_name)
            .with_field(PASSWORD_HASH_FIELD, hash_password(account.password))
            .with_field(CLAIMS_FIELD, Value::Object(account.claims))
            .with_field(CREATED_AT_FIELD, now.clone())
            .with_field(UPDATED_AT_FIELD, now);

        self.store
            .set(&self.collection, doc, false)
            .await
            .map_err(self.write_error(&uid))?;
        tracing::debug!(%uid, "Created account");

        Ok(Account {
            uid,
            email: account.email.to_string(),
            display_name: Some(account.display_name.to_string()),
        })
    }

    async fn update_account(&mut self, uid: &str, update: AccountUpdate<'_>) -> Result<()> {
        let mut patch = DocumentPatch::new().set(UPDATED_AT_FIELD, timestamp(Utc::now()));
        if let Some(password) = update.password {
            patch = patch.set(PASSWORD_HASH_FIELD, hash_password(password));
        }
        if let Some(name) = update.display_name {
            patch = patch.set(DISPLAY_NAME_FIELD, name);
        }
        if let Some(claims) = update.claims {
            patch = patch.set(CLAIMS_FIELD, Value::Object(claims));
        }

        self.store
            .update(&self.collection, uid, &patch)
            .await
            .map_err(self.write_error(uid))?;
        tracing::debug!(%uid, "Updated account");
        Ok(())
    }
}

/// Custom claims marking an administrator.
pub fn admin_claims() -> Map<String, Value> {
    match json!({ "admin": true }) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
