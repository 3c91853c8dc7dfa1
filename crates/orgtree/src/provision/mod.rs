//! Administrator account provisioning.
//!
//! Creates or updates an administrator login in the auth directory and keeps
//! a matching profile record in the profiles collection. Shares nothing with
//! the hierarchy code beyond the store.

mod directory;

pub use directory::{
    admin_claims, Account, AccountUpdate, AuthDirectory, NewAccount, StoreAuthDirectory,
    CLAIMS_FIELD, EMAIL_FIELD, PASSWORD_HASH_FIELD,
};

use crate::domain::{timestamp, CREATED_AT_FIELD, DISPLAY_NAME_FIELD, UPDATED_AT_FIELD};
use crate::error::{Error, Result};
use crate::store::{Document, DocumentStore};
use chrono::Utc;
use serde::Serialize;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum display name length in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Profile field holding the user's role.
pub const ROLE_FIELD: &str = "role";

/// Role recorded on administrator profiles.
pub const ADMIN_ROLE: &str = "admin";

/// An administrator to provision.
#[derive(Debug, Clone)]
pub struct AdminRequest {
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Name shown for the account.
    pub display_name: String,
}

impl AdminRequest {
    /// Check every field, returning the first problem found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] describing the invalid field.
    pub fn validate(&self) -> Result<()> {
        validate_email(&self.email).map_err(Error::Validation)?;
        validate_password(&self.password).map_err(Error::Validation)?;
        validate_display_name(&self.display_name).map_err(Error::Validation)?;
        Ok(())
    }
}

/// Result of a provisioning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    /// Uid of the administrator account.
    pub uid: String,
    /// Email of the administrator account.
    pub email: String,
    /// Whether the account was newly created.
    pub created: bool,
}

/// Check an email address: `local@domain.tld`, no whitespace.
pub fn validate_email(email: &str) -> std::result::Result<(), String> {
    let invalid = || format!("'{email}' is not a valid email address");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
        _ => Err(invalid()),
    }
}

/// Check a password's length.
pub fn validate_password(password: &str) -> std::result::Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Check a display name: non-blank, at most 100 characters.
pub fn validate_display_name(name: &str) -> std::result::Result<(), String> {
    if name.trim().is_empty() {
        return Err("Display name cannot be empty".to_string());
    }
    if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(format!(
            "Display name cannot exceed {MAX_DISPLAY_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Create or update an administrator and their profile.
///
/// If an account already uses the email its password, display name, and
/// claims are overwritten; otherwise a new account is created. The profile
/// document is merged, so fields this tool doesn't manage survive.
///
/// # Errors
///
/// Returns [`Error::Validation`] for a bad request, before anything is
/// written. Directory and store failures are propagated.
pub async fn provision_admin(
    directory: &mut dyn AuthDirectory,
    store: &mut dyn DocumentStore,
    profiles_collection: &str,
    request: &AdminRequest,
) -> Result<ProvisionOutcome> {
    request.validate()?;
    let display_name = request.display_name.trim();

    let (uid, created) = match directory.find_by_email(&request.email).await? {
        Some(existing) => {
            directory
                .update_account(
                    &existing.uid,
                    AccountUpdate {
                        password: Some(&request.password),
                        display_name: Some(display_name),
                        claims: Some(admin_claims()),
                    },
                )
                .await?;
            tracing::info!(uid = %existing.uid, "Updated existing account");
            (existing.uid, false)
        }
        None => {
            let account = directory
                .create_account(NewAccount {
                    email: &request.email,
                    password: &request.password,
                    display_name,
                    claims: admin_claims(),
                })
                .await?;
            tracing::info!(uid = %account.uid, "Created account");
            (account.uid, true)
        }
    };

    let now = timestamp(Utc::now());
    let mut profile = Document::new(uid.clone())
        .with_field(EMAIL_FIELD, request.email.as_str())
        .with_field(DISPLAY_NAME_FIELD, display_name)
        .with_field(ROLE_FIELD, ADMIN_ROLE)
        .with_field(UPDATED_AT_FIELD, now.clone());
    if created {
        profile = profile.with_field(CREATED_AT_FIELD, now);
    }

    store
        .set(profiles_collection, profile, true)
        .await
        .map_err(|source| Error::StoreWrite {
            collection: profiles_collection.to_string(),
            id: uid.clone(),
            source,
        })?;

    Ok(ProvisionOutcome {
        uid,
        email: request.email.clone(),
        created,
    })
}
