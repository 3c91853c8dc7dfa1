//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is rejected at parse
//! time. Each delegates to the provisioning validators to keep one set of
//! rules.

use crate::provision;

/// Validate and normalize an email address.
pub fn validate_email(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    provision::validate_email(trimmed)?;
    Ok(trimmed.to_string())
}

/// Validate a password. Surrounding whitespace is kept.
pub fn validate_password(s: &str) -> Result<String, String> {
    provision::validate_password(s)?;
    Ok(s.to_string())
}

/// Validate and trim a display name.
pub fn validate_display_name(s: &str) -> Result<String, String> {
    provision::validate_display_name(s)?;
    Ok(s.trim().to_string())
}
