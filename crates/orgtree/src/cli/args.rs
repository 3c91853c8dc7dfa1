//! CLI argument structs for all commands.

use clap::Parser;

use super::validators::{validate_display_name, validate_email, validate_password};

/// Environment variable that may supply the admin password.
pub const ADMIN_PASSWORD_ENV: &str = "ORGTREE_ADMIN_PASSWORD";

/// Arguments for the `repair` command
#[derive(Parser, Debug, Clone, Default)]
pub struct RepairArgs {
    /// Show what would be repaired without writing anything
    ///
    /// Runs the repair loop against an in-memory snapshot of the managers
    /// collection.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckArgs {}

/// Arguments for the `provision-admin` command
#[derive(Parser, Debug, Clone)]
pub struct ProvisionAdminArgs {
    /// Login email of the administrator
    #[arg(long, value_parser = validate_email)]
    pub email: String,

    /// Password (at least 8 characters)
    ///
    /// Prefer the environment variable over the flag to keep the password out
    /// of shell history.
    #[arg(long, env = ADMIN_PASSWORD_ENV, hide_env_values = true, value_parser = validate_password)]
    pub password: String,

    /// Name shown for the administrator (1-100 characters)
    #[arg(long, value_parser = validate_display_name)]
    pub display_name: String,
}
