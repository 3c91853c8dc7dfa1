//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `repair`: Break every reports-to cycle until the hierarchy is a forest
//! - `check`: Report cycles and dangling references without writing
//! - `provision-admin`: Create or update an administrator account
//!
//! # Global Flags
//!
//! - `--credentials <PATH>`: Credential file (else `ORGTREE_CREDENTIALS`)
//! - `--json`: Output in JSON format (applies to all commands)
//!
//! # Example
//!
//! ```bash
//! orgtree --credentials ./credentials.yaml check
//! ORGTREE_CREDENTIALS=./credentials.yaml orgtree repair --dry-run
//! ORGTREE_ADMIN_PASSWORD=... orgtree provision-admin --email root@acme.io --display-name Root
//! ```

mod args;
mod execute;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{CheckArgs, ProvisionAdminArgs, RepairArgs, ADMIN_PASSWORD_ENV};
pub use validators::{validate_display_name, validate_email, validate_password};

/// Orgtree - keeps a reports-to hierarchy acyclic
///
/// Finds cycles in the managers collection and breaks each by promoting one
/// member to root.
#[derive(Parser, Debug)]
#[command(name = "orgtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Credential file locating the store (overrides ORGTREE_CREDENTIALS)
    #[arg(long, global = true, value_name = "PATH")]
    pub credentials: Option<PathBuf>,

    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Break reports-to cycles until none remain
    ///
    /// Repeatedly reloads the managers collection, finds one cycle, and
    /// clears the `reportsTo` of the cycle's entry record. Safe to re-run.
    Repair(RepairArgs),

    /// Report the hierarchy's shape without writing
    ///
    /// Lists every cycle and every record reporting to a missing manager.
    Check(CheckArgs),

    /// Create or update an administrator account and profile
    ProvisionAdmin(ProvisionAdminArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// Credentials are resolved before any store access; a missing locator
    /// fails here.
    pub async fn execute(&self) -> Result<()> {
        use crate::app::App;
        use crate::config::{resolve_locator, CREDENTIALS_ENV};
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        let Some(command) = &self.command else {
            println!("Orgtree reports-to hierarchy repair");
            println!("Use --help for more information");
            return Ok(());
        };

        let locator = resolve_locator(
            self.credentials.as_deref(),
            std::env::var_os(CREDENTIALS_ENV),
        )?;
        let mut app = App::from_locator(&locator).await?;

        match command {
            Commands::Repair(args) => execute::execute_repair(&mut app, args, output_mode).await,
            Commands::Check(args) => execute::execute_check(&app, args, output_mode).await,
            Commands::ProvisionAdmin(args) => {
                execute::execute_provision_admin(&mut app, args, output_mode).await
            }
        }
    }
}
