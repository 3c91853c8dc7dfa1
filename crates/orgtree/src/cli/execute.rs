//! Command execution logic.

use anyhow::Result;

use super::args::{CheckArgs, ProvisionAdminArgs, RepairArgs};
use crate::app::App;
use crate::error::Error;
use crate::hierarchy::{audit, load_graph, RepairLoop, RepairReport};
use crate::output::{self, OutputMode};
use crate::provision::{provision_admin, AdminRequest};
use crate::store::{DocumentStore, InMemoryStore};

/// Execute the repair command
pub async fn execute_repair(app: &mut App, args: &RepairArgs, output_mode: OutputMode) -> Result<()> {
    let collection = app.collections().managers.clone();
    tracing::info!(
        project = app.project_id(),
        collection = %collection,
        dry_run = args.dry_run,
        "Starting repair"
    );

    let report = if args.dry_run {
        let mut snapshot = InMemoryStore::snapshot_of(app.store(), &[collection.as_str()])
            .await
            .map_err(|source| Error::StoreRead {
                collection: collection.clone(),
                source,
            })?;
        run_repair(&mut snapshot, &collection, output_mode).await?
    } else {
        run_repair(app.store_mut(), &collection, output_mode).await?
    };

    output::print_repair_report(&report, args.dry_run, output_mode)?;
    Ok(())
}

/// Run the loop, printing each repair as soon as it is persisted.
async fn run_repair(
    store: &mut dyn DocumentStore,
    collection: &str,
    output_mode: OutputMode,
) -> Result<RepairReport> {
    let mut printed = Ok(());
    let report = RepairLoop::new(store, collection)
        .run_with(|repair| {
            if printed.is_ok() {
                printed = output::print_repair_progress(repair, output_mode);
            }
        })
        .await?;
    printed?;
    Ok(report)
}

/// Execute the check command
pub async fn execute_check(app: &App, _args: &CheckArgs, output_mode: OutputMode) -> Result<()> {
    let graph = load_graph(app.store(), &app.collections().managers).await?;
    let report = audit(&graph);

    if !report.is_forest() {
        tracing::warn!(cycles = report.cycles.len(), "Hierarchy contains cycles");
    }
    output::print_audit(&report, output_mode)?;
    Ok(())
}

/// Execute the provision-admin command
pub async fn execute_provision_admin(
    app: &mut App,
    args: &ProvisionAdminArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let profiles = app.collections().profiles.clone();
    let request = AdminRequest {
        email: args.email.clone(),
        password: args.password.clone(),
        display_name: args.display_name.clone(),
    };

    let (directory, store) = app.provisioning_parts();
    let outcome = provision_admin(directory, store, &profiles, &request).await?;

    output::print_provision(&outcome, output_mode)?;
    Ok(())
}
