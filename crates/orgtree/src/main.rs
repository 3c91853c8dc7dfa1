//! Orgtree CLI binary.

use anyhow::Result;
use orgtree::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the orgtree CLI.
///
/// Uses tokio's current_thread runtime; every command is a sequence of
/// store reads and writes.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout carries only command output.
    // Example: RUST_LOG=orgtree=debug,orgtree_jsonl=trace orgtree repair
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("orgtree=info,orgtree_jsonl=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("Starting orgtree CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("Orgtree CLI completed successfully");
    Ok(())
}
