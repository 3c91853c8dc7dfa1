//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A credential file and data directory in a temporary location.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Create `credentials.yaml` pointing at an empty `data/` directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::create_dir(dir.path().join("data")).expect("Failed to create data dir");
        std::fs::write(
            dir.path().join("credentials.yaml"),
            "project-id: test-org\ndata-dir: data\n",
        )
        .expect("Failed to write credentials");
        Self { dir }
    }

    pub fn credentials(&self) -> PathBuf {
        self.dir.path().join("credentials.yaml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    /// Write a collection file from raw JSONL lines.
    pub fn write_collection(&self, collection: &str, lines: &[&str]) {
        let mut content = lines.join("\n");
        content.push('\n');
        std::fs::write(self.collection_path(collection), content)
            .expect("Failed to write collection");
    }

    /// Read a collection file back as JSON values, one per line.
    pub fn read_collection(&self, collection: &str) -> Vec<serde_json::Value> {
        std::fs::read_to_string(self.collection_path(collection))
            .expect("Failed to read collection")
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).expect("Collection line is not JSON"))
            .collect()
    }

    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.data_dir().join(format!("{collection}.jsonl"))
    }
}

/// Path of the built orgtree binary.
pub fn orgtree_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_orgtree"))
}

/// Run the orgtree binary with a clean environment and no colors.
pub fn run_orgtree(dir: &Path, args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(orgtree_binary());
    command
        .args(args)
        .current_dir(dir)
        .env_remove("ORGTREE_CREDENTIALS")
        .env_remove("ORGTREE_ADMIN_PASSWORD")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    for (key, value) in env {
        command.env(key, value);
    }
    command.output().expect("Failed to execute orgtree binary")
}
