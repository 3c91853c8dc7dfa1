//! JSON Lines record I/O for the orgtree document store.
//!
//! Every collection of the store is a JSONL file: one JSON object per line.
//! This crate provides the pieces the store is built from:
//!
//! - [`JsonlReader`] / [`JsonlWriter`]: buffered async line I/O with line tracking
//! - [`read_jsonl`] / [`read_jsonl_resilient`]: whole-file loading, strict or
//!   skipping malformed lines with [`Warning`]s
//! - [`write_jsonl_atomic`]: crash-safe rewrites via temp file and rename

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod atomic;
pub mod error;
pub mod reader;
pub mod stream;
pub mod warning;
pub mod writer;

pub use atomic::{write_jsonl_atomic, write_jsonl_atomic_iter};
pub use error::{Error, Result};
pub use reader::{read_jsonl, read_jsonl_resilient, JsonlReader};
pub use warning::{Warning, WarningCollector, WarningKind};
pub use writer::JsonlWriter;
