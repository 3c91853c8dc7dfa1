//! Orgtree - keeps a reports-to hierarchy acyclic.
//!
//! Manager records live in a document store. Each record may name one
//! manager it reports to, so the hierarchy is a functional graph that must
//! stay a forest. This crate finds cycles introduced by upstream writers and
//! breaks them, one edge per cycle, until none remain.
//!
//! The crate provides both the `orgtree` CLI and a library:
//!
//! - [`store`]: the document store abstraction and its backends
//! - [`hierarchy`]: graph loading, cycle detection, repair, and audit
//! - [`provision`]: administrator account provisioning

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod hierarchy;
pub mod id_generation;
pub mod provision;
pub mod store;

// Public CLI module (needed by binary)
pub mod cli;

pub(crate) mod output;
