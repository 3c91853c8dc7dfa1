//! Domain types for the reports-to hierarchy.
//!
//! Manager records are stored as schemaless documents. [`ManagerNode`] is the
//! typed projection the hierarchy core works with.

use crate::store::Document;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Field holding a manager's human-readable name.
pub const DISPLAY_NAME_FIELD: &str = "displayName";

/// Field holding the uid of the manager this record reports to.
pub const REPORTS_TO_FIELD: &str = "reportsTo";

/// Field stamped whenever this tool modifies a record.
pub const UPDATED_AT_FIELD: &str = "updatedAt";

/// Field stamped when this tool creates a record.
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Unique, stable identifier of a manager record.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerId(String);

impl ManagerId {
    /// Create a new manager ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ManagerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ManagerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One record of the managers collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerNode {
    /// Document id of the record.
    pub uid: ManagerId,

    /// Human-readable name, if the record has one.
    pub display_name: Option<String>,

    /// The manager this record reports to; `None` for a root.
    pub reports_to: Option<ManagerId>,
}

impl ManagerNode {
    /// Project a manager document onto the fields the hierarchy needs.
    ///
    /// `reportsTo` only counts as an edge when it is a non-empty string.
    /// A missing key, `null`, or `""` all mean the record is a root. Any
    /// other JSON type is also treated as a root and logged.
    pub fn from_document(doc: &Document) -> Self {
        let display_name = doc
            .fields
            .get(DISPLAY_NAME_FIELD)
            .and_then(Value::as_str)
            .map(str::to_string);

        let reports_to = match doc.fields.get(REPORTS_TO_FIELD) {
            Some(Value::String(parent)) if !parent.is_empty() => Some(ManagerId::new(parent)),
            None | Some(Value::Null | Value::String(_)) => None,
            Some(other) => {
                tracing::warn!(
                    uid = %doc.id,
                    value = %other,
                    "Ignoring non-string reportsTo value"
                );
                None
            }
        };

        Self {
            uid: ManagerId::new(doc.id.clone()),
            display_name,
            reports_to,
        }
    }
}

/// Format a timestamp the way this tool writes `createdAt`/`updatedAt`.
pub fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true))
}
