//! Lines a resilient read skipped.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Why a line was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The line did not decode into the record type.
    MalformedJson,
    /// The underlying reader failed; the read stopped at this line.
    ReadFailed,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MalformedJson => "malformed JSON",
            Self::ReadFailed => "read failed",
        })
    }
}

/// One skipped line.
///
/// ```
/// use orgtree_jsonl::Warning;
///
/// let warning = Warning::malformed(5, "unexpected end of input");
/// assert_eq!(warning.to_string(), "line 5: malformed JSON: unexpected end of input");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    line_number: usize,
    kind: WarningKind,
    detail: String,
}

impl Warning {
    /// A line that failed to decode.
    pub fn malformed(line_number: usize, detail: impl fmt::Display) -> Self {
        Self {
            line_number,
            kind: WarningKind::MalformedJson,
            detail: detail.to_string(),
        }
    }

    /// A read error at `line_number`.
    pub fn read_failed(line_number: usize, detail: impl fmt::Display) -> Self {
        Self {
            line_number,
            kind: WarningKind::ReadFailed,
            detail: detail.to_string(),
        }
    }

    /// 1-based line number.
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Why the line was skipped.
    #[must_use]
    pub fn kind(&self) -> WarningKind {
        self.kind
    }

    /// Message from the decoder or reader.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line_number, self.kind, self.detail)
    }
}

/// Shared sink for warnings; clones push to the same list.
#[derive(Debug, Clone, Default)]
pub struct WarningCollector {
    warnings: Arc<Mutex<Vec<Warning>>>,
}

impl WarningCollector {
    /// Create an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning.
    pub fn add(&self, warning: Warning) {
        // Pushing can't leave the Vec half-written, so poisoning is ignored.
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning);
    }

    /// Copy of everything recorded so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take the recorded warnings, copying only if another clone is alive.
    #[must_use]
    pub fn into_warnings(self) -> Vec<Warning> {
        match Arc::try_unwrap(self.warnings) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => shared
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        }
    }
}
