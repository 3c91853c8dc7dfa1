//! Output formatting for CLI commands.
//!
//! Every command prints either human-readable text or JSON (`--json`).
//! Text renderers write to any `io::Write` so they can be tested against a
//! buffer; the `print_*` dispatchers target stdout.

pub mod color;

use crate::hierarchy::{AuditReport, Repair, RepairReport};
use crate::provision::ProvisionOutcome;
use color::{bold, dimmed, error, info, success, warning};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

/// Settings controlling text output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `ORGTREE_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("ORGTREE_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self { use_colors }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

/// Serialize a value as pretty JSON followed by a newline.
pub fn print_json<W: Write, T: Serialize + ?Sized>(w: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value).map_err(io::Error::other)?;
    writeln!(w)
}

// ============================================================================
// Repair
// ============================================================================

/// Write the two progress lines for one repair.
pub fn write_repair_progress<W: Write>(
    w: &mut W,
    repair: &Repair,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{} {}", warning("Cycle:", config), repair.path)?;
    writeln!(
        w,
        "  Promoted {} ({}) to root",
        repair.promoted_name,
        info(repair.promoted.as_str(), config)
    )
}

/// Write the closing line of a repair run.
pub fn write_repair_summary<W: Write>(
    w: &mut W,
    report: &RepairReport,
    dry_run: bool,
    config: &OutputConfig,
) -> io::Result<()> {
    let line = if report.fixed == 0 {
        "No cycles found; hierarchy is acyclic.".to_string()
    } else {
        format!("Fixed {} cycle(s); hierarchy is acyclic.", report.fixed)
    };
    writeln!(w, "{}", success(&line, config))?;
    if dry_run {
        writeln!(w, "{}", dimmed("Dry run: no changes were written.", config))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct RepairJson<'a> {
    #[serde(flatten)]
    report: &'a RepairReport,
    dry_run: bool,
}

/// Print a progress line pair to stdout. No-op in JSON mode.
pub fn print_repair_progress(repair: &Repair, mode: OutputMode) -> io::Result<()> {
    if mode == OutputMode::Json {
        return Ok(());
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_repair_progress(&mut handle, repair, &OutputConfig::from_env())
}

/// Print the result of a repair run.
pub fn print_repair_report(report: &RepairReport, dry_run: bool, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => {
            write_repair_summary(&mut handle, report, dry_run, &OutputConfig::from_env())
        }
        OutputMode::Json => print_json(&mut handle, &RepairJson { report, dry_run }),
    }
}

// ============================================================================
// Audit
// ============================================================================

/// Write an audit report as text.
pub fn write_audit_text<W: Write>(
    w: &mut W,
    report: &AuditReport,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(
        w,
        "{} {} managers, {} reports-to edges, {} roots",
        bold("Hierarchy:", config),
        report.managers,
        report.edges,
        report.roots
    )?;

    if !report.dangling.is_empty() {
        let uids: Vec<&str> = report.dangling.iter().map(|uid| uid.as_str()).collect();
        writeln!(
            w,
            "{} {} record(s) report to a missing manager: {}",
            error("Dangling:", config),
            uids.len(),
            uids.join(", ")
        )?;
    }

    if report.is_forest() {
        return writeln!(w, "{}", success("No cycles found; hierarchy is acyclic.", config));
    }

    writeln!(
        w,
        "{}",
        warning(&format!("Found {} cycle(s):", report.cycles.len()), config)
    )?;
    for cycle in &report.cycles {
        writeln!(w, "  {}", cycle.path)?;
    }
    Ok(())
}

#[derive(Serialize)]
struct AuditJson<'a> {
    #[serde(flatten)]
    report: &'a AuditReport,
    acyclic: bool,
}

/// Print an audit report.
pub fn print_audit(report: &AuditReport, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_audit_text(&mut handle, report, &OutputConfig::from_env()),
        OutputMode::Json => print_json(
            &mut handle,
            &AuditJson {
                report,
                acyclic: report.is_forest(),
            },
        ),
    }
}

// ============================================================================
// Provisioning
// ============================================================================

/// Write a provisioning outcome as text.
pub fn write_provision_text<W: Write>(
    w: &mut W,
    outcome: &ProvisionOutcome,
    config: &OutputConfig,
) -> io::Result<()> {
    let verb = if outcome.created { "Created" } else { "Updated" };
    writeln!(
        w,
        "{} admin {} ({})",
        success(verb, config),
        outcome.email,
        info(&outcome.uid, config)
    )
}

/// Print a provisioning outcome.
pub fn print_provision(outcome: &ProvisionOutcome, mode: OutputMode) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();

    match mode {
        OutputMode::Text => write_provision_text(&mut handle, outcome, &OutputConfig::from_env()),
        OutputMode::Json => print_json(&mut handle, outcome),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ManagerId;
    use crate::hierarchy::{AuditedCycle, Cycle};
    use chrono::Utc;

    fn plain() -> OutputConfig {
        OutputConfig::new(false)
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn repair() -> Repair {
        Repair {
            cycle: Cycle::new(vec!["u1".into(), "u2".into(), "u3".into()]).unwrap(),
            path: "Alice -> Bob -> Carol -> Alice".to_string(),
            promoted: ManagerId::new("u1"),
            promoted_name: "Alice".to_string(),
            previous_parent: ManagerId::new("u2"),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn progress_lines() {
        let text = render(|w| write_repair_progress(w, &repair(), &plain()));
        assert_eq!(
            text,
            "Cycle: Alice -> Bob -> Carol -> Alice\n  Promoted Alice (u1) to root\n"
        );
    }

    #[test]
    fn summary_lines() {
        let none = RepairReport::default();
        assert_eq!(
            render(|w| write_repair_summary(w, &none, false, &plain())),
            "No cycles found; hierarchy is acyclic.\n"
        );

        let two = RepairReport {
            fixed: 2,
            ..RepairReport::default()
        };
        let text = render(|w| write_repair_summary(w, &two, true, &plain()));
        assert!(text.starts_with("Fixed 2 cycle(s); hierarchy is acyclic.\n"));
        assert!(text.contains("Dry run"));
    }

    #[test]
    fn audit_text_lists_cycles_and_dangling() {
        let report = AuditReport {
            managers: 4,
            edges: 3,
            roots: 1,
            dangling: vec![ManagerId::new("c")],
            cycles: vec![AuditedCycle {
                members: Cycle::new(vec!["x".into(), "y".into()]).unwrap(),
                path: "Xena -> Yuri -> Xena".to_string(),
            }],
        };

        let text = render(|w| write_audit_text(w, &report, &plain()));

        assert!(text.contains("4 managers, 3 reports-to edges, 1 roots"));
        assert!(text.contains("missing manager: c"));
        assert!(text.contains("Found 1 cycle(s):\n  Xena -> Yuri -> Xena\n"));
    }

    #[test]
    fn audit_json_carries_acyclic_flag() {
        let report = AuditReport {
            managers: 1,
            edges: 0,
            roots: 1,
            dangling: Vec::new(),
            cycles: Vec::new(),
        };
        let text = render(|w| {
            print_json(
                w,
                &AuditJson {
                    report: &report,
                    acyclic: report.is_forest(),
                },
            )
        });
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["acyclic"], true);
        assert_eq!(value["managers"], 1);
    }

    #[test]
    fn provision_text() {
        let outcome = ProvisionOutcome {
            uid: "abc".to_string(),
            email: "root@acme.io".to_string(),
            created: false,
        };
        assert_eq!(
            render(|w| write_provision_text(w, &outcome, &plain())),
            "Updated admin root@acme.io (abc)\n"
        );
    }
}
