//! Result presentation.

use std::fmt::Write as _;

use serde::Serialize;

use crate::checks::CheckKind;
use crate::resolver::ResolverStats;
use crate::violation::ViolationSet;

#[derive(Debug, Clone, Serialize)]
pub struct CheckStats {
    pub check: CheckKind,
    /// Size of the focus set the check walked.
    pub targets: usize,
    pub violations: usize,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunStats {
    pub data_triples: usize,
    pub schema_triples: usize,
    pub declared_properties: usize,
    pub disjoint_pairs: usize,
    pub checks: Vec<CheckStats>,
    pub resolver: ResolverStats,
    pub duration_ms: u64,
}

/// Outcome of one validation run.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub violations: ViolationSet,
    pub stats: RunStats,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// One line, e.g. `3 violations (1 domain_mismatch, 2 range_mismatch)`.
    pub fn summary(&self) -> String {
        let total = self.violations.len();
        if total == 0 {
            return "no violations".to_string();
        }
        let per_kind = self
            .violations
            .kinds()
            .into_iter()
            .map(|kind| format!("{} {}", self.violations.count_of(kind), kind))
            .collect::<Vec<_>>()
            .join(", ");
        let noun = if total == 1 { "violation" } else { "violations" };
        format!("{total} {noun} ({per_kind})")
    }
}

/// Human-readable listing, grouped by violation kind.
pub fn render_text(report: &ValidationReport) -> String {
    let mut out = String::new();

    for kind in report.violations.kinds() {
        let _ = writeln!(out, "{kind}:");
        for violation in report.violations.of_kind(kind) {
            let _ = writeln!(out, "  - {violation}");
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{} ({} data triples, {} schema triples, {} ms)",
        report.summary(),
        report.stats.data_triples,
        report.stats.schema_triples,
        report.stats.duration_ms
    );
    out
}

pub fn render_json(report: &ValidationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
