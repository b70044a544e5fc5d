//! Report Data Structures

use chrono::{DateTime, Utc};
use numbench_core::{ValidationOutcome, ValidationStatus};
use numbench_stats::SummaryStatistics;
use serde::{Deserialize, Serialize};

/// Final state of one (algorithm, implementation, scenario) cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellStatus {
    /// Validated and timed.
    Measured,
    /// Output disagreed with the reference; excluded from timing.
    ValidationFailed,
    /// Backend artifact or symbol could not be bound.
    Unavailable,
    /// Backend failed, panicked or timed out during execution.
    ExecutionFailed,
    /// Not run because the reference produced no output to validate against.
    Skipped,
}

/// Final aggregate for one cell - the unit of output handed to downstream
/// formatting and storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Algorithm family name.
    pub algorithm: String,
    /// Implementation tag.
    pub implementation: String,
    /// Scenario label.
    pub scenario: String,
    /// Whether this row is the trusted reference.
    pub is_reference: bool,
    /// Final cell state.
    pub status: CellStatus,
    /// Equivalence check result; absent for unbound or skipped cells.
    pub validation: Option<ValidationOutcome>,
    /// Timing statistics; present only for measured cells.
    pub timing: Option<SummaryStatistics>,
    /// Binding or execution error text, where one occurred.
    pub error: Option<String>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Harness version.
    pub version: String,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
    /// Host operating system.
    pub os: String,
    /// Host CPU architecture.
    pub arch: String,
    /// Warmup iterations per cell.
    pub warmup_iterations: u32,
    /// Timed iterations per cell.
    pub repeat_iterations: u32,
}

/// Per-status counts across the whole run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total number of cells in the report.
    pub total_cells: usize,
    /// Cells validated and timed.
    pub measured: usize,
    /// Cells whose output disagreed with the reference.
    pub validation_failures: usize,
    /// Cells whose backend could not be bound.
    pub unavailable: usize,
    /// Cells that failed, panicked or timed out during execution.
    pub execution_failures: usize,
    /// Cells skipped for lack of a reference output.
    pub skipped: usize,
}

/// Complete benchmark report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata.
    pub meta: ReportMeta,
    /// Per-cell records, in execution order.
    pub records: Vec<ReportRecord>,
    /// Aggregate counts.
    pub summary: ReportSummary,
}

impl Report {
    /// Assemble a report, computing the summary from the records.
    pub fn new(meta: ReportMeta, records: Vec<ReportRecord>) -> Self {
        let summary = summarize(&records);
        Self {
            meta,
            records,
            summary,
        }
    }

    /// Whether any cell failed validation or crashed during execution.
    /// Unavailable backends alone do not count as failures.
    pub fn has_failures(&self) -> bool {
        self.summary.validation_failures > 0 || self.summary.execution_failures > 0
    }
}

fn summarize(records: &[ReportRecord]) -> ReportSummary {
    let mut summary = ReportSummary {
        total_cells: records.len(),
        ..ReportSummary::default()
    };
    for record in records {
        match record.status {
            CellStatus::Measured => summary.measured += 1,
            CellStatus::ValidationFailed => summary.validation_failures += 1,
            CellStatus::Unavailable => summary.unavailable += 1,
            CellStatus::ExecutionFailed => summary.execution_failures += 1,
            CellStatus::Skipped => summary.skipped += 1,
        }
    }
    summary
}

impl ReportRecord {
    /// Convenience check for a validated-and-timed cell.
    pub fn is_measured(&self) -> bool {
        self.status == CellStatus::Measured
    }

    /// Whether the cell's equivalence check passed.
    pub fn validation_passed(&self) -> bool {
        matches!(
            &self.validation,
            Some(outcome) if outcome.status == ValidationStatus::Passed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: CellStatus) -> ReportRecord {
        ReportRecord {
            algorithm: "sieve".to_string(),
            implementation: "c".to_string(),
            scenario: "n=10".to_string(),
            is_reference: false,
            status,
            validation: None,
            timing: None,
            error: None,
        }
    }

    #[test]
    fn summary_counts_every_status() {
        let report = Report::new(
            test_meta(),
            vec![
                record(CellStatus::Measured),
                record(CellStatus::Measured),
                record(CellStatus::ValidationFailed),
                record(CellStatus::Unavailable),
                record(CellStatus::ExecutionFailed),
                record(CellStatus::Skipped),
            ],
        );

        assert_eq!(report.summary.total_cells, 6);
        assert_eq!(report.summary.measured, 2);
        assert_eq!(report.summary.validation_failures, 1);
        assert_eq!(report.summary.unavailable, 1);
        assert_eq!(report.summary.execution_failures, 1);
        assert_eq!(report.summary.skipped, 1);
        assert!(report.has_failures());
    }

    #[test]
    fn unavailable_backends_are_not_failures() {
        let report = Report::new(
            test_meta(),
            vec![record(CellStatus::Measured), record(CellStatus::Unavailable)],
        );

        assert!(!report.has_failures());
    }

    fn test_meta() -> ReportMeta {
        ReportMeta {
            version: "0.1.0".to_string(),
            timestamp: Utc::now(),
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
            warmup_iterations: 1,
            repeat_iterations: 5,
        }
    }
}
