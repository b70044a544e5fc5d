//! Human-Readable Output
//!
//! Terminal rendering of a report: one block per algorithm, one line per
//! (implementation, scenario) cell.

use crate::record::{CellStatus, Report, ReportRecord};

/// Format a nanosecond value with an adaptive unit.
pub fn format_duration(ns: f64) -> String {
    if ns < 1_000.0 {
        format!("{:.0}ns", ns)
    } else if ns < 1_000_000.0 {
        format!("{:.2}µs", ns / 1_000.0)
    } else if ns < 1_000_000_000.0 {
        format!("{:.2}ms", ns / 1_000_000.0)
    } else {
        format!("{:.2}s", ns / 1_000_000_000.0)
    }
}

fn status_icon(status: CellStatus) -> &'static str {
    match status {
        CellStatus::Measured => "✓",
        CellStatus::ValidationFailed => "✗",
        CellStatus::Unavailable => "⊘",
        CellStatus::ExecutionFailed => "💥",
        CellStatus::Skipped => "-",
    }
}

fn format_record_line(record: &ReportRecord) -> String {
    let tag = if record.is_reference {
        format!("{} (reference)", record.implementation)
    } else {
        record.implementation.clone()
    };

    match record.status {
        CellStatus::Measured => {
            let mut line = format!("    {} {:<18}", status_icon(record.status), tag);
            if let Some(timing) = &record.timing {
                line.push_str(&format!(
                    " mean {:>10}  min {:>10}  max {:>10}  ±{:>10}  ({} samples",
                    format_duration(timing.mean_ns),
                    format_duration(timing.min_ns),
                    format_duration(timing.max_ns),
                    format_duration(timing.std_dev_ns),
                    timing.sample_count,
                ));
                if timing.trimmed_count > 0 {
                    line.push_str(&format!(", {} trimmed", timing.trimmed_count));
                }
                line.push(')');
            }
            line
        }
        CellStatus::ValidationFailed => {
            let detail = record
                .validation
                .as_ref()
                .and_then(|v| v.detail.clone())
                .unwrap_or_else(|| "output disagrees with reference".to_string());
            format!(
                "    {} {:<18} validation failed: {}",
                status_icon(record.status),
                tag,
                detail
            )
        }
        CellStatus::Unavailable | CellStatus::ExecutionFailed | CellStatus::Skipped => {
            let reason = record
                .error
                .clone()
                .unwrap_or_else(|| "no detail".to_string());
            let label = match record.status {
                CellStatus::Unavailable => "unavailable",
                CellStatus::Skipped => "skipped",
                _ => "failed",
            };
            format!(
                "    {} {:<18} {}: {}",
                status_icon(record.status),
                tag,
                label,
                reason
            )
        }
    }
}

/// Format the full report for terminal display.
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("numbench results\n");
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "{} v{} ({}/{}), warmup {}, repeats {}\n",
        report.meta.timestamp.format("%Y-%m-%d %H:%M:%S"),
        report.meta.version,
        report.meta.os,
        report.meta.arch,
        report.meta.warmup_iterations,
        report.meta.repeat_iterations,
    ));

    let mut current_group: Option<(String, String)> = None;
    for record in &report.records {
        let group = (record.algorithm.clone(), record.scenario.clone());
        if current_group.as_ref() != Some(&group) {
            output.push_str(&format!("\n{}  {}\n", record.algorithm, record.scenario));
            current_group = Some(group);
        }
        output.push_str(&format_record_line(record));
        output.push('\n');
    }

    output.push('\n');
    output.push_str("Summary\n");
    output.push_str(&"-".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "  measured: {}  validation failures: {}  unavailable: {}  execution failures: {}\n",
        report.summary.measured,
        report.summary.validation_failures,
        report.summary.unavailable,
        report.summary.execution_failures,
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ReportMeta;
    use chrono::Utc;
    use numbench_core::{validate, AlgoOutput, EquivalencePolicy};
    use numbench_stats::compute_summary;

    #[test]
    fn duration_units_scale() {
        assert_eq!(format_duration(512.0), "512ns");
        assert_eq!(format_duration(1_500.0), "1.50µs");
        assert_eq!(format_duration(2_500_000.0), "2.50ms");
        assert_eq!(format_duration(3_000_000_000.0), "3.00s");
    }

    #[test]
    fn human_output_shows_each_cell_once() {
        let timing = compute_summary(&[1000.0, 1100.0, 900.0], 0.0);
        let failed_validation = validate(
            &AlgoOutput::Scalar(0.4),
            &AlgoOutput::Scalar(1.0 / 3.0),
            EquivalencePolicy::Tolerance { epsilon: 1e-6 },
        );

        let report = Report::new(
            ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: Utc::now(),
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                warmup_iterations: 1,
                repeat_iterations: 3,
            },
            vec![
                ReportRecord {
                    algorithm: "trapezoid".to_string(),
                    implementation: "reference".to_string(),
                    scenario: "n=1000".to_string(),
                    is_reference: true,
                    status: CellStatus::Measured,
                    validation: None,
                    timing: Some(timing),
                    error: None,
                },
                ReportRecord {
                    algorithm: "trapezoid".to_string(),
                    implementation: "c".to_string(),
                    scenario: "n=1000".to_string(),
                    is_reference: false,
                    status: CellStatus::ValidationFailed,
                    validation: Some(failed_validation),
                    timing: None,
                    error: None,
                },
            ],
        );

        let text = format_human_output(&report);
        assert!(text.contains("trapezoid  n=1000"));
        assert!(text.contains("reference (reference)"));
        assert!(text.contains("validation failed"));
        assert!(text.contains("validation failures: 1"));
    }
}
