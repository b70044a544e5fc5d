//! JSON Output

use crate::record::Report;

/// Generate a prettified JSON report.
///
/// Serializes the benchmark report into machine-readable JSON format.
pub fn generate_json_report(report: &Report) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CellStatus, ReportMeta, ReportRecord};
    use chrono::Utc;

    #[test]
    fn json_report_round_trips() {
        let report = Report::new(
            ReportMeta {
                version: "0.1.0".to_string(),
                timestamp: Utc::now(),
                os: "linux".to_string(),
                arch: "x86_64".to_string(),
                warmup_iterations: 1,
                repeat_iterations: 5,
            },
            vec![ReportRecord {
                algorithm: "sieve".to_string(),
                implementation: "c".to_string(),
                scenario: "n=10".to_string(),
                is_reference: false,
                status: CellStatus::Unavailable,
                validation: None,
                timing: None,
                error: Some("artifact not found".to_string()),
            }],
        );

        let json = generate_json_report(&report).unwrap();
        assert!(json.contains("\"unavailable\""));

        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].status, CellStatus::Unavailable);
    }
}
