//! Per-row outcome aggregation for one submission run.
//!
//! The reporter is append-only; `details` preserves exactly the order in
//! which rows were recorded so reports are deterministic and reviewable.

use serde::{Deserialize, Serialize};

/// Outcome of one processed upload row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
    Success,
    Failed,
    Skipped,
}

impl RowOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            "skipped" => Some(Self::Skipped),
            _ => None,
        }
    }

    /// All valid outcome values.
    pub const ALL: &'static [&'static str] = &["success", "failed", "skipped"];
}

impl std::fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded row result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowResult {
    /// Zero-based index of the row in the uploaded sheet.
    pub row: usize,
    pub outcome: RowOutcome,
    /// Human-readable reason (platform message, skip cause, ...).
    pub reason: String,
}

/// Aggregated counts plus the ordered detail list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub success_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub details: Vec<RowResult>,
}

impl ReportSummary {
    /// Render the report as CSV for download (header plus one line per
    /// row, in record order). Row numbers are one-based for readability.
    pub fn to_csv(&self) -> String {
        let mut out = String::from("row,outcome,reason\n");
        for result in &self.details {
            out.push_str(&format!(
                "{},{},{}\n",
                result.row + 1,
                result.outcome,
                escape_csv(&result.reason)
            ));
        }
        out
    }
}

/// Append-only collector of per-row results for a single run.
#[derive(Debug, Clone, Default)]
pub struct SubmissionReport {
    results: Vec<RowResult>,
}

impl SubmissionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one row.
    pub fn record(&mut self, row: usize, outcome: RowOutcome, reason: impl Into<String>) {
        self.results.push(RowResult {
            row,
            outcome,
            reason: reason.into(),
        });
    }

    /// Number of recorded rows.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Summarize counts and details, preserving record order.
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            success_count: 0,
            failed_count: 0,
            skipped_count: 0,
            details: self.results.clone(),
        };
        for result in &self.results {
            match result.outcome {
                RowOutcome::Success => summary.success_count += 1,
                RowOutcome::Failed => summary.failed_count += 1,
                RowOutcome::Skipped => summary.skipped_count += 1,
            }
        }
        summary
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn escape_csv(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_round_trip() {
        for name in RowOutcome::ALL {
            let outcome = RowOutcome::from_str(name).unwrap();
            assert_eq!(outcome.as_str(), *name);
        }
        assert!(RowOutcome::from_str("bogus").is_none());
    }

    #[test]
    fn test_summary_counts_and_order() {
        let mut report = SubmissionReport::new();
        report.record(0, RowOutcome::Success, "Submitted");
        report.record(1, RowOutcome::Failed, "400: bad value");
        report.record(2, RowOutcome::Skipped, "Empty row");
        report.record(3, RowOutcome::Success, "Duplicate (already exists)");

        let summary = report.summary();
        assert_eq!(summary.success_count, 2);
        assert_eq!(summary.failed_count, 1);
        assert_eq!(summary.skipped_count, 1);
        assert_eq!(
            summary.success_count + summary.failed_count + summary.skipped_count,
            report.len()
        );

        let rows: Vec<usize> = summary.details.iter().map(|d| d.row).collect();
        assert_eq!(rows, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_report() {
        let report = SubmissionReport::new();
        let summary = report.summary();

        assert!(report.is_empty());
        assert_eq!(summary.success_count, 0);
        assert!(summary.details.is_empty());
    }

    #[test]
    fn test_csv_rendering_escapes_reasons() {
        let mut report = SubmissionReport::new();
        report.record(0, RowOutcome::Failed, "error: \"name\" required, got none");

        let csv = report.summary().to_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("row,outcome,reason"));
        assert_eq!(
            lines.next(),
            Some("1,failed,\"error: \"\"name\"\" required, got none\"")
        );
    }
}
