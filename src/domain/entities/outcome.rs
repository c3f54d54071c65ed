use crate::domain::entities::record::Process;

pub const MAX_REASON_CHARS: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Succeeded {
        tax_id: String,
    },
    Failed {
        tax_id: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedSubmission {
    pub tax_id: String,
    pub process: Process,
    pub reason: String,
}

/// Outcomes of one batch run, in input order. Skipped records appear in
/// neither list and are only counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub succeeded: Vec<(String, Process)>,
    pub failed: Vec<FailedSubmission>,
    pub skipped: usize,
}

impl BatchReport {
    pub(crate) fn record(&mut self, process: Process, outcome: SubmissionOutcome) {
        match outcome {
            SubmissionOutcome::Succeeded { tax_id } => self.succeeded.push((tax_id, process)),
            SubmissionOutcome::Failed { tax_id, reason } => self.failed.push(FailedSubmission {
                tax_id,
                process,
                reason,
            }),
        }
    }

    pub fn merge(&mut self, other: BatchReport) {
        self.succeeded.extend(other.succeeded);
        self.failed.extend(other.failed);
        self.skipped += other.skipped;
    }

    pub fn ok_ids(&self) -> Vec<String> {
        self.succeeded.iter().map(|(id, _)| id.clone()).collect()
    }

    pub fn failed_ids(&self) -> Vec<(String, String)> {
        self.failed
            .iter()
            .map(|f| (f.tax_id.clone(), f.reason.clone()))
            .collect()
    }

    pub fn summary(&self) -> String {
        let mut text = format!("{} ok, {} failed", self.succeeded.len(), self.failed.len());
        if self.skipped > 0 {
            text.push_str(&format!(", {} skipped", self.skipped));
        }
        for failure in &self.failed {
            text.push_str(&format!(
                "\n  {} [{}]: {}",
                failure.tax_id,
                failure.process.label(),
                failure.reason
            ));
        }
        text
    }
}

/// First line of `message`, trimmed and capped at [`MAX_REASON_CHARS`];
/// `fallback` when the message is blank.
pub fn truncate_reason(message: &str, fallback: &str) -> String {
    let first = message.lines().next().unwrap_or("").trim();
    let reason = if first.is_empty() { fallback } else { first };
    if reason.chars().count() > MAX_REASON_CHARS {
        let kept: String = reason.chars().take(MAX_REASON_CHARS - 3).collect();
        format!("{kept}...")
    } else {
        reason.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reason_keeps_first_line_only() {
        let reason = truncate_reason("Timeout 30000ms exceeded.\n  at locator.click", "fallback");

        assert_eq!(reason, "Timeout 30000ms exceeded.");
    }

    #[test]
    fn long_reason_is_capped_with_ellipsis() {
        let long = "x".repeat(200);
        let reason = truncate_reason(&long, "fallback");

        assert_eq!(reason.chars().count(), MAX_REASON_CHARS);
        assert!(reason.ends_with("..."), "truncated reason should end with an ellipsis");
    }

    #[test]
    fn blank_reason_uses_fallback() {
        assert_eq!(truncate_reason("  \n", "failed"), "failed");
    }

    #[test]
    fn summary_lists_failures() {
        let mut report = BatchReport::default();
        report.record(
            Process::Normal,
            SubmissionOutcome::Succeeded {
                tax_id: "1".to_string(),
            },
        );
        report.record(
            Process::Normal,
            SubmissionOutcome::Failed {
                tax_id: "2".to_string(),
                reason: "boom".to_string(),
            },
        );

        assert_eq!(report.summary(), "1 ok, 1 failed\n  2 [Normal]: boom");
        assert_eq!(report.ok_ids(), vec!["1".to_string()]);
        assert_eq!(
            report.failed_ids(),
            vec![("2".to_string(), "boom".to_string())]
        );
    }
}
