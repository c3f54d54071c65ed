use std::time::Duration;

use chrono::{Local, NaiveDate};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::PortalConfig;
use crate::domain::entities::outcome::{truncate_reason, BatchReport, SubmissionOutcome};
use crate::domain::entities::record::{Process, Record};
use crate::usecase::ports::form_driver::{DriverError, DriverSession, FormDriver};

pub const EMPTY_ID_PLACEHOLDER: &str = "(empty)";
pub const REASON_INVALID_ID: &str = "invalid or empty tax ID";
pub const REASON_MISSING_PERIOD: &str = "missing reference period (month/year)";
pub const REASON_PAST_DUE: &str = "due date in the past: portal rejects past dates";

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to open portal session: {0}")]
    Session(#[source] DriverError),

    #[error("failed to reach portal home page: {0}")]
    Navigation(#[source] DriverError),
}

/// A multi-process run that stopped at a session failure. `partial` holds
/// every outcome recorded before the stop, filed forms included.
#[derive(Debug, Error)]
#[error("batch stopped after {} filed forms", .partial.succeeded.len())]
pub struct BatchInterrupted {
    pub partial: BatchReport,
    #[source]
    pub source: BatchError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSettings {
    pub interval: Duration,
    pub today: NaiveDate,
}

impl BatchSettings {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            today: Local::now().date_naive(),
        }
    }

    #[cfg(test)]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Disposition {
    Reject(SubmissionOutcome),
    Skip,
    Submit { amount: f64, due_date: NaiveDate },
}

pub fn format_interval(ms: u64) -> String {
    if ms >= 60_000 {
        format!("{} min", ms / 60_000)
    } else if ms >= 1_000 {
        format!("{} s", ms / 1_000)
    } else {
        format!("{ms} ms")
    }
}

pub struct SubmissionService {
    portal: PortalConfig,
    settings: BatchSettings,
}

impl SubmissionService {
    pub fn new(portal: PortalConfig, settings: BatchSettings) -> Self {
        Self { portal, settings }
    }

    fn classify(&self, record: &Record, process: Process) -> Disposition {
        let tax_id = record.tax_id.trim();
        if tax_id.is_empty() || !tax_id.chars().all(|c| c.is_ascii_digit()) {
            let shown = if tax_id.is_empty() {
                EMPTY_ID_PLACEHOLDER
            } else {
                tax_id
            };
            return Disposition::Reject(SubmissionOutcome::Failed {
                tax_id: shown.to_string(),
                reason: REASON_INVALID_ID.to_string(),
            });
        }
        let due_date = match record.period.due_date() {
            Some(date) if record.period.is_valid() => date,
            _ => {
                return Disposition::Reject(SubmissionOutcome::Failed {
                    tax_id: tax_id.to_string(),
                    reason: REASON_MISSING_PERIOD.to_string(),
                })
            }
        };
        let amount = match record.amount_for(process) {
            Some(amount) if record.is_actionable(process) => amount,
            _ => return Disposition::Skip,
        };
        if due_date < self.settings.today {
            return Disposition::Reject(SubmissionOutcome::Failed {
                tax_id: tax_id.to_string(),
                reason: REASON_PAST_DUE.to_string(),
            });
        }
        Disposition::Submit { amount, due_date }
    }

    fn fill_form<D: FormDriver + ?Sized>(
        &self,
        driver: &mut D,
        process: Process,
        record: &Record,
        amount: f64,
        due_date: NaiveDate,
    ) -> Result<(), DriverError> {
        let portal = &self.portal;

        driver.click_menu(&portal.menu_label)?;
        driver.wait_for_load()?;
        driver.select_option(&portal.code_select, portal.option_for(process))?;
        driver.wait_for_load()?;
        driver.click_button(&portal.advance_button)?;
        driver.wait_for_load()?;

        driver.fill_field(&portal.tax_id_field, record.tax_id.trim())?;
        driver.select_option(&portal.substitution_select, &portal.substitution_no)?;
        driver.click_button(&portal.advance_button)?;
        driver.wait_for_load()?;

        driver.fill_field(&portal.period_field, &record.period.portal_text())?;
        driver.fill_masked_date(&portal.due_date_field, due_date)?;
        driver.fill_masked_date(&portal.payment_date_field, due_date)?;
        driver.fill_masked_amount(&portal.amount_field, amount)?;
        driver.click_button(&portal.calculate_button)?;
        driver.wait_for_load()?;
        Ok(())
    }

    fn attempt<D: FormDriver + ?Sized>(
        &self,
        driver: &mut D,
        process: Process,
        record: &Record,
        amount: f64,
        due_date: NaiveDate,
        needs_pause: bool,
    ) -> Result<(), DriverError> {
        if needs_pause {
            if !self.settings.interval.is_zero() {
                debug!(
                    interval = %format_interval(self.settings.interval.as_millis() as u64),
                    "waiting before next submission"
                );
                std::thread::sleep(self.settings.interval);
            }
            driver.navigate_home()?;
            driver.wait_for_load()?;
        }
        self.fill_form(driver, process, record, amount, due_date)
    }

    fn submit<D: FormDriver + ?Sized>(
        &self,
        driver: &mut D,
        process: Process,
        record: &Record,
        amount: f64,
        due_date: NaiveDate,
        needs_pause: bool,
    ) -> SubmissionOutcome {
        let tax_id = record.tax_id.trim().to_string();
        let attempt = self.attempt(driver, process, record, amount, due_date, needs_pause);

        match attempt {
            Ok(()) => {
                info!(%tax_id, %process, "form submitted");
                SubmissionOutcome::Succeeded { tax_id }
            }
            Err(err) => {
                error!(%tax_id, %process, error = %err, "form submission failed");
                let artifact = format!(
                    "error_{}_form_{}_{}",
                    process.as_str(),
                    tax_id,
                    Local::now().format("%Y%m%d_%H%M%S")
                );
                if let Err(capture_err) = driver.capture_diagnostic(&artifact) {
                    warn!(%tax_id, error = %capture_err, "failed to capture diagnostic");
                }
                let fallback = format!("failed to fill {} form", process.label());
                SubmissionOutcome::Failed {
                    tax_id,
                    reason: truncate_reason(&err.to_string(), &fallback),
                }
            }
        }
    }

    /// Files `process` for every record, strictly in order, in one portal
    /// session. Record-level problems land in the report; only session
    /// setup failures are returned as errors.
    pub fn run<D: FormDriver + ?Sized>(
        &self,
        records: &[Record],
        process: Process,
        driver: &mut D,
    ) -> Result<BatchReport, BatchError> {
        info!(
            %process,
            total = records.len(),
            interval = %format_interval(self.settings.interval.as_millis() as u64),
            "starting batch"
        );
        let mut session = DriverSession::open(driver).map_err(BatchError::Session)?;
        session.navigate_home().map_err(BatchError::Navigation)?;
        session.wait_for_load().map_err(BatchError::Navigation)?;

        let mut report = BatchReport::default();
        for (idx, record) in records.iter().enumerate() {
            match self.classify(record, process) {
                Disposition::Reject(outcome) => {
                    if let SubmissionOutcome::Failed { tax_id, reason } = &outcome {
                        info!(%tax_id, %process, %reason, "record rejected");
                    }
                    report.record(process, outcome);
                }
                Disposition::Skip => {
                    info!(tax_id = %record.tax_id, %process, "no amount to file, skipped");
                    report.skipped += 1;
                }
                Disposition::Submit { amount, due_date } => {
                    info!(
                        tax_id = %record.tax_id,
                        %process,
                        "processing {}/{}",
                        idx + 1,
                        records.len()
                    );
                    let outcome = self.submit(
                        &mut *session,
                        process,
                        record,
                        amount,
                        due_date,
                        idx > 0,
                    );
                    report.record(process, outcome);
                }
            }
        }
        drop(session);

        info!(
            %process,
            ok = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped,
            "batch finished"
        );
        Ok(report)
    }

    /// Runs each selected process in the fixed order ATC, Normal, DIFAL,
    /// one session per process, over the records that have an amount for
    /// it. Processes with nothing to file open no session. A session failure
    /// stops the run but hands back what earlier processes filed.
    pub fn run_processes<D: FormDriver + ?Sized>(
        &self,
        records: &[Record],
        processes: &[Process],
        driver: &mut D,
    ) -> Result<BatchReport, BatchInterrupted> {
        let mut report = BatchReport::default();
        for process in Process::ALL {
            if !processes.contains(&process) {
                continue;
            }
            let actionable: Vec<Record> = records
                .iter()
                .filter(|r| r.is_actionable(process))
                .cloned()
                .collect();
            report.skipped += records.len() - actionable.len();
            if actionable.is_empty() {
                info!(%process, "no records with an amount, process skipped");
                continue;
            }
            match self.run(&actionable, process, driver) {
                Ok(done) => report.merge(done),
                Err(source) => {
                    error!(
                        %process,
                        error = %source,
                        filed = report.succeeded.len(),
                        "batch stopped"
                    );
                    return Err(BatchInterrupted {
                        partial: report,
                        source,
                    });
                }
            }
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::record::{ExtractedRow, Period};
    use crate::usecase::ports::fake_driver::FakeDriver;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).expect("valid date")
    }

    fn service() -> SubmissionService {
        SubmissionService::new(
            PortalConfig::default(),
            BatchSettings::new(Duration::ZERO).with_today(today()),
        )
    }

    fn record(id: &str, normal: Option<f64>, period: Period) -> Record {
        Record {
            tax_id: id.to_string(),
            amount_atc: None,
            amount_normal: normal,
            amount_difal: None,
            period,
            source_row: ExtractedRow::default(),
        }
    }

    #[test]
    fn mixed_batch_reports_success_and_past_due_only() {
        let records = vec![
            record("000000001", Some(150.25), Period::new(3, 2026)),
            record("000000002", Some(0.0), Period::new(3, 2026)),
            record("000000003", Some(10.0), Period::new(1, 2026)),
        ];
        let mut driver = FakeDriver::default();

        let report = service()
            .run(&records, Process::Normal, &mut driver)
            .expect("batch should run");

        assert_eq!(report.ok_ids(), vec!["000000001".to_string()]);
        assert_eq!(
            report.failed_ids(),
            vec![("000000003".to_string(), REASON_PAST_DUE.to_string())]
        );
        assert_eq!(report.skipped, 1);
        assert_eq!(driver.count("fill #fieldInscricaoEstadual"), 1, "only one record reaches the portal");
    }

    #[test]
    fn form_sequence_fills_period_dates_and_amount() {
        let records = vec![record("000000001", Some(1234.5), Period::new(3, 2026))];
        let mut driver = FakeDriver::default();

        service()
            .run(&records, Process::Normal, &mut driver)
            .expect("batch should run");

        let portal = PortalConfig::default();
        assert_eq!(
            driver.calls,
            vec![
                "open".to_string(),
                "home".to_string(),
                "menu ICMS".to_string(),
                format!("select {}={}", portal.code_select, portal.option_normal),
                "button Avançar".to_string(),
                format!("fill {}=000000001", portal.tax_id_field),
                format!("select {}=NÃO", portal.substitution_select),
                "button Avançar".to_string(),
                format!("fill {}=03/2026", portal.period_field),
                format!("date {}=15/03/2026", portal.due_date_field),
                format!("date {}=15/03/2026", portal.payment_date_field),
                format!("amount {}=1234.50", portal.amount_field),
                "button Calcular Imposto".to_string(),
                "close".to_string(),
            ]
        );
    }

    #[test]
    fn failing_record_is_isolated_and_diagnosed() {
        let records = vec![
            record("000000001", Some(1.0), Period::new(4, 2026)),
            record("000000002", Some(2.0), Period::new(4, 2026)),
        ];
        let mut driver = FakeDriver {
            fail_on: vec!["000000001".to_string()],
            ..FakeDriver::default()
        };

        let report = service()
            .run(&records, Process::Normal, &mut driver)
            .expect("batch should run");

        assert_eq!(report.ok_ids(), vec!["000000002".to_string()]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].tax_id, "000000001");
        assert!(
            report.failed[0].reason.starts_with("timed out waiting for"),
            "reason should keep the first error line: {}",
            report.failed[0].reason
        );
        assert!(!report.failed[0].reason.contains('\n'));
        assert_eq!(driver.count("capture error_normal_form_000000001_"), 1);
        assert_eq!(driver.count("home"), 2, "second record starts from the home page");
        assert_eq!(driver.calls.last().map(String::as_str), Some("close"));
    }

    #[test]
    fn invalid_id_and_period_fail_without_driver_calls() {
        let records = vec![
            record("", Some(1.0), Period::new(4, 2026)),
            record("000000009", Some(1.0), Period::new(0, 2026)),
        ];
        let mut driver = FakeDriver::default();

        let report = service()
            .run(&records, Process::Normal, &mut driver)
            .expect("batch should run");

        assert_eq!(
            report.failed_ids(),
            vec![
                (EMPTY_ID_PLACEHOLDER.to_string(), REASON_INVALID_ID.to_string()),
                ("000000009".to_string(), REASON_MISSING_PERIOD.to_string()),
            ]
        );
        assert_eq!(driver.calls, vec!["open", "home", "close"]);
    }

    #[test]
    fn session_failure_is_an_error_not_an_empty_report() {
        let records = vec![record("000000001", Some(1.0), Period::new(4, 2026))];
        let mut driver = FakeDriver {
            fail_open_at: Some(1),
            ..FakeDriver::default()
        };

        let result = service().run(&records, Process::Normal, &mut driver);

        assert!(matches!(result, Err(BatchError::Session(_))));
    }

    #[test]
    fn processes_without_amounts_open_no_session() {
        let records = vec![record("000000001", Some(5.0), Period::new(4, 2026))];
        let mut driver = FakeDriver::default();

        let report = service()
            .run_processes(&records, &[Process::Difal, Process::Normal], &mut driver)
            .expect("batch should run");

        assert_eq!(report.succeeded, vec![("000000001".to_string(), Process::Normal)]);
        assert_eq!(driver.count("open"), 1);
    }

    #[test]
    fn pause_follows_record_position_not_submission_count() {
        let records = vec![
            record("000000001", Some(1.0), Period::new(1, 2026)),
            record("000000002", Some(2.0), Period::new(4, 2026)),
        ];
        let mut driver = FakeDriver::default();

        let report = service()
            .run(&records, Process::Normal, &mut driver)
            .expect("batch should run");

        assert_eq!(report.ok_ids(), vec!["000000002".to_string()]);
        assert_eq!(report.failed_ids()[0].1, REASON_PAST_DUE);
        assert_eq!(
            driver.count("home"),
            2,
            "second record returns home even though the first never reached the portal"
        );
    }

    #[test]
    fn later_session_failure_keeps_earlier_outcomes() {
        let mut both = record("000000001", Some(5.0), Period::new(4, 2026));
        both.amount_atc = Some(7.0);
        let mut driver = FakeDriver {
            fail_open_at: Some(2),
            ..FakeDriver::default()
        };

        let stopped = service()
            .run_processes(&[both], &[Process::Atc, Process::Normal], &mut driver)
            .expect_err("second session should fail");

        assert_eq!(
            stopped.partial.succeeded,
            vec![("000000001".to_string(), Process::Atc)],
            "the ATC filing should survive the Normal session failure"
        );
        assert!(matches!(stopped.source, BatchError::Session(_)));
        assert_eq!(driver.count("open"), 2);
    }

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(120_000), "2 min");
        assert_eq!(format_interval(5_000), "5 s");
        assert_eq!(format_interval(250), "250 ms");
    }
}
