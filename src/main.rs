mod config;
mod domain;
mod infra;
mod platform;
mod usecase;


use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::AppConfig;
use crate::domain::entities::outcome::BatchReport;
use crate::domain::entities::record::{count_actionable, tax_ids, Process, Record};
use crate::infra::driver::logging_driver::LoggingDriver;
use crate::infra::export::report::write_report_csv;
use crate::platform::worker::spawn_batch;
use crate::usecase::services::extraction_service::{derive_records, ExtractionService};
use crate::usecase::services::submission_service::{
    BatchInterrupted, BatchSettings, SubmissionService,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ProcessArg {
    Atc,
    Normal,
    Difal,
}

impl From<ProcessArg> for Process {
    fn from(value: ProcessArg) -> Self {
        match value {
            ProcessArg::Atc => Process::Atc,
            ProcessArg::Normal => Process::Normal,
            ProcessArg::Difal => Process::Difal,
        }
    }
}

#[derive(Parser)]
#[command(about = "File monthly state-tax declarations for every branch in a spreadsheet.")]
struct Args {
    /// Branch spreadsheet (.xlsx, .xlsm, .xls, .ods or .csv). Only the first sheet is read.
    file: PathBuf,

    /// Filing process to run (repeatable). Defaults to `atc`.
    #[arg(long = "process", value_enum)]
    processes: Vec<ProcessArg>,

    /// Config file. Defaults to `config.json` in the platform config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the outcome of every record to this CSV file.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,

    /// Override the pause between two submissions.
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Stop after listing the extracted records.
    #[arg(long)]
    list_only: bool,
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn print_records(records: &[Record]) {
    println!(
        "{:<24} {:<12} {:>14} {:>14} {:>14}",
        "FILIAL", "I.E.", "ATC", "NORMAL", "DIF. ALIQ."
    );
    for record in records {
        let branch = record
            .source_row
            .fields
            .first()
            .map(|(_, value)| value.to_string())
            .unwrap_or_default();
        println!(
            "{:<24} {:<12} {:>14} {:>14} {:>14}",
            branch,
            record.tax_id,
            format_amount(record.amount_atc),
            format_amount(record.amount_normal),
            format_amount(record.amount_difal)
        );
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = interval_ms;
    }

    let extraction = ExtractionService::new(config.scan).extract_all(&args.file)?;
    let records = derive_records(&extraction.rows, &extraction.header_map, extraction.period)?;

    let processes: Vec<Process> = if args.processes.is_empty() {
        vec![Process::Atc]
    } else {
        args.processes.iter().copied().map(Process::from).collect()
    };
    let (actionable, ignored) = count_actionable(&records, &processes);

    print_records(&records);
    println!(
        "period {}: {} records, {} actionable, {} ignored",
        extraction.period,
        records.len(),
        actionable,
        ignored
    );
    info!(ids = ?tax_ids(&records), "registrations found");
    if args.list_only {
        return Ok(());
    }

    let service = SubmissionService::new(
        config.portal.clone(),
        BatchSettings::new(config.interval()),
    );
    let driver = LoggingDriver::new(config.diagnostics_dir()?);
    let handle = spawn_batch(service, records, processes, driver, |ok, failed| {
        info!(ok = ok.len(), failed = failed.len(), "batch completed");
    });
    let report = match handle.join() {
        Ok(report) => report,
        Err(err) => {
            if let Some(stopped) = err.downcast_ref::<BatchInterrupted>() {
                finish(&stopped.partial, args.report.as_deref())?;
            }
            return Err(err);
        }
    };
    finish(&report, args.report.as_deref())
}

fn finish(report: &BatchReport, report_path: Option<&Path>) -> Result<()> {
    println!("{}", report.summary());
    if let Some(path) = report_path {
        write_report_csv(path, report)?;
        info!(path = %path.display(), "report written");
    }
    Ok(())
}
