use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::entities::outcome::BatchReport;

pub fn write_report_csv(path: &Path, report: &BatchReport) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create report: {}", path.display()))?;
    writer
        .write_record(["tax_id", "process", "status", "reason"])
        .context("failed to write report header")?;
    for (tax_id, process) in &report.succeeded {
        writer
            .write_record([tax_id.as_str(), process.as_str(), "ok", ""])
            .context("failed to write report row")?;
    }
    for failure in &report.failed {
        writer
            .write_record([
                failure.tax_id.as_str(),
                failure.process.as_str(),
                "failed",
                failure.reason.as_str(),
            ])
            .context("failed to write report row")?;
    }
    writer.flush().context("failed to flush report")?;
    Ok(())
}
