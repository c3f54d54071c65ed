use std::thread::JoinHandle;

use anyhow::{anyhow, Result};

use crate::domain::entities::outcome::BatchReport;
use crate::domain::entities::record::{Process, Record};
use crate::usecase::ports::form_driver::FormDriver;
use crate::usecase::services::submission_service::{BatchInterrupted, SubmissionService};

pub struct BatchHandle {
    handle: JoinHandle<Result<BatchReport, BatchInterrupted>>,
}

impl BatchHandle {
    /// Waits for the batch. Session failures and worker panics come back as
    /// errors, distinct from an empty report; a session failure downcasts to
    /// [`BatchInterrupted`] with the outcomes recorded before it.
    pub fn join(self) -> Result<BatchReport> {
        let result = self
            .handle
            .join()
            .map_err(|_| anyhow!("batch worker panicked"))?;
        Ok(result?)
    }
}

/// Runs the selected processes in the background. `on_done` receives the
/// successful IDs and the `(id, reason)` failures once the batch completes;
/// it is not called when the batch fails as a whole.
pub fn spawn_batch<D, F>(
    service: SubmissionService,
    records: Vec<Record>,
    processes: Vec<Process>,
    mut driver: D,
    on_done: F,
) -> BatchHandle
where
    D: FormDriver + 'static,
    F: FnOnce(Vec<String>, Vec<(String, String)>) + Send + 'static,
{
    let handle = std::thread::spawn(move || {
        let report = service.run_processes(&records, &processes, &mut driver)?;
        on_done(report.ok_ids(), report.failed_ids());
        Ok(report)
    });
    BatchHandle { handle }
}
