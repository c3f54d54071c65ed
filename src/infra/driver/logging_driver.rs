use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::info;

use crate::usecase::ports::form_driver::{DriverError, FormDriver};

/// Dry-run driver: logs every form action instead of touching the portal
/// and writes diagnostics as text files listing the actions of the failed
/// attempt.
pub struct LoggingDriver {
    diagnostics_dir: PathBuf,
    open: bool,
    actions: Vec<String>,
}

impl LoggingDriver {
    pub fn new(diagnostics_dir: PathBuf) -> Self {
        Self {
            diagnostics_dir,
            open: false,
            actions: Vec::new(),
        }
    }

    fn act(&mut self, action: String) -> Result<(), DriverError> {
        if !self.open {
            return Err(DriverError::Session("no open session".to_string()));
        }
        info!(target: "dry_run", "{action}");
        self.actions.push(action);
        Ok(())
    }
}

impl FormDriver for LoggingDriver {
    fn open_session(&mut self) -> Result<(), DriverError> {
        info!(target: "dry_run", "session opened");
        self.open = true;
        self.actions.clear();
        Ok(())
    }

    fn close_session(&mut self) -> Result<(), DriverError> {
        info!(target: "dry_run", "session closed");
        self.open = false;
        Ok(())
    }

    fn navigate_home(&mut self) -> Result<(), DriverError> {
        self.actions.clear();
        self.act("navigate home".to_string())
    }

    fn click_menu(&mut self, label: &str) -> Result<(), DriverError> {
        self.act(format!("click menu '{label}'"))
    }

    fn select_option(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.act(format!("select '{value}' in {selector}"))
    }

    fn fill_field(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.act(format!("fill {selector} with '{text}'"))
    }

    fn fill_masked_date(&mut self, selector: &str, date: NaiveDate) -> Result<(), DriverError> {
        self.act(format!("fill {selector} with '{}'", date.format("%d/%m/%Y")))
    }

    fn fill_masked_amount(&mut self, selector: &str, amount: f64) -> Result<(), DriverError> {
        let text = format!("{amount:.2}").replace('.', ",");
        self.act(format!("fill {selector} with '{text}'"))
    }

    fn click_button(&mut self, label: &str) -> Result<(), DriverError> {
        self.act(format!("click button '{label}'"))
    }

    fn wait_for_load(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    fn capture_diagnostic(&mut self, name: &str) -> Result<(), DriverError> {
        std::fs::create_dir_all(&self.diagnostics_dir)
            .map_err(|err| DriverError::Message(err.to_string()))?;
        let path = self.diagnostics_dir.join(format!("{name}.txt"));
        std::fs::write(&path, self.actions.join("\n"))
            .map_err(|err| DriverError::Message(err.to_string()))?;
        info!(target: "dry_run", path = %path.display(), "diagnostic written");
        Ok(())
    }
}
