use chrono::NaiveDate;

use crate::usecase::ports::form_driver::{DriverError, FormDriver};

#[derive(Default)]
pub struct FakeDriver {
    pub calls: Vec<String>,
    pub fail_on: Vec<String>,
    /// Opens numbered from this one (1-based) fail.
    pub fail_open_at: Option<usize>,
}

impl FakeDriver {
    pub fn count(&self, prefix: &str) -> usize {
        self.calls.iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl FormDriver for FakeDriver {
    fn open_session(&mut self) -> Result<(), DriverError> {
        self.calls.push("open".to_string());
        if self.fail_open_at.is_some_and(|n| self.count("open") >= n) {
            return Err(DriverError::Session("browser did not start".to_string()));
        }
        Ok(())
    }
    fn close_session(&mut self) -> Result<(), DriverError> {
        self.calls.push("close".to_string());
        Ok(())
    }
    fn navigate_home(&mut self) -> Result<(), DriverError> {
        self.calls.push("home".to_string());
        Ok(())
    }
    fn click_menu(&mut self, label: &str) -> Result<(), DriverError> {
        self.calls.push(format!("menu {label}"));
        Ok(())
    }
    fn select_option(&mut self, selector: &str, value: &str) -> Result<(), DriverError> {
        self.calls.push(format!("select {selector}={value}"));
        Ok(())
    }
    fn fill_field(&mut self, selector: &str, text: &str) -> Result<(), DriverError> {
        self.calls.push(format!("fill {selector}={text}"));
        if self.fail_on.iter().any(|id| id == text) {
            return Err(DriverError::Message(format!(
                "timed out waiting for {selector}\n  call log: waiting for locator"
            )));
        }
        Ok(())
    }
    fn fill_masked_date(&mut self, selector: &str, date: NaiveDate) -> Result<(), DriverError> {
        self.calls.push(format!("date {selector}={}", date.format("%d/%m/%Y")));
        Ok(())
    }
    fn fill_masked_amount(&mut self, selector: &str, amount: f64) -> Result<(), DriverError> {
        self.calls.push(format!("amount {selector}={amount:.2}"));
        Ok(())
    }
    fn click_button(&mut self, label: &str) -> Result<(), DriverError> {
        self.calls.push(format!("button {label}"));
        Ok(())
    }
    fn wait_for_load(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
    fn capture_diagnostic(&mut self, name: &str) -> Result<(), DriverError> {
        self.calls.push(format!("capture {name}"));
        Ok(())
    }
}
