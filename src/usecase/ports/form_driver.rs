use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("session error: {0}")]
    Session(String),

    #[error("{0}")]
    Message(String),
}

/// Concrete UI actions against the remote filing portal.
///
/// Implementations own the transport (a browser, a recorder, a fake). The
/// orchestrator drives one session at a time and never shares it.
pub trait FormDriver: Send {
    fn open_session(&mut self) -> Result<(), DriverError>;
    fn close_session(&mut self) -> Result<(), DriverError>;

    fn navigate_home(&mut self) -> Result<(), DriverError>;
    fn click_menu(&mut self, label: &str) -> Result<(), DriverError>;
    fn select_option(&mut self, selector: &str, value: &str) -> Result<(), DriverError>;
    fn fill_field(&mut self, selector: &str, text: &str) -> Result<(), DriverError>;
    fn fill_masked_date(&mut self, selector: &str, date: NaiveDate) -> Result<(), DriverError>;
    fn fill_masked_amount(&mut self, selector: &str, amount: f64) -> Result<(), DriverError>;
    fn click_button(&mut self, label: &str) -> Result<(), DriverError>;
    fn wait_for_load(&mut self) -> Result<(), DriverError>;
    fn capture_diagnostic(&mut self, name: &str) -> Result<(), DriverError>;
}

/// Open session that is closed when dropped, whatever happened in between.
pub struct DriverSession<'a, D: FormDriver + ?Sized> {
    driver: &'a mut D,
}

impl<'a, D: FormDriver + ?Sized> DriverSession<'a, D> {
    pub fn open(driver: &'a mut D) -> Result<Self, DriverError> {
        driver.open_session()?;
        Ok(Self { driver })
    }
}

impl<D: FormDriver + ?Sized> std::ops::Deref for DriverSession<'_, D> {
    type Target = D;

    fn deref(&self) -> &D {
        self.driver
    }
}

impl<D: FormDriver + ?Sized> std::ops::DerefMut for DriverSession<'_, D> {
    fn deref_mut(&mut self) -> &mut D {
        self.driver
    }
}

impl<D: FormDriver + ?Sized> Drop for DriverSession<'_, D> {
    fn drop(&mut self) {
        if let Err(err) = self.driver.close_session() {
            tracing::warn!(error = %err, "failed to close portal session");
        }
    }
}
