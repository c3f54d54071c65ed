#[cfg(test)]
pub mod fake_driver;
pub mod form_driver;
