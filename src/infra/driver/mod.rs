pub mod logging_driver;
