pub mod driver;
pub mod export;
pub mod import;
