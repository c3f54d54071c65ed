pub mod extraction_service;
pub mod submission_service;
