pub mod entities;
pub mod extraction;
