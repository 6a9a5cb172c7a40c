pub mod cache;
pub mod clock;
pub mod directory;
pub mod error;
pub mod repo;
pub mod report;
pub mod service;
