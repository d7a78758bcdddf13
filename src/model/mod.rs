pub mod artifact;
pub mod config;
pub mod error;
pub mod history;
pub mod log;
pub mod schedule;
