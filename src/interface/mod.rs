pub mod backup_executor;
pub mod core;
pub mod repository;
