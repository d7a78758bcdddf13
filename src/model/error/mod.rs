pub mod compression;
pub mod config;
pub mod database;
pub mod execution;
pub mod retention;
pub mod system;
pub mod task;

use crate::model::error::compression::CompressionError;
use crate::model::error::config::ConfigError;
use crate::model::error::database::DatabaseError;
use crate::model::error::execution::ExecutionError;
use crate::model::error::retention::RetentionError;
use crate::model::error::system::SystemError;
use crate::model::error::task::TaskError;
use macros::log;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    #[error(transparent)]
    Compression(#[from] CompressionError),
    #[error(transparent)]
    Retention(#[from] RetentionError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    System(#[from] SystemError),
}

impl Error {
    pub fn level(&self) -> tracing::Level {
        match self {
            Error::Config(error) => error.level(),
            Error::Execution(error) => error.level(),
            Error::Compression(error) => error.level(),
            Error::Retention(error) => error.level(),
            Error::Task(error) => error.level(),
            Error::Database(error) => error.level(),
            Error::System(error) => error.level(),
        }
    }

    pub fn log(&self) {
        log!(self);
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Error::Task(TaskError::Busy { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn source_text_is_part_of_the_message() {
        let error: Error = ExecutionError::dump_spawn_failed("pg_dump", "permission denied").into();
        assert_eq!(
            error.to_string(),
            "Failed to spawn dump tool: pg_dump: permission denied"
        );
        assert_eq!(error.level(), tracing::Level::ERROR);
    }

    #[test]
    fn busy_is_recognized_through_the_wrapper() {
        let error: Error = TaskError::busy(Uuid::nil()).into();
        assert!(error.is_busy());
        assert_eq!(error.level(), tracing::Level::WARN);

        let other: Error = RetentionError::delete_file_failed(PathBuf::from("/tmp/x"), "denied").into();
        assert!(!other.is_busy());
    }
}
