use macros::traceable;
use std::path::PathBuf;

traceable! {
    DatabaseError {
        #[error("Failed to create database directory: {path}")]
        CreateDatabaseFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Failed to connect to database")]
        DatabaseConnectFailed => tracing::Level::ERROR,

        #[error("Failed to create table {table}")]
        CreateTableFailed { table: String } => tracing::Level::ERROR,

        #[error("Failed to execute SQL statement")]
        StatementExecutionFailed => tracing::Level::ERROR,

        #[error("Stored value is corrupted in column {column}")]
        DataCorrupted { column: String } => tracing::Level::ERROR,
    }
}
