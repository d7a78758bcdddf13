use macros::loggable;
use std::path::PathBuf;

loggable! {
    DatabaseLog {
        #[error("Connected to database successfully: {path}")]
        DatabaseConnectSuccess { path: PathBuf } => tracing::Level::INFO,

        #[error("Created table {table}")]
        TableCreated { table: String } => tracing::Level::INFO,

        #[error("Database connection closed")]
        DatabaseClosed => tracing::Level::INFO,
    }
}
