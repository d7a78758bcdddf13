use chrono::{DateTime, Utc};
use macros::traceable;
use std::path::PathBuf;

traceable! {
    ConfigError {
        #[no_source]
        #[error("Unrecognized frequency: {value}")]
        InvalidFrequency { value: String } => tracing::Level::WARN,

        #[no_source]
        #[error("Retention count must be at least 1, got {value}")]
        InvalidRetentionCount { value: i64 } => tracing::Level::WARN,

        #[no_source]
        #[error("Backup path cannot be empty")]
        EmptyBackupPath => tracing::Level::WARN,

        #[no_source]
        #[error("Backup path exists but is not a directory: {path}")]
        BackupPathNotDirectory { path: PathBuf } => tracing::Level::WARN,

        #[error("Backup directory is not writable: {path}")]
        BackupPathNotWritable { path: PathBuf } => tracing::Level::WARN,

        #[error("Failed to create backup directory: {path}")]
        CreateDirectoryFailed { path: PathBuf } => tracing::Level::ERROR,

        #[no_source]
        #[error("End time {end} is not after start time {start}")]
        InvalidActiveWindow { start: DateTime<Utc>, end: DateTime<Utc> } => tracing::Level::WARN,

        #[no_source]
        #[error("Next backup date {next} precedes start time {start}")]
        NextBeforeStart { start: DateTime<Utc>, next: DateTime<Utc> } => tracing::Level::WARN,

        #[no_source]
        #[error("Next due date after {current} is out of range")]
        DueDateOutOfRange { current: DateTime<Utc> } => tracing::Level::ERROR,

        #[error("Configuration not found: {path}")]
        ConfigNotFound { path: PathBuf } => tracing::Level::ERROR,

        #[error("Invalid configuration")]
        InvalidConfig => tracing::Level::ERROR,

        #[no_source]
        #[error("Invalid configuration value for {key}: {reason}")]
        InvalidConfigValue { key: String, reason: String } => tracing::Level::ERROR,

        #[no_source]
        #[error("Unsupported database url: {url}")]
        UnsupportedDatabaseUrl { url: String } => tracing::Level::ERROR,
    }
}
