use macros::traceable;
use std::path::PathBuf;

traceable! {
    RetentionError {
        #[error("Failed to list backup directory: {path}")]
        ReadDirectoryFailed { path: PathBuf } => tracing::Level::WARN,

        #[error("Failed to delete old backup: {path}")]
        DeleteFileFailed { path: PathBuf } => tracing::Level::WARN,
    }
}
