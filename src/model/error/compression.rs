use macros::traceable;
use std::path::PathBuf;

traceable! {
    CompressionError {
        #[error("Failed to open raw artifact: {path}")]
        OpenRawFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Failed to create compressed output in {path}")]
        CreateOutputFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Failed to compress {path}")]
        StreamFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Failed to move compressed artifact into place: {path}")]
        PersistFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Compression worker failed")]
        WorkerFailed => tracing::Level::ERROR,
    }
}
