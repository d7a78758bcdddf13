use macros::traceable;
use std::path::PathBuf;

traceable! {
    ExecutionError {
        #[no_source]
        #[error("Database file not found: {path}")]
        SourceDatabaseMissing { path: PathBuf } => tracing::Level::ERROR,

        #[error("Failed to snapshot database into {path}")]
        SnapshotFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Failed to create temporary file in {path}")]
        CreateTemporaryFileFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Dump tool not found: {tool}")]
        DumpToolMissing { tool: String } => tracing::Level::ERROR,

        #[error("Failed to spawn dump tool: {tool}")]
        DumpSpawnFailed { tool: String } => tracing::Level::ERROR,

        #[no_source]
        #[error("Dump tool exited with {status}: {stderr}")]
        DumpExited { status: String, stderr: String } => tracing::Level::ERROR,

        #[error("Failed to move artifact into place: {path}")]
        PersistArtifactFailed { path: PathBuf } => tracing::Level::ERROR,

        #[error("Failed to read artifact metadata: {path}")]
        ReadMetadataFailed { path: PathBuf } => tracing::Level::ERROR,
    }
}
