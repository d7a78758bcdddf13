use macros::loggable;
use std::path::PathBuf;

loggable! {
    BackupLog {
        #[error("Performing SQLite snapshot into {path}")]
        SnapshotStarted { path: PathBuf } => tracing::Level::INFO,

        #[error("VACUUM INTO failed, falling back to file copy: {reason}")]
        SnapshotFallbackCopy { reason: String } => tracing::Level::WARN,

        #[error("Running {tool} into {path}")]
        DumpStarted { tool: String, path: PathBuf } => tracing::Level::INFO,

        #[error("Backup artifact created: {path} ({size} bytes)")]
        ArtifactCreated { path: PathBuf, size: u64 } => tracing::Level::INFO,

        #[error("Compressed backup: {path} ({size} bytes)")]
        Compressed { path: PathBuf, size: u64 } => tracing::Level::INFO,

        #[error("Compressed copy written but raw artifact could not be removed: {path}: {reason}")]
        RawRemovalFailed { path: PathBuf, reason: String } => tracing::Level::WARN,

        #[error("Removed old backup: {path}")]
        ArtifactDeleted { path: PathBuf } => tracing::Level::INFO,

        #[error("Retention applied: kept {kept}, deleted {deleted}, failed {failed}")]
        RetentionApplied { kept: usize, deleted: usize, failed: usize } => tracing::Level::INFO,

        #[error("Backup successful for schedule {name}")]
        BackupSucceeded { name: String } => tracing::Level::INFO,

        #[error("Backup failed for schedule {name}: {reason}")]
        BackupFailed { name: String, reason: String } => tracing::Level::ERROR,
    }
}
