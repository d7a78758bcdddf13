use crate::model::error::config::ConfigError;
use crate::model::schedule::frequency::Frequency;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTrigger {
    Scheduled,
    Manual,
}

/// Settings of one schedule frozen at dispatch time. Edits made to the
/// schedule while the run is in flight apply to the next run only.
#[derive(Debug, Clone)]
pub struct BackupJob {
    pub schedule_id: Uuid,
    pub name: String,
    pub backup_path: PathBuf,
    pub frequency: Frequency,
    pub compress: bool,
    pub retention_count: u32,
    pub scheduled_for: DateTime<Utc>,
    pub requested_at: DateTime<Utc>,
    pub trigger: RunTrigger,
}

impl BackupJob {
    /// Rejects settings no run can honour, whatever wrote them to the store.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backup_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBackupPath);
        }
        if self.retention_count < 1 {
            return Err(ConfigError::invalid_retention_count(self.retention_count));
        }
        Ok(())
    }
}
