use crate::model::error::config::ConfigError;
use crate::model::schedule::backup_job::{BackupJob, RunTrigger};
use crate::model::schedule::frequency::Frequency;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use uuid::Uuid;

pub const DEFAULT_RETENTION_COUNT: u32 = 7;

/// Creates and removes a scratch file in `directory`.
pub fn check_writable(directory: &Path) -> Result<(), ConfigError> {
    Builder::new()
        .prefix(".write-check-")
        .tempfile_in(directory)
        .map(drop)
        .map_err(|err| ConfigError::backup_path_not_writable(directory, err))
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupSchedule {
    pub id: Uuid,
    pub name: String,
    pub wallet: String,
    pub backup_path: PathBuf,
    pub frequency_type: Frequency,
    pub start_datetime: DateTime<Utc>,
    pub end_datetime: Option<DateTime<Utc>>,
    pub next_backup_date: DateTime<Utc>,
    pub retention_count: u32,
    pub compress: bool,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub last_error: Option<String>,
    pub last_error_time: Option<DateTime<Utc>>,
    pub last_success_time: Option<DateTime<Utc>>,
    pub last_backup_path: Option<PathBuf>,
    pub last_backup_size: Option<u64>,
}

impl BackupSchedule {
    /// A fresh, active schedule whose first backup is due at `start_datetime`.
    pub fn new(
        name: impl Into<String>,
        wallet: impl Into<String>,
        backup_path: impl Into<PathBuf>,
        frequency_type: Frequency,
        start_datetime: DateTime<Utc>,
    ) -> Self {
        BackupSchedule {
            id: Uuid::new_v4(),
            name: name.into(),
            wallet: wallet.into(),
            backup_path: backup_path.into(),
            frequency_type,
            start_datetime,
            end_datetime: None,
            next_backup_date: start_datetime,
            retention_count: DEFAULT_RETENTION_COUNT,
            compress: true,
            active: true,
            created_at: Utc::now(),
            last_error: None,
            last_error_time: None,
            last_success_time: None,
            last_backup_path: None,
            last_backup_size: None,
        }
    }

    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        self.active
            && now >= self.start_datetime
            && now >= self.next_backup_date
            && !self.is_expired(now)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.end_datetime.is_some_and(|end| now > end)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backup_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBackupPath);
        }
        if self.backup_path.exists() && !self.backup_path.is_dir() {
            return Err(ConfigError::backup_path_not_directory(&self.backup_path));
        }
        if self.backup_path.is_dir() {
            check_writable(&self.backup_path)?;
        }
        if self.retention_count < 1 {
            return Err(ConfigError::invalid_retention_count(self.retention_count));
        }
        if let Some(end) = self.end_datetime {
            if end <= self.start_datetime {
                return Err(ConfigError::invalid_active_window(self.start_datetime, end));
            }
        }
        if self.next_backup_date < self.start_datetime {
            return Err(ConfigError::next_before_start(
                self.start_datetime,
                self.next_backup_date,
            ));
        }
        Ok(())
    }

    pub fn to_job(&self, requested_at: DateTime<Utc>, trigger: RunTrigger) -> BackupJob {
        BackupJob {
            schedule_id: self.id,
            name: self.name.clone(),
            backup_path: self.backup_path.clone(),
            frequency: self.frequency_type,
            compress: self.compress,
            retention_count: self.retention_count,
            scheduled_for: self.next_backup_date,
            requested_at,
            trigger,
        }
    }
}
