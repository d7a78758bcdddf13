use crate::model::error::database::DatabaseError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Success,
    Error,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStatus::Success => "success",
            HistoryStatus::Error => "error",
        }
    }
}

impl fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryStatus {
    type Err = DatabaseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "success" => Ok(HistoryStatus::Success),
            "error" => Ok(HistoryStatus::Error),
            other => Err(DatabaseError::data_corrupted(
                "status",
                format!("unknown history status {other}"),
            )),
        }
    }
}

/// One execution attempt. Written once, never updated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BackupHistory {
    pub id: Uuid,
    pub schedule_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub status: HistoryStatus,
    pub file_path: Option<PathBuf>,
    pub file_size: Option<u64>,
    pub error_message: Option<String>,
}

impl BackupHistory {
    pub fn success(
        schedule_id: Uuid,
        timestamp: DateTime<Utc>,
        file_path: PathBuf,
        file_size: u64,
    ) -> Self {
        BackupHistory {
            id: Uuid::new_v4(),
            schedule_id,
            timestamp,
            status: HistoryStatus::Success,
            file_path: Some(file_path),
            file_size: Some(file_size),
            error_message: None,
        }
    }

    pub fn failure(schedule_id: Uuid, timestamp: DateTime<Utc>, error_message: String) -> Self {
        BackupHistory {
            id: Uuid::new_v4(),
            schedule_id,
            timestamp,
            status: HistoryStatus::Error,
            file_path: None,
            file_size: None,
            error_message: Some(error_message),
        }
    }
}
