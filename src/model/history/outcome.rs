use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum RunResult {
    Success {
        at: DateTime<Utc>,
        backup_path: PathBuf,
        backup_size: u64,
    },
    Failure {
        at: DateTime<Utc>,
        message: String,
    },
}

/// Partial update of a schedule's scheduling and outcome fields. Success
/// clears the error fields; failure leaves the success fields untouched.
/// `next_backup_date` is left as stored when `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeUpdate {
    pub next_backup_date: Option<DateTime<Utc>>,
    pub result: RunResult,
}
