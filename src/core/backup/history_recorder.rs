use crate::core::schedule::due_date;
use crate::interface::repository::ScheduleStore;
use crate::model::artifact::Artifact;
use crate::model::error::Error;
use crate::model::history::backup_history::BackupHistory;
use crate::model::history::outcome::{OutcomeUpdate, RunResult};
use crate::model::log::schedule::ScheduleLog;
use crate::model::schedule::backup_job::{BackupJob, RunTrigger};
use chrono::Utc;
use macros::log;
use std::sync::Arc;

pub struct HistoryRecorder {
    repository: Arc<dyn ScheduleStore>,
}

impl HistoryRecorder {
    pub fn new(repository: Arc<dyn ScheduleStore>) -> Self {
        Self { repository }
    }

    /// Appends the history record for one run and writes the outcome back to
    /// the schedule. Scheduled runs advance `next_backup_date` one step from
    /// the date they were due, whatever the outcome; manual runs leave it.
    pub async fn record(&self, job: &BackupJob, outcome: &Result<Artifact, Error>) -> Result<(), Error> {
        let now = Utc::now();
        let next_backup_date = match job.trigger {
            RunTrigger::Scheduled => match due_date::next(job.scheduled_for, job.frequency) {
                Ok(next) => Some(next),
                Err(err) => {
                    log!(err, schedule_id = job.schedule_id);
                    None
                }
            },
            RunTrigger::Manual => None,
        };

        let (history, result) = match outcome {
            Ok(artifact) => (
                BackupHistory::success(job.schedule_id, now, artifact.path.clone(), artifact.size),
                RunResult::Success {
                    at: now,
                    backup_path: artifact.path.clone(),
                    backup_size: artifact.size,
                },
            ),
            Err(err) => (
                BackupHistory::failure(job.schedule_id, now, err.to_string()),
                RunResult::Failure {
                    at: now,
                    message: err.to_string(),
                },
            ),
        };

        let appended = self.repository.append_history(&history).await;
        let updated = self
            .repository
            .update_outcome(
                job.schedule_id,
                &OutcomeUpdate {
                    next_backup_date,
                    result,
                },
            )
            .await;
        if updated.is_ok() {
            if let Some(next) = next_backup_date {
                log!(ScheduleLog::NextBackupScheduled { next }, schedule_id = job.schedule_id);
            }
        }
        appended.and(updated)
    }
}
