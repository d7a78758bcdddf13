use crate::core::backup::artifact_namer::{ArtifactName, ArtifactNamer};
use crate::model::error::retention::RetentionError;
use crate::model::log::backup::BackupLog;
use crate::model::schedule::backup_job::BackupJob;
use macros::log;
use std::path::PathBuf;
use tokio::fs;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RetentionReport {
    pub kept: usize,
    pub deleted: usize,
    pub failed: usize,
}

pub struct RetentionManager;

impl RetentionManager {
    /// Keeps the `retention_count` most recent artifacts of the job's
    /// schedule and deletes the rest. Failures are logged and counted, never
    /// returned.
    pub async fn enforce(job: &BackupJob) -> RetentionReport {
        let mut artifacts = match Self::list_artifacts(job).await {
            Ok(artifacts) => artifacts,
            Err(err) => {
                log!(err, schedule_id = job.schedule_id);
                return RetentionReport::default();
            }
        };
        artifacts.sort_by(|(a, _), (b, _)| b.recency().cmp(&a.recency()));

        let keep = artifacts.len().min(job.retention_count as usize);
        let surplus = artifacts.split_off(keep);
        let report = RetentionReport {
            kept: artifacts.len(),
            ..Self::delete(job, surplus.into_iter().map(|(_, path)| path)).await
        };
        log!(BackupLog::RetentionApplied {
            kept: report.kept,
            deleted: report.deleted,
            failed: report.failed
        }, schedule_id = job.schedule_id);
        report
    }

    /// Deletes every path, carrying on past failures.
    async fn delete(job: &BackupJob, paths: impl IntoIterator<Item = PathBuf>) -> RetentionReport {
        let mut report = RetentionReport::default();
        for path in paths {
            match fs::remove_file(&path).await {
                Ok(()) => {
                    log!(BackupLog::ArtifactDeleted { path }, schedule_id = job.schedule_id);
                    report.deleted += 1;
                }
                Err(err) => {
                    log!(RetentionError::delete_file_failed(path, err), schedule_id = job.schedule_id);
                    report.failed += 1;
                }
            }
        }
        report
    }

    async fn list_artifacts(job: &BackupJob) -> Result<Vec<(ArtifactName, PathBuf)>, RetentionError> {
        let directory = &job.backup_path;
        let mut entries = fs::read_dir(directory)
            .await
            .map_err(|err| RetentionError::read_directory_failed(directory, err))?;

        let mut artifacts = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| RetentionError::read_directory_failed(directory, err))?
        {
            let Some(name) = entry.file_name().to_str().and_then(ArtifactNamer::parse) else {
                continue;
            };
            if name.schedule_id != job.schedule_id {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|file_type| file_type.is_file())
                .unwrap_or(false);
            if is_file {
                artifacts.push((name, entry.path()));
            }
        }
        Ok(artifacts)
    }
}
