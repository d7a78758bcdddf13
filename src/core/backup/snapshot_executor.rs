use crate::core::backup::artifact_namer::ArtifactNamer;
use crate::core::backup::ensure_directory;
use crate::interface::backup_executor::BackupExecutor;
use crate::model::artifact::{Artifact, DatabaseEngine};
use crate::model::error::Error;
use crate::model::error::execution::ExecutionError;
use crate::model::log::backup::BackupLog;
use crate::model::schedule::backup_job::BackupJob;
use async_trait::async_trait;
use macros::log;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection};
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tokio::fs;

/// Online copy of a SQLite database using `VACUUM INTO`.
pub struct SnapshotExecutor {
    source: PathBuf,
}

impl SnapshotExecutor {
    pub fn new(source: PathBuf) -> Self {
        Self { source }
    }

    async fn vacuum_into(&self, target: &Path) -> Result<(), sqlx::Error> {
        let mut connection: SqliteConnection = SqliteConnectOptions::new()
            .filename(&self.source)
            .read_only(true)
            .connect()
            .await?;
        let result = sqlx::query("VACUUM INTO ?")
            .bind(target.to_string_lossy().to_string())
            .execute(&mut connection)
            .await;
        connection.close().await?;
        result.map(|_| ())
    }
}

#[async_trait]
impl BackupExecutor for SnapshotExecutor {
    async fn produce(&self, job: &BackupJob) -> Result<Artifact, Error> {
        ensure_directory(&job.backup_path).await?;
        if fs::metadata(&self.source).await.is_err() {
            Err(ExecutionError::source_database_missing(&self.source))?
        }

        let final_path = ArtifactNamer::available_path(
            &job.backup_path,
            job.schedule_id,
            DatabaseEngine::Sqlite,
            job.requested_at,
        );
        let temp_path = Builder::new()
            .prefix(".partial-")
            .tempfile_in(&job.backup_path)
            .map_err(|err| ExecutionError::create_temporary_file_failed(&job.backup_path, err))?
            .into_temp_path();

        log!(BackupLog::SnapshotStarted {
            path: final_path.clone()
        }, schedule_id = job.schedule_id);
        if let Err(err) = self.vacuum_into(&temp_path).await {
            log!(BackupLog::SnapshotFallbackCopy {
                reason: err.to_string()
            }, schedule_id = job.schedule_id);
            fs::copy(&self.source, &temp_path)
                .await
                .map_err(|err| ExecutionError::snapshot_failed(&final_path, err))?;
        }

        temp_path
            .persist(&final_path)
            .map_err(|err| ExecutionError::persist_artifact_failed(&final_path, err))?;
        let size = fs::metadata(&final_path)
            .await
            .map_err(|err| ExecutionError::read_metadata_failed(&final_path, err))?
            .len();
        log!(BackupLog::ArtifactCreated {
            path: final_path.clone(),
            size
        }, schedule_id = job.schedule_id);
        Ok(Artifact {
            path: final_path,
            size,
        })
    }
}
