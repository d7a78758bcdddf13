use crate::core::backup::compressor::Compressor;
use crate::core::backup::history_recorder::HistoryRecorder;
use crate::core::backup::retention::RetentionManager;
use crate::interface::backup_executor::BackupExecutor;
use crate::interface::repository::ScheduleStore;
use crate::model::artifact::Artifact;
use crate::model::error::Error;
use crate::model::log::backup::BackupLog;
use crate::model::schedule::backup_job::BackupJob;
use macros::log;
use std::sync::Arc;

/// One backup run: produce, optionally compress, enforce retention, record.
pub struct BackupPipeline {
    executor: Arc<dyn BackupExecutor>,
    recorder: HistoryRecorder,
}

impl BackupPipeline {
    pub fn new(executor: Arc<dyn BackupExecutor>, repository: Arc<dyn ScheduleStore>) -> Self {
        Self {
            executor,
            recorder: HistoryRecorder::new(repository),
        }
    }

    pub async fn run(&self, job: BackupJob) -> Result<Artifact, Error> {
        let outcome = self.execute(&job).await;
        match &outcome {
            Ok(artifact) => {
                log!(BackupLog::BackupSucceeded {
                    name: job.name.clone()
                }, schedule_id = job.schedule_id, path = artifact.path.display());
            }
            Err(err) => {
                log!(BackupLog::BackupFailed {
                    name: job.name.clone(),
                    reason: err.to_string()
                }, schedule_id = job.schedule_id);
            }
        }
        if let Err(err) = self.recorder.record(&job, &outcome).await {
            err.log();
        }
        outcome
    }

    async fn execute(&self, job: &BackupJob) -> Result<Artifact, Error> {
        job.validate()?;
        let raw = self.executor.produce(job).await?;
        let artifact = if job.compress {
            Compressor::compress(&raw.path).await?
        } else {
            raw
        };
        RetentionManager::enforce(job).await;
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backup::artifact_namer::ArtifactNamer;
    use crate::core::backup::snapshot_executor::SnapshotExecutor;
    use crate::core::infrastructure::database_manager::DatabaseManager;
    use crate::interface::repository::history::HistoryRepository;
    use crate::interface::repository::schedule::ScheduleRepository;
    use crate::model::artifact::DatabaseEngine;
    use crate::model::error::compression::CompressionError;
    use crate::model::error::config::ConfigError;
    use crate::model::error::execution::ExecutionError;
    use crate::model::history::backup_history::HistoryStatus;
    use crate::model::schedule::backup_job::RunTrigger;
    use crate::model::schedule::backup_schedule::BackupSchedule;
    use crate::model::schedule::frequency::Frequency;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use sqlx::sqlite::SqliteConnectOptions;
    use sqlx::{ConnectOptions, Connection};
    use std::path::Path;
    use tempfile::TempDir;

    async fn seed_source(path: &Path) -> anyhow::Result<()> {
        let mut connection = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .connect()
            .await?;
        sqlx::query("CREATE TABLE ledger (id INTEGER PRIMARY KEY, amount INTEGER NOT NULL)")
            .execute(&mut connection)
            .await?;
        sqlx::query("INSERT INTO ledger (amount) VALUES (10), (20), (30)")
            .execute(&mut connection)
            .await?;
        connection.close().await?;
        Ok(())
    }

    struct Fixture {
        _dir: TempDir,
        backups: std::path::PathBuf,
        store: Arc<DatabaseManager>,
        pipeline: BackupPipeline,
    }

    async fn fixture() -> anyhow::Result<Fixture> {
        let dir = TempDir::new()?;
        let source = dir.path().join("app.db");
        seed_source(&source).await?;
        let store = Arc::new(DatabaseManager::new(&dir.path().join("store.sqlite3")).await?);
        let pipeline = BackupPipeline::new(Arc::new(SnapshotExecutor::new(source)), store.clone());
        Ok(Fixture {
            backups: dir.path().join("backups"),
            _dir: dir,
            store,
            pipeline,
        })
    }

    /// Writes a raw dump and parks a directory on its compressed name, so
    /// compression cannot move its output into place.
    struct BlockedCompressionExecutor;

    #[async_trait]
    impl BackupExecutor for BlockedCompressionExecutor {
        async fn produce(&self, job: &BackupJob) -> Result<Artifact, Error> {
            let path = job.backup_path.join(ArtifactNamer::name(
                job.schedule_id,
                DatabaseEngine::Postgres,
                job.requested_at,
                false,
            ));
            std::fs::create_dir_all(ArtifactNamer::compressed_path(&path))
                .and_then(|()| std::fs::write(&path, b"-- dump"))
                .map_err(|err| ExecutionError::persist_artifact_failed(&path, err))?;
            Ok(Artifact { path, size: 7 })
        }
    }

    fn artifact_names(directory: &Path) -> anyhow::Result<Vec<String>> {
        let mut names = std::fs::read_dir(directory)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect::<Vec<_>>();
        names.sort();
        Ok(names)
    }

    #[tokio::test]
    async fn daily_schedule_keeps_three_of_four_runs() -> anyhow::Result<()> {
        let fixture = fixture().await?;
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 1, 0, 0).unwrap();
        let mut schedule =
            BackupSchedule::new("daily", "wallet", &fixture.backups, Frequency::Daily, start);
        schedule.retention_count = 3;
        fixture.store.create_schedule(&schedule).await?;

        let mut first_artifact = None;
        for day in 0..4 {
            let current = fixture
                .store
                .get_schedule(schedule.id)
                .await?
                .expect("schedule exists");
            assert_eq!(current.next_backup_date, start + Duration::days(day));
            let job = current.to_job(start + Duration::days(day), RunTrigger::Scheduled);
            let artifact = fixture.pipeline.run(job).await?;
            first_artifact.get_or_insert(artifact.path);
        }

        let names = artifact_names(&fixture.backups)?;
        assert_eq!(names.len(), 3);
        assert!(names.iter().all(|name| name.ends_with(".sqlite3.gz")));
        assert!(!first_artifact.expect("ran").exists());

        let history = fixture.store.get_history(Some(schedule.id), 50).await?;
        assert_eq!(history.len(), 4);
        assert!(history.iter().all(|entry| entry.status == HistoryStatus::Success));

        let stored = fixture.store.get_schedule(schedule.id).await?.expect("exists");
        assert_eq!(stored.next_backup_date, start + Duration::days(4));
        assert!(stored.last_success_time.is_some());
        assert_eq!(
            stored.last_backup_path.as_deref(),
            Some(fixture.backups.join(names[2].as_str()).as_path())
        );
        Ok(())
    }

    #[tokio::test]
    async fn compress_toggle_applies_to_the_next_run_only() -> anyhow::Result<()> {
        let fixture = fixture().await?;
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 1, 0, 0).unwrap();
        let mut schedule =
            BackupSchedule::new("toggle", "wallet", &fixture.backups, Frequency::Hourly, start);
        fixture.store.create_schedule(&schedule).await?;

        let compressed = fixture
            .pipeline
            .run(schedule.to_job(start, RunTrigger::Scheduled))
            .await?;

        schedule.compress = false;
        let raw = fixture
            .pipeline
            .run(schedule.to_job(start + Duration::hours(1), RunTrigger::Scheduled))
            .await?;

        assert!(compressed.path.to_string_lossy().ends_with(".sqlite3.gz"));
        assert!(raw.path.to_string_lossy().ends_with(".sqlite3"));
        assert!(compressed.path.exists());
        assert!(raw.path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn manual_run_records_history_without_moving_the_cadence() -> anyhow::Result<()> {
        let fixture = fixture().await?;
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 1, 0, 0).unwrap();
        let schedule =
            BackupSchedule::new("manual", "wallet", &fixture.backups, Frequency::Weekly, start);
        fixture.store.create_schedule(&schedule).await?;

        fixture
            .pipeline
            .run(schedule.to_job(Utc::now(), RunTrigger::Manual))
            .await?;

        let stored = fixture.store.get_schedule(schedule.id).await?.expect("exists");
        assert_eq!(stored.next_backup_date, start);
        assert!(stored.last_backup_size.is_some());
        assert_eq!(fixture.store.get_history(Some(schedule.id), 10).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn compression_failure_keeps_the_raw_dump_and_advances() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let backups = dir.path().join("backups");
        let store = Arc::new(DatabaseManager::new(&dir.path().join("store.sqlite3")).await?);
        let pipeline = BackupPipeline::new(Arc::new(BlockedCompressionExecutor), store.clone());
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 1, 0, 0).unwrap();
        let schedule = BackupSchedule::new("gzip", "wallet", &backups, Frequency::Daily, start);
        std::fs::create_dir_all(&backups)?;
        store.create_schedule(&schedule).await?;

        let result = pipeline
            .run(schedule.to_job(start, RunTrigger::Scheduled))
            .await;

        assert!(matches!(result, Err(Error::Compression(CompressionError::PersistFailed { .. }))));
        let raw = backups.join(ArtifactNamer::name(
            schedule.id,
            DatabaseEngine::Postgres,
            start,
            false,
        ));
        assert!(raw.is_file());

        let history = store.get_history(Some(schedule.id), 10).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, HistoryStatus::Error);

        let stored = store.get_schedule(schedule.id).await?.expect("exists");
        assert_eq!(stored.next_backup_date, start + Duration::days(1));
        assert!(stored.last_error.is_some());
        assert!(stored.last_success_time.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn zero_retention_from_the_store_fails_before_producing() -> anyhow::Result<()> {
        let fixture = fixture().await?;
        let start = Utc.with_ymd_and_hms(2024, 4, 1, 1, 0, 0).unwrap();
        let schedule =
            BackupSchedule::new("tampered", "wallet", &fixture.backups, Frequency::Hourly, start);
        fixture.store.create_schedule(&schedule).await?;
        sqlx::query("UPDATE BackupSchedules SET retention_count = 0")
            .execute(&fixture.store.get_pool())
            .await?;
        let loaded = fixture.store.get_schedule(schedule.id).await?.expect("exists");
        assert_eq!(loaded.retention_count, 0);

        let result = fixture
            .pipeline
            .run(loaded.to_job(start, RunTrigger::Scheduled))
            .await;

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidRetentionCount { value: 0 }))
        ));
        let produced = std::fs::read_dir(&fixture.backups)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(produced, 0);

        let history = fixture.store.get_history(Some(schedule.id), 10).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, HistoryStatus::Error);
        let stored = fixture.store.get_schedule(schedule.id).await?.expect("exists");
        assert_eq!(stored.next_backup_date, start + Duration::hours(1));
        assert!(stored.last_backup_path.is_none());
        Ok(())
    }
}
