use crate::core::infrastructure::database_manager::DatabaseManager;
use crate::model::error::Error;
use crate::model::error::database::DatabaseError;
use crate::model::history::backup_history::{BackupHistory, HistoryStatus};
use async_trait::async_trait;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::path::PathBuf;
use uuid::Uuid;

pub const MAX_HISTORY_LIMIT: u32 = 200;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    async fn create_history_table(&self) -> Result<(), Error>;
    async fn append_history(&self, history: &BackupHistory) -> Result<(), Error>;
    /// Newest first. `limit` is clamped to `1..=200`.
    async fn get_history(
        &self,
        schedule_id: Option<Uuid>,
        limit: u32,
    ) -> Result<Vec<BackupHistory>, Error>;
}

fn uuid_column(row: &SqliteRow, column: &str) -> Result<Uuid, DatabaseError> {
    let bytes: Vec<u8> = row
        .try_get(column)
        .map_err(|err| DatabaseError::data_corrupted(column, err))?;
    Uuid::from_slice(&bytes).map_err(|err| DatabaseError::data_corrupted(column, err))
}

fn history_from_row(row: &SqliteRow) -> Result<BackupHistory, DatabaseError> {
    let status = row
        .try_get::<String, _>("status")
        .map_err(|err| DatabaseError::data_corrupted("status", err))?
        .parse::<HistoryStatus>()?;
    let file_size = row
        .try_get::<Option<i64>, _>("file_size")
        .map_err(|err| DatabaseError::data_corrupted("file_size", err))?
        .map(|size| size.max(0) as u64);

    Ok(BackupHistory {
        id: uuid_column(row, "uuid")?,
        schedule_id: uuid_column(row, "schedule_id")?,
        timestamp: row
            .try_get("timestamp")
            .map_err(|err| DatabaseError::data_corrupted("timestamp", err))?,
        status,
        file_path: row
            .try_get::<Option<String>, _>("file_path")
            .map_err(|err| DatabaseError::data_corrupted("file_path", err))?
            .map(PathBuf::from),
        file_size,
        error_message: row
            .try_get("error_message")
            .map_err(|err| DatabaseError::data_corrupted("error_message", err))?,
    })
}

#[async_trait]
impl HistoryRepository for DatabaseManager {
    async fn create_history_table(&self) -> Result<(), Error> {
        let pool = self.get_pool();
        sqlx::query(
            r#"
            CREATE TABLE BackupHistory (
                uuid BLOB PRIMARY KEY,
                schedule_id BLOB NOT NULL,
                timestamp TEXT NOT NULL,
                status TEXT NOT NULL,
                file_path TEXT,
                file_size INTEGER,
                error_message TEXT
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|err| DatabaseError::create_table_failed("BackupHistory", err))?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_history_schedule ON BackupHistory (schedule_id, timestamp DESC)",
        )
        .execute(&pool)
        .await
        .map_err(|err| DatabaseError::create_table_failed("BackupHistory", err))?;
        Ok(())
    }

    async fn append_history(&self, history: &BackupHistory) -> Result<(), Error> {
        let pool = self.get_pool();
        sqlx::query(
            r#"
            INSERT INTO BackupHistory (
                uuid,
                schedule_id,
                timestamp,
                status,
                file_path,
                file_size,
                error_message
            )
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(history.id.as_bytes().as_slice())
        .bind(history.schedule_id.as_bytes().as_slice())
        .bind(history.timestamp)
        .bind(history.status.as_str())
        .bind(
            history
                .file_path
                .as_ref()
                .map(|path| path.to_string_lossy().to_string()),
        )
        .bind(history.file_size.map(|size| size as i64))
        .bind(&history.error_message)
        .execute(&pool)
        .await
        .map_err(DatabaseError::statement_execution_failed)?;
        Ok(())
    }

    async fn get_history(
        &self,
        schedule_id: Option<Uuid>,
        limit: u32,
    ) -> Result<Vec<BackupHistory>, Error> {
        let pool = self.get_pool();
        let limit = i64::from(limit.clamp(1, MAX_HISTORY_LIMIT));
        let rows = match schedule_id {
            Some(schedule_id) => {
                sqlx::query(
                    r#"
                    SELECT uuid, schedule_id, timestamp, status, file_path, file_size, error_message
                    FROM BackupHistory
                    WHERE schedule_id = ?
                    ORDER BY timestamp DESC, rowid DESC
                    LIMIT ?
                    "#,
                )
                .bind(schedule_id.as_bytes().as_slice())
                .bind(limit)
                .fetch_all(&pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT uuid, schedule_id, timestamp, status, file_path, file_size, error_message
                    FROM BackupHistory
                    ORDER BY timestamp DESC, rowid DESC
                    LIMIT ?
                    "#,
                )
                .bind(limit)
                .fetch_all(&pool)
                .await
            }
        }
        .map_err(DatabaseError::statement_execution_failed)?;

        let histories = rows
            .iter()
            .map(history_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(histories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    #[tokio::test]
    async fn history_is_returned_newest_first_and_filtered() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = DatabaseManager::new(&dir.path().join("store.sqlite3")).await?;
        let schedule_a = Uuid::new_v4();
        let schedule_b = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();

        for hour in 0..3 {
            store
                .append_history(&BackupHistory::success(
                    schedule_a,
                    base + Duration::hours(hour),
                    dir.path().join(format!("a{hour}.sql")),
                    10,
                ))
                .await?;
        }
        store
            .append_history(&BackupHistory::failure(
                schedule_b,
                base + Duration::hours(10),
                "boom".to_string(),
            ))
            .await?;

        let history = store.get_history(Some(schedule_a), 50).await?;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].timestamp, base + Duration::hours(2));
        assert_eq!(history[2].timestamp, base);
        assert!(history.iter().all(|entry| entry.status == HistoryStatus::Success));

        let all = store.get_history(None, 50).await?;
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].status, HistoryStatus::Error);
        assert_eq!(all[0].error_message.as_deref(), Some("boom"));
        assert!(all[0].file_path.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn limit_is_clamped() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = DatabaseManager::new(&dir.path().join("store.sqlite3")).await?;
        let schedule = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        for minute in 0..3 {
            store
                .append_history(&BackupHistory::failure(
                    schedule,
                    base + Duration::minutes(minute),
                    "x".to_string(),
                ))
                .await?;
        }

        assert_eq!(store.get_history(Some(schedule), 0).await?.len(), 1);
        assert_eq!(store.get_history(Some(schedule), 2).await?.len(), 2);
        assert_eq!(store.get_history(Some(schedule), 10_000).await?.len(), 3);
        Ok(())
    }
}
