use crate::interface::repository::history::HistoryRepository;
use crate::interface::repository::schedule::ScheduleRepository;
use crate::model::error::Error;
use crate::model::error::database::DatabaseError;
use crate::model::log::database::DatabaseLog;
use macros::log;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tokio::fs;

/// Owns the connection pool of the schedule store and creates its tables on
/// first use.
#[derive(Debug)]
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    pub async fn new(path: &Path) -> Result<Self, Error> {
        Self::create_parent(path).await?;
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(DatabaseError::database_connect_failed)?;
        log!(DatabaseLog::DatabaseConnectSuccess {
            path: path.to_path_buf()
        });

        let database_manager = Self { pool };
        if !database_manager.exist_table("BackupSchedules").await {
            database_manager.create_schedule_table().await?;
            log!(DatabaseLog::TableCreated {
                table: "BackupSchedules".to_string()
            });
        }
        if !database_manager.exist_table("BackupHistory").await {
            database_manager.create_history_table().await?;
            log!(DatabaseLog::TableCreated {
                table: "BackupHistory".to_string()
            });
        }
        Ok(database_manager)
    }

    pub fn get_pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    async fn create_parent(path: &Path) -> Result<(), Error> {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|err| DatabaseError::create_database_failed(parent, err))?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub async fn exist_table(&self, table_name: &str) -> bool {
        let pool = self.get_pool();
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type='table' AND name = ?)",
        )
        .bind(table_name)
        .fetch_one(&pool)
        .await
        .unwrap_or(false)
    }

    pub async fn close(&self) {
        self.pool.close().await;
        log!(DatabaseLog::DatabaseClosed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn opening_creates_directories_and_tables() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("nested").join("store.sqlite3");

        let store = DatabaseManager::new(&path).await?;
        assert!(path.exists());
        assert!(store.exist_table("BackupSchedules").await);
        assert!(store.exist_table("BackupHistory").await);
        assert!(!store.exist_table("Missing").await);
        store.close().await;

        let reopened = DatabaseManager::new(&path).await?;
        assert!(reopened.exist_table("BackupSchedules").await);
        Ok(())
    }
}
