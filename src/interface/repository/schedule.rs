use crate::core::infrastructure::database_manager::DatabaseManager;
use crate::model::error::Error;
use crate::model::error::database::DatabaseError;
use crate::model::history::outcome::{OutcomeUpdate, RunResult};
use crate::model::schedule::backup_schedule::BackupSchedule;
use crate::model::schedule::frequency::Frequency;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use macros::log;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use std::path::PathBuf;
use uuid::Uuid;

#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create_schedule_table(&self) -> Result<(), Error>;
    async fn create_schedule(&self, schedule: &BackupSchedule) -> Result<(), Error>;
    async fn modify_schedule(&self, schedule: &BackupSchedule) -> Result<(), Error>;
    async fn remove_schedule(&self, id: Uuid) -> Result<(), Error>;
    async fn get_schedule(&self, id: Uuid) -> Result<Option<BackupSchedule>, Error>;
    async fn list_schedules(&self, wallet: &str) -> Result<Vec<BackupSchedule>, Error>;
    async fn list_active(&self) -> Result<Vec<BackupSchedule>, Error>;
    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), Error>;
    async fn update_outcome(&self, id: Uuid, update: &OutcomeUpdate) -> Result<(), Error>;

    async fn list_eligible(&self, now: DateTime<Utc>) -> Result<Vec<BackupSchedule>, Error> {
        let schedules = self.list_active().await?;
        Ok(schedules
            .into_iter()
            .filter(|schedule| schedule.is_eligible(now))
            .collect())
    }
}

const SELECT_SCHEDULE: &str = r#"
    SELECT
        uuid,
        name,
        wallet,
        backup_path,
        frequency_type,
        start_datetime,
        end_datetime,
        next_backup_date,
        retention_count,
        compress,
        active,
        created_at,
        last_error,
        last_error_time,
        last_success_time,
        last_backup_path,
        last_backup_size
    FROM BackupSchedules
"#;

fn corrupted(column: &str) -> impl FnOnce(sqlx::Error) -> DatabaseError + '_ {
    move |err| DatabaseError::data_corrupted(column, err)
}

fn schedule_from_row(row: &SqliteRow) -> Result<BackupSchedule, Error> {
    let uuid_bytes: Vec<u8> = row.try_get("uuid").map_err(corrupted("uuid"))?;
    let id = Uuid::from_slice(&uuid_bytes)
        .map_err(|err| DatabaseError::data_corrupted("uuid", err))?;

    let frequency: String = row
        .try_get("frequency_type")
        .map_err(corrupted("frequency_type"))?;
    let frequency_type = frequency.parse::<Frequency>()?;

    let retention: i64 = row
        .try_get("retention_count")
        .map_err(corrupted("retention_count"))?;
    let retention_count = u32::try_from(retention)
        .map_err(|err| DatabaseError::data_corrupted("retention_count", err))?;

    let last_backup_size = row
        .try_get::<Option<i64>, _>("last_backup_size")
        .map_err(corrupted("last_backup_size"))?
        .map(|size| size.max(0) as u64);

    Ok(BackupSchedule {
        id,
        name: row.try_get("name").map_err(corrupted("name"))?,
        wallet: row.try_get("wallet").map_err(corrupted("wallet"))?,
        backup_path: row
            .try_get::<String, _>("backup_path")
            .map_err(corrupted("backup_path"))?
            .into(),
        frequency_type,
        start_datetime: row
            .try_get("start_datetime")
            .map_err(corrupted("start_datetime"))?,
        end_datetime: row
            .try_get("end_datetime")
            .map_err(corrupted("end_datetime"))?,
        next_backup_date: row
            .try_get("next_backup_date")
            .map_err(corrupted("next_backup_date"))?,
        retention_count,
        compress: row.try_get("compress").map_err(corrupted("compress"))?,
        active: row.try_get("active").map_err(corrupted("active"))?,
        created_at: row.try_get("created_at").map_err(corrupted("created_at"))?,
        last_error: row.try_get("last_error").map_err(corrupted("last_error"))?,
        last_error_time: row
            .try_get("last_error_time")
            .map_err(corrupted("last_error_time"))?,
        last_success_time: row
            .try_get("last_success_time")
            .map_err(corrupted("last_success_time"))?,
        last_backup_path: row
            .try_get::<Option<String>, _>("last_backup_path")
            .map_err(corrupted("last_backup_path"))?
            .map(PathBuf::from),
        last_backup_size,
    })
}

// Undecodable rows are logged and skipped.
fn decode_rows(rows: Vec<SqliteRow>) -> Vec<BackupSchedule> {
    rows.iter()
        .filter_map(|row| match schedule_from_row(row) {
            Ok(schedule) => Some(schedule),
            Err(err) => {
                log!(err);
                None
            }
        })
        .collect()
}

fn path_text(path: &std::path::Path) -> String {
    path.to_string_lossy().to_string()
}

#[async_trait]
impl ScheduleRepository for DatabaseManager {
    async fn create_schedule_table(&self) -> Result<(), Error> {
        let pool = self.get_pool();
        sqlx::query(
            r#"
            CREATE TABLE BackupSchedules (
                uuid BLOB PRIMARY KEY,
                name TEXT NOT NULL,
                wallet TEXT NOT NULL,
                backup_path TEXT NOT NULL,
                frequency_type TEXT NOT NULL,
                start_datetime TEXT NOT NULL,
                end_datetime TEXT,
                next_backup_date TEXT NOT NULL,
                retention_count INTEGER NOT NULL DEFAULT 7,
                compress INTEGER NOT NULL DEFAULT 1,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                last_error TEXT,
                last_error_time TEXT,
                last_success_time TEXT,
                last_backup_path TEXT,
                last_backup_size INTEGER
            )
            "#,
        )
        .execute(&pool)
        .await
        .map_err(|err| DatabaseError::create_table_failed("BackupSchedules", err))?;
        Ok(())
    }

    async fn create_schedule(&self, schedule: &BackupSchedule) -> Result<(), Error> {
        schedule.validate()?;
        let pool = self.get_pool();
        sqlx::query(
            r#"
            INSERT INTO BackupSchedules (
                uuid,
                name,
                wallet,
                backup_path,
                frequency_type,
                start_datetime,
                end_datetime,
                next_backup_date,
                retention_count,
                compress,
                active,
                created_at,
                last_error,
                last_error_time,
                last_success_time,
                last_backup_path,
                last_backup_size
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(schedule.id.as_bytes().as_slice())
        .bind(&schedule.name)
        .bind(&schedule.wallet)
        .bind(path_text(&schedule.backup_path))
        .bind(schedule.frequency_type.as_str())
        .bind(schedule.start_datetime)
        .bind(schedule.end_datetime)
        .bind(schedule.next_backup_date)
        .bind(i64::from(schedule.retention_count))
        .bind(schedule.compress)
        .bind(schedule.active)
        .bind(schedule.created_at)
        .bind(&schedule.last_error)
        .bind(schedule.last_error_time)
        .bind(schedule.last_success_time)
        .bind(schedule.last_backup_path.as_deref().map(path_text))
        .bind(schedule.last_backup_size.map(|size| size as i64))
        .execute(&pool)
        .await
        .map_err(DatabaseError::statement_execution_failed)?;
        Ok(())
    }

    /// Rewrites the user-editable configuration of a schedule. Outcome fields
    /// belong to the engine and are left alone.
    async fn modify_schedule(&self, schedule: &BackupSchedule) -> Result<(), Error> {
        schedule.validate()?;
        let pool = self.get_pool();
        sqlx::query(
            r#"
            UPDATE BackupSchedules
            SET
                name = ?,
                wallet = ?,
                backup_path = ?,
                frequency_type = ?,
                start_datetime = ?,
                end_datetime = ?,
                next_backup_date = ?,
                retention_count = ?,
                compress = ?,
                active = ?
            WHERE uuid = ?
            "#,
        )
        .bind(&schedule.name)
        .bind(&schedule.wallet)
        .bind(path_text(&schedule.backup_path))
        .bind(schedule.frequency_type.as_str())
        .bind(schedule.start_datetime)
        .bind(schedule.end_datetime)
        .bind(schedule.next_backup_date)
        .bind(i64::from(schedule.retention_count))
        .bind(schedule.compress)
        .bind(schedule.active)
        .bind(schedule.id.as_bytes().as_slice())
        .execute(&pool)
        .await
        .map_err(DatabaseError::statement_execution_failed)?;
        Ok(())
    }

    async fn remove_schedule(&self, id: Uuid) -> Result<(), Error> {
        let pool = self.get_pool();
        let mut transaction = pool
            .begin()
            .await
            .map_err(DatabaseError::statement_execution_failed)?;
        sqlx::query("DELETE FROM BackupHistory WHERE schedule_id = ?")
            .bind(id.as_bytes().as_slice())
            .execute(&mut *transaction)
            .await
            .map_err(DatabaseError::statement_execution_failed)?;
        sqlx::query("DELETE FROM BackupSchedules WHERE uuid = ?")
            .bind(id.as_bytes().as_slice())
            .execute(&mut *transaction)
            .await
            .map_err(DatabaseError::statement_execution_failed)?;
        transaction
            .commit()
            .await
            .map_err(DatabaseError::statement_execution_failed)?;
        Ok(())
    }

    async fn get_schedule(&self, id: Uuid) -> Result<Option<BackupSchedule>, Error> {
        let pool = self.get_pool();
        let row = sqlx::query(&format!("{SELECT_SCHEDULE} WHERE uuid = ?"))
            .bind(id.as_bytes().as_slice())
            .fetch_optional(&pool)
            .await
            .map_err(DatabaseError::statement_execution_failed)?;
        row.as_ref().map(schedule_from_row).transpose()
    }

    async fn list_schedules(&self, wallet: &str) -> Result<Vec<BackupSchedule>, Error> {
        let pool = self.get_pool();
        let rows = sqlx::query(&format!(
            "{SELECT_SCHEDULE} WHERE wallet = ? ORDER BY created_at DESC"
        ))
        .bind(wallet)
        .fetch_all(&pool)
        .await
        .map_err(DatabaseError::statement_execution_failed)?;
        Ok(decode_rows(rows))
    }

    async fn list_active(&self) -> Result<Vec<BackupSchedule>, Error> {
        let pool = self.get_pool();
        let rows = sqlx::query(&format!(
            "{SELECT_SCHEDULE} WHERE active = 1 ORDER BY next_backup_date"
        ))
        .fetch_all(&pool)
        .await
        .map_err(DatabaseError::statement_execution_failed)?;
        Ok(decode_rows(rows))
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), Error> {
        let pool = self.get_pool();
        sqlx::query("UPDATE BackupSchedules SET active = ? WHERE uuid = ?")
            .bind(active)
            .bind(id.as_bytes().as_slice())
            .execute(&pool)
            .await
            .map_err(DatabaseError::statement_execution_failed)?;
        Ok(())
    }

    async fn update_outcome(&self, id: Uuid, update: &OutcomeUpdate) -> Result<(), Error> {
        let pool = self.get_pool();
        let query = match &update.result {
            RunResult::Success {
                at,
                backup_path,
                backup_size,
            } => sqlx::query(
                r#"
                UPDATE BackupSchedules
                SET
                    next_backup_date = COALESCE(?, next_backup_date),
                    last_error = NULL,
                    last_error_time = NULL,
                    last_success_time = ?,
                    last_backup_path = ?,
                    last_backup_size = ?
                WHERE uuid = ?
                "#,
            )
            .bind(update.next_backup_date)
            .bind(*at)
            .bind(path_text(backup_path))
            .bind(*backup_size as i64),
            RunResult::Failure { at, message } => sqlx::query(
                r#"
                UPDATE BackupSchedules
                SET
                    next_backup_date = COALESCE(?, next_backup_date),
                    last_error = ?,
                    last_error_time = ?
                WHERE uuid = ?
                "#,
            )
            .bind(update.next_backup_date)
            .bind(message.clone())
            .bind(*at),
        };
        query
            .bind(id.as_bytes().as_slice())
            .execute(&pool)
            .await
            .map_err(DatabaseError::statement_execution_failed)?;
        Ok(())
    }
}
