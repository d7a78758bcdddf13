use crate::core::schedule::dispatcher::Dispatcher;
use crate::interface::core::runnable::Runnable;
use crate::model::log::schedule::ScheduleLog;
use async_trait::async_trait;
use chrono::Utc;
use macros::log;
use std::sync::Arc;
use std::time::Duration;
use tokio::select;
use tokio::sync::Notify;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

/// The control loop: polls the dispatcher every `poll_interval`, or earlier
/// when woken.
pub struct ScheduleTimer {
    dispatcher: Arc<Dispatcher>,
    poll_interval: Duration,
    wake_notify: Notify,
}

impl ScheduleTimer {
    pub fn new(dispatcher: Arc<Dispatcher>, poll_interval: Duration) -> Self {
        ScheduleTimer {
            dispatcher,
            poll_interval,
            wake_notify: Notify::new(),
        }
    }

    pub fn wake(&self) {
        self.wake_notify.notify_one();
    }
}

#[async_trait]
impl Runnable for ScheduleTimer {
    async fn run_impl(self: Arc<Self>, cancel: CancellationToken) {
        log!(ScheduleLog::TimerStarted {
            seconds: self.poll_interval.as_secs()
        });
        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = self.wake_notify.notified() => {}
                _ = ticker.tick() => {}
            }
            if let Err(err) = self.dispatcher.poll_once(Utc::now()).await {
                err.log();
            }
        }
        log!(ScheduleLog::TimerStopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backup::pipeline::BackupPipeline;
    use crate::core::backup::snapshot_executor::SnapshotExecutor;
    use crate::core::infrastructure::database_manager::DatabaseManager;
    use crate::interface::repository::history::HistoryRepository;
    use crate::interface::repository::schedule::ScheduleRepository;
    use crate::model::config::Config;
    use crate::model::schedule::backup_schedule::BackupSchedule;
    use crate::model::schedule::frequency::Frequency;
    use chrono::Duration as ChronoDuration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn wake_triggers_a_poll_and_cancel_stops_the_loop() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let store = Arc::new(DatabaseManager::new(&dir.path().join("store.sqlite3")).await?);
        let pipeline = Arc::new(BackupPipeline::new(
            Arc::new(SnapshotExecutor::new(dir.path().join("absent.db"))),
            store.clone(),
        ));
        let config = Config {
            database_url: "sqlite:absent.db".to_string(),
            ..Config::default()
        };
        let dispatcher = Arc::new(Dispatcher::new(store.clone(), pipeline, &config));
        let timer = Arc::new(ScheduleTimer::new(dispatcher.clone(), Duration::from_secs(3600)));
        let cancel = dispatcher.cancellation_token();
        let handle = timer.clone().run(cancel.clone());

        // The first tick fires immediately; this schedule becomes due only
        // afterwards, so only a wake can pick it up within the test.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let schedule = BackupSchedule::new(
            "woken",
            "wallet",
            dir.path().join("backups"),
            Frequency::Daily,
            Utc::now() - ChronoDuration::seconds(1),
        );
        store.create_schedule(&schedule).await?;
        timer.wake();

        let mut recorded = Vec::new();
        for _ in 0..200 {
            recorded = store.get_history(Some(schedule.id), 10).await?;
            if !recorded.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(recorded.len(), 1);

        cancel.cancel();
        handle.await?;
        Ok(())
    }
}
