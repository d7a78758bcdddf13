use crate::core::backup::database_target::DatabaseTarget;
use crate::core::backup::pipeline::BackupPipeline;
use crate::core::infrastructure::app_config::AppConfig;
use crate::core::infrastructure::database_manager::DatabaseManager;
use crate::core::schedule::dispatcher::Dispatcher;
use crate::core::schedule::schedule_timer::ScheduleTimer;
use crate::interface::core::runnable::Runnable;
use crate::model::error::Error;
use crate::model::error::system::SystemError;
use crate::model::log::system::SystemLog;
use macros::log;
use std::sync::Arc;
use std::time::Duration;
use tokio::{select, signal};

pub struct System {
    database_manager: Arc<DatabaseManager>,
    dispatcher: Arc<Dispatcher>,
    timer: Arc<ScheduleTimer>,
}

impl System {
    pub async fn initialize(app_config: &AppConfig) -> Result<Self, Error> {
        log!(SystemLog::Initializing);
        let target = DatabaseTarget::parse(&app_config.database_url)?;
        let database_manager = Arc::new(DatabaseManager::new(&app_config.store_path).await?);
        let pipeline = Arc::new(BackupPipeline::new(
            target.executor(app_config),
            database_manager.clone(),
        ));
        let dispatcher = Arc::new(Dispatcher::new(
            database_manager.clone(),
            pipeline,
            app_config,
        ));
        let timer = Arc::new(ScheduleTimer::new(
            dispatcher.clone(),
            Duration::from_secs(app_config.poll_interval),
        ));
        log!(SystemLog::InitializeComplete);
        Ok(Self {
            database_manager,
            dispatcher,
            timer,
        })
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    /// Runs the poll loop until Ctrl-C or until the dispatcher is cancelled.
    pub async fn run(&self) -> Result<(), Error> {
        let cancel = self.dispatcher.cancellation_token();
        let timer_handle = self.timer.clone().run(cancel.clone());
        log!(SystemLog::Online);

        let signal = select! {
            result = signal::ctrl_c() => result.map_err(SystemError::signal_listen_failed),
            _ = cancel.cancelled() => Ok(()),
        };
        log!(SystemLog::ShutdownRequested);
        cancel.cancel();
        timer_handle
            .await
            .map_err(SystemError::timer_panicked)?;
        signal?;
        Ok(())
    }

    pub async fn terminate(&self) -> Result<(), Error> {
        log!(SystemLog::Terminating);
        let drained = self.dispatcher.shutdown().await;
        self.database_manager.close().await;
        log!(SystemLog::TerminateComplete);
        drained
    }
}
