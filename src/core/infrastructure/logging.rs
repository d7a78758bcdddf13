use crate::model::config::Config;
use crate::model::error::Error;
use crate::model::error::system::SystemError;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub struct Logging;

impl Logging {
    /// Installs the global subscriber: stdout plus a daily rolling file under
    /// `log_directory`. `RUST_LOG` overrides the configured level. The
    /// returned guard flushes the file writer when dropped.
    pub fn initialize(config: &Config) -> Result<WorkerGuard, Error> {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.log_level))
            .map_err(SystemError::initialize_logging_failed)?;

        std::fs::create_dir_all(&config.log_directory)
            .map_err(SystemError::initialize_logging_failed)?;
        let file_appender =
            tracing_appender::rolling::daily(&config.log_directory, "backup_cadence.log");
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .with(fmt::layer().with_ansi(false).with_writer(file_writer))
            .try_init()
            .map_err(SystemError::initialize_logging_failed)?;

        log_panics::init();
        Ok(guard)
    }
}
