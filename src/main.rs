use backup_cadence::core::infrastructure::app_config::AppConfig;
use backup_cadence::core::infrastructure::logging::Logging;
use backup_cadence::core::system::System;
use backup_cadence::model::log::system::SystemLog;
use macros::log;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

const DEFAULT_CONFIG_PATH: &str = "./config.toml";

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));

    // Nothing can be logged before the subscriber exists.
    let app_config = match AppConfig::load(&config_path) {
        Ok(app_config) => app_config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = match Logging::initialize(&app_config) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    log!(SystemLog::ConfigLoaded { path: config_path });

    let system = match System::initialize(&app_config).await {
        Ok(system) => system,
        Err(err) => {
            err.log();
            return ExitCode::FAILURE;
        }
    };
    let running = system.run().await;
    let terminated = system.terminate().await;
    match running.and(terminated) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            err.log();
            ExitCode::FAILURE
        }
    }
}
