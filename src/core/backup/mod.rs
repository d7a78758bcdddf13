pub mod artifact_namer;
pub mod compressor;
pub mod database_target;
pub mod dump_executor;
pub mod history_recorder;
pub mod pipeline;
pub mod retention;
pub mod snapshot_executor;

use crate::model::error::Error;
use crate::model::error::config::ConfigError;
use crate::model::schedule::backup_schedule::check_writable;
use std::path::Path;
use tokio::fs;

pub(crate) async fn ensure_directory(path: &Path) -> Result<(), Error> {
    fs::create_dir_all(path)
        .await
        .map_err(|err| ConfigError::create_directory_failed(path, err))?;
    check_writable(path)?;
    Ok(())
}
