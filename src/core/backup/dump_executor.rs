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
use std::process::Stdio;
use tempfile::Builder;
use tokio::fs;
use tokio::process::Command;

/// Runs an external dump tool (`pg_dump` by default) with an explicit
/// argument vector and streams its stdout into the artifact.
pub struct DumpExecutor {
    tool: String,
    arguments: Vec<String>,
    database_url: String,
}

impl DumpExecutor {
    pub fn new(tool: String, arguments: Vec<String>, database_url: String) -> Self {
        Self {
            tool,
            arguments,
            database_url,
        }
    }
}

#[async_trait]
impl BackupExecutor for DumpExecutor {
    async fn produce(&self, job: &BackupJob) -> Result<Artifact, Error> {
        ensure_directory(&job.backup_path).await?;
        let program = which::which(&self.tool)
            .map_err(|err| ExecutionError::dump_tool_missing(&self.tool, err))?;

        let final_path = ArtifactNamer::available_path(
            &job.backup_path,
            job.schedule_id,
            DatabaseEngine::Postgres,
            job.requested_at,
        );
        let temp_file = Builder::new()
            .prefix(".partial-")
            .tempfile_in(&job.backup_path)
            .map_err(|err| ExecutionError::create_temporary_file_failed(&job.backup_path, err))?;
        let stdout = temp_file
            .reopen()
            .map_err(|err| ExecutionError::create_temporary_file_failed(&job.backup_path, err))?;
        let temp_path = temp_file.into_temp_path();

        log!(BackupLog::DumpStarted {
            tool: self.tool.clone(),
            path: final_path.clone()
        }, schedule_id = job.schedule_id);
        let child = Command::new(&program)
            .args(&self.arguments)
            .arg(&self.database_url)
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| ExecutionError::dump_spawn_failed(&self.tool, err))?;
        let output = child
            .wait_with_output()
            .await
            .map_err(|err| ExecutionError::dump_spawn_failed(&self.tool, err))?;

        // Dropping `temp_path` on any early return removes the partial dump.
        if !output.status.success() {
            Err(ExecutionError::dump_exited(
                output.status.to_string(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))?
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
