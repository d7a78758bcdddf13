use crate::model::artifact::Artifact;
use crate::model::error::Error;
use crate::model::schedule::backup_job::BackupJob;
use async_trait::async_trait;

/// Produces the raw (uncompressed) backup artifact for one job.
///
/// Implementations write to a temporary file inside the job's backup
/// directory and rename it to its final name only once it is complete, so a
/// file carrying a final artifact name is never partial.
#[async_trait]
pub trait BackupExecutor: Send + Sync {
    async fn produce(&self, job: &BackupJob) -> Result<Artifact, Error>;
}
