use crate::core::backup::artifact_namer::ArtifactNamer;
use crate::model::artifact::Artifact;
use crate::model::error::Error;
use crate::model::error::compression::CompressionError;
use crate::model::log::backup::BackupLog;
use flate2::Compression;
use flate2::write::GzEncoder;
use macros::log;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::Builder;
use tokio::task;

pub struct Compressor;

impl Compressor {
    /// Gzips `raw` into `<raw>.gz` and removes `raw` once the compressed copy
    /// is in place. On failure the raw artifact is left untouched.
    pub async fn compress(raw: &Path) -> Result<Artifact, Error> {
        let raw = raw.to_path_buf();
        let artifact = task::spawn_blocking(move || Self::compress_blocking(&raw))
            .await
            .map_err(CompressionError::worker_failed)??;
        Ok(artifact)
    }

    fn compress_blocking(raw: &Path) -> Result<Artifact, CompressionError> {
        let directory = raw.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        let target = ArtifactNamer::compressed_path(raw);

        let mut input =
            File::open(raw).map_err(|err| CompressionError::open_raw_failed(raw, err))?;
        let output = Builder::new()
            .prefix(".partial-")
            .tempfile_in(&directory)
            .map_err(|err| CompressionError::create_output_failed(&directory, err))?;

        let mut encoder = GzEncoder::new(output, Compression::default());
        io::copy(&mut input, &mut encoder)
            .map_err(|err| CompressionError::stream_failed(raw, err))?;
        let output = encoder
            .finish()
            .map_err(|err| CompressionError::stream_failed(raw, err))?;
        output
            .as_file()
            .sync_all()
            .map_err(|err| CompressionError::stream_failed(raw, err))?;
        drop(input);

        output
            .into_temp_path()
            .persist(&target)
            .map_err(|err| CompressionError::persist_failed(&target, err))?;
        let size = fs::metadata(&target)
            .map_err(|err| CompressionError::stream_failed(&target, err))?
            .len();

        if let Err(err) = fs::remove_file(raw) {
            log!(BackupLog::RawRemovalFailed {
                path: raw.to_path_buf(),
                reason: err.to_string()
            });
        }
        log!(BackupLog::Compressed {
            path: target.clone(),
            size
        });
        Ok(Artifact { path: target, size })
    }
}
