use crate::core::backup::dump_executor::DumpExecutor;
use crate::core::backup::snapshot_executor::SnapshotExecutor;
use crate::interface::backup_executor::BackupExecutor;
use crate::model::config::Config;
use crate::model::error::config::ConfigError;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// The database being backed up, classified once at startup from
/// `database_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Sqlite(PathBuf),
    Postgres(String),
}

impl DatabaseTarget {
    pub fn parse(database_url: &str) -> Result<Self, ConfigError> {
        let unsupported = || ConfigError::unsupported_database_url(database_url);
        let url = match Url::parse(database_url) {
            Ok(url) => url,
            // No scheme at all: a plain file path.
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                return Ok(DatabaseTarget::Sqlite(PathBuf::from(database_url)));
            }
            Err(_) => return Err(unsupported()),
        };

        match url.scheme() {
            "postgres" | "postgresql" => Ok(DatabaseTarget::Postgres(database_url.to_string())),
            "sqlite" => {
                let (_, rest) = database_url.split_once(':').ok_or_else(unsupported)?;
                let rest = rest.strip_prefix("//").unwrap_or(rest);
                let path = rest.split('?').next().unwrap_or(rest);
                if path.is_empty() || path == ":memory:" {
                    return Err(unsupported());
                }
                Ok(DatabaseTarget::Sqlite(PathBuf::from(path)))
            }
            "file" => url
                .to_file_path()
                .map(DatabaseTarget::Sqlite)
                .map_err(|_| unsupported()),
            _ => Err(unsupported()),
        }
    }

    pub fn executor(&self, config: &Config) -> Arc<dyn BackupExecutor> {
        match self {
            DatabaseTarget::Sqlite(path) => Arc::new(SnapshotExecutor::new(path.clone())),
            DatabaseTarget::Postgres(url) => Arc::new(DumpExecutor::new(
                config.dump_tool.clone(),
                config.dump_arguments.clone(),
                url.clone(),
            )),
        }
    }
}
