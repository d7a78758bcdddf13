use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseEngine {
    Sqlite,
    Postgres,
}

impl DatabaseEngine {
    pub const ALL: [DatabaseEngine; 2] = [DatabaseEngine::Sqlite, DatabaseEngine::Postgres];

    pub fn extension(&self) -> &'static str {
        match self {
            DatabaseEngine::Sqlite => "sqlite3",
            DatabaseEngine::Postgres => "sql",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub size: u64,
}
