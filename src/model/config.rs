use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct ConfigTable {
    #[serde(rename = "Config")]
    pub config: Config,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub database_url: String,
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64, // second
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u8, // number
    #[serde(default = "default_shutdown_grace_period")]
    pub shutdown_grace_period: u64, // second
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_dump_tool")]
    pub dump_tool: String,
    #[serde(default = "default_dump_arguments")]
    pub dump_arguments: Vec<String>,
    #[serde(default = "default_expire_schedules")]
    pub expire_schedules: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: String::new(),
            store_path: default_store_path(),
            poll_interval: default_poll_interval(),
            max_concurrency: default_max_concurrency(),
            shutdown_grace_period: default_shutdown_grace_period(),
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            dump_tool: default_dump_tool(),
            dump_arguments: default_dump_arguments(),
            expire_schedules: default_expire_schedules(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./backup_schedules.sqlite3")
}

fn default_poll_interval() -> u64 {
    60
}

fn default_max_concurrency() -> u8 {
    4
}

fn default_shutdown_grace_period() -> u64 {
    300
}

fn default_log_directory() -> PathBuf {
    PathBuf::from("./logs")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_dump_tool() -> String {
    "pg_dump".to_string()
}

fn default_dump_arguments() -> Vec<String> {
    vec!["--no-owner".to_string(), "--no-acl".to_string()]
}

fn default_expire_schedules() -> bool {
    true
}
