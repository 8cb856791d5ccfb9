//! Core configuration supplied by the embedding application.
//!
//! The core reads no environment variables; the host decides where data
//! lives and passes it in.

use crate::logging::default_log_level;
use crate::reminder::DEFAULT_WINDOW_DAYS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_DB_FILE_NAME: &str = "entries.db";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Writable directory holding the database file and logs.
    pub data_dir: PathBuf,
    pub db_file_name: String,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Days before a contract's end date it is reported as expiring.
    pub reminder_window_days: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            log_level: default_log_level().to_string(),
            reminder_window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl CoreConfig {
    /// Default settings rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(&self.db_file_name)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}
