//! Engine configuration
//!
//! JSON file, every field but `data_dir` optional:
//!
//! ```json
//! {
//!   "data_dir": "./data",
//!   "buffer_pool_size": 32,
//!   "log_file": "relplan.log",
//!   "diagnostic_log_file": "relplan-diagnostics.log",
//!   "query_planner": "sort"
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{ServerError, ServerResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Data directory (required)
    pub data_dir: String,

    /// Buffer slots (default 32)
    #[serde(default = "default_buffer_pool_size")]
    pub buffer_pool_size: usize,

    /// Durability log file name inside `data_dir`
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Diagnostic log file name inside `data_dir`
    #[serde(default = "default_diagnostic_log_file")]
    pub diagnostic_log_file: String,

    /// Strategy key; see `STRATEGY_TABLE`
    #[serde(default)]
    pub query_planner: String,
}

fn default_buffer_pool_size() -> usize {
    32
}
fn default_log_file() -> String {
    "relplan.log".to_string()
}
fn default_diagnostic_log_file() -> String {
    "relplan-diagnostics.log".to_string()
}

impl EngineConfig {
    /// Defaults for everything but the data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_string_lossy().into_owned(),
            buffer_pool_size: default_buffer_pool_size(),
            log_file: default_log_file(),
            diagnostic_log_file: default_diagnostic_log_file(),
            query_planner: String::new(),
        }
    }

    pub fn with_query_planner(mut self, key: impl Into<String>) -> Self {
        self.query_planner = key.into();
        self
    }

    pub fn with_buffer_pool_size(mut self, size: usize) -> Self {
        self.buffer_pool_size = size;
        self
    }

    /// Load and validate a configuration file
    pub fn load(path: &Path) -> ServerResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| ServerError::config_invalid(format!("Failed to read config: {}", e)))?;

        let config: EngineConfig = serde_json::from_str(&content)
            .map_err(|e| ServerError::config_invalid(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.data_dir.trim().is_empty() {
            return Err(ServerError::config_invalid("data_dir must not be empty"));
        }
        if self.buffer_pool_size == 0 {
            return Err(ServerError::config_invalid("buffer_pool_size must be > 0"));
        }
        for (name, value) in [
            ("log_file", &self.log_file),
            ("diagnostic_log_file", &self.diagnostic_log_file),
        ] {
            if value.is_empty() || value.contains('/') || value.contains('\\') {
                return Err(ServerError::config_invalid(format!(
                    "{} must be a plain file name, got '{}'",
                    name, value
                )));
            }
        }
        if self.log_file == self.diagnostic_log_file {
            return Err(ServerError::config_invalid(
                "log_file and diagnostic_log_file must differ",
            ));
        }
        Ok(())
    }

    pub fn data_path(&self) -> &Path {
        Path::new(&self.data_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_path().join(&self.log_file)
    }

    pub fn diagnostic_log_path(&self) -> PathBuf {
        self.data_path().join(&self.diagnostic_log_file)
    }
}
