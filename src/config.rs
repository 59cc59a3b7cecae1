use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MAIN_DOC_URL: &str = "https://docs.python.org/3/";
pub const PEP_URL: &str = "https://peps.python.org/";

pub const LOG_DIR: &str = "logs";
pub const LOG_FILE: &str = "parser.log";
pub const DOWNLOADS_DIR: &str = "downloads";
pub const RESULTS_DIR: &str = "results";
pub const CACHE_DIR: &str = "http_cache";

/// Timestamp layout of log records.
pub const DT_FORMAT: &str = "%d.%m.%Y %H:%M:%S";
/// Timestamp layout embedded in result file names.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Statuses a PEP page may carry for each one-letter code of the index table.
pub const EXPECTED_STATUS: &[(&str, &[&str])] = &[
    ("A", &["Active", "Accepted"]),
    ("D", &["Deferred"]),
    ("F", &["Final"]),
    ("P", &["Provisional"]),
    ("R", &["Rejected"]),
    ("S", &["Superseded"]),
    ("W", &["Withdrawn"]),
    ("", &["Draft", "Active"]),
];

pub fn expected_statuses(code: &str) -> Option<&'static [&'static str]> {
    EXPECTED_STATUS
        .iter()
        .find(|(key, _)| *key == code)
        .map(|(_, statuses)| *statuses)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub main_doc_url: String,
    pub pep_url: String,
    /// Root for logs, downloads, results and the response cache.
    pub base_dir: PathBuf,
    pub log_max_bytes: u64,
    pub log_backup_count: usize,
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            main_doc_url: MAIN_DOC_URL.to_string(),
            pep_url: PEP_URL.to_string(),
            base_dir: PathBuf::from("."),
            log_max_bytes: 1_000_000,
            log_backup_count: 5,
            request_timeout_secs: 30,
            user_agent: format!("docs-parser/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ParserConfig {
    /// Reads a TOML file; keys it leaves out keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn log_dir(&self) -> PathBuf {
        self.base_dir.join(LOG_DIR)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join(LOG_FILE)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.base_dir.join(DOWNLOADS_DIR)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.base_dir.join(RESULTS_DIR)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir.join(CACHE_DIR)
    }
}
