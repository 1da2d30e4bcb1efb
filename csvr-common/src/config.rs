//! Configuration loading and resolution
//!
//! Resolution priority for the configuration file:
//! 1. Explicit path argument (highest priority)
//! 2. `CSVR_CONFIG` environment variable
//! 3. User config file (`<config dir>/csvr/config.toml`)
//! 4. Compiled defaults (fallback)
//!
//! A missing file never aborts startup: a warning is logged and the compiled
//! defaults are used. A file that exists but fails to parse is an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "CSVR_CONFIG";

/// Environment variable overriding `studio_url` after the file is loaded
pub const STUDIO_URL_ENV_VAR: &str = "CSVR_STUDIO_URL";

const DEFAULT_STUDIO_URL: &str = "http://localhost:41080/rest/api/";
const DEFAULT_CSRF_HEADER: &str = "X-CSRF-Token";
const DEFAULT_UPLOAD_PATH: &str = "importcsv/uploadfile";
const DEFAULT_EXPORT_PATH: &str = "exportcsv/contentset";
const DEFAULT_JOBS_PATH: &str = "jobs";
const DEFAULT_ACCEPTED_FILE_TYPE: &str = "csv";
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Top-level TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Base URL every relative REST path is resolved against
    #[serde(default = "default_studio_url")]
    pub studio_url: String,

    #[serde(default)]
    pub csrf: CsrfConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub jobs: JobsConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            studio_url: default_studio_url(),
            csrf: CsrfConfig::default(),
            logging: LoggingConfig::default(),
            import: ImportConfig::default(),
            export: ExportConfig::default(),
            jobs: JobsConfig::default(),
        }
    }
}

/// Anti-forgery header settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrfConfig {
    #[serde(default = "default_csrf_header")]
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            header_name: default_csrf_header(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Optional log file; stderr when absent
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// CSV import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// File type the importer accepts (one file of this type per import)
    #[serde(default = "default_accepted_file_type")]
    pub accepted_file_type: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            upload_path: default_upload_path(),
            accepted_file_type: default_accepted_file_type(),
        }
    }
}

/// CSV export settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub endpoint_path: String,

    /// Template names offered by the export dialog, in display order
    #[serde(default)]
    pub templates: Vec<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            endpoint_path: default_export_path(),
            templates: Vec::new(),
        }
    }
}

/// Background job settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "default_jobs_path")]
    pub endpoint_path: String,

    /// Retry budget for jobs that declare themselves retryable
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            endpoint_path: default_jobs_path(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_studio_url() -> String {
    DEFAULT_STUDIO_URL.to_string()
}

fn default_csrf_header() -> String {
    DEFAULT_CSRF_HEADER.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_upload_path() -> String {
    DEFAULT_UPLOAD_PATH.to_string()
}

fn default_accepted_file_type() -> String {
    DEFAULT_ACCEPTED_FILE_TYPE.to_string()
}

fn default_export_path() -> String {
    DEFAULT_EXPORT_PATH.to_string()
}

fn default_jobs_path() -> String {
    DEFAULT_JOBS_PATH.to_string()
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Load and parse a TOML config file
pub fn load_from_path(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolves the active configuration following the priority order above
pub struct ConfigResolver {
    explicit_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self { explicit_path }
    }

    /// Path of the config file that would be read, if any candidate exists
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit_path {
            return Some(path.clone());
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        dirs::config_dir()
            .map(|d| d.join("csvr").join("config.toml"))
            .filter(|p| p.exists())
    }

    /// Resolve the configuration, degrading to defaults when no file exists
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match self.config_path() {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                load_from_path(&path)?
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            None => {
                info!("No config file found, using compiled defaults");
                TomlConfig::default()
            }
        };

        if let Ok(url) = std::env::var(STUDIO_URL_ENV_VAR) {
            if !url.trim().is_empty() {
                info!(studio_url = %url, "studio_url overridden from environment");
                config.studio_url = url;
            }
        }

        Ok(config)
    }
}
