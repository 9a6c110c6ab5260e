//! Bootstrap configuration loading
//!
//! Services read a small TOML file at startup. Nothing in it can change
//! while the process runs; restart to pick up edits.
//!
//! Resolution order for the config file:
//! 1. Explicit path (command-line argument or `MSH_CONFIG`, supplied by the caller)
//! 2. `~/.config/msh/<module>.toml`
//! 3. `/etc/msh/<module>.toml` (Linux only)
//! 4. Compiled defaults
//!
//! A missing file at steps 2-3 is not an error: the service logs a warning
//! and starts on defaults. An explicit path that does not exist, or any file
//! that fails to parse, is an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for the content filter service
pub const DEFAULT_PORT: u16 = 3000;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address to bind the HTTP listener to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub compliance: ComplianceConfig,

    /// Keyword overrides; `None` lists keep the built-in terms
    #[serde(default)]
    pub rules: RulesConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Content policy switches
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Keep explicit tracks admissible, annotated as medium risk
    #[serde(default = "default_true")]
    pub allow_explicit_with_educational_context: bool,

    /// Reported to clients in the compliance block
    #[serde(default = "default_true")]
    pub require_user_consent: bool,

    /// Emit a compliance log entry for every classified item
    #[serde(default = "default_true")]
    pub log_content_access: bool,

    /// Maximum number of recommended tracks per batch
    #[serde(default = "default_recommendation_limit")]
    pub recommendation_limit: usize,
}

/// Compliance annotation and sink settings
#[derive(Debug, Clone, Deserialize)]
pub struct ComplianceConfig {
    #[serde(default = "default_institution")]
    pub institution: String,

    /// Context recorded on every compliance log entry
    #[serde(default = "default_educational_context")]
    pub educational_context: String,

    /// Note attached to every annotated track in API responses
    #[serde(default = "default_context_note")]
    pub context_note: String,

    #[serde(default = "default_standards")]
    pub standards: Vec<String>,

    /// Write entries to the `compliance` tracing target
    #[serde(default = "default_true")]
    pub log_to_tracing: bool,

    /// Append entries as JSON lines to this file
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Broadcast channel capacity for live subscribers
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

/// Keyword list overrides
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesConfig {
    #[serde(default)]
    pub educational: Option<Vec<String>>,
    #[serde(default)]
    pub blocked: Option<Vec<String>>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_recommendation_limit() -> usize {
    10
}

fn default_institution() -> String {
    "Music Study Hub".to_string()
}

fn default_educational_context() -> String {
    "Music Study Platform - Approved".to_string()
}

fn default_context_note() -> String {
    "Approved for educational music study platform".to_string()
}

fn default_standards() -> Vec<String> {
    vec!["CIPA".to_string(), "COPPA".to_string(), "FERPA".to_string()]
}

fn default_event_capacity() -> usize {
    256
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            logging: LoggingConfig::default(),
            policy: PolicyConfig::default(),
            compliance: ComplianceConfig::default(),
            rules: RulesConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allow_explicit_with_educational_context: true,
            require_user_consent: true,
            log_content_access: true,
            recommendation_limit: default_recommendation_limit(),
        }
    }
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            institution: default_institution(),
            educational_context: default_educational_context(),
            context_note: default_context_note(),
            standards: default_standards(),
            log_to_tracing: true,
            log_file: None,
            event_capacity: default_event_capacity(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn parse(text: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Reject values the services cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.policy.recommendation_limit == 0 {
            return Err(Error::Config(
                "policy.recommendation_limit must be at least 1".to_string(),
            ));
        }
        if self.compliance.event_capacity == 0 {
            return Err(Error::Config(
                "compliance.event_capacity must be at least 1".to_string(),
            ));
        }
        if self.bind_address.trim().is_empty() {
            return Err(Error::Config("bind_address must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Locates and loads the bootstrap TOML file for one module
pub struct ConfigResolver {
    module_name: String,
}

impl ConfigResolver {
    pub fn new(module_name: &str) -> Self {
        Self {
            module_name: module_name.to_string(),
        }
    }

    /// Candidate config file locations below an explicit path, highest priority first
    pub fn candidate_paths(&self) -> Vec<PathBuf> {
        let file_name = format!("{}.toml", self.module_name);
        let mut paths = Vec::new();

        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("msh").join(&file_name));
        }
        if cfg!(target_os = "linux") {
            paths.push(PathBuf::from("/etc/msh").join(&file_name));
        }

        paths
    }

    /// Load configuration, falling back to compiled defaults
    ///
    /// Returns the config together with the path it was read from, if any.
    pub fn load(&self, explicit: Option<&Path>) -> Result<(TomlConfig, Option<PathBuf>)> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            let config = TomlConfig::from_file(path)?;
            return Ok((config, Some(path.to_path_buf())));
        }

        for path in self.candidate_paths() {
            if path.exists() {
                info!("Loading configuration from {}", path.display());
                let config = TomlConfig::from_file(&path)?;
                return Ok((config, Some(path)));
            }
        }

        warn!(
            "No configuration file found for {}; using compiled defaults",
            self.module_name
        );
        Ok((TomlConfig::default(), None))
    }
}
