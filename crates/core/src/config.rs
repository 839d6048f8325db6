//! Configuration management for promptvault.
//!
//! Configuration is resolved in layers, later layers winning:
//! - Built-in defaults
//! - Config file (`.promptvault/config.yaml` or `PROMPTVAULT_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! The configuration is workspace-centric: the SQLite database and the
//! config file live under `.promptvault/` in the workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};
use crate::logging::LogFormat;

/// Name of the per-workspace state directory.
pub const STATE_DIR: &str = ".promptvault";

/// Default table name, shared with the original deployment's
/// `PROMPT_TABLE_NAME`.
pub const DEFAULT_TABLE: &str = "prompts";

/// Storage backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Process-local map; nothing survives the process
    Memory,
    /// SQLite database file in the workspace
    #[default]
    Sqlite,
}

impl std::str::FromStr for BackendKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" | "in-memory" => Ok(BackendKind::Memory),
            "sqlite" => Ok(BackendKind::Sqlite),
            other => Err(AppError::Config(format!(
                "Unknown backend: {}. Supported: memory, sqlite",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Memory => write!(f, "memory"),
            BackendKind::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .promptvault/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Storage backend
    pub backend: BackendKind,

    /// SQLite database path; defaults to `.promptvault/prompts.sqlite`
    pub database: Option<PathBuf>,

    /// Table holding prompt records
    pub table: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Log output format
    pub log_format: LogFormat,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    storage: Option<StorageSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StorageSection {
    backend: Option<BackendKind>,
    database: Option<String>,
    table: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    format: Option<LogFormat>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            backend: BackendKind::default(),
            database: None,
            table: DEFAULT_TABLE.to_string(),
            log_level: None,
            log_format: LogFormat::default(),
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// `workspace` and `config_file` come from the command line; when given
    /// they win over the environment and decide which YAML file is read.
    ///
    /// Environment variables:
    /// - `PROMPTVAULT_WORKSPACE`: Override workspace path
    /// - `PROMPTVAULT_CONFIG`: Path to config file
    /// - `PROMPTVAULT_BACKEND`: `memory` or `sqlite`
    /// - `PROMPTVAULT_DATABASE`: SQLite database path
    /// - `PROMPT_TABLE_NAME`: Table holding prompt records
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output (any non-empty value)
    ///
    /// # Example
    /// ```no_run
    /// use promptvault_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None, None).expect("Failed to load config");
    /// println!("Backend: {}", config.backend);
    /// ```
    pub fn load(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::resolve(workspace, config_file, |key| std::env::var(key).ok())
    }

    /// Resolve defaults, YAML and environment with `env` as the variable
    /// lookup.
    fn resolve<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let workspace = workspace.or_else(|| env("PROMPTVAULT_WORKSPACE").map(PathBuf::from));
        if let Some(workspace) = workspace {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| env("PROMPTVAULT_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        match config.config_file.clone() {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let path = config.state_dir().join("config.yaml");
                if path.exists() {
                    config = config.merge_yaml(&path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Some(backend) = env("PROMPTVAULT_BACKEND") {
            config.backend = backend.parse()?;
        }

        if let Some(database) = env("PROMPTVAULT_DATABASE") {
            config.database = Some(PathBuf::from(database));
        }

        if let Some(table) = env("PROMPT_TABLE_NAME") {
            config.table = table;
        }

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some_and(|v| !v.is_empty()) {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into a copy of this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(storage) = config_file.storage {
            if let Some(backend) = storage.backend {
                result.backend = backend;
            }
            if let Some(database) = storage.database {
                result.database = Some(PathBuf::from(database));
            }
            if let Some(table) = storage.table {
                result.table = table;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the environment and the config file.
    /// Workspace and config file paths are applied earlier, by [`AppConfig::load`].
    pub fn with_overrides(
        mut self,
        backend: Option<BackendKind>,
        database: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(backend) = backend {
            self.backend = backend;
        }

        if let Some(database) = database {
            self.database = Some(database);
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .promptvault directory.
    pub fn state_dir(&self) -> PathBuf {
        self.workspace.join(STATE_DIR)
    }

    /// Ensure the .promptvault directory exists.
    pub fn ensure_state_dir(&self) -> AppResult<()> {
        let state_dir = self.state_dir();
        if !state_dir.exists() {
            std::fs::create_dir_all(&state_dir).map_err(|e| {
                AppError::Config(format!("Failed to create {} directory: {}", STATE_DIR, e))
            })?;
        }
        Ok(())
    }

    /// Resolved SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        match &self.database {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.workspace.join(path),
            None => self.state_dir().join("prompts.sqlite"),
        }
    }

    /// Validate the resolved configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.table.is_empty() {
            return Err(AppError::Config("Table name cannot be empty".to_string()));
        }

        // The table name is spliced into SQL, so only identifiers pass.
        let valid_ident = self
            .table
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && self
                .table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');

        if !valid_ident {
            return Err(AppError::Config(format!(
                "Invalid table name: {}. Use letters, digits and underscores",
                self.table
            )));
        }

        Ok(())
    }
}
