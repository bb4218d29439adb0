//! Configuration management using the prefer crate.
//!
//! Precedence, lowest first: built-in defaults, the config file, environment
//! variables, then the `--data` flag.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::repository::util::{is_postgres_url, redact_url_password};
use crate::repository::{DbContext, PoolOptions, StoreError};

/// Default database filename.
pub const DEFAULT_DATABASE_FILENAME: &str = "ipl.db";

/// Default bind address for `ipl serve`.
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

/// Default route prefix for the HTTP API.
pub const DEFAULT_API_PREFIX: &str = "/api/v1";

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Database filename.
    pub database_filename: String,
    /// Database URL (overrides data_dir/database_filename if set).
    pub database_url: Option<String>,
    /// Connections opened when the pool starts.
    pub pool_min: usize,
    /// Upper bound on open connections.
    pub pool_max: usize,
    /// Seconds to wait for a free connection before failing.
    pub acquire_timeout_secs: u64,
    /// Address the HTTP server binds to.
    pub bind: String,
    /// Prefix every API route is nested under.
    pub api_prefix: String,
    /// Version reported by the health endpoint.
    pub api_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        // Default to ~/.local/share/ipl-analytics (or platform equivalent)
        let data_dir = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ipl-analytics");

        let pool = PoolOptions::default();
        Self {
            data_dir,
            database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            database_url: None,
            pool_min: pool.min_size,
            pool_max: pool.max_size,
            acquire_timeout_secs: pool.acquire_timeout.as_secs(),
            bind: DEFAULT_BIND.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            api_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Settings {
    /// Create settings with a custom data directory.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            ..Default::default()
        }
    }

    /// Get the database URL, constructing from path if not explicitly set.
    pub fn database_url(&self) -> String {
        if let Some(ref url) = self.database_url {
            url.clone()
        } else {
            format!("sqlite:{}", self.database_path().display())
        }
    }

    /// Database URL safe to print.
    pub fn display_database_url(&self) -> String {
        redact_url_password(&self.database_url())
    }

    /// Check if using PostgreSQL (vs SQLite).
    pub fn is_postgres(&self) -> bool {
        self.database_url
            .as_ref()
            .is_some_and(|url| is_postgres_url(url))
    }

    /// Get the full path to the database (for SQLite file-based databases).
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(&self.database_filename)
    }

    /// Check if the database appears to be initialized.
    /// For PostgreSQL this is always true; connection errors surface later.
    pub fn database_exists(&self) -> bool {
        self.is_postgres() || self.database_path().exists()
    }

    /// Ensure the data directory exists.
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create data directory '{}': {}",
                    self.data_dir.display(),
                    e
                ),
            )
        })
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            min_size: self.pool_min.min(self.pool_max),
            max_size: self.pool_max.max(1),
            acquire_timeout: Duration::from_secs(self.acquire_timeout_secs),
        }
    }

    /// Create a database context using the configured database URL or path.
    pub fn create_db_context(&self) -> Result<DbContext, StoreError> {
        DbContext::from_url(&self.database_url(), self.pool_options())
    }

    /// Create a database context and verify the connection works.
    pub async fn create_db_context_validated(&self) -> Result<DbContext, StoreError> {
        let ctx = self.create_db_context()?;
        ctx.test_connection().await?;
        Ok(ctx)
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, prefer::FromValue)]
pub struct Config {
    /// Data directory path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
    /// Database filename.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// Full database URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_min: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_max: Option<u64>,
    /// Connection acquire timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquire_timeout: Option<u64>,
    /// Server bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_prefix: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    #[prefer(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers ipl-analytics config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("ipl-analytics").await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await.unwrap_or_else(|e| {
                    tracing::warn!("{}", e);
                    Self::default()
                }),
                None => Self::default(),
            },
            // No config file found
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

        let mut config: Config = match ext {
            "toml" => toml::from_str(&contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
        };

        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Get the base directory for resolving relative paths.
    /// Returns the config file's parent directory if available, otherwise None.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref data_dir) = self.data_dir {
            settings.data_dir = self.resolve_path(data_dir, base_dir);
        }
        if let Some(ref database) = self.database {
            settings.database_filename = database.clone();
        }
        if let Some(ref url) = self.database_url {
            settings.database_url = Some(url.clone());
        }
        if let Some(min) = self.pool_min {
            settings.pool_min = min as usize;
        }
        if let Some(max) = self.pool_max {
            settings.pool_max = max as usize;
        }
        if let Some(timeout) = self.acquire_timeout {
            settings.acquire_timeout_secs = timeout;
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(ref prefix) = self.api_prefix {
            settings.api_prefix = normalize_prefix(prefix);
        }
    }
}

/// `api/v1/` and `/api/v1` both become `/api/v1`; an empty prefix stays empty.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Options for loading settings.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
    /// Use CWD for relative paths instead of config file directory.
    pub use_cwd: bool,
    /// Data directory or database file (--data flag).
    /// Can be a directory containing ipl.db or a .db file directly.
    pub data: Option<PathBuf>,
}

/// Where `--data` points: a directory, or a database file inside one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedData {
    data_dir: PathBuf,
    database_filename: String,
}

impl ResolvedData {
    fn from_path(path: &Path) -> Self {
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(path)
        };

        let is_db_file = path
            .extension()
            .is_some_and(|ext| ext == "db" || ext == "sqlite" || ext == "sqlite3")
            || path.is_file();

        if is_db_file {
            Self {
                database_filename: path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or(DEFAULT_DATABASE_FILENAME)
                    .to_string(),
                data_dir: path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            }
        } else {
            Self {
                data_dir: path,
                database_filename: DEFAULT_DATABASE_FILENAME.to_string(),
            }
        }
    }
}

/// Environment overrides, read once.
#[derive(Debug, Default)]
struct EnvOverrides {
    database_url: Option<String>,
    pool_min: Option<usize>,
    pool_max: Option<usize>,
    acquire_timeout: Option<u64>,
    bind: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
        let number = |key: &str| {
            get(key).and_then(|raw| match raw.trim().parse() {
                Ok(n) => Some(n),
                Err(_) => {
                    tracing::warn!("Ignoring {}={:?}: not a number", key, raw);
                    None
                }
            })
        };

        Self {
            database_url: get("DATABASE_URL"),
            pool_min: number("IPL_POOL_MIN").map(|n: u64| n as usize),
            pool_max: number("IPL_POOL_MAX").map(|n: u64| n as usize),
            acquire_timeout: number("IPL_ACQUIRE_TIMEOUT"),
            bind: get("IPL_BIND"),
        }
    }

    fn apply(self, settings: &mut Settings) {
        if let Some(url) = self.database_url {
            tracing::debug!(
                "Using DATABASE_URL from environment: {}",
                redact_url_password(&url)
            );
            settings.database_url = Some(url);
        }
        if let Some(min) = self.pool_min {
            settings.pool_min = min;
        }
        if let Some(max) = self.pool_max {
            settings.pool_max = max;
        }
        if let Some(timeout) = self.acquire_timeout {
            settings.acquire_timeout_secs = timeout;
        }
        if let Some(bind) = self.bind {
            settings.bind = bind;
        }
    }
}

/// Look for a config file in the data directory.
fn find_config_next_to_db(data_dir: &Path) -> Option<PathBuf> {
    let extensions = ["toml", "yaml", "yml", "json"];
    let basenames = ["ipl-analytics", "config"];

    for basename in basenames {
        for ext in extensions {
            let path = data_dir.join(format!("{}.{}", basename, ext));
            if path.exists() {
                return Some(path);
            }
        }
    }
    None
}

/// Load config from file sources.
async fn load_file_config(options: &LoadOptions, data_dir: Option<&Path>) -> Config {
    // Priority 1: Explicit --config flag
    if let Some(ref config_path) = options.config_path {
        return Config::load_from_path(config_path)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("{}", e);
                Config::default()
            });
    }

    // Priority 2: Config next to data dir
    if let Some(data_dir) = data_dir {
        if let Some(config_path) = find_config_next_to_db(data_dir) {
            tracing::debug!("Found config next to data dir: {}", config_path.display());
            return Config::load_from_path(&config_path)
                .await
                .unwrap_or_else(|_| Config::default());
        }
    }

    // Priority 3: Auto-discover via prefer
    Config::load().await
}

/// Load settings with explicit options.
/// Returns (Settings, Config) tuple.
pub async fn load_settings_with_options(options: LoadOptions) -> (Settings, Config) {
    let resolved = options.data.as_deref().map(ResolvedData::from_path);
    let config = load_file_config(&options, resolved.as_ref().map(|r| r.data_dir.as_path())).await;

    let mut settings = Settings::default();

    let base_dir = if options.use_cwd {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        config
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    };
    config.apply_to_settings(&mut settings, &base_dir);

    EnvOverrides::from_env().apply(&mut settings);

    // --data override takes precedence for the SQLite location
    if let Some(resolved) = resolved {
        settings.data_dir = resolved.data_dir;
        settings.database_filename = resolved.database_filename;
    }

    (settings, config)
}
