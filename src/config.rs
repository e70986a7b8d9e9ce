//! Configuration management for AudioVault Fetcher
//!
//! Settings are layered: built-in defaults, then a TOML config file, then
//! environment variables (a `.env` file is loaded first), then command-line
//! flags applied by the CLI handlers.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::app::ClientConfig;
use crate::constants::{catalog, env as env_constants, files, http};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog endpoint settings
    pub catalog: CatalogConfig,
    /// HTTP client settings
    pub client: ClientConfigToml,
    /// Input and output locations
    pub paths: PathsConfig,
    /// Terminal progress output
    pub progress: ProgressConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Catalog endpoint settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Listing page searched with `?search=<term>`
    pub search_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            search_url: catalog::SEARCH_URL.to_string(),
        }
    }
}

/// TOML-friendly client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfigToml {
    /// Timeout for search pages and HEAD requests in seconds
    pub request_timeout_secs: u64,
    /// Connect timeout in seconds
    pub connect_timeout_secs: u64,
    /// TCP nodelay setting
    pub tcp_nodelay: bool,
    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfigToml {
    fn default() -> Self {
        Self {
            request_timeout_secs: http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout_secs: http::CONNECT_TIMEOUT.as_secs(),
            tcp_nodelay: true,
            user_agent: http::USER_AGENT.to_string(),
        }
    }
}

impl ClientConfigToml {
    /// Convert to runtime ClientConfig
    pub fn to_runtime_config(&self) -> ClientConfig {
        ClientConfig {
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            tcp_nodelay: self.tcp_nodelay,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Input and output locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Netscape `cookies.txt` exported from a logged-in browser
    pub cookie_file: PathBuf,
    /// CSV ledger rewritten at every checkpoint
    pub output_csv: PathBuf,
    /// Root under which `<search_term>/<filename>` is created
    pub download_root: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            cookie_file: PathBuf::from(files::DEFAULT_COOKIE_FILE),
            output_csv: PathBuf::from(files::DEFAULT_OUTPUT_CSV),
            download_root: PathBuf::from(files::DEFAULT_DOWNLOAD_DIR),
        }
    }
}

/// Terminal progress output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Draw progress lines when stderr is a terminal
    pub enabled: bool,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration with multi-source precedence:
    /// 1. Default values
    /// 2. Config file (if exists)
    /// 3. Environment variables
    ///
    /// Command-line flags are applied afterwards by the caller.
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = match Self::resolve_config_path(config_file_override.as_deref())? {
            Some(path) => Self::load_from_file(&path).await?,
            None => Self::default(),
        };

        config.apply_env_overrides(|key| env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Pick the config file to read
    ///
    /// An explicit path must exist. Otherwise the project-local file wins over
    /// the per-user one, and having neither is fine.
    pub fn resolve_config_path(explicit: Option<&Path>) -> ConfigResult<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                });
            }
            return Ok(Some(path.to_path_buf()));
        }

        let mut search_paths = vec![PathBuf::from(files::LOCAL_CONFIG_FILE)];
        if let Ok(user_path) = Self::default_config_path() {
            search_paths.push(user_path);
        }

        for path in search_paths {
            if path.exists() {
                debug!("Found config file: {}", path.display());
                return Ok(Some(path));
            }
        }

        debug!("No config file found in standard locations");
        Ok(None)
    }

    /// Get the default config file path for the current user
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(files::CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;

        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// `lookup` returns the value of a variable, if set. Empty values are
    /// ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = value(env_constants::COOKIE_FILE) {
            self.paths.cookie_file = PathBuf::from(path);
        }
        if let Some(path) = value(env_constants::OUTPUT_CSV) {
            self.paths.output_csv = PathBuf::from(path);
        }
        if let Some(path) = value(env_constants::DOWNLOAD_ROOT) {
            self.paths.download_root = PathBuf::from(path);
        }
        if let Some(url) = value(env_constants::SEARCH_URL) {
            self.catalog.search_url = url;
        }
    }

    /// Check values that would only fail later in the run
    pub fn validate(&self) -> ConfigResult<()> {
        self.search_url()?;

        if self.client.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.request_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }
        if self.client.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "client.connect_timeout_secs".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }

        Ok(())
    }

    /// Parsed catalog search endpoint
    pub fn search_url(&self) -> ConfigResult<Url> {
        let url = Url::parse(&self.catalog.search_url).map_err(|e| ConfigError::InvalidValue {
            field: "catalog.search_url".to_string(),
            value: self.catalog.search_url.clone(),
            reason: e.to_string(),
        })?;

        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                field: "catalog.search_url".to_string(),
                value: self.catalog.search_url.clone(),
                reason: "URL must be hierarchical, e.g. https://host/path".to_string(),
            });
        }

        Ok(url)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write a commented default config file
    ///
    /// Refuses to overwrite an existing file unless `force` is set.
    pub async fn init(path: &Path, force: bool) -> ConfigResult<()> {
        if path.exists() && !force {
            return Err(ConfigError::InvalidValue {
                field: "path".to_string(),
                value: path.display().to_string(),
                reason: "File already exists; use --force to overwrite".to_string(),
            });
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        info!("Wrote default configuration to {}", path.display());
        Ok(())
    }

    /// Generate default configuration content with helpful comments
    pub fn generate_default_config_content() -> String {
        format!(
            r#"# AudioVault Fetcher Configuration
# Environment variables {cookie_env}, {csv_env},
# {root_env} and {url_env} override the values below.

[catalog]
# Listing page searched with ?search=<term>
search_url = "{search_url}"

[client]
# Timeout for search pages and HEAD requests (downloads are not bounded)
request_timeout_secs = {request_timeout}
connect_timeout_secs = {connect_timeout}
tcp_nodelay = true
user_agent = "{user_agent}"

[paths]
# Netscape cookies.txt exported from a logged-in browser session
cookie_file = "{cookie_file}"
# CSV ledger, rewritten after marking and after every download
output_csv = "{output_csv}"
# Files are saved as <download_root>/<search_term>/<filename>
download_root = "{download_root}"

[progress]
enabled = true

[logging]
level = "warn"  # error, warn, info, debug, trace
"#,
            cookie_env = env_constants::COOKIE_FILE,
            csv_env = env_constants::OUTPUT_CSV,
            root_env = env_constants::DOWNLOAD_ROOT,
            url_env = env_constants::SEARCH_URL,
            search_url = catalog::SEARCH_URL,
            request_timeout = http::DEFAULT_TIMEOUT.as_secs(),
            connect_timeout = http::CONNECT_TIMEOUT.as_secs(),
            user_agent = http::USER_AGENT,
            cookie_file = files::DEFAULT_COOKIE_FILE,
            output_csv = files::DEFAULT_OUTPUT_CSV,
            download_root = files::DEFAULT_DOWNLOAD_DIR,
        )
    }
}
