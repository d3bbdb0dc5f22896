//! Top-level application configuration.
//!
//! Configuration is stored as YAML at `$CLINIC_CONSOLE_CONFIG`, or
//! `config.yaml` in the platform config directory, and includes:
//! - The clinic API base URL and request timeout
//! - The bearer token of the last login
//! - Queue table defaults (page size, selection behaviour)
//! - Static asset server and proxy settings

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ConsoleError, Result};
use crate::query::{DEFAULT_ROWS_PER_PAGE, ROWS_PER_PAGE_OPTIONS};
use crate::selection::{SelectAllScope, SelectionKey};

pub const CONFIG_PATH_ENV: &str = "CLINIC_CONSOLE_CONFIG";
pub const API_URL_ENV: &str = "CLINIC_API_URL";
pub const TOKEN_ENV: &str = "CLINIC_API_TOKEN";

/// Keys accepted by `config get` / `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "api_base_url",
    "token",
    "request_timeout",
    "queue.rows_per_page",
    "queue.select_all_scope",
    "queue.selection_key",
    "server.listen",
    "server.static_dir",
    "server.upstream",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the clinic API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Bearer token saved by `login`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<StoredToken>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub server: ServerSettings,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            token: None,
            request_timeout: default_request_timeout(),
            queue: QueueSettings::default(),
            server: ServerSettings::default(),
        }
    }
}

/// Token as persisted on disk. Never printed by `Debug`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
struct StoredToken(String);

impl fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Queue table defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSettings {
    #[serde(default = "default_rows_per_page")]
    pub rows_per_page: usize,

    #[serde(default)]
    pub select_all_scope: SelectAllScope,

    #[serde(default)]
    pub selection_key: SelectionKey,
}

fn default_rows_per_page() -> usize {
    DEFAULT_ROWS_PER_PAGE
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            rows_per_page: default_rows_per_page(),
            select_all_scope: SelectAllScope::default(),
            selection_key: SelectionKey::default(),
        }
    }
}

/// Static asset server and reverse proxy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Directory holding the built console assets and `index.html`
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Proxy target for `/api` and `/auth`; defaults to `api_base_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
}

fn default_listen() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("build")
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            static_dir: default_static_dir(),
            upstream: None,
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_PATH_ENV)
            && !path.is_empty()
        {
            return PathBuf::from(path);
        }

        ProjectDirs::from("", "", "clinic-console")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .unwrap_or_else(|| PathBuf::from(".clinic-console").join("config.yaml"))
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ConsoleError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            ConsoleError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // The file holds a bearer token: owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// API base URL from the environment or config file
    pub fn api_base_url(&self) -> String {
        if let Ok(url) = env::var(API_URL_ENV)
            && !url.is_empty()
        {
            return url;
        }
        self.api_base_url.clone()
    }

    /// Bearer token from the environment or config file
    pub fn token(&self) -> Option<SecretString> {
        if let Ok(token) = env::var(TOKEN_ENV)
            && !token.is_empty()
        {
            return Some(SecretString::from(token));
        }
        self.stored_token().map(|t| SecretString::from(t.to_string()))
    }

    /// Token saved in the config file, ignoring the environment
    pub fn stored_token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.0.as_str())
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(StoredToken(token));
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Proxy target for the asset server
    pub fn upstream(&self) -> String {
        self.server
            .upstream
            .clone()
            .unwrap_or_else(|| self.api_base_url())
    }

    /// Read a value by key. The token is masked.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "api_base_url" => self.api_base_url.clone(),
            "token" => match self.stored_token() {
                Some(token) => mask_token(token),
                None => "(not set)".to_string(),
            },
            "request_timeout" => self.request_timeout.to_string(),
            "queue.rows_per_page" => self.queue.rows_per_page.to_string(),
            "queue.select_all_scope" => self.queue.select_all_scope.to_string(),
            "queue.selection_key" => self.queue.selection_key.to_string(),
            "server.listen" => self.server.listen.clone(),
            "server.static_dir" => self.server.static_dir.display().to_string(),
            "server.upstream" => self.upstream(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by key, validating it first.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api_base_url" => {
                parse_url(value)?;
                self.api_base_url = value.trim().to_string();
            }
            "token" => self.set_token(value.trim().to_string()),
            "request_timeout" => {
                self.request_timeout = value.trim().parse().map_err(|_| {
                    ConsoleError::Config(format!("request_timeout must be seconds, got '{value}'"))
                })?;
            }
            "queue.rows_per_page" => {
                let rows: usize = value.trim().parse().unwrap_or(0);
                if !ROWS_PER_PAGE_OPTIONS.contains(&rows) {
                    return Err(ConsoleError::Config(format!(
                        "queue.rows_per_page must be one of {ROWS_PER_PAGE_OPTIONS:?}, got '{value}'"
                    )));
                }
                self.queue.rows_per_page = rows;
            }
            "queue.select_all_scope" => self.queue.select_all_scope = value.parse()?,
            "queue.selection_key" => self.queue.selection_key = value.parse()?,
            "server.listen" => {
                value.trim().parse::<std::net::SocketAddr>().map_err(|_| {
                    ConsoleError::Config(format!("server.listen must be host:port, got '{value}'"))
                })?;
                self.server.listen = value.trim().to_string();
            }
            "server.static_dir" => self.server.static_dir = PathBuf::from(value.trim()),
            "server.upstream" => {
                parse_url(value)?;
                self.server.upstream = Some(value.trim().to_string());
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_url(value: &str) -> Result<Url> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConsoleError::Config(format!("invalid URL '{value}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConsoleError::Config(format!(
            "URL must use http or https, got '{value}'"
        )));
    }
    Ok(url)
}

fn unknown_key(key: &str) -> ConsoleError {
    ConsoleError::Config(format!(
        "unknown key '{key}', expected one of: {}",
        CONFIG_KEYS.join(", ")
    ))
}

/// Show only the last four characters of a token.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout, 30);
        assert_eq!(config.queue.rows_per_page, 5);
        assert_eq!(config.queue.select_all_scope, SelectAllScope::Filtered);
        assert_eq!(config.queue.selection_key, SelectionKey::PatientName);
        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert!(config.stored_token().is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
api_base_url: https://clinic.example
queue:
  select_all_scope: page
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.api_base_url, "https://clinic.example");
        assert_eq!(config.queue.select_all_scope, SelectAllScope::Page);
        assert_eq!(config.queue.rows_per_page, 5);
        assert_eq!(config.server.static_dir, PathBuf::from("build"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let mut config = Config::default();
        config.set_token("abc123token".to_string());
        config.set("queue.rows_per_page", "25").unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.stored_token(), Some("abc123token"));
        assert_eq!(loaded.queue.rows_per_page, 25);
    }

    #[test]
    fn test_load_missing_file_gives_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.request_timeout, 30);
    }

    #[test]
    fn test_debug_redacts_token() {
        let mut config = Config::default();
        config.set_token("super-secret-token".to_string());
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_get_masks_token() {
        let mut config = Config::default();
        assert_eq!(config.get("token").unwrap(), "(not set)");
        config.set_token("abcdefgh".to_string());
        assert_eq!(config.get("token").unwrap(), "****efgh");
    }

    #[test]
    fn test_set_validates_values() {
        let mut config = Config::default();

        assert!(config.set("queue.rows_per_page", "7").is_err());
        assert!(config.set("api_base_url", "ftp://clinic").is_err());
        assert!(config.set("server.listen", "nowhere").is_err());
        assert!(config.set("queue.select_all_scope", "everything").is_err());
        assert!(config.set("request_timeout", "soon").is_err());
        assert!(config.set("colour", "blue").is_err());

        config.set("queue.selection_key", "id").unwrap();
        assert_eq!(config.queue.selection_key, SelectionKey::Id);
        config.set("server.listen", "127.0.0.1:4000").unwrap();
        assert_eq!(config.get("server.listen").unwrap(), "127.0.0.1:4000");
    }

    #[test]
    fn test_mask_token_short() {
        assert_eq!(mask_token("abc"), "****");
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let mut config = Config::default();
        config.set_token("from-file".to_string());

        unsafe {
            env::set_var(TOKEN_ENV, "from-env");
            env::set_var(API_URL_ENV, "https://env.example");
        }
        let token = config.token();
        let url = config.api_base_url();
        unsafe {
            env::remove_var(TOKEN_ENV);
            env::remove_var(API_URL_ENV);
        }

        use secrecy::ExposeSecret;
        assert_eq!(token.unwrap().expose_secret(), "from-env");
        assert_eq!(url, "https://env.example");
        assert_eq!(config.token().unwrap().expose_secret(), "from-file");
    }

    #[test]
    #[serial]
    fn test_upstream_defaults_to_api_base_url() {
        let mut config = Config::default();
        assert_eq!(config.upstream(), "http://localhost:8080");
        config.set("server.upstream", "http://10.0.0.5:9000").unwrap();
        assert_eq!(config.upstream(), "http://10.0.0.5:9000");
    }
}
