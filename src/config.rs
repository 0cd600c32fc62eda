//! Client configuration.
//!
//! Configuration is stored in the platform config directory
//! (`~/.config/appcheck/config.yaml` on Linux) and includes:
//! - Backend base URL and request timeout
//! - Cache freshness window for the in-memory application cache
//! - Download directory for export files
//! - Optional HTTP basic-auth credentials
//!
//! Environment variables (`APPCHECK_BASE_URL`, `APPCHECK_USERNAME`,
//! `APPCHECK_PASSWORD`) take precedence over the file.

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{CheckError, Result};

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    60
}

/// Cache window matching the tracker front-end's five-minute freshness rule.
fn default_cache_ttl() -> u64 {
    300
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the tracker backend
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// How long a fetched application list stays fresh, in seconds
    /// (default: 300)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: u64,

    /// Directory export downloads are written to (default: current dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// Basic-auth credentials for the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<BasicAuth>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            cache_ttl: default_cache_ttl(),
            export_dir: None,
            auth: None,
        }
    }
}

/// Basic-auth credentials
#[derive(Clone, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var("APPCHECK_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "appcheck")
            .ok_or_else(|| CheckError::Config("cannot determine config directory".to_string()))?;
        Ok(dirs.config_dir().join("config.yaml"))
    }

    /// Load configuration from file, or return defaults if not found.
    /// Environment overrides are applied on top in either case.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                CheckError::Config(format!("failed to read config at {}: {e}", path.display()))
            })?;
            serde_yaml_ng::from_str(&content)?
        } else {
            Config::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CheckError::Config(format!(
                    "failed to create config directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            CheckError::Config(format!("failed to write config at {}: {e}", path.display()))
        })?;

        // Credentials may live in this file; owner read/write only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions).map_err(|e| {
                CheckError::Config(format!(
                    "failed to set permissions on config at {}: {e}",
                    path.display()
                ))
            })?;
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = env::var("APPCHECK_BASE_URL")
            && !url.is_empty()
        {
            self.base_url = url;
        }
        if let Ok(username) = env::var("APPCHECK_USERNAME")
            && !username.is_empty()
        {
            let password = env::var("APPCHECK_PASSWORD").unwrap_or_default();
            self.auth = Some(BasicAuth { username, password });
        }
    }

    /// Get a config value by key (dot notation for auth fields)
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "base_url" => Ok(self.base_url.clone()),
            "timeout" => Ok(self.timeout.to_string()),
            "cache_ttl" => Ok(self.cache_ttl.to_string()),
            "export_dir" => Ok(self
                .export_dir
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            "auth.username" => Ok(self
                .auth
                .as_ref()
                .map(|a| a.username.clone())
                .unwrap_or_default()),
            _ => Err(CheckError::Config(format!("unknown config key '{key}'"))),
        }
    }

    /// Set a config value by key (dot notation for auth fields)
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "base_url" => self.base_url = value.to_string(),
            "timeout" => {
                self.timeout = value
                    .parse()
                    .map_err(|_| CheckError::Config(format!("timeout must be a number of seconds, got '{value}'")))?;
            }
            "cache_ttl" => {
                self.cache_ttl = value
                    .parse()
                    .map_err(|_| CheckError::Config(format!("cache_ttl must be a number of seconds, got '{value}'")))?;
            }
            "export_dir" => self.export_dir = Some(PathBuf::from(value)),
            "auth.username" => {
                let password = self.auth.take().map(|a| a.password).unwrap_or_default();
                self.auth = Some(BasicAuth {
                    username: value.to_string(),
                    password,
                });
            }
            "auth.password" => {
                let username = self.auth.take().map(|a| a.username).unwrap_or_default();
                self.auth = Some(BasicAuth {
                    username,
                    password: value.to_string(),
                });
            }
            _ => return Err(CheckError::Config(format!("unknown config key '{key}'"))),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.timeout, 60);
        assert_eq!(config.cache_ttl, 300);
        assert!(config.auth.is_none());
    }

    #[test]
    fn test_config_yaml_roundtrip() {
        let mut config = Config::default();
        config.set("base_url", "https://check.example.org").unwrap();
        config.set("auth.username", "inspector").unwrap();
        config.set("auth.password", "hunter2").unwrap();

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: Config = serde_yaml_ng::from_str(&yaml).unwrap();

        assert_eq!(parsed.base_url, "https://check.example.org");
        let auth = parsed.auth.unwrap();
        assert_eq!(auth.username, "inspector");
        assert_eq!(auth.password, "hunter2");
    }

    #[test]
    fn test_config_missing_fields_take_defaults() {
        let config: Config =
            serde_yaml_ng::from_str("base_url: https://check.example.org\n").unwrap();
        assert_eq!(config.cache_ttl, 300);
        assert_eq!(config.timeout, 60);
    }

    #[test]
    fn test_basic_auth_debug_redacts_password() {
        let auth = BasicAuth {
            username: "inspector".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{auth:?}");
        assert!(debug.contains("inspector"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut config = Config::default();
        assert!(config.set("bogus", "x").is_err());
    }

    #[test]
    fn test_set_rejects_non_numeric_timeout() {
        let mut config = Config::default();
        assert!(config.set("timeout", "soon").is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_win() {
        // SAFETY: marked #[serial]; no other test touches these vars concurrently
        unsafe {
            std::env::set_var("APPCHECK_BASE_URL", "https://env.example.org");
            std::env::set_var("APPCHECK_USERNAME", "envuser");
            std::env::set_var("APPCHECK_PASSWORD", "envpass");
        }

        let mut config = Config::default();
        config.apply_env_overrides();
        assert_eq!(config.base_url, "https://env.example.org");
        let auth = config.auth.unwrap();
        assert_eq!(auth.username, "envuser");
        assert_eq!(auth.password, "envpass");

        unsafe {
            std::env::remove_var("APPCHECK_BASE_URL");
            std::env::remove_var("APPCHECK_USERNAME");
            std::env::remove_var("APPCHECK_PASSWORD");
        }
    }

    #[test]
    #[serial]
    fn test_save_and_load_via_config_env() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        // SAFETY: marked #[serial]
        unsafe { std::env::set_var("APPCHECK_CONFIG", &path) };

        let mut config = Config::default();
        config.set("cache_ttl", "120").unwrap();
        config.save().unwrap();

        let loaded = Config::load().unwrap();
        assert_eq!(loaded.cache_ttl, 120);

        unsafe { std::env::remove_var("APPCHECK_CONFIG") };
    }
}
