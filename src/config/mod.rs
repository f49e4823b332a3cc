//! Configuration system (layered: defaults > config file > env).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::error::AuthError;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Public client id of the desktop OAuth app registered with GitHub.
pub const DEFAULT_GITHUB_CLIENT_ID: &str = "Ov23liuBDdLFrlVABfQ8";
/// Public client id of the desktop OAuth app registered with Google.
pub const DEFAULT_GOOGLE_CLIENT_ID: &str =
    "1091209241791-qga5pefh6fqdt4akodlll1ss0j85jch1.apps.googleusercontent.com";

/// Client ids, endpoints and timings for every provider.
///
/// Resolution order, lowest first:
/// 1. Built-in defaults
/// 2. `~/.studio-auth/config.toml` (if present)
/// 3. Environment variables (a `.env` file is loaded first, if present)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub github: GitHubConfig,
    pub google: GoogleConfig,
    pub local: LocalConfig,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub client_id: String,
    pub scope: String,
    pub device_code_url: String,
    pub access_token_url: String,
    /// REST API root used for `/user` and `/user/emails`.
    pub api_url: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_GITHUB_CLIENT_ID.to_string(),
            scope: "read:user user:email".to_string(),
            device_code_url: "https://github.com/login/device/code".to_string(),
            access_token_url: "https://github.com/login/oauth/access_token".to_string(),
            api_url: "https://api.github.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,
    pub scope: String,
    pub authorize_url: String,
    pub userinfo_url: String,
    pub redirect_uri: String,
    pub popup_width: u32,
    pub popup_height: u32,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: DEFAULT_GOOGLE_CLIENT_ID.to_string(),
            scope: "openid email profile".to_string(),
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            redirect_uri: "http://localhost/auth/google/callback".to_string(),
            popup_width: 500,
            popup_height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Simulated sign-in latency.
    pub latency_ms: u64,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self { latency_ms: 1500 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval used when the provider reports `0` or omits it.
    pub default_interval_secs: u64,
    /// Added to the device-flow interval on every `slow_down`.
    pub slow_down_step_secs: u64,
    /// Popup monitor tick.
    pub popup_tick_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            default_interval_secs: 5,
            slow_down_step_secs: 5,
            popup_tick_ms: 500,
        }
    }
}

impl PollingConfig {
    pub fn popup_tick(&self) -> Duration {
        Duration::from_millis(self.popup_tick_ms)
    }
}

impl AuthConfig {
    /// Defaults, then the default config file, then the environment.
    pub fn load() -> Result<Self, AuthError> {
        let mut config = Self::load_from_path(Self::default_config_path())?;
        config.apply_env();
        Ok(config)
    }

    /// Default config file path (`~/.studio-auth/config.toml`).
    pub fn default_config_path() -> PathBuf {
        default_config_dir().join(CONFIG_FILE_NAME)
    }

    /// Load a config file on top of the defaults.
    ///
    /// Returns the defaults if the file does not exist.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let raw = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Overlay environment variables (`STUDIO_AUTH_*`).
    pub fn apply_env(&mut self) {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        self.apply_vars(|name| std::env::var(name).ok());
    }

    fn apply_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let mappings: [(&str, &mut String); 5] = [
            ("STUDIO_AUTH_GITHUB_CLIENT_ID", &mut self.github.client_id),
            ("STUDIO_AUTH_GITHUB_API_URL", &mut self.github.api_url),
            ("STUDIO_AUTH_GOOGLE_CLIENT_ID", &mut self.google.client_id),
            (
                "STUDIO_AUTH_GOOGLE_REDIRECT_URI",
                &mut self.google.redirect_uri,
            ),
            ("STUDIO_AUTH_GOOGLE_USERINFO_URL", &mut self.google.userinfo_url),
        ];
        for (var, slot) in mappings {
            if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
        if let Some(ms) = lookup("STUDIO_AUTH_LOCAL_LATENCY_MS").and_then(|v| v.parse().ok()) {
            self.local.latency_ms = ms;
        }
    }
}

fn default_config_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".studio-auth"))
        .unwrap_or_else(|| PathBuf::from(".studio-auth"))
}

/// Directory holding the config file and persisted sessions.
pub fn studio_auth_dir() -> PathBuf {
    default_config_dir()
}
