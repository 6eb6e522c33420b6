use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::Arc};

use crate::{
    http::build_client,
    provider::{IpInfoProvider, WeatherApiProvider, ipinfo, weatherapi},
    session::WeatherSession,
};

/// Environment variable that overrides the stored WeatherAPI key.
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";

/// WeatherAPI.com credentials and endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherApiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub base_url: Option<String>,
}

/// Timeouts of the shared HTTP client, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub connect_timeout_secs: u64,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { connect_timeout_secs: 30, timeout_secs: 30 }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weather]
/// api_key = "..."
///
/// [http]
/// timeout_secs = 10
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub weather: WeatherApiConfig,
    pub geolocation: GeolocationConfig,
    pub http: HttpConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherapp", "weatherapp")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key.trim().to_string());
    }

    /// WeatherAPI key: `WEATHERAPI_KEY` first, then the config file.
    pub fn api_key(&self) -> Result<String> {
        let from_env = std::env::var(API_KEY_ENV).ok();
        self.resolve_api_key(from_env)
    }

    fn resolve_api_key(&self, from_env: Option<String>) -> Result<String> {
        from_env
            .into_iter()
            .chain(self.weather.api_key.clone())
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No WeatherAPI key configured.\n\
                     Hint: run `weatherapp configure` or set {API_KEY_ENV}."
                )
            })
    }

    pub fn weather_base_url(&self) -> &str {
        self.weather.base_url.as_deref().unwrap_or(weatherapi::DEFAULT_BASE_URL)
    }

    pub fn geolocation_base_url(&self) -> &str {
        self.geolocation.base_url.as_deref().unwrap_or(ipinfo::DEFAULT_BASE_URL)
    }

    /// Wire one shared HTTP client into both providers and hand them to a new session.
    /// The session is not started; see [`WeatherSession::start`].
    pub fn build_session(&self) -> Result<WeatherSession> {
        let http = build_client(&self.http)?;

        let weather = WeatherApiProvider::with_base_url(
            self.api_key()?,
            self.weather_base_url().to_string(),
            http.clone(),
        );
        let geo = IpInfoProvider::with_base_url(self.geolocation_base_url().to_string(), http);

        Ok(WeatherSession::new(Arc::new(weather), Arc::new(geo)))
    }
}
