use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use tracing::debug;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FlightFareScanner";
const APP_NAME: &str = "FlightFareScanner";

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.aviationstack.com/v1/";
pub const DEFAULT_SEARCH_ENDPOINT: &str = "http://localhost:3000/api/flights";
pub const DEFAULT_REQUEST_LIMIT: u32 = 100;

pub const ENV_API_KEY: &str = "AVIATIONSTACK_API_KEY";
pub const ENV_PROVIDER_BASE_URL: &str = "AVIATIONSTACK_BASE_URL";
pub const ENV_SEARCH_ENDPOINT: &str = "FLIGHT_SEARCH_ENDPOINT";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// aviationstack access key. Absent means provider searches fail with a
    /// configuration error.
    pub api_key: Option<String>,
    pub provider_base_url: String,
    pub search_endpoint: String,
    pub request_limit: u32,
    /// Handed to the HTTP client; the search flow itself has no timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            provider_base_url: DEFAULT_PROVIDER_BASE_URL.to_string(),
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            request_limit: DEFAULT_REQUEST_LIMIT,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    /// Settings file from the platform config directory (defaults when
    /// missing), then environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = match settings_file() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        settings.apply_env(|key| env::var(key).ok());
        Ok(settings)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&data)?;
        debug!(path = %path.display(), "loaded settings file");
        Ok(settings)
    }

    /// Overrides fields from the given variable lookup. Blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(url) = get(ENV_PROVIDER_BASE_URL) {
            self.provider_base_url = url;
        }
        if let Some(url) = get(ENV_SEARCH_ENDPOINT) {
            self.search_endpoint = url;
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub fn settings_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("settings.json"))
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn environment_overrides_file_values() {
        let mut settings = Settings {
            api_key: Some("from-file".into()),
            ..Settings::default()
        };
        let vars: HashMap<&str, &str> = [
            (ENV_API_KEY, "from-env"),
            (ENV_SEARCH_ENDPOINT, "https://flights.example/api/flights"),
            (ENV_PROVIDER_BASE_URL, "  "),
        ]
        .into_iter()
        .collect();

        settings.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(settings.api_key.as_deref(), Some("from-env"));
        assert_eq!(settings.search_endpoint, "https://flights.example/api/flights");
        assert_eq!(settings.provider_base_url, DEFAULT_PROVIDER_BASE_URL);
    }

    #[test]
    fn partial_file_uses_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"request_timeout_secs": 15}"#).unwrap();
        assert_eq!(settings.request_limit, DEFAULT_REQUEST_LIMIT);
        assert_eq!(settings.request_timeout(), Some(Duration::from_secs(15)));
        assert!(settings.api_key.is_none());
    }

    #[test]
    fn save_and_reload() {
        let path = env::temp_dir()
            .join(format!("flight-fare-scanner-{}", std::process::id()))
            .join("settings.json");
        let settings = Settings {
            api_key: Some("secret".into()),
            request_limit: 50,
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::from_file(&path).unwrap(), settings);
        let _ = fs::remove_file(&path);
    }
}
