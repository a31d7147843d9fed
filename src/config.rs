use std::{fs, path::PathBuf, sync::Mutex};

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::utils;

fn default_backend_url() -> String {
    "https://api.cityscout.app".to_string()
}

// City-center fallback when geolocation is unavailable.
fn default_fallback_latitude() -> f64 {
    40.7128
}

fn default_fallback_longitude() -> f64 {
    -74.0060
}

fn default_radius_miles() -> f64 {
    5.0
}

fn default_position_timeout_ms() -> u64 {
    3000
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub backend_api_key: Option<String>,
    pub fallback_latitude: f64,
    pub fallback_longitude: f64,
    pub default_radius_miles: f64,
    pub position_timeout_ms: u64,
    pub timezone: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            backend_api_key: None,
            fallback_latitude: default_fallback_latitude(),
            fallback_longitude: default_fallback_longitude(),
            default_radius_miles: default_radius_miles(),
            position_timeout_ms: default_position_timeout_ms(),
            timezone: default_timezone(),
        }
    }
}

impl AppConfig {
    pub fn fallback_position(&self) -> Coordinates {
        Coordinates {
            latitude: self.fallback_latitude,
            longitude: self.fallback_longitude,
        }
    }

    pub fn display_timezone(&self) -> chrono_tz::Tz {
        self.timezone
            .parse()
            .unwrap_or(chrono_tz::America::New_York)
    }
}

pub struct ConfigStore {
    path: PathBuf,
    data: Mutex<AppConfig>,
}

impl ConfigStore {
    pub fn load() -> Self {
        Self::at_path(utils::config_path())
    }

    pub fn at_path(path: PathBuf) -> Self {
        let data = read_config(&path).unwrap_or_default();
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    pub fn read(&self) -> AppConfig {
        self.data.lock().expect("config mutex poisoned").clone()
    }

    pub fn update<F>(&self, transform: F) -> Result<AppConfig, String>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self
            .data
            .lock()
            .map_err(|_| "config mutex poisoned".to_string())?;
        transform(&mut guard);
        write_config(&self.path, &guard)?;
        Ok(guard.clone())
    }
}

fn read_config(path: &PathBuf) -> Result<AppConfig, String> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let contents = fs::read_to_string(path).map_err(|err| err.to_string())?;
    serde_json::from_str(&contents).map_err(|err| err.to_string())
}

fn write_config(path: &PathBuf, config: &AppConfig) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            return Err(err.to_string());
        }
    }
    let contents = serde_json::to_string_pretty(config).map_err(|err| err.to_string())?;
    fs::write(path, contents).map_err(|err| err.to_string())
}
