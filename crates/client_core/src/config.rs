use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use thiserror::Error;

pub const DEFAULT_SETTINGS_FILE: &str = "recommender.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub image_base_url: String,
    pub request_timeout_secs: Option<u64>,
    /// Off by default: transport failures are logged on the worker and never
    /// reach the consumer. When on, they surface as a generic notice.
    pub notify_transport_failures: bool,
    pub no_favourites_message: String,
    pub user: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:7777".into(),
            image_base_url: "drawable://".into(),
            request_timeout_secs: Some(10),
            notify_transport_failures: false,
            no_favourites_message: "Please add your favourite movies in the profile settings."
                .into(),
            user: None,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Defaults, then `recommender.toml` (or `explicit_path`), then environment.
pub fn load_settings(explicit_path: Option<&Path>) -> Result<Settings, SettingsError> {
    load_settings_with(explicit_path, |key| std::env::var(key).ok())
}

pub fn load_settings_with(
    explicit_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings, SettingsError> {
    let mut settings = Settings::default();

    let file_cfg = match explicit_path {
        Some(path) => Some(read_settings_file(path)?),
        None => {
            let path = Path::new(DEFAULT_SETTINGS_FILE);
            if path.exists() {
                Some(read_settings_file(path)?)
            } else {
                None
            }
        }
    };

    if let Some(file_cfg) = file_cfg {
        apply_overrides(&mut settings, |key| file_cfg.get(key).cloned());
    }

    apply_overrides(&mut settings, |key| {
        env(&format!("APP__{}", key.to_ascii_uppercase()))
    });
    if let Some(v) = env("RECOMMENDER_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("RECOMMENDER_USER") {
        settings.user = Some(v);
    }

    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<HashMap<String, String>, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table: toml::Table = toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(table
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                toml::Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

/// Unparseable numbers and booleans leave the previous layer in place.
fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("server_url") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("image_base_url") {
        settings.image_base_url = v;
    }
    if let Some(v) = lookup("request_timeout_secs") {
        if let Ok(parsed) = v.trim().parse::<u64>() {
            settings.request_timeout_secs = Some(parsed);
        }
    }
    if let Some(v) = lookup("notify_transport_failures") {
        if let Ok(parsed) = v.trim().parse::<bool>() {
            settings.notify_transport_failures = parsed;
        }
    }
    if let Some(v) = lookup("no_favourites_message") {
        settings.no_favourites_message = v;
    }
    if let Some(v) = lookup("user") {
        settings.user = Some(v);
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
