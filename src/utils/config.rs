use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::Settings;

const ENV_BACKEND_URL: &str = "PIXELPET_BACKEND_URL";
const ENV_ACCESS_TOKEN: &str = "PIXELPET_ACCESS_TOKEN";
const ENV_USER_ID: &str = "PIXELPET_USER_ID";
const ENV_TIMEZONE: &str = "PIXELPET_TZ";

pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// `<config dir>/pixelpet/settings.json`, when the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("pixelpet").join("settings.json"))
}

/// Reads settings from `path`; a missing file yields defaults.
pub fn read_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        log::debug!("No settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read settings from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid settings file {}", path.display()))
}

pub fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write settings to {}", path.display()))
}

/// Environment wins over the settings file for anything it sets.
pub fn apply_env_defaults(settings: &mut Settings) {
    if let Some(url) = env_value(ENV_BACKEND_URL) {
        settings.api.base_url = url;
    }
    if let Some(token) = env_value(ENV_ACCESS_TOKEN) {
        settings.session.access_token = token;
    }
    if let Some(user_id) = env_value(ENV_USER_ID) {
        settings.session.user_id = user_id;
    }
    if let Some(tz) = env_value(ENV_TIMEZONE) {
        settings.dashboard.timezone = Some(tz);
    }
}

pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    let mut settings = match explicit.map(Path::to_path_buf).or_else(default_settings_path) {
        Some(path) => read_settings(&path)?,
        None => Settings::default(),
    };
    apply_env_defaults(&mut settings);
    Ok(settings)
}

/// The configured IANA zone, or `None` for the machine's local zone.
pub fn resolve_timezone(settings: &Settings) -> Result<Option<chrono_tz::Tz>> {
    match settings.dashboard.timezone.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => name
            .parse::<chrono_tz::Tz>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("unknown timezone `{}`: {}", name, e)),
    }
}
