use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context};
use client_core::transport::{TransportConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use shared::domain::IMAGE_BASE_URL;

pub const DEFAULT_CONFIG_PATH: &str = "movies.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub request_timeout_secs: u64,
    /// Host prefix for poster and backdrop paths, without the size segment.
    pub image_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.into(),
            api_token: None,
            request_timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            image_base_url: IMAGE_BASE_URL.into(),
        }
    }
}

impl Settings {
    pub fn transport_config(&self) -> anyhow::Result<TransportConfig> {
        let Some(token) = self.api_token.as_deref().map(str::trim) else {
            bail!("no catalog api token configured (set TMDB_API_TOKEN or api_token in {DEFAULT_CONFIG_PATH})");
        };
        if token.is_empty() {
            bail!("configured catalog api token is empty");
        }
        Ok(TransportConfig {
            base_url: self.api_base_url.clone(),
            api_token: token.to_string(),
            timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}

/// Defaults, then the flat toml file (if present), then the environment.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    config_path: Option<&Path>,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("failed to parse config file '{}'", path.display()))?,
        Err(err) if config_path.is_some() => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()));
        }
        Err(_) => {}
    }

    apply_env(&mut settings, var)?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: HashMap<String, toml::Value> = toml::from_str(raw)?;
    if let Some(v) = file_cfg.get("api_base_url").and_then(toml::Value::as_str) {
        settings.api_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("api_token").and_then(toml::Value::as_str) {
        settings.api_token = Some(v.to_string());
    }
    if let Some(v) = file_cfg.get("image_base_url").and_then(toml::Value::as_str) {
        settings.image_base_url = v.to_string();
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        settings.request_timeout_secs = v
            .as_integer()
            .and_then(|secs| u64::try_from(secs).ok())
            .context("request_timeout_secs must be a non-negative integer")?;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = var("TMDB_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = var("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = var("TMDB_API_TOKEN") {
        settings.api_token = Some(v);
    }
    if let Some(v) = var("APP__API_TOKEN") {
        settings.api_token = Some(v);
    }

    if let Some(v) = var("TMDB_IMAGE_BASE_URL") {
        settings.image_base_url = v;
    }
    if let Some(v) = var("APP__IMAGE_BASE_URL") {
        settings.image_base_url = v;
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .parse()
            .with_context(|| format!("invalid APP__REQUEST_TIMEOUT_SECS '{v}'"))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
