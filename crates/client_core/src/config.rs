use std::{collections::HashMap, fs};

use anyhow::{bail, Context};
use shared::domain::{PageSize, SearchState, DEFAULT_QUERY};
use url::Url;

pub const SETTINGS_FILE: &str = "pixelscape.toml";
pub const DEFAULT_API_BASE_URL: &str = "https://pixabay.com/api/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub api_key: Option<String>,
    pub default_query: String,
    pub page_size: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            api_key: None,
            default_query: DEFAULT_QUERY.into(),
            page_size: PageSize::default().get(),
        }
    }
}

/// Validated settings the client is built from.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub api_key: String,
    pub initial_state: SearchState,
}

pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(file.as_deref(), |name| std::env::var(name).ok())
}

/// Defaults, then the flat `key = "value"` settings file, then the environment.
pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("api_base_url") {
                settings.api_base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("api_key") {
                settings.api_key = Some(v.clone());
            }
            if let Some(v) = file_cfg.get("default_query") {
                settings.default_query = v.clone();
            }
            if let Some(parsed) = file_cfg.get("page_size").and_then(|v| v.parse().ok()) {
                settings.page_size = parsed;
            }
        }
    }

    if let Some(v) = env("PIXABAY_API_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = env("PIXABAY_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = Some(v);
    }

    if let Some(v) = env("APP__DEFAULT_QUERY") {
        settings.default_query = v;
    }

    if let Some(v) = env("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.page_size = parsed;
        }
    }

    settings
}

impl Settings {
    pub fn validate(&self) -> anyhow::Result<ClientConfig> {
        let api_key = match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => bail!(
                "missing image service access key; set PIXABAY_API_KEY or APP__API_KEY, or api_key in {SETTINGS_FILE}"
            ),
        };

        let raw_url = self.api_base_url.trim();
        let raw_url = if raw_url.is_empty() {
            DEFAULT_API_BASE_URL
        } else {
            raw_url
        };
        let base_url = Url::parse(raw_url)
            .with_context(|| format!("invalid image service base url '{raw_url}'"))?;

        let page_size = PageSize::try_from(self.page_size).context("invalid page_size setting")?;
        let mut default_query = self.default_query.trim();
        if default_query.is_empty() {
            default_query = DEFAULT_QUERY;
        }

        Ok(ClientConfig {
            base_url,
            api_key,
            initial_state: SearchState::new(default_query, page_size),
        })
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
