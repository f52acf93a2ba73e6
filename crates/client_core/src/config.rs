use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use url::Url;

use crate::error::ServiceError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const SETTINGS_FILE: &str = "gallery.toml";

const BASE_URL_ENV_VARS: [&str; 2] = ["GALLERY_API_BASE_URL", "APP__API_BASE_URL"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
        }
    }
}

impl Settings {
    /// Applies a command-line override, which wins over file and env.
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(v) = base_url {
            self.api_base_url = normalize_api_base_url(&v);
        }
        self
    }

    pub fn base_url(&self) -> Result<Url, ServiceError> {
        parse_api_base_url(&self.api_base_url)
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(SETTINGS_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(
    file: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(file) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("api_base_url") {
                    settings.api_base_url = v.clone();
                }
            }
            Err(err) => {
                tracing::warn!(path = %file.display(), "ignoring unreadable settings file: {err}");
            }
        }
    }

    for name in BASE_URL_ENV_VARS {
        if let Some(v) = env(name) {
            settings.api_base_url = v;
        }
    }

    settings.api_base_url = normalize_api_base_url(&settings.api_base_url);
    settings
}

pub fn normalize_api_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base_url;
    }
    trimmed.to_string()
}

pub fn parse_api_base_url(raw: &str) -> Result<Url, ServiceError> {
    let normalized = normalize_api_base_url(raw);
    // Trailing slash so relative joins keep any path prefix.
    Url::parse(&format!("{normalized}/")).map_err(|source| ServiceError::InvalidUrl {
        input: raw.to_string(),
        source,
    })
}
