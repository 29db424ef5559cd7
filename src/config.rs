// SPDX-License-Identifier: GPL-3.0-or-later
// src/config.rs
//
// Persistent application configuration, stored as JSON in the user's
// config directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constant::{
    AI_BASE_URL, AI_IMAGE_MODEL, AI_MAX_CONCURRENT_REQUESTS, AI_RESPONSE_LANGUAGE,
    AI_SOLID_IMAGE_MODEL, AI_TEXT_MODEL, API_KEY_ENV_VARS, CONFIG_DIR, CONFIG_FILE,
    REQUEST_TIMEOUT_SECS,
};
use crate::records::Collection;
use crate::services::record_store::Endpoints;

/// Global configuration for the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Record store script URL per collection.
    pub endpoints: Endpoints,
    pub ai: AiConfig,
    pub admin: AdminConfig,
    /// Timeout applied to every remote request.
    pub request_timeout_secs: u64,
    /// Directory searched for relative image paths given to `crop`.
    pub default_image_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            ai: AiConfig::default(),
            admin: AdminConfig::default(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
            default_image_dir: dirs::picture_dir().or_else(dirs::home_dir),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Overridden by the environment, see [`AppConfig::api_key`].
    pub api_key: Option<String>,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    /// Used for 3D figures.
    pub solid_image_model: String,
    pub response_language: String,
    /// Grading calls in flight at once.
    pub max_concurrent_requests: usize,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: AI_BASE_URL.into(),
            text_model: AI_TEXT_MODEL.into(),
            image_model: AI_IMAGE_MODEL.into(),
            solid_image_model: AI_SOLID_IMAGE_MODEL.into(),
            response_language: AI_RESPONSE_LANGUAGE.into(),
            max_concurrent_requests: AI_MAX_CONCURRENT_REQUESTS,
        }
    }
}

/// Administrator credentials. An empty digest disables admin login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".into(),
            password_sha256: String::new(),
        }
    }
}

impl AdminConfig {
    pub fn set_password(&mut self, password: &str) {
        self.password_sha256 = password_digest(password);
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        let expected = self.password_sha256.trim();
        !expected.is_empty()
            && username.trim() == self.username.trim()
            && password_digest(password).eq_ignore_ascii_case(expected)
    }
}

/// Lowercase hex SHA-256 of `password`.
pub fn password_digest(password: &str) -> String {
    Sha256::digest(password.as_bytes())
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

impl AppConfig {
    /// `<config dir>/lectern/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, text).with_context(|| format!("Failed to write config {}", path.display()))?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// API key from the environment, falling back to the config file.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|&name| env(name))
            .or_else(|| self.ai.api_key.clone())
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Update one setting by its dotted name, e.g. `endpoints.lessons`.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let value = value.trim();
        match key.trim() {
            "ai.api_key" => self.ai.api_key = Some(value.to_string()).filter(|v| !v.is_empty()),
            "ai.base_url" => self.ai.base_url = value.into(),
            "ai.text_model" => self.ai.text_model = value.into(),
            "ai.image_model" => self.ai.image_model = value.into(),
            "ai.solid_image_model" => self.ai.solid_image_model = value.into(),
            "ai.response_language" => self.ai.response_language = value.into(),
            "ai.max_concurrent_requests" => {
                let n: usize = value.parse().context("Expected a positive number")?;
                if n == 0 {
                    bail!("ai.max_concurrent_requests must be at least 1");
                }
                self.ai.max_concurrent_requests = n;
            }
            "admin.username" => self.admin.username = value.into(),
            "admin.password" if value.is_empty() => self.admin.password_sha256.clear(),
            "admin.password" => self.admin.set_password(value),
            "request_timeout_secs" => {
                self.request_timeout_secs = value.parse().context("Expected a number of seconds")?;
            }
            "default_image_dir" => {
                self.default_image_dir = Some(PathBuf::from(value)).filter(|_| !value.is_empty());
            }
            other => {
                let collection = other
                    .strip_prefix("endpoints.")
                    .and_then(Collection::parse)
                    .with_context(|| format!("Unknown setting `{other}`"))?;
                self.endpoints.set(collection, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.set("endpoints.lessons", "https://script.test/lessons").unwrap();
        config.set("ai.max_concurrent_requests", "2").unwrap();
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.endpoints.url(Collection::Lessons), Some("https://script.test/lessons"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"ai": {"text_model": "custom"}}"#).unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.ai.text_model, "custom");
        assert_eq!(config.ai.image_model, AI_IMAGE_MODEL);
        assert_eq!(config.request_timeout_secs, REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn unknown_and_invalid_settings() {
        let mut config = AppConfig::default();
        assert!(config.set("endpoints.grades", "x").is_err());
        assert!(config.set("colour", "x").is_err());
        assert!(config.set("ai.max_concurrent_requests", "0").is_err());
    }

    #[test]
    fn env_key_wins_over_file() {
        let mut config = AppConfig::default();
        config.ai.api_key = Some("from-file".into());

        let env = |name: &str| (name == "API_KEY").then(|| "from-env".to_string());
        assert_eq!(config.api_key_with(env).as_deref(), Some("from-env"));
        assert_eq!(config.api_key_with(|_| None).as_deref(), Some("from-file"));

        config.ai.api_key = Some("  ".into());
        assert_eq!(config.api_key_with(|_| None), None);
    }

    #[test]
    fn admin_digest_check() {
        assert_eq!(
            password_digest("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );

        let mut admin = AdminConfig::default();
        assert!(!admin.verify("admin", ""));

        admin.set_password("s3cret");
        assert!(admin.verify(" admin ", "s3cret"));
        assert!(!admin.verify("admin", "secret"));
        assert!(!admin.verify("root", "s3cret"));
    }
}
