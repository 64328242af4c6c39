//! Client settings.
//!
//! Resolution order, later sources winning: JSON file (`--config`),
//! environment variables, command-line flags. The result is validated once
//! before any client is built.
use anyhow::{anyhow, Context, Result};
use claims::{PollConfig, UploadPolicy};
use gateway::{HttpGatewayConfig, TOKEN_ENV_VAR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::cli::GlobalArgs;

pub const API_URL_ENV: &str = "CLAIMWATCH_API_URL";
pub const MAX_ATTEMPTS_ENV: &str = "CLAIMWATCH_MAX_ATTEMPTS";
pub const INTERVAL_MS_ENV: &str = "CLAIMWATCH_INTERVAL_MS";
pub const INITIAL_DELAY_MS_ENV: &str = "CLAIMWATCH_INITIAL_DELAY_MS";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything needed to build a [`workflow::ClaimClient`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ClientSettings {
    pub api_url: Option<String>,
    /// Fixed session token; `CLAIMWATCH_TOKEN` overrides the file value.
    /// When no source sets one the variable is re-read on every request.
    pub token: Option<String>,
    pub request_timeout_secs: u64,
    pub upload: UploadPolicy,
    pub poll: PollConfig,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            upload: UploadPolicy::default(),
            poll: PollConfig::default(),
        }
    }
}

impl ClientSettings {
    /// Resolves settings from all sources and validates the result.
    pub fn resolve<F>(global: &GlobalArgs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = match &global.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply_env(env)?;
        settings.apply_flags(global);
        settings.validate()?;
        Ok(settings)
    }

    /// Loads a settings file. Missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read settings {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("parse settings JSON {}", path.display()))
    }

    /// Applies environment overrides read through `env`.
    pub fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = var(API_URL_ENV) {
            self.api_url = Some(url);
        }
        if let Some(token) = var(TOKEN_ENV_VAR) {
            self.token = Some(token);
        }
        if let Some(value) = var(MAX_ATTEMPTS_ENV) {
            self.poll.max_attempts = parse_number(MAX_ATTEMPTS_ENV, &value)?;
        }
        if let Some(value) = var(INTERVAL_MS_ENV) {
            self.poll.interval_ms = parse_number(INTERVAL_MS_ENV, &value)?;
        }
        if let Some(value) = var(INITIAL_DELAY_MS_ENV) {
            self.poll.initial_delay_ms = parse_number(INITIAL_DELAY_MS_ENV, &value)?;
        }
        Ok(())
    }

    pub fn apply_flags(&mut self, global: &GlobalArgs) {
        if let Some(url) = &global.api_url {
            self.api_url = Some(url.clone());
        }
        if let Some(token) = &global.token {
            self.token = Some(token.clone());
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.as_deref().map_or(true, |u| u.trim().is_empty()) {
            return Err(anyhow!(
                "no API base URL configured; pass --api-url or set {API_URL_ENV}"
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(anyhow!("requestTimeoutSecs must be greater than zero"));
        }
        self.poll.validate().context("invalid poll settings")?;
        self.upload.check().context("invalid upload settings")?;
        Ok(())
    }

    pub fn gateway_config(&self) -> Result<HttpGatewayConfig> {
        let url = self
            .api_url
            .clone()
            .ok_or_else(|| anyhow!("no API base URL configured"))?;
        let mut config = HttpGatewayConfig::new(url);
        config.request_timeout = Duration::from_secs(self.request_timeout_secs);
        Ok(config)
    }
}

fn parse_number<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{name} must be a non-negative integer, got '{value}'"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
