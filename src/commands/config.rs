//! Configuration file handling.
//!
//! The configuration is a JSON file. Credentials can be supplied through
//! `EUSURVEYMGR_*` environment variables instead, so they never have to
//! appear on the command line.

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::{ClientConfig, DEFAULT_TIMEOUT_SECS};
use crate::runtime::Runtime;

pub const DEFAULT_CONFIG_PATH: &str = "eusurveymgr.json";

pub const ENV_BASE_URL: &str = "EUSURVEYMGR_BASE_URL";
pub const ENV_WEB_USER: &str = "EUSURVEYMGR_WEB_USER";
pub const ENV_WEB_PASSWORD: &str = "EUSURVEYMGR_WEB_PASSWORD";

const REDACTED: &str = "***";

/// Contents of `eusurveymgr.json`. Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub web_user: String,
    pub web_password: String,
    /// Directory for output files written under their default names.
    pub output_dir: PathBuf,
    /// Per-request timeout; also the poll deadline unless overridden.
    pub timeout_seconds: u64,
    pub poll_timeout_seconds: Option<u64>,
    pub insecure_tls: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            web_user: String::new(),
            web_password: String::new(),
            output_dir: PathBuf::from("."),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            poll_timeout_seconds: None,
            insecure_tls: false,
        }
    }
}

impl Config {
    /// Reads the file at `path`, fills in defaults and applies environment
    /// overrides.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime + ?Sized>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to load config file {:?}", path))?;
        let config = Self::from_json(runtime, &content)
            .with_context(|| format!("Invalid config file {:?}", path))?;
        debug!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_json<R: Runtime + ?Sized>(runtime: &R, content: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(content)?;

        if config.timeout_seconds == 0 {
            config.timeout_seconds = DEFAULT_TIMEOUT_SECS;
        }
        if config.output_dir.as_os_str().is_empty() {
            config.output_dir = PathBuf::from(".");
        }

        config.apply_env_overrides(runtime);
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    fn apply_env_overrides<R: Runtime + ?Sized>(&mut self, runtime: &R) {
        let overrides: [(&str, &mut String); 3] = [
            (ENV_BASE_URL, &mut self.base_url),
            (ENV_WEB_USER, &mut self.web_user),
            (ENV_WEB_PASSWORD, &mut self.web_password),
        ];
        for (key, field) in overrides {
            if let Ok(value) = runtime.env_var(key) {
                if !value.is_empty() {
                    debug!("Using {} from environment", key);
                    *field = value;
                }
            }
        }
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_seconds.unwrap_or(self.timeout_seconds))
    }

    /// Connection settings for the survey client.
    pub fn client_config(&self) -> Result<ClientConfig> {
        if self.base_url.is_empty() {
            bail!("base_url is not set (config file or {})", ENV_BASE_URL);
        }
        if self.web_user.is_empty() {
            bail!("web_user is not set (config file or {})", ENV_WEB_USER);
        }

        let mut client = ClientConfig::new(&self.base_url, &self.web_user, &self.web_password);
        client.insecure_tls = self.insecure_tls;
        client.timeout = Duration::from_secs(self.timeout_seconds);
        client.poll_timeout = self.poll_timeout();
        Ok(client)
    }

    /// Copy safe to print: the password is masked.
    pub fn redacted(&self) -> Self {
        let mut safe = self.clone();
        if !safe.web_password.is_empty() {
            safe.web_password = REDACTED.to_string();
        }
        safe
    }

    pub fn to_display_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.redacted())?)
    }
}
