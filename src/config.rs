//! Configuration management for docgate.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::error::{GateError, Result};
use crate::ratelimit::{BlockingGate, SubmissionGate, TimeUnit};

/// Environment variable prefix for configuration overrides, e.g.
/// `DOCGATE__GATE__REQUEST_LIMIT=10`.
const ENV_PREFIX: &str = "DOCGATE";

/// Main configuration for docgate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocgateConfig {
    /// Rate limiting configuration
    #[serde(default)]
    pub gate: GateConfig,

    /// Document API client configuration
    #[serde(default)]
    pub client: ClientConfig,
}

/// Rate limit gate configuration.
///
/// One window lasts one `time_unit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    /// Length of one window
    #[serde(default)]
    pub time_unit: TimeUnit,

    /// Maximum submissions per window
    #[serde(default = "default_request_limit")]
    pub request_limit: u64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            time_unit: TimeUnit::default(),
            request_limit: default_request_limit(),
        }
    }
}

fn default_request_limit() -> u64 {
    5
}

impl GateConfig {
    /// Build an async gate from this configuration.
    pub fn build(&self) -> Result<SubmissionGate> {
        SubmissionGate::with_time_unit(self.time_unit, self.request_limit)
    }

    /// Build a thread-blocking gate from this configuration.
    pub fn build_blocking(&self) -> Result<BlockingGate> {
        BlockingGate::with_time_unit(self.time_unit, self.request_limit)
    }
}

/// Document API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Document creation endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://ismp.crpt.ru/api/v3/lk/documents/create".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DocgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading configuration file");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| GateError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Load configuration from an optional file, then apply `DOCGATE__*`
    /// environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            info!(path = %path.display(), "Loading configuration file");
            builder = builder.add_source(config::File::from(path));
        }

        builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(|e| GateError::Config(e.to_string()))
    }
}
