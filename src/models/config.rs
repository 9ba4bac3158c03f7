use reqwest::Url;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ClientError;
use crate::models::{ImageFormat, RenderRequest};

/// Client configuration loaded from a YAML file
#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Root URL of the map server
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Bound on a single HTTP round trip in milliseconds (0 = no bound)
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Deadline for a whole polling session in milliseconds (0 = no deadline)
    #[serde(default = "default_timeout_ms")]
    pub overall_timeout_ms: u64,

    /// Minimum spacing between fetch attempts
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Value of the `agent` header sent on submit
    #[serde(default = "default_agent")]
    pub agent: String,

    /// Job run by the command-line binary
    #[serde(default)]
    pub job: Option<JobConfig>,
}

fn default_server_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_agent() -> String {
    "gis".to_string()
}

/// A render job described in the configuration file
#[derive(Debug, Deserialize, Clone)]
pub struct JobConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub scale: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default = "default_format")]
    pub format: ImageFormat,
    /// Where the fetched image is written
    pub output: PathBuf,
}

fn default_format() -> ImageFormat {
    ImageFormat::Png
}

impl JobConfig {
    pub fn to_request(&self) -> Result<RenderRequest, ClientError> {
        RenderRequest::new(
            self.latitude,
            self.longitude,
            self.scale,
            self.width,
            self.height,
            self.format,
        )
    }
}

impl ClientConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load configuration from a file, falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file given, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml_str(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        server_url = %config.server_url,
                        has_job = config.job.is_some(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn base_url(&self) -> Result<Url, ClientError> {
        Url::parse(&self.server_url).map_err(|e| {
            ClientError::InvalidInput(format!("invalid server URL {}: {e}", self.server_url))
        })
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.request_timeout_ms)
    }

    pub fn overall_timeout(&self) -> Option<Duration> {
        non_zero_millis(self.overall_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn non_zero_millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_ms: default_timeout_ms(),
            overall_timeout_ms: default_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            agent: default_agent(),
            job: None,
        }
    }
}
