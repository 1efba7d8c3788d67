//! Crew configuration: defaults, optional TOML file, environment overrides.
//!
//! Resolution order is defaults < `crew.toml` < environment variables.
//!
//! # Environment Variables
//! - `BUS_URL`: transport endpoint (default `redis://localhost:6379`, `memory://` for in-process)
//! - `CHANNEL_NAME`: pub/sub channel (default `medlyf_events`)
//! - `JOB_SERVER_URL`: base URL of the job server (default `http://localhost:5001`)
//! - `ALERT_THRESHOLD`: occupancy ceiling (default 80)
//! - `JOB_TIMEOUT_SECS`: per-call timeout of the job request (default 20)
//! - `HTTP_ENABLED` / `HTTP_ADDR`: ingress API switch and bind address
//! - `SEVERITY_CSV` / `SEVERITY_INTERVAL_SECS`: disease table for the periodic scan
//! - `RECORDS_PATH`: JSON-lines file for severity records
//! - `CREW_CONFIG_PATH`: explicit path of the TOML file

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CrewError, CrewResult};
use crate::severity::SeverityBand;

pub const DEFAULT_BUS_URL: &str = "redis://localhost:6379";
pub const DEFAULT_CHANNEL: &str = "medlyf_events";
pub const DEFAULT_JOB_SERVER_URL: &str = "http://localhost:5001";
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

/// Full crew configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrewConfig {
    #[serde(default)]
    pub bus: BusSettings,
    #[serde(default)]
    pub jobs: JobSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub severity: SeveritySettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub records: RecordSettings,
}

/// Pub/sub transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusSettings {
    #[serde(default = "default_bus_url")]
    pub url: String,
    #[serde(default = "default_channel")]
    pub channel: String,
    /// Capacity of the in-process channel when `url` is `memory://`.
    #[serde(default = "default_local_capacity")]
    pub local_capacity: usize,
}

/// Job-creation endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSettings {
    #[serde(default = "default_job_server_url")]
    pub server_url: String,
    #[serde(default = "default_job_path")]
    pub path: String,
    #[serde(default = "default_job_timeout_secs")]
    pub timeout_secs: u64,
}

/// Alerting and optimization thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSettings {
    #[serde(default = "default_alert_threshold")]
    pub threshold: f64,
}

/// Periodic disease severity scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveritySettings {
    /// Disease case table. The scan is disabled when unset.
    #[serde(default)]
    pub csv_path: Option<PathBuf>,
    #[serde(default = "default_scan_interval_secs")]
    pub interval_secs: u64,
    /// Diseases with a trained seasonal model.
    #[serde(default)]
    pub models: Vec<String>,
    /// Ascending case-count bands for the severity classifier.
    #[serde(default = "default_bands")]
    pub bands: Vec<SeverityBand>,
}

/// Ingress HTTP API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_http_enabled")]
    pub enabled: bool,
    #[serde(default = "default_http_addr")]
    pub addr: String,
}

/// Where severity records go.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordSettings {
    /// JSON-lines file. Records stay in memory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_bus_url() -> String {
    DEFAULT_BUS_URL.to_string()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

fn default_local_capacity() -> usize {
    256
}

fn default_job_server_url() -> String {
    DEFAULT_JOB_SERVER_URL.to_string()
}

fn default_job_path() -> String {
    "/api/jobs".to_string()
}

fn default_job_timeout_secs() -> u64 {
    20
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

fn default_scan_interval_secs() -> u64 {
    24 * 60 * 60
}

fn default_bands() -> Vec<SeverityBand> {
    crate::severity::classifier::default_bands()
}

fn default_http_enabled() -> bool {
    true
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            url: default_bus_url(),
            channel: default_channel(),
            local_capacity: default_local_capacity(),
        }
    }
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            server_url: default_job_server_url(),
            path: default_job_path(),
            timeout_secs: default_job_timeout_secs(),
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            threshold: default_alert_threshold(),
        }
    }
}

impl Default for SeveritySettings {
    fn default() -> Self {
        Self {
            csv_path: None,
            interval_secs: default_scan_interval_secs(),
            models: Vec::new(),
            bands: default_bands(),
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            enabled: default_http_enabled(),
            addr: default_http_addr(),
        }
    }
}

impl JobSettings {
    /// Full URL of the job-creation endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.server_url.trim_end_matches('/'),
            self.path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CrewConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> CrewResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            CrewError::configuration(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> CrewResult<Self> {
        let config: CrewConfig = toml::from_str(content).map_err(|e| {
            CrewError::configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Locate the TOML file: `CREW_CONFIG_PATH`, then `crew.toml`, then
    /// `backend/crew.toml`. Returns `None` when no file exists.
    pub fn locate_file() -> Option<PathBuf> {
        if let Ok(path) = env::var("CREW_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }
        [PathBuf::from("crew.toml"), PathBuf::from("backend/crew.toml")]
            .into_iter()
            .find(|path| path.exists())
    }

    /// Load defaults, then the config file if any, then environment overrides.
    pub fn load() -> CrewResult<Self> {
        let base = match Self::locate_file() {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        base.with_env_overrides()
    }

    /// Apply environment variable overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> CrewResult<Self> {
        if let Some(url) = env_string("BUS_URL") {
            self.bus.url = url;
        }
        if let Some(channel) = env_string("CHANNEL_NAME") {
            self.bus.channel = channel;
        }
        if let Some(url) = env_string("JOB_SERVER_URL") {
            self.jobs.server_url = url;
        }
        if let Some(threshold) = env_parse::<f64>("ALERT_THRESHOLD")? {
            self.alerts.threshold = threshold;
        }
        if let Some(secs) = env_parse::<u64>("JOB_TIMEOUT_SECS")? {
            self.jobs.timeout_secs = secs;
        }
        if let Some(enabled) = env_parse::<bool>("HTTP_ENABLED")? {
            self.http.enabled = enabled;
        }
        if let Some(addr) = env_string("HTTP_ADDR") {
            self.http.addr = addr;
        }
        if let Some(path) = env_string("SEVERITY_CSV") {
            self.severity.csv_path = Some(PathBuf::from(path));
        }
        if let Some(secs) = env_parse::<u64>("SEVERITY_INTERVAL_SECS")? {
            self.severity.interval_secs = secs;
        }
        if let Some(path) = env_string("RECORDS_PATH") {
            self.records.path = Some(PathBuf::from(path));
        }
        self.validate()?;
        Ok(self)
    }

    /// Reject values the agents cannot work with.
    pub fn validate(&self) -> CrewResult<()> {
        if !self.alerts.threshold.is_finite() {
            return Err(CrewError::configuration(
                "ALERT_THRESHOLD must be a finite number",
            ));
        }
        if self.bus.channel.trim().is_empty() {
            return Err(CrewError::configuration("channel name must not be empty"));
        }
        if self.jobs.timeout_secs == 0 {
            return Err(CrewError::configuration("job timeout must be at least 1 second"));
        }
        if self.severity.interval_secs == 0 {
            return Err(CrewError::configuration(
                "severity scan interval must be at least 1 second",
            ));
        }
        crate::severity::classifier::validate_bands(&self.severity.bands)?;
        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> CrewResult<Option<T>> {
    match env_string(key) {
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            CrewError::configuration(format!("{} has an invalid value '{}'", key, raw))
        }),
        None => Ok(None),
    }
}
