use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};

use crate::http::RequestOptions;

const DEFAULT_SIM_DURATION_SECS: u64 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// Runtime settings resolved from `REELWATCH_*` environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the video-source service; the in-process mock is used when unset.
    pub source_url: Option<String>,
    pub request: RequestOptions,
    pub autoplay: bool,
    /// Length of every clip played by the simulated engine.
    pub sim_duration: Duration,
    pub data_dir: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: None,
            request: RequestOptions::default(),
            autoplay: true,
            sim_duration: Duration::from_secs(DEFAULT_SIM_DURATION_SECS),
            data_dir: None,
            log_format: LogFormat::Compact,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        config.source_url = get("REELWATCH_SOURCE_URL");
        if let Some(raw) = get("REELWATCH_HTTP_TIMEOUT_MS") {
            let timeout = Duration::from_millis(parse_number("REELWATCH_HTTP_TIMEOUT_MS", &raw)?);
            config.request.connect_timeout = timeout;
            config.request.read_timeout = timeout;
        }
        if let Some(raw) = get("REELWATCH_HTTP_ATTEMPTS") {
            let attempts = parse_number("REELWATCH_HTTP_ATTEMPTS", &raw)?;
            if attempts == 0 {
                return Err(anyhow!("REELWATCH_HTTP_ATTEMPTS must be at least 1"));
            }
            config.request.attempts = attempts as usize;
        }
        if let Some(raw) = get("REELWATCH_AUTOPLAY") {
            config.autoplay = parse_flag("REELWATCH_AUTOPLAY", &raw)?;
        }
        if let Some(raw) = get("REELWATCH_SIM_DURATION_SECS") {
            let secs = parse_number("REELWATCH_SIM_DURATION_SECS", &raw)?;
            if secs == 0 {
                return Err(anyhow!("REELWATCH_SIM_DURATION_SECS must be positive"));
            }
            config.sim_duration = Duration::from_secs(secs);
        }
        config.data_dir = get("REELWATCH_DATA_DIR").map(PathBuf::from);
        if let Some(raw) = get("REELWATCH_LOG_FORMAT") {
            config.log_format = match raw.to_ascii_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" | "text" | "pretty" => LogFormat::Compact,
                other => return Err(anyhow!("unsupported REELWATCH_LOG_FORMAT '{other}'")),
            };
        }

        Ok(config)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<u64> {
    raw.parse::<u64>()
        .map_err(|err| anyhow!("invalid {key} '{raw}': {err}"))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("invalid {key} '{raw}': expected true/false")),
    }
}
