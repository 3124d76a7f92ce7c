// src/config.rs
// Channel/keyword lists come from a TOML file; knobs and credentials come
// from the environment (.env is loaded by main). Anything invalid aborts
// startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::state::DEFAULT_STATE_PATH;

pub const ENV_CONFIG_PATH: &str = "MONITOR_CONFIG_PATH";
const DEFAULT_CONFIG_PATH: &str = "config/monitor.toml";

/// Everything the monitor needs, resolved and validated up front.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channels: Vec<String>,
    pub keywords: Vec<String>,
    pub poll_interval: Duration,
    pub lookback_hours: u32,
    pub retry: RetryPolicy,
    /// Failed runs before a stuck message is skipped with an alert.
    /// 0 keeps retrying forever.
    pub skip_after_failures: u32,
    pub channel_pause: Duration,
    pub http_timeout: Duration,
    pub state_path: PathBuf,
    pub gateway: GatewaySettings,
    pub sheet: SheetSettings,
    pub alerts: AlertSettings,
}

/// Within-run retry of transient sink failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Exponential: initial, then doubled per attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub base_url: String,
    /// Opaque session token, handed to the adapter untouched.
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct SheetSettings {
    pub api_base: String,
    pub spreadsheet_id: String,
    /// Opaque bearer token.
    pub token: String,
    pub tab: String,
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    /// Absent means alerting is disabled.
    pub webhook_url: Option<String>,
    pub cooldown_secs: i64,
}

#[derive(Debug, Deserialize)]
struct FileLists {
    channels: Vec<String>,
    keywords: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let lists = read_lists(&path)?;

        let channels = clean_list(lists.channels);
        if channels.is_empty() {
            return Err(ConfigError::Invalid {
                name: "channels",
                reason: format!("no channels configured in {}", path.display()),
            });
        }
        let keywords = clean_list(lists.keywords);
        if keywords.is_empty() {
            return Err(ConfigError::Invalid {
                name: "keywords",
                reason: format!("no keywords configured in {}", path.display()),
            });
        }

        Ok(Self {
            channels,
            keywords,
            poll_interval: Duration::from_secs(env_parse("MONITOR_POLL_INTERVAL_SECS", 3600)?),
            lookback_hours: env_parse("MONITOR_LOOKBACK_HOURS", 24)?,
            retry: RetryPolicy {
                max_attempts: env_parse("MONITOR_MAX_RETRIES", 3)?,
                initial_delay: Duration::from_millis(env_parse("MONITOR_RETRY_DELAY_MS", 1000)?),
            },
            skip_after_failures: env_parse("MONITOR_SKIP_AFTER_FAILURES", 3)?,
            channel_pause: Duration::from_millis(env_parse("MONITOR_CHANNEL_PAUSE_MS", 500)?),
            http_timeout: Duration::from_secs(env_parse("MONITOR_HTTP_TIMEOUT_SECS", 30)?),
            state_path: std::env::var("MONITOR_STATE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH)),
            gateway: GatewaySettings {
                base_url: env_required("GATEWAY_BASE_URL")?,
                token: env_required("GATEWAY_TOKEN")?,
            },
            sheet: SheetSettings {
                api_base: std::env::var("SHEETS_API_BASE").unwrap_or_else(|_| {
                    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
                }),
                spreadsheet_id: env_required("SHEET_ID")?,
                token: env_required("SHEET_TOKEN")?,
                tab: std::env::var("SHEET_TAB").unwrap_or_else(|_| "Vacancies".to_string()),
            },
            alerts: AlertSettings {
                webhook_url: std::env::var("ALERT_WEBHOOK_URL").ok(),
                cooldown_secs: env_parse("ALERT_COOLDOWN_SECS", 10_800)?,
            },
        })
    }
}

fn read_lists(path: &Path) -> Result<FileLists, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Trim, drop empties, dedup. First occurrence wins so channels keep the
/// configured processing order.
fn clean_list(items: Vec<String>) -> Vec<String> {
    use std::collections::BTreeSet;
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for it in items {
        let t = it.trim();
        if !t.is_empty() && seen.insert(t.to_string()) {
            out.push(t.to_string());
        }
    }
    out
}

/// Absent env vars fall back to the default; present-but-garbage values
/// are a hard error rather than a silent default.
fn env_parse<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            reason: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

fn env_required(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}
