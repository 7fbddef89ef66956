//! Process configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

use chrono_tz::Tz;

use crate::heatmap::HeatmapConfig;
use crate::live_status::LiveStatusConfig;
use crate::programme::ProgrammeConfig;
use crate::tracker::TrackerConfig;
use crate::{Error, Result};

/// Twitch Helix credentials.
#[derive(Debug, Clone)]
pub struct TwitchCredentials {
    pub client_id: String,
    pub access_token: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_dir: String,
    /// Filter directive applied once logging is up. Takes precedence over
    /// `RUST_LOG`.
    pub log_filter: Option<String>,
    pub platform_timeout: Duration,
    /// Twitch is only queried when credentials are present.
    pub twitch: Option<TwitchCredentials>,
    pub tracker: TrackerConfig,
    pub live_status: LiveStatusConfig,
    pub heatmap: HeatmapConfig,
    pub programme: ProgrammeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:live-programme.db?mode=rwc".to_string(),
            log_dir: "logs".to_string(),
            log_filter: None,
            platform_timeout: Duration::from_secs(10),
            twitch: None,
            tracker: TrackerConfig::default(),
            live_status: LiveStatusConfig::default(),
            heatmap: HeatmapConfig::default(),
            programme: ProgrammeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// Supported env vars:
    /// - `DATABASE_URL`, `LOG_DIR`, `LOG_FILTER`
    /// - `TRACKER_INTERVAL_SECS`, `TRACKER_PAGE_SIZE`
    /// - `LIVE_STATUS_TTL_SECS`
    /// - `HEATMAP_LOOKBACK_DAYS` (0 = whole history)
    /// - `PROGRAMME_TOP_N`, `PROGRAMME_MIN_PROBABILITY`, `PROGRAMME_TIMEZONE`
    /// - `TWITCH_CLIENT_ID`, `TWITCH_ACCESS_TOKEN`, `PLATFORM_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to read variables. Unset and blank values keep
    /// their defaults; unparsable values are an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(dir) = get("LOG_DIR") {
            config.log_dir = dir;
        }
        config.log_filter = get("LOG_FILTER");

        if let Some(secs) = parse::<u64>("TRACKER_INTERVAL_SECS", get("TRACKER_INTERVAL_SECS"))? {
            if secs == 0 {
                return Err(Error::config("TRACKER_INTERVAL_SECS must be greater than 0"));
            }
            config.tracker.interval = Duration::from_secs(secs);
        }
        if let Some(size) = parse::<u32>("TRACKER_PAGE_SIZE", get("TRACKER_PAGE_SIZE"))? {
            config.tracker.page_size = size;
        }

        if let Some(secs) = parse::<u64>("LIVE_STATUS_TTL_SECS", get("LIVE_STATUS_TTL_SECS"))? {
            config.live_status.cache_ttl = Duration::from_secs(secs);
            config.live_status.fallback_ttl = config.live_status.fallback_ttl.min(config.live_status.cache_ttl);
        }

        if let Some(days) = parse::<u32>("HEATMAP_LOOKBACK_DAYS", get("HEATMAP_LOOKBACK_DAYS"))? {
            config.heatmap.lookback = (days > 0).then(|| chrono::Duration::days(days as i64));
        }

        if let Some(tz) = get("PROGRAMME_TIMEZONE") {
            config.heatmap.timezone = Tz::from_str(&tz)
                .map_err(|_| Error::config(format!("PROGRAMME_TIMEZONE: unknown timezone '{tz}'")))?;
        }
        if let Some(n) = parse::<u32>("PROGRAMME_TOP_N", get("PROGRAMME_TOP_N"))? {
            config.programme.top_n = n;
        }
        if let Some(p) = parse::<f64>("PROGRAMME_MIN_PROBABILITY", get("PROGRAMME_MIN_PROBABILITY"))? {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::config(format!(
                    "PROGRAMME_MIN_PROBABILITY must be between 0 and 1, got {p}"
                )));
            }
            config.programme.min_probability = p;
        }

        if let Some(secs) = parse::<u64>("PLATFORM_TIMEOUT_SECS", get("PLATFORM_TIMEOUT_SECS"))? {
            config.platform_timeout = Duration::from_secs(secs);
        }
        config.twitch = match (get("TWITCH_CLIENT_ID"), get("TWITCH_ACCESS_TOKEN")) {
            (Some(client_id), Some(access_token)) => Some(TwitchCredentials {
                client_id,
                access_token,
            }),
            _ => None,
        };

        Ok(config)
    }
}

fn parse<T>(key: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.parse::<T>()
                .map_err(|e| Error::config(format!("{key}: invalid value '{v}': {e}")))
        })
        .transpose()
}
