//! Logging setup: reloadable filter, console and daily-rolling file output
//! with local timestamps, and retention cleanup of old log files.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate, Utc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::Writer, time::FormatTime},
    layer::SubscriberExt,
    reload::{self, Handle},
    util::SubscriberInitExt,
};

/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "live_programme=info,sqlx=warn";

/// Rolling log file name prefix; files are `<prefix>.YYYY-MM-DD`.
const LOG_FILE_PREFIX: &str = "live-programme.log";

/// Log retention period in days.
const LOG_RETENTION_DAYS: i64 = 7;

/// Timestamps in the server's local timezone.
#[derive(Debug, Clone, Copy)]
struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z"))
    }
}

pub type FilterHandle = Handle<EnvFilter, tracing_subscriber::Registry>;

/// Handle on the running subscriber.
pub struct LoggingConfig {
    handle: FilterHandle,
    log_dir: PathBuf,
}

impl LoggingConfig {
    /// Current filter directive.
    pub fn get_filter(&self) -> String {
        self.handle
            .with_current(|filter| filter.to_string())
            .unwrap_or_default()
    }

    /// Replace the filter directive, e.g. `live_programme=debug,sqlx=warn`.
    pub fn set_filter(&self, directive: &str) -> crate::Result<()> {
        let new_filter = EnvFilter::try_new(directive)
            .map_err(|e| crate::Error::config(format!("Invalid filter directive: {}", e)))?;

        self.handle
            .reload(new_filter)
            .map_err(|e| crate::Error::Other(format!("Failed to reload filter: {}", e)))?;

        info!(directive = %directive, "Log filter updated");
        Ok(())
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Delete log files older than the retention period, once a day, until
    /// `cancel_token` fires.
    pub fn start_retention_cleanup(
        self: &Arc<Self>,
        cancel_token: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let log_dir = self.log_dir.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(24 * 60 * 60));

            loop {
                tokio::select! {
                    biased;

                    _ = cancel_token.cancelled() => {
                        debug!("Log retention cleanup task shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let today = Utc::now().date_naive();
                        if let Err(e) = cleanup_old_logs(&log_dir, today, LOG_RETENTION_DAYS).await {
                            warn!(error = %e, "Failed to cleanup old logs");
                        }
                    }
                }
            }
        })
    }
}

/// Date encoded in a rolling log file name, if it is one of ours.
fn log_file_date(file_name: &str) -> Option<NaiveDate> {
    let date = file_name.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Delete our log files dated more than `retention_days` before `today`.
/// Returns the number of files removed.
async fn cleanup_old_logs(
    log_dir: &Path,
    today: NaiveDate,
    retention_days: i64,
) -> std::io::Result<usize> {
    let cutoff = today - chrono::Duration::days(retention_days);
    let mut entries = tokio::fs::read_dir(log_dir).await?;
    let mut deleted = 0;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let Some(file_date) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(log_file_date)
        else {
            continue;
        };

        if file_date < cutoff {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    deleted += 1;
                    debug!(path = %path.display(), "Deleted old log file");
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to delete old log file"),
            }
        }
    }

    if deleted > 0 {
        info!(count = deleted, "Cleaned up old log files");
    }

    Ok(deleted)
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_LOG_FILTER`]. Keep the returned guard
/// alive for the lifetime of the process or buffered file output is lost.
pub fn init_logging(log_dir: &str) -> crate::Result<(Arc<LoggingConfig>, WorkerGuard)> {
    let log_path = PathBuf::from(log_dir);
    std::fs::create_dir_all(&log_path)?;

    let file_appender = tracing_appender::rolling::daily(&log_path, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let initial_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let (filter_layer, filter_handle) = reload::Layer::new(initial_filter);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_ansi(true).with_timer(LocalTimer))
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_timer(LocalTimer),
        )
        .try_init()
        .map_err(|e| {
            crate::Error::Other(format!("Failed to set global default subscriber: {}", e))
        })?;

    let config = Arc::new(LoggingConfig {
        handle: filter_handle,
        log_dir: log_path,
    });

    Ok((config, guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
        assert!(DEFAULT_LOG_FILTER.contains("live_programme=info"));
    }

    #[test]
    fn test_set_filter_reloads_directive() {
        let (layer, handle): (_, FilterHandle) =
            reload::Layer::new(EnvFilter::new(DEFAULT_LOG_FILTER));
        // The handle only reloads while the layer is alive.
        let _subscriber = tracing_subscriber::registry().with(layer);
        let config = LoggingConfig {
            handle,
            log_dir: PathBuf::from("logs"),
        };

        assert!(config.get_filter().contains("live_programme=info"));

        config.set_filter("live_programme=debug").unwrap();
        let filter = config.get_filter();
        assert!(filter.contains("live_programme=debug"));
        assert!(!filter.contains("sqlx"));

        assert!(config.set_filter("live_programme=notalevel").is_err());
        assert!(config.get_filter().contains("live_programme=debug"));
    }

    #[test]
    fn test_log_file_date() {
        assert_eq!(
            log_file_date("live-programme.log.2024-03-04"),
            NaiveDate::from_ymd_opt(2024, 3, 4)
        );
        assert_eq!(log_file_date("live-programme.log"), None);
        assert_eq!(log_file_date("live-programme.log.latest"), None);
        assert_eq!(log_file_date("other.log.2024-03-04"), None);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_logs() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "live-programme.log.2024-02-01",
            "live-programme.log.2024-03-01",
            "live-programme.log.2024-03-09",
            "notes.txt",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let deleted = cleanup_old_logs(dir.path(), today, 7).await.unwrap();

        assert_eq!(deleted, 2);
        assert!(dir.path().join("live-programme.log.2024-03-09").exists());
        assert!(dir.path().join("notes.txt").exists());
        assert!(!dir.path().join("live-programme.log.2024-02-01").exists());
    }
}
