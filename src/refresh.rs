//! Scheduled content refresh
//!
//! Spawns a background task that refreshes the content service at fixed
//! times of day (UTC), independent of request traffic.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::service::ContentService;

/// Configuration for scheduled refreshes
///
/// Defaults to midnight and noon UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshConfig {
    /// Times of day (UTC) at which a refresh fires
    pub times: Vec<NaiveTime>,
    /// Whether scheduled refresh is enabled
    pub enabled: bool,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            times: vec![NaiveTime::default(), midday()],
            enabled: true,
        }
    }
}

fn midday() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap_or_default()
}

/// Returns the first configured time strictly after `now`
///
/// Looks at today and tomorrow, so with any non-empty `times` the result is
/// at most a day away. Returns `None` for an empty schedule.
pub fn next_run_after(now: DateTime<Utc>, times: &[NaiveTime]) -> Option<DateTime<Utc>> {
    let today = now.date_naive();
    [today, today + ChronoDuration::days(1)]
        .into_iter()
        .flat_map(|date| times.iter().map(move |time| date.and_time(*time).and_utc()))
        .filter(|candidate| *candidate > now)
        .min()
}

/// Returns the run that follows `previous`, or the first after `now`
///
/// The sleep before a run is measured on the monotonic clock, so the wall
/// clock may still read just before `previous` when the task wakes. Starting
/// from whichever is later keeps one target from firing twice.
///
/// # Arguments
/// * `now` - Current wall-clock time
/// * `previous` - Target of the run that just fired, if any
/// * `times` - Configured times of day
pub fn next_scheduled_run(
    now: DateTime<Utc>,
    previous: Option<DateTime<Utc>>,
    times: &[NaiveTime],
) -> Option<DateTime<Utc>> {
    let from = previous.map_or(now, |previous| previous.max(now));
    next_run_after(from, times)
}

/// Handle for the background refresh task
pub struct RefreshHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl RefreshHandle {
    /// Spawns the scheduler task
    ///
    /// # Arguments
    /// * `service` - Service refreshed at each configured time
    /// * `config` - Schedule; `times` need not be sorted
    ///
    /// With `enabled == false` or no times configured, nothing is spawned and
    /// the handle is inert.
    pub fn spawn(service: Arc<ContentService>, config: RefreshConfig) -> Self {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        if config.enabled && !config.times.is_empty() {
            tokio::spawn(async move {
                info!(times = ?config.times, "Scheduled refresh started");
                let mut previous = None;
                loop {
                    let now = Utc::now();
                    let Some(next) = next_scheduled_run(now, previous, &config.times) else {
                        break;
                    };
                    let wait = (next - now).to_std().unwrap_or_default();
                    debug!(next = %next, "Waiting for next scheduled refresh");

                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {
                            previous = Some(next);
                            match service.refresh().await {
                                Ok(report) => info!(last_updated = ?report.last_updated, "Scheduled refresh completed"),
                                Err(e) => error!(error = %e, "Scheduled refresh failed"),
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            break;
                        }
                    }
                }
                info!("Scheduled refresh stopped");
            });
        }

        Self { shutdown_tx }
    }

    /// Stops the background task
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ContentCache;
    use crate::fetch::SourceAggregator;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_refresh_config_default() {
        let config = RefreshConfig::default();
        assert_eq!(config.times, vec![at(0, 0), at(12, 0)]);
        assert!(config.enabled);
    }

    #[test]
    fn test_next_run_morning_fires_at_noon() {
        let next = next_run_after(utc(2025, 6, 1, 8, 30), &RefreshConfig::default().times);
        assert_eq!(next, Some(utc(2025, 6, 1, 12, 0)));
    }

    #[test]
    fn test_next_run_afternoon_fires_at_midnight() {
        let next = next_run_after(utc(2025, 6, 1, 15, 0), &RefreshConfig::default().times);
        assert_eq!(next, Some(utc(2025, 6, 2, 0, 0)));
    }

    #[test]
    fn test_next_run_is_strictly_after_now() {
        let next = next_run_after(utc(2025, 6, 1, 12, 0), &RefreshConfig::default().times);
        assert_eq!(next, Some(utc(2025, 6, 2, 0, 0)));
    }

    #[test]
    fn test_next_run_crosses_year_end() {
        let next = next_run_after(utc(2024, 12, 31, 23, 59), &[at(6, 0)]);
        assert_eq!(next, Some(utc(2025, 1, 1, 6, 0)));
    }

    #[test]
    fn test_next_run_unordered_times() {
        let next = next_run_after(utc(2025, 6, 1, 1, 0), &[at(18, 0), at(3, 0)]);
        assert_eq!(next, Some(utc(2025, 6, 1, 3, 0)));
    }

    #[test]
    fn test_early_wake_does_not_repeat_target() {
        let noon = utc(2025, 6, 1, 12, 0);
        let slightly_early = noon - ChronoDuration::milliseconds(300);
        let times = RefreshConfig::default().times;

        assert_eq!(next_run_after(slightly_early, &times), Some(noon));
        assert_eq!(
            next_scheduled_run(slightly_early, Some(noon), &times),
            Some(utc(2025, 6, 2, 0, 0))
        );
    }

    #[test]
    fn test_late_wake_uses_current_time() {
        let times = RefreshConfig::default().times;
        // Woke long after the 00:00 target, e.g. after a suspend
        let next = next_scheduled_run(utc(2025, 6, 1, 13, 0), Some(utc(2025, 6, 1, 0, 0)), &times);
        assert_eq!(next, Some(utc(2025, 6, 2, 0, 0)));
        assert_eq!(
            next_scheduled_run(utc(2025, 6, 1, 8, 0), None, &times),
            Some(utc(2025, 6, 1, 12, 0))
        );
    }

    #[test]
    fn test_next_run_empty_schedule() {
        assert_eq!(next_run_after(utc(2025, 6, 1, 1, 0), &[]), None);
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_not_refresh() {
        let service = Arc::new(ContentService::new(
            Arc::new(ContentCache::new()),
            Arc::new(SourceAggregator::default()),
        ));
        let config = RefreshConfig {
            enabled: false,
            ..Default::default()
        };

        let handle = RefreshHandle::spawn(Arc::clone(&service), config);
        tokio::task::yield_now().await;

        assert!(service.cache().is_pristine());
        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_refreshes_when_time_arrives() {
        let service = Arc::new(ContentService::new(
            Arc::new(ContentCache::new()),
            Arc::new(SourceAggregator::default()),
        ));
        // Every minute of the day, so the next run is under a minute away
        let times = (0..24)
            .flat_map(|h| (0..60).map(move |m| at(h, m)))
            .collect();
        let config = RefreshConfig { times, enabled: true };

        let handle = RefreshHandle::spawn(Arc::clone(&service), config);
        tokio::time::sleep(std::time::Duration::from_secs(61)).await;

        assert!(!service.cache().is_pristine());
        handle.shutdown().await;
    }
}
