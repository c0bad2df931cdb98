//! Daily timesheet reminder.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{error, info};

use crate::config::ReminderConfig;
use crate::repository::Repository;

/// Next occurrence of `at` (local time in `now`'s zone) strictly after `now`.
/// A local time skipped by a DST jump runs an hour later.
pub fn next_run(now: DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    loop {
        let local = day.and_time(at);
        let candidate = tz
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| tz.from_local_datetime(&(local + Duration::hours(1))).earliest());
        if let Some(candidate) = candidate {
            if candidate > now {
                return candidate;
            }
        }
        day += Duration::days(1);
    }
}

/// Sleep until the configured time, queue reminders, repeat. Failures are logged
/// and the loop waits for the next day.
pub async fn run(repo: Arc<Repository>, config: ReminderConfig) {
    info!(at = %config.at, timezone = %config.timezone, "Timesheet reminder scheduled");
    loop {
        let now = Utc::now().with_timezone(&config.timezone);
        let next = next_run(now, config.at);
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        match repo.queue_timesheet_reminders().await {
            Ok(queued) => info!(queued, "Timesheet reminder run finished"),
            Err(e) => error!(error = %e, "Timesheet reminder run failed"),
        }
    }
}
