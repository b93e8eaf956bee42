use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};
use classhub_config::ReminderSettings;
use classhub_db::models::{NewNotification, Notification, NotificationType, Priority, RecordId};
use classhub_db::store::RecordStore;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::dao::AssignmentDao;
use crate::notifications::NotificationSink;

const MILLIS_PER_DAY: f64 = 86_400_000.0;
pub const DUE_SOON_TITLE: &str = "Assignment Due Soon";

/// Outcome of one scheduler pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub offline: bool,
    pub candidates: usize,
    pub created: usize,
    pub duplicates: usize,
    pub failures: usize,
}

/// Whole days from `now` until local midnight of `due`, rounded up. Zero for
/// an assignment due later today.
pub fn days_until_due(due: NaiveDate, now: DateTime<Local>) -> i64 {
    let midnight = due.and_time(NaiveTime::MIN);
    let due_at = match Local.from_local_datetime(&midnight) {
        LocalResult::Single(at) => at,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => Local.from_utc_datetime(&midnight),
    };
    let millis = (due_at - now).num_milliseconds() as f64;
    (millis / MILLIS_PER_DAY).ceil() as i64
}

pub fn due_message(name: &str, days: i64) -> String {
    match days {
        0 => format!("Assignment \"{name}\" is due today!"),
        1 => format!("Assignment \"{name}\" is due tomorrow!"),
        n => format!("Assignment \"{name}\" is due in {n} days."),
    }
}

pub fn due_priority(days: i64) -> Priority {
    if days <= 1 { Priority::High } else { Priority::Medium }
}

fn notified_on(existing: &[Notification], assignment_id: RecordId, today: NaiveDate) -> bool {
    existing.iter().any(|n| {
        n.notification_type == NotificationType::AssignmentDue
            && n.assignment_id == Some(assignment_id)
            && n.created_at.with_timezone(&Local).date_naive() == today
    })
}

/// Periodically raises one "due soon" notification per assignment per day.
pub struct ReminderScheduler {
    store: Arc<dyn RecordStore>,
    assignments: Arc<AssignmentDao>,
    sink: Arc<dyn NotificationSink>,
    settings: ReminderSettings,
}

impl ReminderScheduler {
    pub fn new(
        store: Arc<dyn RecordStore>,
        assignments: Arc<AssignmentDao>,
        sink: Arc<dyn NotificationSink>,
        settings: ReminderSettings,
    ) -> Self {
        Self {
            store,
            assignments,
            sink,
            settings,
        }
    }

    /// Runs ticks until the runtime shuts down. A tick always finishes
    /// before the next one starts.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                initial_delay_secs = self.settings.initial_delay_secs,
                interval_secs = self.settings.interval_secs,
                days_ahead = self.settings.days_ahead,
                "Reminder scheduler started"
            );
            tokio::time::sleep(Duration::from_secs(self.settings.initial_delay_secs)).await;

            let mut ticker =
                tokio::time::interval(Duration::from_secs(self.settings.interval_secs.max(1)));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let report = self.tick().await;
                if report.created > 0 || report.failures > 0 {
                    info!(?report, "Due assignment check finished");
                } else {
                    debug!(?report, "Due assignment check finished");
                }
            }
        })
    }

    pub async fn tick(&self) -> TickReport {
        self.tick_at(Local::now()).await
    }

    pub async fn tick_at(&self, now: DateTime<Local>) -> TickReport {
        let mut report = TickReport::default();

        if let Err(e) = self.store.ping().await {
            warn!(error = %e, "Record store unreachable, skipping due assignment check");
            report.offline = true;
            return report;
        }

        let today = now.date_naive();
        let Some(until) = today.checked_add_days(Days::new(u64::from(self.settings.days_ahead)))
        else {
            error!(days_ahead = self.settings.days_ahead, "Reminder window out of range");
            return report;
        };
        let candidates = match self.assignments.due_between(today, until).await {
            Ok(candidates) => candidates,
            Err(e) if e.is_unavailable() => {
                warn!(error = %e, "Record store unreachable, skipping due assignment check");
                report.offline = true;
                return report;
            }
            Err(e) => {
                error!(error = %e, "Failed to load due assignments");
                return report;
            }
        };

        let mut existing = match self.sink.list().await {
            Ok(existing) => existing,
            Err(e) => {
                error!(error = %e, "Failed to read notifications");
                return report;
            }
        };

        report.candidates = candidates.len();
        for assignment in &candidates {
            let (Some(id), Some(due)) = (assignment.id, assignment.due_date) else {
                continue;
            };
            if notified_on(&existing, id, today) {
                report.duplicates += 1;
                continue;
            }

            let days = days_until_due(due, now);
            if days < 0 {
                continue;
            }

            let data = NewNotification {
                notification_type: NotificationType::AssignmentDue,
                title: DUE_SOON_TITLE.to_string(),
                message: due_message(&assignment.name, days),
                assignment_id: Some(id),
                priority: due_priority(days),
            };
            match self.sink.emit(data).await {
                Ok(notification) => {
                    report.created += 1;
                    existing.push(notification);
                }
                Err(e) => {
                    report.failures += 1;
                    error!(assignment_id = id, error = %e, "Failed to create due notification");
                }
            }
        }

        report
    }
}
