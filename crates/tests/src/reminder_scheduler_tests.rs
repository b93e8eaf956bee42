use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use classhub_config::ReminderSettings;
use classhub_db::models::{
    AssignmentCategory, NewNotification, Notification, NotificationType, Priority, RecordId,
};
use classhub_db::store::MemoryRecordStore;
use classhub_services::dao::{AssignmentDao, AssignmentInput};
use classhub_services::notifications::{
    MemoryBlobStorage, NotificationError, NotificationResult, NotificationService,
    NotificationSink, NotificationStore,
};
use classhub_services::reminders::ReminderError;
use classhub_services::reminders::scheduler::{days_until_due, due_message, due_priority};
use classhub_services::{ReminderScheduler, ReminderService};

fn noon(date: NaiveDate) -> DateTime<Local> {
    Local
        .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
        .earliest()
        .unwrap()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

struct Fixture {
    store: Arc<MemoryRecordStore>,
    assignments: Arc<AssignmentDao>,
    notifications: Arc<NotificationService>,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_blob(MemoryBlobStorage::new()).await
    }

    async fn with_blob(blob: MemoryBlobStorage) -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        let assignments = Arc::new(AssignmentDao::new(store.clone()));
        let notification_store = NotificationStore::open(Arc::new(blob)).await;
        let notifications = Arc::new(NotificationService::new(Arc::new(notification_store)));
        Self {
            store,
            assignments,
            notifications,
        }
    }

    fn scheduler(&self, sink: Arc<dyn NotificationSink>) -> ReminderScheduler {
        self.scheduler_with(sink, ReminderSettings::default())
    }

    fn scheduler_with(
        &self,
        sink: Arc<dyn NotificationSink>,
        settings: ReminderSettings,
    ) -> ReminderScheduler {
        ReminderScheduler::new(self.store.clone(), self.assignments.clone(), sink, settings)
    }

    fn default_scheduler(&self) -> ReminderScheduler {
        self.scheduler(self.notifications.clone())
    }

    async fn assignment(&self, name: &str, due: Option<NaiveDate>) -> RecordId {
        self.assignments
            .create(AssignmentInput {
                name: name.to_string(),
                due_date: due,
                total_points: 100.0,
                category: AssignmentCategory::Homework,
                class_id: 1,
            })
            .await
            .unwrap()
            .id
            .unwrap()
    }
}

/// Fails every emit for one assignment and delegates the rest.
struct FlakySink {
    inner: Arc<NotificationService>,
    fail_for: RecordId,
}

#[async_trait]
impl NotificationSink for FlakySink {
    async fn list(&self) -> NotificationResult<Vec<Notification>> {
        self.inner.list().await
    }

    async fn emit(&self, data: NewNotification) -> NotificationResult<Notification> {
        if data.assignment_id == Some(self.fail_for) {
            return Err(NotificationError::Storage(io::Error::other("disk full")));
        }
        self.inner.emit(data).await
    }
}

#[test]
fn days_until_due_rounds_up_from_local_midnight() {
    let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
    let now = noon(day);

    assert_eq!(days_until_due(day, now), 0);
    assert_eq!(days_until_due(day + Days::new(1), now), 1);
    assert_eq!(days_until_due(day + Days::new(3), now), 3);
    assert_eq!(days_until_due(day - Days::new(1), now), -1);
}

#[test]
fn due_messages_and_priorities() {
    assert_eq!(due_message("Essay", 0), "Assignment \"Essay\" is due today!");
    assert_eq!(due_message("Essay", 1), "Assignment \"Essay\" is due tomorrow!");
    assert_eq!(due_message("Essay", 3), "Assignment \"Essay\" is due in 3 days.");

    assert_eq!(due_priority(0), Priority::High);
    assert_eq!(due_priority(1), Priority::High);
    assert_eq!(due_priority(2), Priority::Medium);
}

#[tokio::test]
async fn tick_creates_one_notification_per_due_assignment() {
    let fx = Fixture::new().await;
    let today = today();
    let essay = fx.assignment("Essay", Some(today + Days::new(1))).await;
    let lab = fx.assignment("Lab", Some(today + Days::new(3))).await;
    fx.assignment("Project", Some(today + Days::new(10))).await;
    fx.assignment("Reading", None).await;

    let report = fx.default_scheduler().tick_at(noon(today)).await;

    assert!(!report.offline);
    assert_eq!(report.candidates, 2);
    assert_eq!(report.created, 2);
    assert_eq!(report.failures, 0);

    let all = fx.notifications.all().await;
    let essay_note = all.iter().find(|n| n.assignment_id == Some(essay)).unwrap();
    assert_eq!(essay_note.notification_type, NotificationType::AssignmentDue);
    assert_eq!(essay_note.title, "Assignment Due Soon");
    assert_eq!(essay_note.message, "Assignment \"Essay\" is due tomorrow!");
    assert_eq!(essay_note.priority, Priority::High);

    let lab_note = all.iter().find(|n| n.assignment_id == Some(lab)).unwrap();
    assert_eq!(lab_note.message, "Assignment \"Lab\" is due in 3 days.");
    assert_eq!(lab_note.priority, Priority::Medium);
}

#[tokio::test]
async fn second_tick_on_same_day_is_deduplicated() {
    let fx = Fixture::new().await;
    let today = today();
    fx.assignment("Essay", Some(today)).await;
    let scheduler = fx.default_scheduler();

    let first = scheduler.tick_at(noon(today)).await;
    let second = scheduler.tick_at(noon(today)).await;

    assert_eq!(first.created, 1);
    assert_eq!(second.created, 0);
    assert_eq!(second.duplicates, 1);
    assert_eq!(fx.notifications.all().await.len(), 1);
}

#[tokio::test]
async fn due_notification_from_yesterday_does_not_suppress_today() {
    let today = today();
    let yesterday = today - Days::new(1);
    let seeded = vec![Notification {
        id: 1,
        notification_type: NotificationType::AssignmentDue,
        title: "Assignment Due Soon".to_string(),
        message: "Assignment \"Essay\" is due in 3 days.".to_string(),
        assignment_id: Some(1),
        priority: Priority::Medium,
        read: false,
        created_at: noon(yesterday).with_timezone(&Utc),
    }];
    let blob = MemoryBlobStorage::with_contents(serde_json::to_string(&seeded).unwrap());

    let fx = Fixture::with_blob(blob).await;
    let essay = fx.assignment("Essay", Some(today + Days::new(2))).await;
    assert_eq!(essay, 1);

    let report = fx.default_scheduler().tick_at(noon(today)).await;
    assert_eq!(report.candidates, 1);
    assert_eq!(report.created, 1);
    assert_eq!(report.duplicates, 0);

    let due: Vec<Notification> = fx
        .notifications
        .all()
        .await
        .into_iter()
        .filter(|n| n.assignment_id == Some(essay))
        .collect();
    assert_eq!(due.len(), 2);

    // The new one now suppresses further ticks today.
    let again = fx.default_scheduler().tick_at(noon(today)).await;
    assert_eq!(again.created, 0);
    assert_eq!(again.duplicates, 1);
}

#[tokio::test]
async fn out_of_range_window_ends_the_tick_quietly() {
    let fx = Fixture::new().await;
    let today = today();
    fx.assignment("Essay", Some(today)).await;

    let settings = ReminderSettings {
        days_ahead: u32::MAX,
        ..ReminderSettings::default()
    };
    let scheduler = fx.scheduler_with(fx.notifications.clone(), settings);
    let report = scheduler.tick_at(noon(today)).await;

    assert!(!report.offline);
    assert_eq!(report.candidates, 0);
    assert_eq!(report.created, 0);
    assert!(fx.notifications.all().await.is_empty());
}

#[tokio::test]
async fn bulk_reminder_rejects_out_of_range_window() {
    let fx = Fixture::new().await;
    fx.assignment("Essay", Some(today())).await;

    let reminders = ReminderService::new(fx.assignments.clone(), fx.notifications.clone());
    let result = reminders.bulk_remind(1, u32::MAX, today()).await;

    assert!(matches!(result, Err(ReminderError::InvalidWindow(u32::MAX))));
    assert!(fx.notifications.all().await.is_empty());
}

#[tokio::test]
async fn existing_reminder_does_not_suppress_due_notification() {
    let fx = Fixture::new().await;
    let today = today();
    let essay = fx.assignment("Essay", Some(today + Days::new(2))).await;

    let reminders = ReminderService::new(fx.assignments.clone(), fx.notifications.clone());
    reminders.remind(essay).await.unwrap();

    let report = fx.default_scheduler().tick_at(noon(today)).await;
    assert_eq!(report.created, 1);
    assert_eq!(report.duplicates, 0);
}

#[tokio::test]
async fn unreachable_store_skips_the_tick() {
    let fx = Fixture::new().await;
    let today = today();
    fx.assignment("Essay", Some(today)).await;
    fx.store.set_available(false);

    let scheduler = fx.default_scheduler();
    let report = scheduler.tick_at(noon(today)).await;

    assert!(report.offline);
    assert_eq!(report.created, 0);
    assert!(fx.notifications.all().await.is_empty());

    fx.store.set_available(true);
    let report = scheduler.tick_at(noon(today)).await;
    assert!(!report.offline);
    assert_eq!(report.created, 1);
}

#[tokio::test]
async fn failing_emit_does_not_stop_other_candidates() {
    let fx = Fixture::new().await;
    let today = today();
    let first = fx.assignment("Essay", Some(today)).await;
    let second = fx.assignment("Lab", Some(today + Days::new(1))).await;

    let sink = Arc::new(FlakySink {
        inner: fx.notifications.clone(),
        fail_for: first,
    });
    let report = fx.scheduler(sink).tick_at(noon(today)).await;

    assert_eq!(report.candidates, 2);
    assert_eq!(report.failures, 1);
    assert_eq!(report.created, 1);

    let all = fx.notifications.all().await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].assignment_id, Some(second));
}

#[tokio::test]
async fn bulk_reminders_are_not_deduplicated() {
    let fx = Fixture::new().await;
    let today = today();
    fx.assignment("Essay", Some(today)).await;
    fx.assignment("Lab", Some(today + Days::new(2))).await;
    fx.assignment("Project", Some(today + Days::new(9))).await;

    let reminders = ReminderService::new(fx.assignments.clone(), fx.notifications.clone());
    let first = reminders.bulk_remind(1, 3, today).await.unwrap();
    let second = reminders.bulk_remind(1, 3, today).await.unwrap();

    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
    assert_eq!(fx.notifications.all().await.len(), 4);
    assert!(first.iter().all(|n| {
        n.notification_type == NotificationType::AssignmentReminder
            && n.title == "Bulk Reminder Set"
            && n.priority == Priority::Medium
    }));
}

#[tokio::test]
async fn single_reminder_mentions_due_date() {
    let fx = Fixture::new().await;
    let due = NaiveDate::from_ymd_opt(2030, 5, 17).unwrap();
    let id = fx.assignment("Essay", Some(due)).await;

    let reminders = ReminderService::new(fx.assignments.clone(), fx.notifications.clone());
    let created = reminders.remind(id).await.unwrap();

    assert_eq!(created.title, "Assignment Reminder Set");
    assert_eq!(created.message, "Reminder set for \"Essay\" due 2030-05-17");
    assert_eq!(created.assignment_id, Some(id));
}
