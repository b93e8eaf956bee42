use std::sync::Arc;

use chrono::{Days, NaiveDate};
use classhub_db::models::{Assignment, NewNotification, Notification, NotificationType, Priority, RecordId};
use tracing::info;

use super::{ReminderError, ReminderResult};
use crate::dao::AssignmentDao;
use crate::notifications::NotificationSink;

pub const REMINDER_TITLE: &str = "Assignment Reminder Set";
pub const BULK_REMINDER_TITLE: &str = "Bulk Reminder Set";

pub fn reminder_message(assignment: &Assignment) -> String {
    match assignment.due_date {
        Some(due) => format!("Reminder set for \"{}\" due {}", assignment.name, due),
        None => format!("Reminder set for \"{}\" with no due date", assignment.name),
    }
}

/// Reminders requested by hand. These never check for earlier ones.
pub struct ReminderService {
    assignments: Arc<AssignmentDao>,
    sink: Arc<dyn NotificationSink>,
}

impl ReminderService {
    pub fn new(assignments: Arc<AssignmentDao>, sink: Arc<dyn NotificationSink>) -> Self {
        Self { assignments, sink }
    }

    fn reminder(assignment: &Assignment, title: &str) -> NewNotification {
        NewNotification {
            notification_type: NotificationType::AssignmentReminder,
            title: title.to_string(),
            message: reminder_message(assignment),
            assignment_id: assignment.id,
            priority: Priority::Medium,
        }
    }

    pub async fn remind(&self, assignment_id: RecordId) -> ReminderResult<Notification> {
        let assignment = self.assignments.get(assignment_id).await?;
        let notification = self
            .sink
            .emit(Self::reminder(&assignment, REMINDER_TITLE))
            .await?;
        Ok(notification)
    }

    /// One reminder per class assignment due in `[today, today + days_ahead]`.
    pub async fn bulk_remind(
        &self,
        class_id: RecordId,
        days_ahead: u32,
        today: NaiveDate,
    ) -> ReminderResult<Vec<Notification>> {
        let until = today
            .checked_add_days(Days::new(u64::from(days_ahead)))
            .ok_or(ReminderError::InvalidWindow(days_ahead))?;
        let due: Vec<Assignment> = self
            .assignments
            .list_by_class(class_id)
            .await?
            .into_iter()
            .filter(|a| a.due_date.is_some_and(|d| d >= today && d <= until))
            .collect();

        let mut created = Vec::with_capacity(due.len());
        for assignment in &due {
            created.push(
                self.sink
                    .emit(Self::reminder(assignment, BULK_REMINDER_TITLE))
                    .await?,
            );
        }

        info!(class_id, days_ahead, count = created.len(), "Bulk reminders created");
        Ok(created)
    }
}
