pub mod dao;
pub mod metrics;
pub mod notifications;
pub mod reminders;
pub mod reports;

pub use dao::*;
pub use notifications::{NotificationService, NotificationStore};
pub use reminders::{ReminderScheduler, ReminderService};
