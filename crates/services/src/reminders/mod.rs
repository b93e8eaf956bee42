pub mod manual;
pub mod scheduler;

pub use manual::ReminderService;
pub use scheduler::{ReminderScheduler, TickReport};

use thiserror::Error;

use crate::dao::DaoError;
use crate::notifications::NotificationError;

#[derive(Debug, Error)]
pub enum ReminderError {
    #[error(transparent)]
    Dao(#[from] DaoError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
    #[error("Reminder window of {0} days is out of range")]
    InvalidWindow(u32),
}

pub type ReminderResult<T> = Result<T, ReminderError>;
