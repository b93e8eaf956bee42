pub mod assignment;
pub mod attendance;
pub mod class;
pub mod dashboard;
pub mod grade;
pub mod health;
pub mod notification;
pub mod student;

use chrono::{Local, NaiveDate};
use classhub_db::models::RecordId;

use crate::error::ApiError;

pub(crate) fn parse_id(raw: &str, name: &str) -> Result<RecordId, ApiError> {
    raw.parse::<RecordId>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid {}", name)))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}
