use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, lenient_date, null_as_default};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "first_name_c", default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(rename = "last_name_c", default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(rename = "email_c", default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(rename = "date_of_birth_c", default, deserialize_with = "lenient_date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(rename = "enrollment_date_c", default, deserialize_with = "lenient_date")]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(rename = "status_c", default, deserialize_with = "null_as_default")]
    pub status: StudentStatus,
}

/// Enrollment state. Inactive students keep their records.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    #[default]
    Active,
    Inactive,
}

impl Student {
    pub const FIRST_NAME: &'static str = "first_name_c";
    pub const LAST_NAME: &'static str = "last_name_c";
    pub const EMAIL: &'static str = "email_c";
    pub const STATUS: &'static str = "status_c";

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

impl Record for Student {
    const TABLE: &'static str = "student_c";
    const FIELDS: &'static [&'static str] = &[
        "Name",
        "first_name_c",
        "last_name_c",
        "email_c",
        "date_of_birth_c",
        "enrollment_date_c",
        "status_c",
    ];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}
