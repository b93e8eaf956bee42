use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, lenient_date, null_as_default};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "due_date_c", default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "total_points_c", default, deserialize_with = "null_as_default")]
    pub total_points: f64,
    #[serde(rename = "category_c", default, deserialize_with = "null_as_default")]
    pub category: AssignmentCategory,
    #[serde(rename = "class_id_c", default)]
    pub class_id: Option<RecordId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub enum AssignmentCategory {
    #[default]
    Homework,
    Quiz,
    Test,
    Exam,
    Project,
    Lab,
    Essay,
}

impl Assignment {
    pub const DUE_DATE: &'static str = "due_date_c";
    pub const CLASS_ID: &'static str = "class_id_c";
}

impl Record for Assignment {
    const TABLE: &'static str = "assignment_c";
    const FIELDS: &'static [&'static str] =
        &["Name", "due_date_c", "total_points_c", "category_c", "class_id_c"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}
