use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "student_id_c")]
    pub student_id: RecordId,
    #[serde(rename = "class_id_c")]
    pub class_id: RecordId,
    #[serde(rename = "date_c")]
    pub date: NaiveDate,
    #[serde(rename = "status_c")]
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    /// Present and late both count as attended.
    pub fn counts_as_attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

impl AttendanceRecord {
    pub const STUDENT_ID: &'static str = "student_id_c";
    pub const CLASS_ID: &'static str = "class_id_c";
    pub const DATE: &'static str = "date_c";
}

impl Record for AttendanceRecord {
    const TABLE: &'static str = "attendance_c";
    const FIELDS: &'static [&'static str] = &["student_id_c", "class_id_c", "date_c", "status_c"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}
