use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Record, RecordId, lenient_date};

/// Score of one student on one assignment. `score: None` means not graded
/// yet, which is not the same as a zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "student_id_c")]
    pub student_id: RecordId,
    #[serde(rename = "assignment_id_c")]
    pub assignment_id: RecordId,
    #[serde(rename = "score_c", default)]
    pub score: Option<f64>,
    #[serde(rename = "submitted_date_c", default, deserialize_with = "lenient_date")]
    pub submitted_date: Option<NaiveDate>,
}

impl Grade {
    pub const STUDENT_ID: &'static str = "student_id_c";
    pub const ASSIGNMENT_ID: &'static str = "assignment_id_c";
}

impl Record for Grade {
    const TABLE: &'static str = "grade_c";
    const FIELDS: &'static [&'static str] =
        &["student_id_c", "assignment_id_c", "score_c", "submitted_date_c"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}
