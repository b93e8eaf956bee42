use serde::{Deserialize, Serialize};

use super::{Record, RecordId};

/// Student membership in a class. Both directions of the relationship are
/// answered from this table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "student_id_c")]
    pub student_id: RecordId,
    #[serde(rename = "class_id_c")]
    pub class_id: RecordId,
}

impl Enrollment {
    pub const STUDENT_ID: &'static str = "student_id_c";
    pub const CLASS_ID: &'static str = "class_id_c";
}

impl Record for Enrollment {
    const TABLE: &'static str = "enrollment_c";
    const FIELDS: &'static [&'static str] = &["student_id_c", "class_id_c"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}
