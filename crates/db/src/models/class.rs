use serde::{Deserialize, Serialize};

use super::{Record, RecordId, null_as_default};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    #[serde(rename = "Id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(rename = "Name", default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "subject_c", default, deserialize_with = "null_as_default")]
    pub subject: String,
    #[serde(rename = "period_c", default, deserialize_with = "null_as_default")]
    pub period: String,
    #[serde(rename = "room_c", default, deserialize_with = "null_as_default")]
    pub room: String,
}

impl Record for Class {
    const TABLE: &'static str = "class_c";
    const FIELDS: &'static [&'static str] = &["Name", "subject_c", "period_c", "room_c"];

    fn id(&self) -> Option<RecordId> {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = Some(id);
    }
}
