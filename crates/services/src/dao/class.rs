use std::sync::Arc;

use classhub_db::models::{Class, Record, RecordId};
use classhub_db::store::{Filter, Query, RecordStore};
use serde::Deserialize;
use validator::Validate;

use super::base::{BaseDao, DaoResult};
use super::enrollment::EnrollmentDao;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ClassInput {
    #[validate(length(min = 1, max = 100, message = "Class name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Subject is required"))]
    pub subject: String,
    #[validate(length(min = 1, max = 50, message = "Period is required"))]
    #[serde(default)]
    pub period: String,
    #[validate(length(min = 1, max = 50, message = "Room is required"))]
    #[serde(default)]
    pub room: String,
}

impl ClassInput {
    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.subject = self.subject.trim().to_string();
        self.period = self.period.trim().to_string();
        self.room = self.room.trim().to_string();
        self
    }

    fn into_record(self, id: Option<RecordId>) -> Class {
        Class {
            id,
            name: self.name,
            subject: self.subject,
            period: self.period,
            room: self.room,
        }
    }
}

pub struct ClassDao {
    pub base: BaseDao<Class>,
}

impl ClassDao {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseDao::new(store),
        }
    }

    pub async fn create(&self, input: ClassInput) -> DaoResult<Class> {
        let input = input.normalized();
        input.validate()?;
        self.base.insert_one(&input.into_record(None)).await
    }

    pub async fn update(&self, id: RecordId, input: ClassInput) -> DaoResult<Class> {
        let input = input.normalized();
        input.validate()?;
        self.base.find_by_id(id).await?;
        self.base.update_one(&input.into_record(Some(id))).await
    }

    pub async fn get(&self, id: RecordId) -> DaoResult<Class> {
        self.base.find_by_id(id).await
    }

    pub async fn list(&self) -> DaoResult<Vec<Class>> {
        self.base
            .find_query(Query::new(Class::FIELDS).order_by("Name", false))
            .await
    }

    pub async fn find_by_ids(&self, ids: &[RecordId]) -> DaoResult<Vec<Class>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(vec![Filter::any_of("Id", ids.iter().copied())])
            .await
    }

    /// Removes the class together with its student memberships.
    pub async fn delete(&self, id: RecordId, enrollments: &EnrollmentDao) -> DaoResult<()> {
        self.base.find_by_id(id).await?;
        enrollments.remove_class(id).await?;
        self.base.delete_by_id(id).await
    }
}
