use std::sync::Arc;

use chrono::NaiveDate;
use classhub_db::models::{Record, RecordId, Student, StudentStatus};
use classhub_db::store::{Filter, Query, RecordStore};
use serde::Deserialize;
use validator::Validate;

use super::base::{BaseDao, DaoResult};
use super::enrollment::EnrollmentDao;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StudentInput {
    #[validate(length(min = 1, max = 100, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(required(message = "Date of birth is required"))]
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[validate(required(message = "Enrollment date is required"))]
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: StudentStatus,
}

impl StudentInput {
    fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self
    }

    fn into_record(self, id: Option<RecordId>) -> Student {
        Student {
            id,
            name: format!("{} {}", self.first_name, self.last_name),
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            date_of_birth: self.date_of_birth,
            enrollment_date: self.enrollment_date,
            status: self.status,
        }
    }
}

pub struct StudentDao {
    pub base: BaseDao<Student>,
}

impl StudentDao {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseDao::new(store),
        }
    }

    pub async fn create(&self, input: StudentInput) -> DaoResult<Student> {
        let input = input.normalized();
        input.validate()?;
        self.base.insert_one(&input.into_record(None)).await
    }

    pub async fn update(&self, id: RecordId, input: StudentInput) -> DaoResult<Student> {
        let input = input.normalized();
        input.validate()?;
        self.base.find_by_id(id).await?;
        self.base.update_one(&input.into_record(Some(id))).await
    }

    pub async fn get(&self, id: RecordId) -> DaoResult<Student> {
        self.base.find_by_id(id).await
    }

    /// Sorted by last name.
    pub async fn list(&self, status: Option<StudentStatus>) -> DaoResult<Vec<Student>> {
        let mut query = Query::new(Student::FIELDS).order_by(Student::LAST_NAME, false);
        if let Some(status) = status {
            query = query.filter(Filter::eq(Student::STATUS, serde_json::to_value(status)?));
        }
        self.base.find_query(query).await
    }

    pub async fn find_by_ids(&self, ids: &[RecordId]) -> DaoResult<Vec<Student>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(vec![Filter::any_of("Id", ids.iter().copied())])
            .await
    }

    /// Removes the student together with their class memberships.
    pub async fn delete(&self, id: RecordId, enrollments: &EnrollmentDao) -> DaoResult<()> {
        self.base.find_by_id(id).await?;
        enrollments.remove_student(id).await?;
        self.base.delete_by_id(id).await
    }
}
