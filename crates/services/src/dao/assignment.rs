use std::sync::Arc;

use chrono::NaiveDate;
use classhub_db::models::{Assignment, AssignmentCategory, Record, RecordId};
use classhub_db::store::{Filter, Query, RecordStore};
use serde::Deserialize;
use validator::Validate;

use super::base::{BaseDao, DaoResult};
use super::grade::GradeDao;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignmentInput {
    #[validate(length(min = 1, max = 200, message = "Assignment name is required"))]
    pub name: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[validate(range(exclusive_min = 0.0, message = "Total points must be greater than zero"))]
    pub total_points: f64,
    #[serde(default)]
    pub category: AssignmentCategory,
    pub class_id: RecordId,
}

impl AssignmentInput {
    fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }

    fn into_record(self, id: Option<RecordId>) -> Assignment {
        Assignment {
            id,
            name: self.name,
            due_date: self.due_date,
            total_points: self.total_points,
            category: self.category,
            class_id: Some(self.class_id),
        }
    }
}

pub struct AssignmentDao {
    pub base: BaseDao<Assignment>,
}

impl AssignmentDao {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseDao::new(store),
        }
    }

    pub async fn create(&self, input: AssignmentInput) -> DaoResult<Assignment> {
        let input = input.normalized();
        input.validate()?;
        self.base.insert_one(&input.into_record(None)).await
    }

    pub async fn update(&self, id: RecordId, input: AssignmentInput) -> DaoResult<Assignment> {
        let input = input.normalized();
        input.validate()?;
        self.base.find_by_id(id).await?;
        self.base.update_one(&input.into_record(Some(id))).await
    }

    pub async fn get(&self, id: RecordId) -> DaoResult<Assignment> {
        self.base.find_by_id(id).await
    }

    /// Sorted by due date.
    pub async fn list(&self) -> DaoResult<Vec<Assignment>> {
        self.base
            .find_query(Query::new(Assignment::FIELDS).order_by(Assignment::DUE_DATE, false))
            .await
    }

    pub async fn list_by_class(&self, class_id: RecordId) -> DaoResult<Vec<Assignment>> {
        self.base
            .find_query(
                Query::new(Assignment::FIELDS)
                    .filter(Filter::eq(Assignment::CLASS_ID, class_id))
                    .order_by(Assignment::DUE_DATE, false),
            )
            .await
    }

    /// Assignments whose due date falls in `[from, to]`, both inclusive.
    pub async fn due_between(&self, from: NaiveDate, to: NaiveDate) -> DaoResult<Vec<Assignment>> {
        self.base
            .find_query(
                Query::new(Assignment::FIELDS)
                    .filter(Filter::gte(Assignment::DUE_DATE, from.to_string()))
                    .filter(Filter::lte(Assignment::DUE_DATE, to.to_string()))
                    .order_by(Assignment::DUE_DATE, false),
            )
            .await
    }

    /// Removes the assignment and every grade recorded against it.
    pub async fn delete(&self, id: RecordId, grades: &GradeDao) -> DaoResult<()> {
        self.base.find_by_id(id).await?;
        grades.remove_for_assignment(id).await?;
        self.base.delete_by_id(id).await
    }
}
