use std::sync::Arc;

use chrono::NaiveDate;
use classhub_db::models::{Grade, RecordId};
use classhub_db::store::{Filter, RecordStore};
use serde::Deserialize;
use validator::Validate;

use super::base::{BaseDao, DaoResult};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GradeInput {
    pub student_id: RecordId,
    pub assignment_id: RecordId,
    /// `None` clears the score without removing the row.
    #[validate(range(min = 0.0, message = "Score cannot be negative"))]
    pub score: Option<f64>,
}

pub struct GradeDao {
    pub base: BaseDao<Grade>,
}

impl GradeDao {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseDao::new(store),
        }
    }

    /// One grade per (student, assignment). Saving again overwrites the score
    /// and stamps `today` as the submission date.
    pub async fn save(&self, input: GradeInput, today: NaiveDate) -> DaoResult<Grade> {
        input.validate()?;
        self.base
            .upsert(
                vec![
                    Filter::eq(Grade::STUDENT_ID, input.student_id),
                    Filter::eq(Grade::ASSIGNMENT_ID, input.assignment_id),
                ],
                Grade {
                    id: None,
                    student_id: input.student_id,
                    assignment_id: input.assignment_id,
                    score: input.score,
                    submitted_date: Some(today),
                },
            )
            .await
    }

    pub async fn list(
        &self,
        student_id: Option<RecordId>,
        assignment_id: Option<RecordId>,
    ) -> DaoResult<Vec<Grade>> {
        let mut filters = Vec::new();
        if let Some(id) = student_id {
            filters.push(Filter::eq(Grade::STUDENT_ID, id));
        }
        if let Some(id) = assignment_id {
            filters.push(Filter::eq(Grade::ASSIGNMENT_ID, id));
        }
        self.base.find_many(filters).await
    }

    pub async fn list_for_assignments(&self, assignment_ids: &[RecordId]) -> DaoResult<Vec<Grade>> {
        if assignment_ids.is_empty() {
            return Ok(Vec::new());
        }
        self.base
            .find_many(vec![Filter::any_of(Grade::ASSIGNMENT_ID, assignment_ids.iter().copied())])
            .await
    }

    pub async fn delete(&self, id: RecordId) -> DaoResult<()> {
        self.base.delete_by_id(id).await
    }

    pub async fn remove_for_assignment(&self, assignment_id: RecordId) -> DaoResult<usize> {
        self.base
            .delete_where(vec![Filter::eq(Grade::ASSIGNMENT_ID, assignment_id)])
            .await
    }
}
