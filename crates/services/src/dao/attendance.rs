use std::sync::Arc;

use chrono::NaiveDate;
use classhub_db::models::{AttendanceRecord, AttendanceStatus, RecordId};
use classhub_db::store::{Filter, RecordStore};
use serde::Deserialize;
use tracing::debug;

use super::base::{BaseDao, DaoResult};
use super::enrollment::EnrollmentDao;
use super::student::StudentDao;

#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceInput {
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttendanceFilter {
    pub student_id: Option<RecordId>,
    pub class_id: Option<RecordId>,
    pub date: Option<NaiveDate>,
}

pub struct AttendanceDao {
    pub base: BaseDao<AttendanceRecord>,
}

impl AttendanceDao {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseDao::new(store),
        }
    }

    /// One record per student per day. Marking again replaces the class and
    /// status.
    pub async fn mark(&self, input: AttendanceInput) -> DaoResult<AttendanceRecord> {
        self.base
            .upsert(
                vec![
                    Filter::eq(AttendanceRecord::STUDENT_ID, input.student_id),
                    Filter::eq(AttendanceRecord::DATE, input.date.to_string()),
                ],
                AttendanceRecord {
                    id: None,
                    student_id: input.student_id,
                    class_id: input.class_id,
                    date: input.date,
                    status: input.status,
                },
            )
            .await
    }

    /// Marks every active student enrolled in the class with one status for
    /// `date`. Goes through the per-student daily key, so repeating it
    /// overwrites instead of adding rows.
    pub async fn mark_class(
        &self,
        class_id: RecordId,
        date: NaiveDate,
        status: AttendanceStatus,
        enrollments: &EnrollmentDao,
        students: &StudentDao,
    ) -> DaoResult<Vec<AttendanceRecord>> {
        let student_ids = enrollments.student_ids_for_class(class_id).await?;
        let mut active: Vec<RecordId> = students
            .find_by_ids(&student_ids)
            .await?
            .iter()
            .filter(|s| s.is_active())
            .filter_map(|s| s.id)
            .collect();
        active.sort_unstable();

        let mut marked = Vec::with_capacity(active.len());
        for student_id in active {
            marked.push(
                self.mark(AttendanceInput {
                    student_id,
                    class_id,
                    date,
                    status,
                })
                .await?,
            );
        }

        debug!(class_id, %date, ?status, count = marked.len(), "Marked class attendance");
        Ok(marked)
    }

    pub async fn list(&self, filter: &AttendanceFilter) -> DaoResult<Vec<AttendanceRecord>> {
        let mut filters = Vec::new();
        if let Some(id) = filter.student_id {
            filters.push(Filter::eq(AttendanceRecord::STUDENT_ID, id));
        }
        if let Some(id) = filter.class_id {
            filters.push(Filter::eq(AttendanceRecord::CLASS_ID, id));
        }
        if let Some(date) = filter.date {
            filters.push(Filter::eq(AttendanceRecord::DATE, date.to_string()));
        }
        self.base.find_many(filters).await
    }

    pub async fn delete(&self, id: RecordId) -> DaoResult<()> {
        self.base.delete_by_id(id).await
    }
}
