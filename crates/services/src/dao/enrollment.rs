use std::collections::BTreeSet;
use std::sync::Arc;

use classhub_db::models::{Enrollment, RecordId};
use classhub_db::store::{Filter, RecordStore};
use tracing::debug;

use super::base::{BaseDao, DaoResult};

pub struct EnrollmentDao {
    pub base: BaseDao<Enrollment>,
}

impl EnrollmentDao {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            base: BaseDao::new(store),
        }
    }

    /// Idempotent: enrolling twice leaves a single row.
    pub async fn enroll(&self, student_id: RecordId, class_id: RecordId) -> DaoResult<Enrollment> {
        self.base
            .upsert(
                vec![
                    Filter::eq(Enrollment::STUDENT_ID, student_id),
                    Filter::eq(Enrollment::CLASS_ID, class_id),
                ],
                Enrollment {
                    id: None,
                    student_id,
                    class_id,
                },
            )
            .await
    }

    pub async fn unenroll(&self, student_id: RecordId, class_id: RecordId) -> DaoResult<usize> {
        self.base
            .delete_where(vec![
                Filter::eq(Enrollment::STUDENT_ID, student_id),
                Filter::eq(Enrollment::CLASS_ID, class_id),
            ])
            .await
    }

    pub async fn all(&self) -> DaoResult<Vec<Enrollment>> {
        self.base.find_all().await
    }

    pub async fn class_ids_for_student(&self, student_id: RecordId) -> DaoResult<Vec<RecordId>> {
        let rows = self
            .base
            .find_many(vec![Filter::eq(Enrollment::STUDENT_ID, student_id)])
            .await?;
        Ok(distinct(rows.iter().map(|e| e.class_id)))
    }

    pub async fn student_ids_for_class(&self, class_id: RecordId) -> DaoResult<Vec<RecordId>> {
        let rows = self
            .base
            .find_many(vec![Filter::eq(Enrollment::CLASS_ID, class_id)])
            .await?;
        Ok(distinct(rows.iter().map(|e| e.student_id)))
    }

    /// Replaces the student's class list with `class_ids`.
    pub async fn set_classes_for_student(
        &self,
        student_id: RecordId,
        class_ids: &[RecordId],
    ) -> DaoResult<Vec<RecordId>> {
        let current = self.class_ids_for_student(student_id).await?;
        let target: BTreeSet<RecordId> = class_ids.iter().copied().collect();

        for class_id in current.iter().filter(|id| !target.contains(id)) {
            self.unenroll(student_id, *class_id).await?;
        }
        for class_id in target.iter().filter(|id| !current.contains(id)) {
            self.enroll(student_id, *class_id).await?;
        }

        debug!(student_id, classes = target.len(), "Student classes replaced");
        Ok(target.into_iter().collect())
    }

    /// Replaces the class roster with `student_ids`.
    pub async fn set_students_for_class(
        &self,
        class_id: RecordId,
        student_ids: &[RecordId],
    ) -> DaoResult<Vec<RecordId>> {
        let current = self.student_ids_for_class(class_id).await?;
        let target: BTreeSet<RecordId> = student_ids.iter().copied().collect();

        for student_id in current.iter().filter(|id| !target.contains(id)) {
            self.unenroll(*student_id, class_id).await?;
        }
        for student_id in target.iter().filter(|id| !current.contains(id)) {
            self.enroll(*student_id, class_id).await?;
        }

        debug!(class_id, students = target.len(), "Class roster replaced");
        Ok(target.into_iter().collect())
    }

    pub async fn remove_student(&self, student_id: RecordId) -> DaoResult<usize> {
        self.base
            .delete_where(vec![Filter::eq(Enrollment::STUDENT_ID, student_id)])
            .await
    }

    pub async fn remove_class(&self, class_id: RecordId) -> DaoResult<usize> {
        self.base
            .delete_where(vec![Filter::eq(Enrollment::CLASS_ID, class_id)])
            .await
    }
}

fn distinct(ids: impl Iterator<Item = RecordId>) -> Vec<RecordId> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}
