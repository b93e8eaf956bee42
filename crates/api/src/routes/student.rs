use std::collections::{BTreeMap, BTreeSet};

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use classhub_db::models::{Enrollment, RecordId, Student, StudentStatus};
use classhub_services::dao::{AttendanceFilter, StudentInput};
use classhub_services::reports::{self, StudentSummary};
use serde::{Deserialize, Serialize};

use super::parse_id;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct StudentResponse {
    pub id: RecordId,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub enrollment_date: Option<NaiveDate>,
    pub status: StudentStatus,
    pub class_ids: Vec<RecordId>,
}

pub(crate) fn to_response(s: Student, class_ids: Vec<RecordId>) -> StudentResponse {
    StudentResponse {
        id: s.id.unwrap_or_default(),
        name: s.name,
        first_name: s.first_name,
        last_name: s.last_name,
        email: s.email,
        date_of_birth: s.date_of_birth,
        enrollment_date: s.enrollment_date,
        status: s.status,
        class_ids,
    }
}

/// Attaches each student's classes from one enrollment scan.
pub(crate) fn to_responses(students: Vec<Student>, enrollments: &[Enrollment]) -> Vec<StudentResponse> {
    let mut by_student: BTreeMap<RecordId, BTreeSet<RecordId>> = BTreeMap::new();
    for e in enrollments {
        by_student.entry(e.student_id).or_default().insert(e.class_id);
    }

    students
        .into_iter()
        .map(|s| {
            let class_ids = s
                .id
                .and_then(|id| by_student.get(&id))
                .map(|ids| ids.iter().copied().collect())
                .unwrap_or_default();
            to_response(s, class_ids)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<StudentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SetClassesRequest {
    pub class_ids: Vec<RecordId>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let (students, enrollments) =
        futures::try_join!(state.students.list(params.status), state.enrollments.all())?;
    Ok(Json(to_responses(students, &enrollments)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<StudentInput>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = state.students.create(body).await?;
    Ok(Json(to_response(student, Vec::new())))
}

pub async fn get(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentResponse>, ApiError> {
    let id = parse_id(&student_id, "student_id")?;
    let (student, class_ids) = futures::try_join!(
        state.students.get(id),
        state.enrollments.class_ids_for_student(id)
    )?;
    Ok(Json(to_response(student, class_ids)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(body): Json<StudentInput>,
) -> Result<Json<StudentResponse>, ApiError> {
    let id = parse_id(&student_id, "student_id")?;
    let student = state.students.update(id, body).await?;
    let class_ids = state.enrollments.class_ids_for_student(id).await?;
    Ok(Json(to_response(student, class_ids)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&student_id, "student_id")?;
    state.students.delete(id, &state.enrollments).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn set_classes(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    Json(body): Json<SetClassesRequest>,
) -> Result<Json<StudentResponse>, ApiError> {
    let id = parse_id(&student_id, "student_id")?;
    let student = state.students.get(id).await?;

    let requested: BTreeSet<RecordId> = body.class_ids.iter().copied().collect();
    let known = state.classes.find_by_ids(&body.class_ids).await?;
    if known.len() != requested.len() {
        return Err(ApiError::BadRequest("Unknown class id".to_string()));
    }

    let class_ids = state
        .enrollments
        .set_classes_for_student(id, &body.class_ids)
        .await?;
    Ok(Json(to_response(student, class_ids)))
}

pub async fn summary(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<Json<StudentSummary>, ApiError> {
    let id = parse_id(&student_id, "student_id")?;
    state.students.get(id).await?;

    let filter = AttendanceFilter {
        student_id: Some(id),
        ..Default::default()
    };
    let (grades, assignments, attendance) = futures::try_join!(
        state.grades.list(Some(id), None),
        state.assignments.list(),
        state.attendance.list(&filter)
    )?;

    Ok(Json(reports::student_summary(id, &grades, &assignments, &attendance)))
}
