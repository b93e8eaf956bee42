use std::collections::BTreeSet;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::NaiveDate;
use classhub_db::models::{AttendanceStatus, Class, Notification, RecordId};
use classhub_services::dao::{AttendanceFilter, ClassInput};
use classhub_services::reports::{self, ClassOverview, Gradebook};
use serde::{Deserialize, Serialize};

use super::assignment::{self as assignment_routes, AssignmentResponse};
use super::attendance::{self as attendance_routes, AttendanceResponse};
use super::notification::{self as notification_routes, NotificationResponse};
use super::student::{self as student_routes, StudentResponse};
use super::{parse_id, today};
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct ClassResponse {
    pub id: RecordId,
    pub name: String,
    pub subject: String,
    pub period: String,
    pub room: String,
    pub student_ids: Vec<RecordId>,
}

fn to_response(c: Class, student_ids: Vec<RecordId>) -> ClassResponse {
    ClassResponse {
        id: c.id.unwrap_or_default(),
        name: c.name,
        subject: c.subject,
        period: c.period,
        room: c.room,
        student_ids,
    }
}

#[derive(Debug, Deserialize)]
pub struct SetStudentsRequest {
    pub student_ids: Vec<RecordId>,
}

#[derive(Debug, Deserialize)]
pub struct ClassAttendanceRequest {
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkReminderRequest {
    pub days_ahead: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BulkReminderResponse {
    pub created: usize,
    pub notifications: Vec<NotificationResponse>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let (classes, enrollments) =
        futures::try_join!(state.classes.list(), state.enrollments.all())?;

    let items = classes
        .into_iter()
        .map(|c| {
            let student_ids = enrollments
                .iter()
                .filter(|e| Some(e.class_id) == c.id)
                .map(|e| e.student_id)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            to_response(c, student_ids)
        })
        .collect();
    Ok(Json(items))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<ClassInput>,
) -> Result<Json<ClassResponse>, ApiError> {
    let class = state.classes.create(body).await?;
    Ok(Json(to_response(class, Vec::new())))
}

pub async fn get(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<ClassResponse>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    let (class, student_ids) = futures::try_join!(
        state.classes.get(id),
        state.enrollments.student_ids_for_class(id)
    )?;
    Ok(Json(to_response(class, student_ids)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(body): Json<ClassInput>,
) -> Result<Json<ClassResponse>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    let class = state.classes.update(id, body).await?;
    let student_ids = state.enrollments.student_ids_for_class(id).await?;
    Ok(Json(to_response(class, student_ids)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    state.classes.delete(id, &state.enrollments).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn overview(State(state): State<AppState>) -> Result<Json<ClassOverview>, ApiError> {
    let (classes, enrollments) =
        futures::try_join!(state.classes.list(), state.enrollments.all())?;
    Ok(Json(reports::class_overview(&classes, &enrollments)))
}

pub async fn students(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    state.classes.get(id).await?;

    let student_ids = state.enrollments.student_ids_for_class(id).await?;
    let (students, enrollments) = futures::try_join!(
        state.students.find_by_ids(&student_ids),
        state.enrollments.all()
    )?;
    Ok(Json(student_routes::to_responses(students, &enrollments)))
}

pub async fn set_students(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(body): Json<SetStudentsRequest>,
) -> Result<Json<ClassResponse>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    let class = state.classes.get(id).await?;

    let requested: BTreeSet<RecordId> = body.student_ids.iter().copied().collect();
    let known = state.students.find_by_ids(&body.student_ids).await?;
    if known.len() != requested.len() {
        return Err(ApiError::BadRequest("Unknown student id".to_string()));
    }

    let student_ids = state
        .enrollments
        .set_students_for_class(id, &body.student_ids)
        .await?;
    Ok(Json(to_response(class, student_ids)))
}

pub async fn assignments(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    state.classes.get(id).await?;

    let assignments = state.assignments.list_by_class(id).await?;
    Ok(Json(
        assignments.into_iter().map(assignment_routes::to_response).collect(),
    ))
}

pub async fn gradebook(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> Result<Json<Gradebook>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    let class = state.classes.get(id).await?;

    let filter = AttendanceFilter {
        class_id: Some(id),
        ..Default::default()
    };
    let (student_ids, assignments, attendance) = futures::try_join!(
        state.enrollments.student_ids_for_class(id),
        state.assignments.list_by_class(id),
        state.attendance.list(&filter)
    )?;

    let assignment_ids: Vec<RecordId> = assignments.iter().filter_map(|a| a.id).collect();
    let (students, grades) = futures::try_join!(
        state.students.find_by_ids(&student_ids),
        state.grades.list_for_assignments(&assignment_ids)
    )?;

    Ok(Json(reports::class_gradebook(
        &class,
        &students,
        &assignments,
        &grades,
        &attendance,
    )))
}

pub async fn mark_attendance(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Json(body): Json<ClassAttendanceRequest>,
) -> Result<Json<Vec<AttendanceResponse>>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    state.classes.get(id).await?;

    let records = state
        .attendance
        .mark_class(id, body.date, body.status, &state.enrollments, &state.students)
        .await?;
    Ok(Json(records.into_iter().map(attendance_routes::to_response).collect()))
}

pub async fn bulk_reminder(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    body: Option<Json<BulkReminderRequest>>,
) -> Result<Json<BulkReminderResponse>, ApiError> {
    let id = parse_id(&class_id, "class_id")?;
    state.classes.get(id).await?;

    let days_ahead = body
        .and_then(|Json(b)| b.days_ahead)
        .unwrap_or(state.settings.reminders.days_ahead);
    let created: Vec<Notification> = state.reminders.bulk_remind(id, days_ahead, today()).await?;

    Ok(Json(BulkReminderResponse {
        created: created.len(),
        notifications: created
            .into_iter()
            .map(notification_routes::to_response)
            .collect(),
    }))
}
