use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use classhub_db::models::{AttendanceRecord, AttendanceStatus, RecordId};
use classhub_services::dao::{AttendanceFilter, AttendanceInput, DaoError};
use serde::Serialize;

use super::parse_id;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub id: RecordId,
    pub student_id: RecordId,
    pub class_id: RecordId,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

pub(crate) fn to_response(r: AttendanceRecord) -> AttendanceResponse {
    AttendanceResponse {
        id: r.id.unwrap_or_default(),
        student_id: r.student_id,
        class_id: r.class_id,
        date: r.date,
        status: r.status,
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(filter): Query<AttendanceFilter>,
) -> Result<Json<Vec<AttendanceResponse>>, ApiError> {
    let records = state.attendance.list(&filter).await?;
    Ok(Json(records.into_iter().map(to_response).collect()))
}

pub async fn mark(
    State(state): State<AppState>,
    Json(body): Json<AttendanceInput>,
) -> Result<Json<AttendanceResponse>, ApiError> {
    let known = futures::try_join!(
        state.students.get(body.student_id),
        state.classes.get(body.class_id)
    );
    match known {
        Ok(_) => {}
        Err(DaoError::NotFound) => {
            return Err(ApiError::BadRequest("Unknown student or class".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let record = state.attendance.mark(body).await?;
    Ok(Json(to_response(record)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(attendance_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&attendance_id, "attendance_id")?;
    state.attendance.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
