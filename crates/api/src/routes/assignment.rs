use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Days, NaiveDate};
use classhub_db::models::{Assignment, AssignmentCategory, RecordId};
use classhub_services::dao::{AssignmentInput, DaoError};
use serde::{Deserialize, Serialize};

use super::notification::{self as notification_routes, NotificationResponse};
use super::{parse_id, today};
use crate::{error::ApiError, state::AppState};

const DEFAULT_DUE_SOON_DAYS: u32 = 3;

#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    pub id: RecordId,
    pub name: String,
    pub due_date: Option<NaiveDate>,
    pub total_points: f64,
    pub category: AssignmentCategory,
    pub class_id: Option<RecordId>,
}

pub(crate) fn to_response(a: Assignment) -> AssignmentResponse {
    AssignmentResponse {
        id: a.id.unwrap_or_default(),
        name: a.name,
        due_date: a.due_date,
        total_points: a.total_points,
        category: a.category,
        class_id: a.class_id,
    }
}

#[derive(Debug, Deserialize)]
pub struct DueSoonQuery {
    pub days: Option<u32>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments = state.assignments.list().await?;
    Ok(Json(assignments.into_iter().map(to_response).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<AssignmentInput>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    match state.classes.get(body.class_id).await {
        Ok(_) => {}
        Err(DaoError::NotFound) => return Err(ApiError::BadRequest("Unknown class id".to_string())),
        Err(e) => return Err(e.into()),
    }

    let assignment = state.assignments.create(body).await?;
    Ok(Json(to_response(assignment)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let id = parse_id(&assignment_id, "assignment_id")?;
    let assignment = state.assignments.get(id).await?;
    Ok(Json(to_response(assignment)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
    Json(body): Json<AssignmentInput>,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let id = parse_id(&assignment_id, "assignment_id")?;
    let assignment = state.assignments.update(id, body).await?;
    Ok(Json(to_response(assignment)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&assignment_id, "assignment_id")?;
    state.assignments.delete(id, &state.grades).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn due_soon(
    State(state): State<AppState>,
    Query(params): Query<DueSoonQuery>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let from = today();
    let days = params.days.unwrap_or(DEFAULT_DUE_SOON_DAYS);
    let until = from
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| ApiError::BadRequest("Invalid days".to_string()))?;
    let assignments = state.assignments.due_between(from, until).await?;
    Ok(Json(assignments.into_iter().map(to_response).collect()))
}

pub async fn reminder(
    State(state): State<AppState>,
    Path(assignment_id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let id = parse_id(&assignment_id, "assignment_id")?;
    let notification = state.reminders.remind(id).await?;
    Ok(Json(notification_routes::to_response(notification)))
}
