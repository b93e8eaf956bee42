use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use classhub_db::models::{Grade, RecordId};
use classhub_services::dao::{DaoError, GradeInput};
use serde::{Deserialize, Serialize};

use super::{parse_id, today};
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub id: RecordId,
    pub student_id: RecordId,
    pub assignment_id: RecordId,
    pub score: Option<f64>,
    pub submitted_date: Option<NaiveDate>,
}

fn to_response(g: Grade) -> GradeResponse {
    GradeResponse {
        id: g.id.unwrap_or_default(),
        student_id: g.student_id,
        assignment_id: g.assignment_id,
        score: g.score,
        submitted_date: g.submitted_date,
    }
}

#[derive(Debug, Deserialize)]
pub struct GradeQuery {
    pub student_id: Option<RecordId>,
    pub assignment_id: Option<RecordId>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<GradeQuery>,
) -> Result<Json<Vec<GradeResponse>>, ApiError> {
    let grades = state
        .grades
        .list(params.student_id, params.assignment_id)
        .await?;
    Ok(Json(grades.into_iter().map(to_response).collect()))
}

pub async fn save(
    State(state): State<AppState>,
    Json(body): Json<GradeInput>,
) -> Result<Json<GradeResponse>, ApiError> {
    let known = futures::try_join!(
        state.students.get(body.student_id),
        state.assignments.get(body.assignment_id)
    );
    match known {
        Ok(_) => {}
        Err(DaoError::NotFound) => {
            return Err(ApiError::BadRequest("Unknown student or assignment".to_string()));
        }
        Err(e) => return Err(e.into()),
    }

    let grade = state.grades.save(body, today()).await?;
    Ok(Json(to_response(grade)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(grade_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_id(&grade_id, "grade_id")?;
    state.grades.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
