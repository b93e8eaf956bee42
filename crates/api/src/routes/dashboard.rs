use axum::{Json, extract::State};
use classhub_services::dao::AttendanceFilter;
use classhub_services::reports::{self, ClassOverview, DashboardStats};
use serde::Serialize;

use super::today;
use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
    pub overview: ClassOverview,
}

pub async fn get(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let all_attendance = AttendanceFilter::default();
    let (students, classes, assignments, grades, attendance, enrollments) = futures::try_join!(
        state.students.list(None),
        state.classes.list(),
        state.assignments.list(),
        state.grades.list(None, None),
        state.attendance.list(&all_attendance),
        state.enrollments.all()
    )?;

    Ok(Json(DashboardResponse {
        stats: reports::dashboard_stats(
            &students,
            &classes,
            &grades,
            &assignments,
            &attendance,
            today(),
        ),
        overview: reports::class_overview(&classes, &enrollments),
    }))
}
