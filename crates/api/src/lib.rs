pub mod error;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let student_routes = Router::new()
        .route("/", get(routes::student::list))
        .route("/", post(routes::student::create))
        .route("/{student_id}", get(routes::student::get))
        .route("/{student_id}", put(routes::student::update))
        .route("/{student_id}", delete(routes::student::delete))
        .route("/{student_id}/class", put(routes::student::set_classes))
        .route("/{student_id}/summary", get(routes::student::summary));

    let class_routes = Router::new()
        .route("/", get(routes::class::list))
        .route("/", post(routes::class::create))
        .route("/overview", get(routes::class::overview))
        .route("/{class_id}", get(routes::class::get))
        .route("/{class_id}", put(routes::class::update))
        .route("/{class_id}", delete(routes::class::delete))
        .route("/{class_id}/student", get(routes::class::students))
        .route("/{class_id}/student", put(routes::class::set_students))
        .route("/{class_id}/assignment", get(routes::class::assignments))
        .route("/{class_id}/gradebook", get(routes::class::gradebook))
        .route("/{class_id}/attendance", put(routes::class::mark_attendance))
        .route("/{class_id}/reminder", post(routes::class::bulk_reminder));

    let assignment_routes = Router::new()
        .route("/", get(routes::assignment::list))
        .route("/", post(routes::assignment::create))
        .route("/due-soon", get(routes::assignment::due_soon))
        .route("/{assignment_id}", get(routes::assignment::get))
        .route("/{assignment_id}", put(routes::assignment::update))
        .route("/{assignment_id}", delete(routes::assignment::delete))
        .route("/{assignment_id}/reminder", post(routes::assignment::reminder));

    let grade_routes = Router::new()
        .route("/", get(routes::grade::list))
        .route("/", put(routes::grade::save))
        .route("/{grade_id}", delete(routes::grade::delete));

    let attendance_routes = Router::new()
        .route("/", get(routes::attendance::list))
        .route("/", put(routes::attendance::mark))
        .route("/{attendance_id}", delete(routes::attendance::delete));

    let notification_routes = Router::new()
        .route("/", get(routes::notification::list))
        .route("/", delete(routes::notification::delete_all))
        .route("/events", get(routes::notification::events))
        .route("/read-all", post(routes::notification::mark_all_read))
        .route("/{notification_id}/read", post(routes::notification::mark_read))
        .route("/{notification_id}", delete(routes::notification::delete));

    let api = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/dashboard", get(routes::dashboard::get))
        .nest("/student", student_routes)
        .nest("/class", class_routes)
        .nest("/assignment", assignment_routes)
        .nest("/grade", grade_routes)
        .nest("/attendance", attendance_routes)
        .nest("/notification", notification_routes);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// `*` or an empty list allows any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
