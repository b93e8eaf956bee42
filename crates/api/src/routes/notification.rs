use std::convert::Infallible;
use std::time::Duration;

use axum::{
    Json,
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use classhub_db::models::{Notification, NotificationType, Priority, RecordId};
use classhub_services::notifications::ToastChannel;
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: u64,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub assignment_id: Option<RecordId>,
    pub priority: Priority,
    pub read: bool,
    pub created_at: String,
}

pub(crate) fn to_response(n: Notification) -> NotificationResponse {
    NotificationResponse {
        id: n.id,
        notification_type: n.notification_type,
        title: n.title,
        message: n.message,
        assignment_id: n.assignment_id,
        priority: n.priority,
        read: n.read,
        created_at: n.created_at.to_rfc3339(),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub unread: bool,
}

#[derive(Debug, Serialize)]
pub struct NotificationList {
    pub items: Vec<NotificationResponse>,
    pub unread_count: usize,
}

fn parse_notification_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .map_err(|_| ApiError::BadRequest("Invalid notification_id".to_string()))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<NotificationList>, ApiError> {
    let items = if params.unread {
        state.notifications.unread().await
    } else {
        state.notifications.all().await
    };
    let unread_count = state.notifications.unread_count().await;

    Ok(Json(NotificationList {
        items: items.into_iter().map(to_response).collect(),
        unread_count,
    }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<NotificationResponse>, ApiError> {
    let id = parse_notification_id(&notification_id)?;
    let notification = state.notifications.mark_as_read(id).await?;
    Ok(Json(to_response(notification)))
}

pub async fn mark_all_read(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.notifications.mark_all_as_read().await?;
    Ok(Json(serde_json::json!({ "updated": true })))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(notification_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let id = parse_notification_id(&notification_id)?;
    state.notifications.delete(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

pub async fn delete_all(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    state.notifications.delete_all().await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[derive(Debug, Serialize)]
struct ToastPayload {
    channel: ToastChannel,
    notification: NotificationResponse,
}

/// Live stream of newly created notifications. Each SSE event is named after
/// its toast channel (`alert` or `info`).
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut rx = state.notifications.subscribe();
    debug!("Notification stream opened");

    let stream = async_stream::stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = ToastPayload {
                        channel: event.channel,
                        notification: to_response(event.notification),
                    };
                    match Event::default()
                        .event(event.channel.as_str())
                        .id(payload.notification.id.to_string())
                        .json_data(&payload)
                    {
                        Ok(sse) => yield Ok(sse),
                        Err(e) => warn!(error = %e, "Failed to encode notification event"),
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
