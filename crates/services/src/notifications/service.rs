use std::sync::Arc;

use async_trait::async_trait;
use classhub_db::models::{NewNotification, Notification, Priority};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::info;

use super::store::{NotificationResult, NotificationStore};

const EVENT_CAPACITY: usize = 64;

/// Transient delivery channel; high priority goes out as an alert.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ToastChannel {
    Alert,
    Info,
}

impl ToastChannel {
    pub fn for_priority(priority: Priority) -> Self {
        match priority {
            Priority::High => ToastChannel::Alert,
            Priority::Medium | Priority::Low => ToastChannel::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ToastChannel::Alert => "alert",
            ToastChannel::Info => "info",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationEvent {
    pub channel: ToastChannel,
    pub notification: Notification,
}

/// Where reminders are delivered.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn list(&self) -> NotificationResult<Vec<Notification>>;

    async fn emit(&self, data: NewNotification) -> NotificationResult<Notification>;
}

/// Persists notifications and fans them out to live subscribers.
pub struct NotificationService {
    store: Arc<NotificationStore>,
    events: broadcast::Sender<NotificationEvent>,
}

impl NotificationService {
    pub fn new(store: Arc<NotificationStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    pub fn store(&self) -> &Arc<NotificationStore> {
        &self.store
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.events.subscribe()
    }

    pub async fn add(&self, data: NewNotification) -> NotificationResult<Notification> {
        let notification = self.store.create(data).await?;
        let channel = ToastChannel::for_priority(notification.priority);
        info!(
            id = notification.id,
            assignment_id = ?notification.assignment_id,
            ?channel,
            "{}",
            notification.message
        );
        // No subscribers is not an error.
        let _ = self.events.send(NotificationEvent {
            channel,
            notification: notification.clone(),
        });
        Ok(notification)
    }

    pub async fn all(&self) -> Vec<Notification> {
        self.store.get_all().await
    }

    pub async fn unread(&self) -> Vec<Notification> {
        self.store.get_unread().await
    }

    pub async fn unread_count(&self) -> usize {
        self.store.unread_count().await
    }

    pub async fn mark_as_read(&self, id: u64) -> NotificationResult<Notification> {
        self.store.mark_as_read(id).await
    }

    pub async fn mark_all_as_read(&self) -> NotificationResult<()> {
        self.store.mark_all_as_read().await
    }

    pub async fn delete(&self, id: u64) -> NotificationResult<Notification> {
        self.store.delete(id).await
    }

    pub async fn delete_all(&self) -> NotificationResult<()> {
        self.store.delete_all().await
    }
}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn list(&self) -> NotificationResult<Vec<Notification>> {
        Ok(self.store.get_all().await)
    }

    async fn emit(&self, data: NewNotification) -> NotificationResult<Notification> {
        self.add(data).await
    }
}
