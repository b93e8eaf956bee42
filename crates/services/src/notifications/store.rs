use std::sync::Arc;

use chrono::Utc;
use classhub_db::models::{NewNotification, Notification};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::blob::BlobStorage;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification {0} not found")]
    NotFound(u64),
    #[error("Notification storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Notification serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type NotificationResult<T> = Result<T, NotificationError>;

/// Append-only notification log, newest first, mirrored to a blob.
///
/// Every mutation builds the next list, persists it, and only then swaps it
/// in. The lock is held across the write, so after any successful call the
/// in-memory list equals the persisted one.
pub struct NotificationStore {
    storage: Arc<dyn BlobStorage>,
    notifications: Mutex<Vec<Notification>>,
}

impl NotificationStore {
    /// Loads the persisted list. An unreadable blob starts the store empty.
    pub async fn open(storage: Arc<dyn BlobStorage>) -> Self {
        let notifications = match storage.read().await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Notification>>(&raw) {
                Ok(list) => list,
                Err(e) => {
                    warn!(error = %e, "Discarding unreadable notification data");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read notification data");
                Vec::new()
            }
        };

        info!(count = notifications.len(), "Notification store opened");
        Self {
            storage,
            notifications: Mutex::new(notifications),
        }
    }

    async fn commit(
        &self,
        current: &mut Vec<Notification>,
        next: Vec<Notification>,
    ) -> NotificationResult<()> {
        let raw = serde_json::to_string(&next)?;
        self.storage.write(raw).await?;
        *current = next;
        Ok(())
    }

    pub async fn create(&self, data: NewNotification) -> NotificationResult<Notification> {
        let mut current = self.notifications.lock().await;

        let id = current.iter().map(|n| n.id).max().unwrap_or(0) + 1;
        let notification = Notification {
            id,
            notification_type: data.notification_type,
            title: data.title,
            message: data.message,
            assignment_id: data.assignment_id,
            priority: data.priority,
            read: false,
            created_at: Utc::now(),
        };

        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(notification.clone());
        next.extend(current.iter().cloned());
        self.commit(&mut current, next).await?;

        debug!(id, "Notification created");
        Ok(notification)
    }

    pub async fn mark_as_read(&self, id: u64) -> NotificationResult<Notification> {
        let mut current = self.notifications.lock().await;
        let index = current
            .iter()
            .position(|n| n.id == id)
            .ok_or(NotificationError::NotFound(id))?;

        let mut next = current.clone();
        next[index].read = true;
        let updated = next[index].clone();
        self.commit(&mut current, next).await?;
        Ok(updated)
    }

    pub async fn mark_all_as_read(&self) -> NotificationResult<()> {
        let mut current = self.notifications.lock().await;
        let next = current
            .iter()
            .cloned()
            .map(|mut n| {
                n.read = true;
                n
            })
            .collect();
        self.commit(&mut current, next).await
    }

    pub async fn delete(&self, id: u64) -> NotificationResult<Notification> {
        let mut current = self.notifications.lock().await;
        let index = current
            .iter()
            .position(|n| n.id == id)
            .ok_or(NotificationError::NotFound(id))?;

        let mut next = current.clone();
        let removed = next.remove(index);
        self.commit(&mut current, next).await?;
        Ok(removed)
    }

    pub async fn delete_all(&self) -> NotificationResult<()> {
        let mut current = self.notifications.lock().await;
        self.commit(&mut current, Vec::new()).await
    }

    pub async fn get_all(&self) -> Vec<Notification> {
        self.notifications.lock().await.clone()
    }

    pub async fn get_unread(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .await
            .iter()
            .filter(|n| !n.read)
            .cloned()
            .collect()
    }

    pub async fn unread_count(&self) -> usize {
        self.notifications.lock().await.iter().filter(|n| !n.read).count()
    }
}
