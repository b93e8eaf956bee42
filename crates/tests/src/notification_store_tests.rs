use std::sync::Arc;

use classhub_db::models::{NewNotification, NotificationType, Priority};
use classhub_services::notifications::{
    FileBlobStorage, MemoryBlobStorage, NotificationError, NotificationService, NotificationStore,
    ToastChannel,
};

fn due(assignment_id: i64, priority: Priority) -> NewNotification {
    NewNotification {
        notification_type: NotificationType::AssignmentDue,
        title: "Assignment Due Soon".to_string(),
        message: format!("Assignment {assignment_id} is due"),
        assignment_id: Some(assignment_id),
        priority,
    }
}

async fn memory_store() -> (Arc<MemoryBlobStorage>, NotificationStore) {
    let blob = Arc::new(MemoryBlobStorage::new());
    let store = NotificationStore::open(blob.clone()).await;
    (blob, store)
}

#[tokio::test]
async fn ids_increment_and_newest_comes_first() {
    let (_, store) = memory_store().await;

    for assignment_id in 1..=3 {
        store.create(due(assignment_id, Priority::Medium)).await.unwrap();
    }

    let all = store.get_all().await;
    let ids: Vec<u64> = all.iter().map(|n| n.id).collect();
    assert_eq!(ids, vec![3, 2, 1]);
    assert!(all.iter().all(|n| !n.read));
}

#[tokio::test]
async fn ids_continue_after_deletes() {
    let (_, store) = memory_store().await;
    store.create(due(1, Priority::Medium)).await.unwrap();
    store.create(due(2, Priority::Medium)).await.unwrap();
    store.delete(1).await.unwrap();

    let next = store.create(due(3, Priority::Medium)).await.unwrap();
    assert_eq!(next.id, 3);

    store.delete_all().await.unwrap();
    let fresh = store.create(due(4, Priority::Medium)).await.unwrap();
    assert_eq!(fresh.id, 1);
}

#[tokio::test]
async fn mark_as_read_updates_unread_projection() {
    let (_, store) = memory_store().await;
    let first = store.create(due(1, Priority::High)).await.unwrap();
    store.create(due(2, Priority::Medium)).await.unwrap();
    assert_eq!(store.unread_count().await, 2);

    let read = store.mark_as_read(first.id).await.unwrap();
    assert!(read.read);
    let unread = store.get_unread().await;
    assert_eq!(unread.len(), 1);
    assert!(unread.iter().all(|n| n.id != first.id));

    store.mark_all_as_read().await.unwrap();
    assert!(store.get_unread().await.is_empty());
    assert_eq!(store.unread_count().await, 0);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let (_, store) = memory_store().await;

    assert!(matches!(
        store.mark_as_read(42).await,
        Err(NotificationError::NotFound(42))
    ));
    assert!(matches!(
        store.delete(42).await,
        Err(NotificationError::NotFound(42))
    ));
    store.mark_all_as_read().await.unwrap();
}

#[tokio::test]
async fn failed_write_leaves_list_unchanged() {
    let (blob, store) = memory_store().await;
    let kept = store.create(due(1, Priority::Medium)).await.unwrap();
    let persisted = blob.contents();

    blob.set_fail_writes(true);
    assert!(matches!(
        store.create(due(2, Priority::Medium)).await,
        Err(NotificationError::Storage(_))
    ));
    assert!(store.mark_as_read(kept.id).await.is_err());
    assert!(store.delete_all().await.is_err());

    let all = store.get_all().await;
    assert_eq!(all.len(), 1);
    assert!(!all[0].read);
    assert_eq!(blob.contents(), persisted);
}

#[tokio::test]
async fn corrupt_blob_opens_empty() {
    let blob = Arc::new(MemoryBlobStorage::with_contents("{not json"));
    let store = NotificationStore::open(blob).await;

    assert!(store.get_all().await.is_empty());
    let created = store.create(due(1, Priority::Low)).await.unwrap();
    assert_eq!(created.id, 1);
}

#[tokio::test]
async fn file_blob_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("notifications.json");

    {
        let store = NotificationStore::open(Arc::new(FileBlobStorage::new(&path))).await;
        store.create(due(1, Priority::High)).await.unwrap();
        let second = store.create(due(2, Priority::Medium)).await.unwrap();
        store.mark_as_read(second.id).await.unwrap();
    }

    let raw = std::fs::read_to_string(&path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(json[0]["Id"], 2);
    assert_eq!(json[0]["type"], "assignment_due");
    assert_eq!(json[0]["assignmentId"], 2);
    assert!(json[0]["createdAt"].is_string());

    let reopened = NotificationStore::open(Arc::new(FileBlobStorage::new(&path))).await;
    let all = reopened.get_all().await;
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, 2);
    assert!(all[0].read);
    assert_eq!(reopened.unread_count().await, 1);
}

#[tokio::test]
async fn service_broadcasts_on_priority_channel() {
    let (_, store) = memory_store().await;
    let service = NotificationService::new(Arc::new(store));
    let mut events = service.subscribe();

    service.add(due(1, Priority::High)).await.unwrap();
    service.add(due(2, Priority::Medium)).await.unwrap();

    let first = events.recv().await.unwrap();
    assert_eq!(first.channel, ToastChannel::Alert);
    assert_eq!(first.notification.assignment_id, Some(1));

    let second = events.recv().await.unwrap();
    assert_eq!(second.channel, ToastChannel::Info);
    assert_eq!(service.all().await.len(), 2);
}

#[tokio::test]
async fn service_emits_without_subscribers() {
    let (_, store) = memory_store().await;
    let service = NotificationService::new(Arc::new(store));

    let created = service.add(due(1, Priority::Low)).await.unwrap();
    assert_eq!(created.id, 1);
}
