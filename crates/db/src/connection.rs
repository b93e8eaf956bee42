use std::sync::Arc;

use classhub_config::Settings;
use tracing::{info, warn};

use crate::store::{HttpRecordStore, MemoryRecordStore, RecordStore, StoreError};

/// Builds the record store selected by `record_store.url` and checks that it
/// answers. An unreachable hosted store is not fatal: the app starts offline
/// and callers see `Unavailable` until it comes back.
pub async fn connect(settings: &Settings) -> Result<Arc<dyn RecordStore>, StoreError> {
    let store_settings = &settings.record_store;

    let store: Arc<dyn RecordStore> = if store_settings.is_memory() {
        let memory = match &store_settings.seed_path {
            Some(path) => MemoryRecordStore::from_seed_file(path).await?,
            None => MemoryRecordStore::new(),
        };
        Arc::new(memory)
    } else {
        Arc::new(HttpRecordStore::new(store_settings)?)
    };

    match store.ping().await {
        Ok(()) => {
            info!(backend = store.name(), url = %store_settings.url, "Connected to record store");
        }
        Err(StoreError::Unavailable(reason)) => {
            warn!(backend = store.name(), url = %store_settings.url, %reason, "Record store unreachable, starting offline");
        }
        Err(e) => return Err(e),
    }

    Ok(store)
}
