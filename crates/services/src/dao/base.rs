use std::marker::PhantomData;
use std::sync::Arc;

use classhub_db::models::{Record, RecordId};
use classhub_db::store::{BatchResponse, Filter, Query, RecordMap, RecordStore, StoreError};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum DaoError {
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),
    #[error("Record serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Entity not found")]
    NotFound,
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Validation: {0}")]
    Validation(String),
}

impl DaoError {
    /// The store could not be reached; callers may retry later.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, DaoError::Store(StoreError::Unavailable(_)))
    }

    fn from_rejection(message: String) -> Self {
        if message.to_lowercase().contains("not found") {
            DaoError::NotFound
        } else {
            DaoError::Rejected(message)
        }
    }
}

impl From<validator::ValidationErrors> for DaoError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DaoError::Validation(errors.to_string())
    }
}

pub type DaoResult<T> = Result<T, DaoError>;

/// Typed access to one record-store table.
pub struct BaseDao<T: Record> {
    store: Arc<dyn RecordStore>,
    upsert_lock: Mutex<()>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> BaseDao<T> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            upsert_lock: Mutex::new(()),
            _record: PhantomData,
        }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    fn fields() -> Vec<String> {
        T::FIELDS.iter().map(|f| f.to_string()).collect()
    }

    fn decode(row: RecordMap) -> DaoResult<T> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    fn encode(record: &T) -> DaoResult<RecordMap> {
        match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            other => Err(DaoError::Rejected(format!(
                "{} record did not serialize to an object: {}",
                T::TABLE,
                other
            ))),
        }
    }

    /// First successful row of a batch, falling back to `sent` when the store
    /// only echoes the id.
    fn first_success(response: BatchResponse, sent: &T) -> DaoResult<T> {
        for failure in response.failures() {
            warn!(table = T::TABLE, id = ?failure.id, message = ?failure.message, "Record operation failed");
        }

        let rejection = response
            .failures()
            .find_map(|f| f.message.clone())
            .unwrap_or_else(|| format!("{} returned no results", T::TABLE));

        let Some(result) = response.results.into_iter().find(|r| r.success) else {
            return Err(DaoError::from_rejection(rejection));
        };

        match result.data {
            Some(Value::Object(row)) => Self::decode(row),
            _ => {
                let mut record = sent.clone();
                if let Some(id) = result.id {
                    record.set_id(id);
                }
                Ok(record)
            }
        }
    }

    pub async fn find_by_id(&self, id: RecordId) -> DaoResult<T> {
        let row = self
            .store
            .get_record_by_id(T::TABLE, id, &Self::fields())
            .await?
            .ok_or(DaoError::NotFound)?;
        Self::decode(row)
    }

    pub async fn find_many(&self, filters: Vec<Filter>) -> DaoResult<Vec<T>> {
        self.find_query(Query::new(T::FIELDS).filters(filters)).await
    }

    pub async fn find_query(&self, query: Query) -> DaoResult<Vec<T>> {
        let rows = self.store.fetch_records(T::TABLE, &query).await?;
        rows.into_iter().map(Self::decode).collect()
    }

    pub async fn find_all(&self) -> DaoResult<Vec<T>> {
        self.find_many(Vec::new()).await
    }

    pub async fn find_one(&self, filters: Vec<Filter>) -> DaoResult<Option<T>> {
        let query = Query::new(T::FIELDS).filters(filters).limit(1);
        Ok(self.find_query(query).await?.into_iter().next())
    }

    pub async fn insert_one(&self, record: &T) -> DaoResult<T> {
        let mut row = Self::encode(record)?;
        row.remove("Id");

        let response = self.store.create_records(T::TABLE, vec![row]).await?;
        let created = Self::first_success(response, record)?;
        debug!(table = T::TABLE, id = ?created.id(), "Inserted record");
        Ok(created)
    }

    pub async fn update_one(&self, record: &T) -> DaoResult<T> {
        if record.id().is_none() {
            return Err(DaoError::Validation("Record id is required for updates".to_string()));
        }

        let row = Self::encode(record)?;
        let response = self.store.update_records(T::TABLE, vec![row]).await?;
        let updated = Self::first_success(response, record)?;
        debug!(table = T::TABLE, id = ?updated.id(), "Updated record");
        Ok(updated)
    }

    pub async fn delete_by_id(&self, id: RecordId) -> DaoResult<()> {
        let response = self.store.delete_records(T::TABLE, &[id]).await?;
        if !response.results.is_empty() && response.all_succeeded() {
            debug!(table = T::TABLE, id, "Deleted record");
            return Ok(());
        }

        let message = response
            .failures()
            .find_map(|f| f.message.clone())
            .unwrap_or_else(|| format!("Record {id} not found"));
        Err(DaoError::from_rejection(message))
    }

    /// Deletes what it can and returns how many rows went away.
    pub async fn delete_many(&self, ids: &[RecordId]) -> DaoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let response = self.store.delete_records(T::TABLE, ids).await?;
        for failure in response.failures() {
            warn!(table = T::TABLE, id = ?failure.id, message = ?failure.message, "Record delete failed");
        }
        Ok(response.successes().count())
    }

    pub async fn delete_where(&self, filters: Vec<Filter>) -> DaoResult<usize> {
        let ids: Vec<RecordId> = self
            .find_many(filters)
            .await?
            .iter()
            .filter_map(|r| r.id())
            .collect();
        self.delete_many(&ids).await
    }

    pub async fn count(&self, filters: Vec<Filter>) -> DaoResult<usize> {
        Ok(self.find_many(filters).await?.len())
    }

    /// Update-or-insert keyed by `key`. Upserts on one table are serialized so
    /// two concurrent calls for the same key cannot both insert. Extra rows
    /// matching the key are removed.
    pub async fn upsert(&self, key: Vec<Filter>, mut record: T) -> DaoResult<T> {
        let _guard = self.upsert_lock.lock().await;

        let mut matches = self.find_many(key).await?.into_iter();
        let stored = match matches.next() {
            Some(current) => {
                if let Some(id) = current.id() {
                    record.set_id(id);
                }
                self.update_one(&record).await?
            }
            None => self.insert_one(&record).await?,
        };

        let duplicates: Vec<RecordId> = matches.filter_map(|r| r.id()).collect();
        if !duplicates.is_empty() {
            warn!(table = T::TABLE, count = duplicates.len(), "Removing duplicate rows for upsert key");
            self.delete_many(&duplicates).await?;
        }

        Ok(stored)
    }
}
