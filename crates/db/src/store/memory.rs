use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::{debug, info};

use super::{
    BatchResponse, Filter, Operator, Query, RecordMap, RecordResult, RecordStore, StoreError,
    StoreResult,
};
use crate::models::RecordId;

const ID_FIELD: &str = "Id";

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: RecordId,
    rows: BTreeMap<RecordId, RecordMap>,
}

impl MemoryTable {
    fn insert(&mut self, mut record: RecordMap) -> RecordMap {
        let id = match record.get(ID_FIELD).and_then(Value::as_i64) {
            Some(id) if !self.rows.contains_key(&id) => id,
            _ => self.last_id + 1,
        };
        self.last_id = self.last_id.max(id);
        record.insert(ID_FIELD.to_string(), Value::from(id));
        self.rows.insert(id, record.clone());
        record
    }
}

/// In-process record store used for local runs and tests. Tables are created
/// on first use; ids are assigned per table starting at 1.
pub struct MemoryRecordStore {
    tables: DashMap<String, MemoryTable>,
    available: AtomicBool,
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    /// Builds a store from `{ "<table>": [records...] }`. Records keep their
    /// `Id` when present.
    pub fn with_seed(seed: HashMap<String, Vec<RecordMap>>) -> Self {
        let store = Self::new();
        for (table, records) in seed {
            let mut entry = store.tables.entry(table).or_default();
            let memory_table = entry.value_mut();
            for record in records {
                memory_table.insert(record);
            }
        }
        store
    }

    pub async fn from_seed_file(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await?;
        let seed: HashMap<String, Vec<RecordMap>> = serde_json::from_str(&raw)?;
        let store = Self::with_seed(seed);
        info!(path = %path.display(), tables = store.tables.len(), "Seeded memory record store");
        Ok(store)
    }

    /// Simulates losing (or regaining) the connection to the store.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, AtomicOrdering::SeqCst);
    }

    pub fn count(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.rows.len()).unwrap_or(0)
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.available.load(AtomicOrdering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.ensure_available()
    }

    async fn fetch_records(&self, table: &str, query: &Query) -> StoreResult<Vec<RecordMap>> {
        self.ensure_available()?;
        let Some(entry) = self.tables.get(table) else {
            return Ok(Vec::new());
        };

        let mut rows: Vec<&RecordMap> = entry
            .rows
            .values()
            .filter(|row| query.filters.iter().all(|f| matches(f, row)))
            .collect();

        if let Some(order) = &query.order_by {
            rows.sort_by(|a, b| {
                let left = a.get(&order.field).unwrap_or(&Value::Null);
                let right = b.get(&order.field).unwrap_or(&Value::Null);
                let ordering = compare(left, right).unwrap_or(Ordering::Equal);
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let result: Vec<RecordMap> = rows
            .into_iter()
            .take(limit)
            .map(|row| project(row, &query.fields))
            .collect();

        debug!(table, rows = result.len(), "Fetched records");
        Ok(result)
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[String],
    ) -> StoreResult<Option<RecordMap>> {
        self.ensure_available()?;
        Ok(self
            .tables
            .get(table)
            .and_then(|t| t.rows.get(&id).map(|row| project(row, fields))))
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> StoreResult<BatchResponse> {
        self.ensure_available()?;
        let mut entry = self.tables.entry(table.to_string()).or_default();
        let memory_table = entry.value_mut();

        let results = records
            .into_iter()
            .map(|mut record| {
                record.remove(ID_FIELD);
                let stored = memory_table.insert(record);
                let id = stored.get(ID_FIELD).and_then(Value::as_i64).unwrap_or_default();
                RecordResult::ok(id, Some(Value::Object(stored)))
            })
            .collect();

        Ok(BatchResponse { results })
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> StoreResult<BatchResponse> {
        self.ensure_available()?;
        let mut entry = self.tables.entry(table.to_string()).or_default();
        let memory_table = entry.value_mut();

        let results = records
            .into_iter()
            .map(|record| {
                let Some(id) = record.get(ID_FIELD).and_then(Value::as_i64) else {
                    return RecordResult::failed(None, "Id is required for updates");
                };
                match memory_table.rows.get_mut(&id) {
                    Some(row) => {
                        for (key, value) in record {
                            row.insert(key, value);
                        }
                        RecordResult::ok(id, Some(Value::Object(row.clone())))
                    }
                    None => RecordResult::failed(Some(id), format!("Record {id} not found")),
                }
            })
            .collect();

        Ok(BatchResponse { results })
    }

    async fn delete_records(&self, table: &str, ids: &[RecordId]) -> StoreResult<BatchResponse> {
        self.ensure_available()?;
        let mut entry = self.tables.entry(table.to_string()).or_default();
        let memory_table = entry.value_mut();

        let results = ids
            .iter()
            .map(|&id| match memory_table.rows.remove(&id) {
                Some(_) => RecordResult::ok(id, None),
                None => RecordResult::failed(Some(id), format!("Record {id} not found")),
            })
            .collect();

        Ok(BatchResponse { results })
    }
}

/// Keeps `Id` plus the requested fields. An empty projection keeps everything.
fn project(row: &RecordMap, fields: &[String]) -> RecordMap {
    if fields.is_empty() {
        return row.clone();
    }
    row.iter()
        .filter(|(key, _)| key.as_str() == ID_FIELD || fields.iter().any(|f| f == *key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn matches(filter: &Filter, row: &RecordMap) -> bool {
    let value = row.get(&filter.field).unwrap_or(&Value::Null);
    let first = filter.values.first();
    let ordered = |expected: &[Ordering]| {
        first
            .and_then(|v| compare(value, v))
            .map(|o| expected.contains(&o))
            .unwrap_or(false)
    };

    match filter.operator {
        Operator::EqualTo => filter
            .values
            .iter()
            .any(|v| compare(value, v) == Some(Ordering::Equal)),
        Operator::NotEqualTo => filter
            .values
            .iter()
            .all(|v| compare(value, v) != Some(Ordering::Equal)),
        Operator::GreaterThan => ordered(&[Ordering::Greater]),
        Operator::GreaterThanOrEqualTo => ordered(&[Ordering::Greater, Ordering::Equal]),
        Operator::LessThan => ordered(&[Ordering::Less]),
        Operator::LessThanOrEqualTo => ordered(&[Ordering::Less, Ordering::Equal]),
        Operator::Contains => filter.values.iter().any(|v| contains(value, v)),
    }
}

/// Numbers compare numerically (numeric strings are coerced), strings
/// lexicographically, which orders ISO dates correctly.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::String(a), Value::Number(b)) => a.parse::<f64>().ok()?.partial_cmp(&b.as_f64()?),
        (Value::Number(a), Value::String(b)) => a.as_f64()?.partial_cmp(&b.parse::<f64>().ok()?),
        _ => None,
    }
}

fn contains(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::String(text) => match needle {
            Value::String(fragment) => text.contains(fragment.as_str()),
            other => text.contains(&other.to_string()),
        },
        Value::Array(items) => items
            .iter()
            .any(|item| compare(item, needle) == Some(Ordering::Equal)),
        _ => false,
    }
}
