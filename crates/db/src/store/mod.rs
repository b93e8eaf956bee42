pub mod http;
pub mod memory;

pub use http::HttpRecordStore;
pub use memory::MemoryRecordStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::RecordId;

/// One record as the store sees it: field name to JSON value.
pub type RecordMap = Map<String, Value>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record store unavailable: {0}")]
    Unavailable(String),
    #[error("Record store rejected the request: {0}")]
    Rejected(String),
    #[error("Malformed record data: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Seed file error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    EqualTo,
    NotEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    Contains,
}

/// A predicate on one field. `EqualTo` and `Contains` match when any of the
/// values match; the ordering operators use the first value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "FieldName")]
    pub field: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
}

impl Filter {
    pub fn new(field: &str, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.to_string(),
            operator,
            values: vec![value.into()],
        }
    }

    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EqualTo, value)
    }

    /// Matches when the field equals any of `values`.
    pub fn any_of<V: Into<Value>>(field: &str, values: impl IntoIterator<Item = V>) -> Self {
        Self {
            field: field.to_string(),
            operator: Operator::EqualTo,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn gte(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::GreaterThanOrEqualTo, value)
    }

    pub fn lte(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::LessThanOrEqualTo, value)
    }

    pub fn contains(field: &str, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Contains, value)
    }
}

#[derive(Debug, Clone)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

/// Field projection plus AND-ed filters.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub fields: Vec<String>,
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new(fields: &[&str]) -> Self {
        Self {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    pub fn order_by(mut self, field: &str, descending: bool) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_string(),
            descending,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Outcome for one record of a batched create/update/delete.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordResult {
    pub success: bool,
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RecordResult {
    pub fn ok(id: RecordId, data: Option<Value>) -> Self {
        Self {
            success: true,
            id: Some(id),
            data,
            message: None,
        }
    }

    pub fn failed(id: Option<RecordId>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            id,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    pub results: Vec<RecordResult>,
}

impl BatchResponse {
    pub fn successes(&self) -> impl Iterator<Item = &RecordResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RecordResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

/// Capabilities of the hosted record store.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Cheap reachability check.
    async fn ping(&self) -> StoreResult<()>;

    async fn fetch_records(&self, table: &str, query: &Query) -> StoreResult<Vec<RecordMap>>;

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[String],
    ) -> StoreResult<Option<RecordMap>>;

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> StoreResult<BatchResponse>;

    /// Each record must carry its `Id`.
    async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> StoreResult<BatchResponse>;

    async fn delete_records(&self, table: &str, ids: &[RecordId]) -> StoreResult<BatchResponse>;
}
