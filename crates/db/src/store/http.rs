use std::time::Duration;

use async_trait::async_trait;
use classhub_config::RecordStoreSettings;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::{BatchResponse, Query, RecordMap, RecordResult, RecordStore, StoreError, StoreResult};
use crate::models::RecordId;

/// Client for the hosted record store's JSON API.
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    project_id: String,
    public_key: String,
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    results: Option<Vec<RecordResult>>,
}

impl HttpRecordStore {
    pub fn new(settings: &RecordStoreSettings) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| StoreError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: settings.url.trim_end_matches('/').to_string(),
            project_id: settings.project_id.clone(),
            public_key: settings.public_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/tables/{}/records", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-Project-Id", &self.project_id)
            .header("X-Public-Key", &self.public_key)
    }

    async fn send(&self, request: RequestBuilder) -> StoreResult<Envelope> {
        let resp = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(StoreError::Unavailable(format!("Record store returned {}", status)));
        }

        let envelope: Envelope = resp
            .json()
            .await
            .map_err(|e| StoreError::Rejected(format!("Unreadable response ({}): {}", status, e)))?;

        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("Request failed with status {}", status));
            warn!(%status, %message, "Record store rejected request");
            return Err(StoreError::Rejected(message));
        }

        Ok(envelope)
    }

    fn batch(envelope: Envelope) -> BatchResponse {
        BatchResponse {
            results: envelope.results.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    fn name(&self) -> &str {
        "http"
    }

    async fn ping(&self) -> StoreResult<()> {
        self.send(self.client.get(format!("{}/health", self.base_url)))
            .await
            .map(|_| ())
    }

    async fn fetch_records(&self, table: &str, query: &Query) -> StoreResult<Vec<RecordMap>> {
        let fields: Vec<Value> = query
            .fields
            .iter()
            .map(|name| json!({ "field": { "Name": name } }))
            .collect();

        let mut body = json!({
            "fields": fields,
            "where": query.filters,
        });
        if let Some(order) = &query.order_by {
            body["orderBy"] = json!([{
                "fieldName": order.field,
                "sorttype": if order.descending { "DESC" } else { "ASC" },
            }]);
        }
        if let Some(limit) = query.limit {
            body["pagingInfo"] = json!({ "limit": limit, "offset": 0 });
        }

        let envelope = self
            .send(self.client.post(format!("{}/query", self.table_url(table))).json(&body))
            .await?;

        let rows: Vec<RecordMap> = match envelope.data {
            Some(Value::Null) | None => Vec::new(),
            Some(data) => serde_json::from_value(data)?,
        };
        debug!(table, rows = rows.len(), "Fetched records");
        Ok(rows)
    }

    async fn get_record_by_id(
        &self,
        table: &str,
        id: RecordId,
        fields: &[String],
    ) -> StoreResult<Option<RecordMap>> {
        let request = self
            .client
            .get(format!("{}/{}", self.table_url(table), id))
            .query(&[("fields", fields.join(","))]);

        match self.send(request).await {
            Ok(envelope) => match envelope.data {
                Some(Value::Null) | None => Ok(None),
                Some(data) => Ok(Some(serde_json::from_value(data)?)),
            },
            Err(StoreError::Rejected(message)) if message.to_lowercase().contains("not found") => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> StoreResult<BatchResponse> {
        let envelope = self
            .send(
                self.client
                    .post(self.table_url(table))
                    .json(&json!({ "records": records })),
            )
            .await?;
        Ok(Self::batch(envelope))
    }

    async fn update_records(
        &self,
        table: &str,
        records: Vec<RecordMap>,
    ) -> StoreResult<BatchResponse> {
        let envelope = self
            .send(
                self.client
                    .put(self.table_url(table))
                    .json(&json!({ "records": records })),
            )
            .await?;
        Ok(Self::batch(envelope))
    }

    async fn delete_records(&self, table: &str, ids: &[RecordId]) -> StoreResult<BatchResponse> {
        let envelope = self
            .send(
                self.client
                    .delete(self.table_url(table))
                    .json(&json!({ "RecordIds": ids })),
            )
            .await?;
        Ok(Self::batch(envelope))
    }
}
