//! Supabase REST client
//!
//! Talks to the PostgREST endpoint (`/rest/v1/{table}`) for rows and to the
//! storage API (`/storage/v1/object/{bucket}/{path}`) for uploaded files,
//! authenticating with the service role key.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::error::{GatewayError, GatewayResult};
use super::persistence::{DocumentStorage, PersistenceGateway};
use super::types::*;

const REQUESTS_TABLE: &str = "company_requests";
const ASSOCIATES_TABLE: &str = "company_associates";
const DOCUMENTS_TABLE: &str = "company_documents";

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    service_key: String,
    bucket: String,
}

impl SupabaseClient {
    pub fn new(
        base_url: impl Into<String>,
        service_key: impl Into<String>,
        bucket: impl Into<String>,
        timeout: Duration,
    ) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::configuration(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            bucket: bucket.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn object_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(response: Response) -> GatewayResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(GatewayError::not_found(body));
        }
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    /// Insert rows and return the stored representation
    async fn insert<B, T>(&self, table: &str, body: &B) -> GatewayResult<Vec<T>>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned + Send,
    {
        debug!("Inserting into {}", table);
        let response = self
            .authorized(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        let rows = Self::check(response).await?.json::<Vec<T>>().await?;
        Ok(rows)
    }

    async fn delete_where(&self, table: &str, column: &str, value: &str) -> GatewayResult<()> {
        debug!("Deleting from {} where {} = {}", table, column, value);
        let response = self
            .authorized(self.client.delete(self.table_url(table)))
            .query(&[(column, format!("eq.{value}"))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl PersistenceGateway for SupabaseClient {
    async fn create_request(
        &self,
        request: &NewCompanyRequest,
    ) -> GatewayResult<CompanyRequestRecord> {
        let rows: Vec<CompanyRequestRecord> = self.insert(REQUESTS_TABLE, request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::invalid_response("insert returned no row"))
    }

    async fn get_request(&self, id: &str) -> GatewayResult<Option<CompanyRequestRecord>> {
        let response = self
            .authorized(self.client.get(self.table_url(REQUESTS_TABLE)))
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .send()
            .await?;
        let rows: Vec<CompanyRequestRecord> = Self::check(response).await?.json().await?;
        Ok(rows.into_iter().next())
    }

    async fn update_request_status(&self, id: &str, status: RequestStatus) -> GatewayResult<()> {
        let response = self
            .authorized(self.client.patch(self.table_url(REQUESTS_TABLE)))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&json!({
                "status": status,
                "updated_at": chrono::Utc::now(),
            }))
            .send()
            .await?;
        let rows: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(GatewayError::not_found(format!("{REQUESTS_TABLE}/{id}")));
        }
        Ok(())
    }

    async fn delete_request(&self, id: &str) -> GatewayResult<()> {
        self.delete_where(REQUESTS_TABLE, "id", id).await
    }

    async fn insert_associates(
        &self,
        associates: &[NewAssociate],
    ) -> GatewayResult<Vec<AssociateRecord>> {
        if associates.is_empty() {
            return Ok(Vec::new());
        }
        self.insert(ASSOCIATES_TABLE, associates).await
    }

    async fn list_associates(&self, request_id: &str) -> GatewayResult<Vec<AssociateRecord>> {
        let response = self
            .authorized(self.client.get(self.table_url(ASSOCIATES_TABLE)))
            .query(&[("company_request_id", format!("eq.{request_id}"))])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_associates(&self, request_id: &str) -> GatewayResult<()> {
        self.delete_where(ASSOCIATES_TABLE, "company_request_id", request_id)
            .await
    }

    async fn insert_document(&self, document: &NewDocument) -> GatewayResult<DocumentRecord> {
        let rows: Vec<DocumentRecord> = self.insert(DOCUMENTS_TABLE, document).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| GatewayError::invalid_response("insert returned no row"))
    }
}

#[async_trait]
impl DocumentStorage for SupabaseClient {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> GatewayResult<()> {
        debug!("Uploading {} bytes to {}/{}", bytes.len(), self.bucket, path);
        let response = self
            .authorized(self.client.post(self.object_url(path)))
            .header("x-upsert", "true")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn remove(&self, path: &str) -> GatewayResult<()> {
        let response = self
            .authorized(self.client.delete(self.object_url(path)))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
