//! In-memory data store and file store
//!
//! Used by `serve` when no hosted backend is configured, and by tests.
//! Individual operations can be made to fail once with
//! [`MemoryStore::fail_next`].

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{GatewayError, GatewayResult};
use super::persistence::{DocumentStorage, PersistenceGateway};
use super::types::*;

/// Operations that can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    CreateRequest,
    GetRequest,
    UpdateStatus,
    DeleteRequest,
    InsertAssociates,
    DeleteAssociates,
    InsertDocument,
    Upload,
}

/// Object kept by the in-memory file store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    requests: Arc<RwLock<HashMap<String, CompanyRequestRecord>>>,
    associates: Arc<RwLock<Vec<AssociateRecord>>>,
    documents: Arc<RwLock<Vec<DocumentRecord>>>,
    objects: Arc<RwLock<HashMap<String, StoredObject>>>,
    failures: Arc<RwLock<HashSet<StoreOperation>>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `operation` fail with [`GatewayError::Unavailable`]
    pub async fn fail_next(&self, operation: StoreOperation) {
        self.failures.write().await.insert(operation);
    }

    pub async fn requests(&self) -> Vec<CompanyRequestRecord> {
        let mut rows: Vec<_> = self.requests.read().await.values().cloned().collect();
        rows.sort_by_key(|r| r.created_at);
        rows
    }

    pub async fn associates(&self) -> Vec<AssociateRecord> {
        self.associates.read().await.clone()
    }

    pub async fn documents(&self) -> Vec<DocumentRecord> {
        self.documents.read().await.clone()
    }

    pub async fn object(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    async fn check_failure(&self, operation: StoreOperation) -> GatewayResult<()> {
        if self.failures.write().await.remove(&operation) {
            return Err(GatewayError::unavailable(format!(
                "injected failure for {:?}",
                operation
            )));
        }
        Ok(())
    }

    fn next_tracking_number(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!("LF-{}-{:05}", Utc::now().year(), seq)
    }
}

#[async_trait]
impl PersistenceGateway for MemoryStore {
    async fn create_request(
        &self,
        request: &NewCompanyRequest,
    ) -> GatewayResult<CompanyRequestRecord> {
        self.check_failure(StoreOperation::CreateRequest).await?;

        let now = Utc::now();
        let record = CompanyRequestRecord {
            id: Uuid::new_v4().to_string(),
            tracking_number: Some(self.next_tracking_number()),
            request: request.clone(),
            created_at: now,
            updated_at: now,
        };

        self.requests
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(record)
    }

    async fn get_request(&self, id: &str) -> GatewayResult<Option<CompanyRequestRecord>> {
        self.check_failure(StoreOperation::GetRequest).await?;
        Ok(self.requests.read().await.get(id).cloned())
    }

    async fn update_request_status(&self, id: &str, status: RequestStatus) -> GatewayResult<()> {
        self.check_failure(StoreOperation::UpdateStatus).await?;

        let mut requests = self.requests.write().await;
        let record = requests
            .get_mut(id)
            .ok_or_else(|| GatewayError::not_found(format!("company_requests/{id}")))?;
        record.request.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_request(&self, id: &str) -> GatewayResult<()> {
        self.check_failure(StoreOperation::DeleteRequest).await?;
        self.requests.write().await.remove(id);
        Ok(())
    }

    async fn insert_associates(
        &self,
        associates: &[NewAssociate],
    ) -> GatewayResult<Vec<AssociateRecord>> {
        self.check_failure(StoreOperation::InsertAssociates).await?;

        let now = Utc::now();
        let records: Vec<AssociateRecord> = associates
            .iter()
            .map(|associate| AssociateRecord {
                id: Uuid::new_v4().to_string(),
                associate: associate.clone(),
                created_at: now,
            })
            .collect();

        self.associates.write().await.extend(records.iter().cloned());
        Ok(records)
    }

    async fn list_associates(&self, request_id: &str) -> GatewayResult<Vec<AssociateRecord>> {
        Ok(self
            .associates
            .read()
            .await
            .iter()
            .filter(|a| a.associate.company_request_id == request_id)
            .cloned()
            .collect())
    }

    async fn delete_associates(&self, request_id: &str) -> GatewayResult<()> {
        self.check_failure(StoreOperation::DeleteAssociates).await?;
        self.associates
            .write()
            .await
            .retain(|a| a.associate.company_request_id != request_id);
        Ok(())
    }

    async fn insert_document(&self, document: &NewDocument) -> GatewayResult<DocumentRecord> {
        self.check_failure(StoreOperation::InsertDocument).await?;

        let record = DocumentRecord {
            id: Uuid::new_v4().to_string(),
            document: document.clone(),
            uploaded_at: Utc::now(),
        };
        self.documents.write().await.push(record.clone());
        Ok(record)
    }
}

#[async_trait]
impl DocumentStorage for MemoryStore {
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> GatewayResult<()> {
        self.check_failure(StoreOperation::Upload).await?;
        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn remove(&self, path: &str) -> GatewayResult<()> {
        self.objects.write().await.remove(path);
        Ok(())
    }
}
