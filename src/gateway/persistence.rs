//! Data store and file store traits

use async_trait::async_trait;

use super::error::GatewayResult;
use super::types::*;

/// Hosted data store holding company requests, associates and documents.
///
/// Every method is a single independent call; nothing here is
/// transactional. Callers that need all-or-nothing behavior compensate
/// with the delete methods.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Insert a company request and return the stored row
    async fn create_request(&self, request: &NewCompanyRequest)
        -> GatewayResult<CompanyRequestRecord>;

    /// Load a company request by id
    async fn get_request(&self, id: &str) -> GatewayResult<Option<CompanyRequestRecord>>;

    /// Change the status of a company request
    async fn update_request_status(&self, id: &str, status: RequestStatus) -> GatewayResult<()>;

    /// Delete a company request
    async fn delete_request(&self, id: &str) -> GatewayResult<()>;

    /// Insert a batch of associates
    async fn insert_associates(
        &self,
        associates: &[NewAssociate],
    ) -> GatewayResult<Vec<AssociateRecord>>;

    /// List the associates of a company request
    async fn list_associates(&self, request_id: &str) -> GatewayResult<Vec<AssociateRecord>>;

    /// Delete all associates of a company request
    async fn delete_associates(&self, request_id: &str) -> GatewayResult<()>;

    /// Record an uploaded document
    async fn insert_document(&self, document: &NewDocument) -> GatewayResult<DocumentRecord>;
}

/// Object storage for uploaded documents
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Store `bytes` at `path`, replacing any existing object
    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> GatewayResult<()>;

    /// Remove the object at `path`
    async fn remove(&self, path: &str) -> GatewayResult<()>;
}
