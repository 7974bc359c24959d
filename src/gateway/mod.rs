//! Gateways to the external collaborators
//!
//! Each collaborator sits behind an `async_trait` so the intake flow can run
//! against in-memory or recording implementations in tests:
//!
//! - [`PersistenceGateway`] / [`DocumentStorage`]: hosted data and file store
//! - [`PaymentGateway`]: third-party transaction API
//! - [`EmailSender`]: transactional email API

pub mod email;
pub mod error;
pub mod memory;
pub mod payment;
pub mod persistence;
pub mod supabase;
pub mod types;

pub use email::{EmailSender, OutboundEmail, RecordingEmailSender, ResendClient};
pub use error::{GatewayError, GatewayResult};
pub use memory::{MemoryStore, StoreOperation, StoredObject};
pub use payment::{FedaPayClient, MockPaymentGateway, PaymentGateway, PaymentRequest, PaymentSession};
pub use persistence::{DocumentStorage, PersistenceGateway};
pub use supabase::SupabaseClient;
pub use types::{
    AssociateRecord, CompanyRequestRecord, DocumentRecord, NewAssociate, NewCompanyRequest,
    NewDocument, RequestStatus,
};
