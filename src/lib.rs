//! # LegalForm
//!
//! Backend for a company registration service: customers fill a creation
//! wizard, the service derives how the company's shares are split between
//! the associates, stores the request, opens a payment session and keeps
//! the customer informed.
//!
//! ## Usage
//!
//! ```bash
//! legalform serve [--config legalform.toml] [--port 8080]
//! legalform shares --capital 500000 --associate awa:300000 --associate yao:200000
//! ```
//!
//! ## Modules
//!
//! - `shares` - Share distribution calculator
//! - `intake` - Wizard draft types, validation, pricing and the submission saga
//! - `payments` - Payment provider callbacks
//! - `notifications` - Customer emails and SMS text rendered from templates
//! - `documents` - Identity document upload
//! - `gateway` - Data store, file storage, payment and email collaborators
//! - `server` - HTTP API
//! - `config` - Layered configuration (file, then environment)
//! - `error` - Unified error type with numeric codes
pub mod config;
pub mod documents;
pub mod error;
pub mod gateway;
pub mod intake;
pub mod notifications;
pub mod payments;
pub mod server;
pub mod shares;
