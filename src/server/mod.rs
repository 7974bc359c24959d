//! HTTP API
//!
//! Every response uses the same envelope: `{success, data, error}`.

pub mod handlers;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::{AppConfig, BackendType};
use crate::documents::DocumentService;
use crate::error::{common, AppResult, ErrorExt, Result};
use crate::gateway::{
    DocumentStorage, EmailSender, FedaPayClient, MemoryStore, PaymentGateway, PersistenceGateway,
    ResendClient, SupabaseClient,
};
use crate::intake::IntakeService;
use crate::notifications::NotificationService;
use crate::payments::WebhookProcessor;

pub use handlers::{status_for, ApiError, ApiResponse, USER_ID_HEADER};

/// Room for the multipart framing around an upload
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// External collaborators the services talk to
#[derive(Clone)]
pub struct Gateways {
    pub store: Arc<dyn PersistenceGateway>,
    pub storage: Arc<dyn DocumentStorage>,
    pub payments: Option<Arc<dyn PaymentGateway>>,
    pub email: Option<Arc<dyn EmailSender>>,
}

impl Gateways {
    /// Data and files kept in process; no payment or email provider
    pub fn in_memory(store: MemoryStore) -> Self {
        Self {
            store: Arc::new(store.clone()),
            storage: Arc::new(store),
            payments: None,
            email: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let persistence = &config.persistence;
        let mut gateways = match persistence.backend {
            BackendType::Memory => {
                info!("Using in-memory persistence, data is lost on restart");
                Self::in_memory(MemoryStore::new())
            }
            BackendType::Supabase => {
                let url = persistence
                    .supabase_url
                    .as_deref()
                    .ok_or_else(|| common::missing_setting("persistence.supabase_url"))?;
                let key = persistence
                    .service_role_key
                    .as_deref()
                    .ok_or_else(|| common::missing_setting("persistence.service_role_key"))?;
                let client = Arc::new(SupabaseClient::new(
                    url,
                    key,
                    config.documents.bucket.as_str(),
                    Duration::from_secs(persistence.timeout_secs),
                )?);
                info!("Using Supabase persistence at {}", url);
                Self {
                    store: client.clone(),
                    storage: client,
                    payments: None,
                    email: None,
                }
            }
        };

        if let Some(secret_key) = &config.payment.secret_key {
            let client = FedaPayClient::new(
                config.payment.base_url.as_str(),
                secret_key.as_str(),
                Duration::from_secs(config.payment.timeout_secs),
            )?
            .with_currency(config.payment.currency.as_str(), config.payment.country.as_str())
            .with_callback_url(config.payment_callback_url());
            gateways.payments = Some(Arc::new(client));
        } else {
            info!("No payment secret key configured, payments are disabled");
        }

        if let Some(api_key) = &config.notification.resend_api_key {
            let client = ResendClient::new(config.notification.resend_endpoint.as_str(), api_key.as_str())?;
            gateways.email = Some(Arc::new(client));
        } else {
            info!("No email API key configured, notifications are only logged");
        }

        Ok(gateways)
    }
}

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub intake: Arc<IntakeService>,
    pub webhooks: Arc<WebhookProcessor>,
    pub notifications: Arc<NotificationService>,
    pub documents: Arc<DocumentService>,
    pub payments_enabled: bool,
}

impl AppState {
    pub fn new(gateways: Gateways, config: &AppConfig) -> Result<Self> {
        let notifications = Arc::new(NotificationService::new(
            gateways.store.clone(),
            gateways.email.clone(),
            config.notification.clone(),
        )?);
        let payments_enabled = gateways.payments.is_some();

        Ok(Self {
            intake: Arc::new(IntakeService::new(
                gateways.store.clone(),
                gateways.payments,
                notifications.clone(),
                config.pricing.clone(),
            )),
            webhooks: Arc::new(WebhookProcessor::new(
                gateways.store.clone(),
                notifications.clone(),
            )),
            notifications,
            documents: Arc::new(DocumentService::new(
                gateways.storage,
                gateways.store,
                config.documents.clone(),
            )),
            payments_enabled,
        })
    }
}

/// Build API router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.documents.max_upload_bytes() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route("/api/v1/catalogue", get(handlers::catalogue))
        .route("/api/v1/shares/preview", post(handlers::preview_shares))
        .route("/api/v1/requests", post(handlers::submit_request))
        .route("/api/v1/requests/{id}/payment", post(handlers::initiate_payment))
        .route("/api/v1/payments/webhook", post(handlers::payment_webhook))
        .route("/api/v1/notifications", post(handlers::send_notification))
        .route("/api/v1/documents", post(handlers::upload_document))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API server for the intake endpoints
pub struct ApiServer {
    state: AppState,
    host: String,
    port: u16,
}

impl ApiServer {
    pub fn new(state: AppState, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            host: host.into(),
            port,
        }
    }

    /// Wire the gateways named in `config` and bind to its address
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let gateways = Gateways::from_config(config)?;
        let state = AppState::new(gateways, config)?;
        Ok(Self::new(state, config.server.host.as_str(), config.server.port))
    }

    /// Start the API server, returning once Ctrl-C is received
    pub async fn start(self) -> AppResult<()> {
        let addr = format!("{}:{}", self.host, self.port);
        let app = build_router(self.state);

        info!("Starting LegalForm API server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .to_legalform(format!("Failed to bind {addr}"))?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
