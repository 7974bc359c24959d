//! Payment provider callbacks
//!
//! The provider posts the transaction either wrapped in an `entity` object or
//! as the bare object. The company request is found through
//! `custom_metadata.request_id`, set when the session was created.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{common, LegalFormError, Result};
use crate::gateway::{PersistenceGateway, RequestStatus};
use crate::notifications::{NotificationKind, NotificationService};

/// Transaction fields read from a callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookEvent {
    pub transaction_id: Option<String>,
    pub transaction_status: Option<String>,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookOutcome {
    pub request_id: String,
    pub status: RequestStatus,
}

fn as_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract the transaction from a callback body
pub fn parse_webhook(payload: &Value) -> Result<WebhookEvent> {
    let transaction = payload
        .get("entity")
        .filter(|entity| entity.is_object())
        .unwrap_or(payload);

    let request_id = as_text(
        transaction
            .get("custom_metadata")
            .and_then(|metadata| metadata.get("request_id")),
    )
    .ok_or_else(common::webhook_missing_request_id)?;

    Ok(WebhookEvent {
        transaction_id: as_text(transaction.get("id")),
        transaction_status: as_text(transaction.get("status")),
        request_id,
    })
}

/// Request status for a provider transaction status
pub fn map_transaction_status(status: Option<&str>) -> RequestStatus {
    match status {
        Some("approved") | Some("transferred") => RequestStatus::PaymentConfirmed,
        Some("declined") | Some("canceled") => RequestStatus::PaymentFailed,
        _ => RequestStatus::Pending,
    }
}

pub struct WebhookProcessor {
    store: Arc<dyn PersistenceGateway>,
    notifications: Arc<NotificationService>,
}

impl WebhookProcessor {
    pub fn new(store: Arc<dyn PersistenceGateway>, notifications: Arc<NotificationService>) -> Self {
        Self {
            store,
            notifications,
        }
    }

    /// Apply a callback to the matching company request
    pub async fn handle(&self, payload: &Value) -> Result<WebhookOutcome> {
        let event = parse_webhook(payload)?;
        debug!(
            "Transaction {:?} status {:?} for request {}",
            event.transaction_id, event.transaction_status, event.request_id
        );

        let status = map_transaction_status(event.transaction_status.as_deref());
        self.store
            .update_request_status(&event.request_id, status)
            .await
            .map_err(|e| {
                LegalFormError::from(e).with_context(format!(
                    "failed to update request {} after payment callback",
                    event.request_id
                ))
            })?;
        info!("Request {} updated to status: {}", event.request_id, status);

        if status == RequestStatus::PaymentConfirmed {
            match self
                .notifications
                .notify(&event.request_id, NotificationKind::PaymentReceived)
                .await
            {
                Ok(outcome) => debug!("Payment confirmation sent: {:?}", outcome),
                Err(e) => warn!(
                    "Payment confirmation notification failed for {}: {}",
                    event.request_id, e
                ),
            }
        }

        Ok(WebhookOutcome {
            request_id: event.request_id,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    #[test]
    fn test_parse_entity_wrapper() {
        let event = parse_webhook(&json!({
            "name": "transaction.approved",
            "entity": {
                "id": 1042,
                "status": "approved",
                "custom_metadata": {"request_id": "req-7"}
            }
        }))
        .unwrap();

        assert_eq!(event.transaction_id.as_deref(), Some("1042"));
        assert_eq!(event.transaction_status.as_deref(), Some("approved"));
        assert_eq!(event.request_id, "req-7");
    }

    #[test]
    fn test_parse_bare_object() {
        let event = parse_webhook(&json!({
            "id": "tx-1",
            "status": "declined",
            "custom_metadata": {"request_id": "req-8"}
        }))
        .unwrap();
        assert_eq!(event.request_id, "req-8");
    }

    #[test]
    fn test_missing_request_id() {
        let err = parse_webhook(&json!({"entity": {"id": 1, "status": "approved"}})).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PAYMENT_INVALID_WEBHOOK);
        assert!(err.is_client_error());

        assert!(parse_webhook(&json!({"custom_metadata": {"request_id": ""}})).is_err());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(map_transaction_status(Some("approved")), RequestStatus::PaymentConfirmed);
        assert_eq!(map_transaction_status(Some("transferred")), RequestStatus::PaymentConfirmed);
        assert_eq!(map_transaction_status(Some("declined")), RequestStatus::PaymentFailed);
        assert_eq!(map_transaction_status(Some("canceled")), RequestStatus::PaymentFailed);
        assert_eq!(map_transaction_status(Some("pending")), RequestStatus::Pending);
        assert_eq!(map_transaction_status(None), RequestStatus::Pending);
    }
}
