//! Customer notifications
//!
//! Renders the email and SMS for an event on a company request and sends the
//! email when a sender is configured. Delivery problems never surface as
//! errors: they are logged and reported through [`NotificationOutcome`].
//! SMS delivery has no provider yet, so the text is only logged.

pub mod templates;

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::NotificationConfig;
use crate::error::{common, ErrorCode, LegalFormError, Result};
use crate::gateway::{CompanyRequestRecord, EmailSender, OutboundEmail, PersistenceGateway, RequestStatus};
use templates::{
    format_fcfa, status_copy, MessageCopy, NotificationTemplates, TemplateValues, NEW_REQUEST_COPY,
    PAYMENT_RECEIVED_COPY,
};

/// Event a notification is sent for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    StatusChange(RequestStatus),
    NewRequest,
    PaymentReceived,
}

impl NotificationKind {
    /// Build from the wire form (`status_change` + `newStatus`, `new_request`,
    /// `payment_received`)
    pub fn parse(kind: &str, new_status: Option<&str>) -> Result<Self> {
        match kind {
            "status_change" => {
                let raw = new_status.ok_or_else(|| common::missing_required_field("newStatus"))?;
                let status = raw.parse::<RequestStatus>().map_err(|e| {
                    LegalFormError::validation_with_code(
                        ErrorCode::VALIDATION_INVALID_INPUT,
                        e,
                        Some("newStatus".to_string()),
                    )
                })?;
                Ok(Self::StatusChange(status))
            }
            "new_request" => Ok(Self::NewRequest),
            "payment_received" => Ok(Self::PaymentReceived),
            other => Err(LegalFormError::validation_with_code(
                ErrorCode::VALIDATION_INVALID_INPUT,
                format!("Unknown notification type: {other}"),
                Some("type".to_string()),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StatusChange(_) => "status_change",
            Self::NewRequest => "new_request",
            Self::PaymentReceived => "payment_received",
        }
    }

    fn copy(&self) -> MessageCopy {
        match self {
            Self::StatusChange(status) => status_copy(*status),
            Self::NewRequest => NEW_REQUEST_COPY,
            Self::PaymentReceived => PAYMENT_RECEIVED_COPY,
        }
    }

    fn template(&self) -> &'static str {
        match self {
            Self::StatusChange(_) => "status_change.html",
            Self::NewRequest => "new_request.html",
            Self::PaymentReceived => "payment_received.html",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StatusChange(status) => write!(f, "status_change({status})"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Extra values that only exist at submission time
#[derive(Debug, Clone, Default)]
pub struct NotificationExtras {
    pub payment_url: Option<String>,
}

/// Email and SMS ready to be delivered
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedNotification {
    pub subject: String,
    pub html: String,
    pub sms: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOutcome {
    pub request_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub email_sent: bool,
    pub sms_sent: bool,
}

pub struct NotificationService {
    store: Arc<dyn PersistenceGateway>,
    email: Option<Arc<dyn EmailSender>>,
    templates: NotificationTemplates,
    settings: NotificationConfig,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        email: Option<Arc<dyn EmailSender>>,
        settings: NotificationConfig,
    ) -> Result<Self> {
        Ok(Self {
            store,
            email,
            templates: NotificationTemplates::new()?,
            settings,
        })
    }

    pub fn email_enabled(&self) -> bool {
        self.email.is_some()
    }

    pub fn render(
        &self,
        record: &CompanyRequestRecord,
        kind: NotificationKind,
        extras: &NotificationExtras,
    ) -> Result<RenderedNotification> {
        let copy = kind.copy();
        let values = TemplateValues {
            client_name: record.request.contact_name.clone(),
            tracking_number: record.reference().to_string(),
            headline: copy.headline.to_string(),
            message: copy.message.to_string(),
            dashboard_url: self.settings.dashboard_url.clone(),
            support_email: self.settings.support_email.clone(),
            support_phone: self.settings.support_phone.clone(),
            estimated_price: Some(format_fcfa(record.request.estimated_price)),
            payment_url: extras.payment_url.clone(),
        };

        Ok(RenderedNotification {
            subject: format!("LegalForm - {}", copy.headline),
            html: self.templates.render(kind.template(), &values)?,
            sms: self.templates.render("sms.txt", &values)?,
        })
    }

    /// Load the request and notify its contact
    pub async fn notify(&self, request_id: &str, kind: NotificationKind) -> Result<NotificationOutcome> {
        let record = self
            .store
            .get_request(request_id)
            .await?
            .ok_or_else(|| common::request_not_found(request_id))?;
        self.notify_record(&record, kind, &NotificationExtras::default())
            .await
    }

    /// Notify the contact of an already loaded request
    pub async fn notify_record(
        &self,
        record: &CompanyRequestRecord,
        kind: NotificationKind,
        extras: &NotificationExtras,
    ) -> Result<NotificationOutcome> {
        debug!("Processing {} notification for request {}", kind, record.id);
        let rendered = self.render(record, kind, extras)?;

        let email_sent = match &self.email {
            Some(sender) => {
                let email = OutboundEmail {
                    from: self.settings.from.clone(),
                    to: vec![record.request.email.clone()],
                    subject: rendered.subject.clone(),
                    html: rendered.html,
                };
                match sender.send(&email).await {
                    Ok(()) => {
                        info!("Email sent to {} for request {}", record.request.email, record.id);
                        true
                    }
                    Err(e) => {
                        warn!("Email sending failed for request {}: {}", record.id, e);
                        false
                    }
                }
            }
            None => {
                debug!("Email sender not configured, skipping email");
                false
            }
        };

        info!(
            "SMS not sent to {} (no provider), message: {}",
            record.request.phone, rendered.sms
        );

        Ok(NotificationOutcome {
            request_id: record.id.clone(),
            kind: kind.as_str().to_string(),
            email_sent,
            sms_sent: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{MemoryStore, NewCompanyRequest, RecordingEmailSender};

    async fn stored_request(store: &MemoryStore) -> CompanyRequestRecord {
        store
            .create_request(&NewCompanyRequest {
                user_id: None,
                structure_type: "sarl".to_string(),
                company_name: Some("Kone Distribution".to_string()),
                region: "Abidjan".to_string(),
                city: None,
                address: "Marcory".to_string(),
                activity: None,
                capital: Some("1000000".to_string()),
                associates_count: Some("1".to_string()),
                contact_name: "Awa Kone".to_string(),
                phone: "+2250101010101".to_string(),
                email: "awa@example.com".to_string(),
                additional_services: vec![],
                estimated_price: 150_000.0,
                status: RequestStatus::Pending,
            })
            .await
            .unwrap()
    }

    fn service(store: &MemoryStore, sender: Option<RecordingEmailSender>) -> NotificationService {
        NotificationService::new(
            Arc::new(store.clone()),
            sender.map(|s| Arc::new(s) as Arc<dyn EmailSender>),
            NotificationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(
            NotificationKind::parse("status_change", Some("en_cours")).unwrap(),
            NotificationKind::StatusChange(RequestStatus::InProgress)
        );
        assert_eq!(
            NotificationKind::parse("new_request", None).unwrap(),
            NotificationKind::NewRequest
        );
        assert!(NotificationKind::parse("status_change", None).is_err());
        assert!(NotificationKind::parse("status_change", Some("archived")).is_err());
        assert!(NotificationKind::parse("fax", None).is_err());
    }

    #[tokio::test]
    async fn test_status_change_email() {
        let store = MemoryStore::new();
        let record = stored_request(&store).await;
        let sender = RecordingEmailSender::new();
        let service = service(&store, Some(sender.clone()));

        let outcome = service
            .notify(&record.id, NotificationKind::StatusChange(RequestStatus::Completed))
            .await
            .unwrap();

        assert!(outcome.email_sent);
        assert!(!outcome.sms_sent);
        let sent = sender.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, vec!["awa@example.com".to_string()]);
        assert_eq!(sent[0].subject, "LegalForm - 🎉 Votre entreprise est créée !");
        assert_eq!(sent[0].from, "LegalForm <entreprise@legalform.ci>");
    }

    #[tokio::test]
    async fn test_without_sender_nothing_is_sent() {
        let store = MemoryStore::new();
        let record = stored_request(&store).await;
        let service = service(&store, None);

        let outcome = service
            .notify(&record.id, NotificationKind::PaymentReceived)
            .await
            .unwrap();
        assert!(!outcome.email_sent);
    }

    #[tokio::test]
    async fn test_send_failure_is_reported_not_raised() {
        let store = MemoryStore::new();
        let record = stored_request(&store).await;
        let sender = RecordingEmailSender::new();
        sender.set_failing(true).await;
        let service = service(&store, Some(sender));

        let outcome = service
            .notify(&record.id, NotificationKind::NewRequest)
            .await
            .unwrap();
        assert!(!outcome.email_sent);
    }

    #[tokio::test]
    async fn test_unknown_request() {
        let store = MemoryStore::new();
        let service = service(&store, None);

        let err = service
            .notify("missing", NotificationKind::NewRequest)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_render_new_request_with_payment_link() {
        let store = MemoryStore::new();
        let record = stored_request(&store).await;
        let service = service(&store, None);

        let rendered = service
            .render(
                &record,
                NotificationKind::NewRequest,
                &NotificationExtras {
                    payment_url: Some("https://checkout.test/pay/1".to_string()),
                },
            )
            .unwrap();
        assert_eq!(rendered.subject, "LegalForm - Demande reçue");
        assert!(rendered.html.contains("150 000 FCFA"));
        assert!(rendered.html.contains("https://checkout.test/pay/1"));
        assert!(rendered.sms.contains(record.reference()));
    }
}
