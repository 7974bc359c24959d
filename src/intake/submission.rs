//! Submission of a completed wizard draft
//!
//! The data store offers no transaction spanning the request row and the
//! associate rows, so [`IntakeService::submit`] runs as a saga: each step
//! that fails undoes the rows written by the previous ones before the
//! original error is returned.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::pricing::estimate_price;
use super::types::{AssociateDraft, CompanyRequestDraft};
use super::validation::validate_draft;
use crate::config::PricingConfig;
use crate::error::{common, ErrorCode, LegalFormError, Result};
use crate::gateway::{
    CompanyRequestRecord, NewAssociate, NewCompanyRequest, PaymentGateway, PaymentRequest,
    PaymentSession, PersistenceGateway, RequestStatus,
};
use crate::notifications::{NotificationExtras, NotificationKind, NotificationService};
use crate::shares::{calculate_distribution, ShareAllocation, ShareDistribution};

/// Who is submitting; passed explicitly instead of read from a session
#[derive(Debug, Clone, Default)]
pub struct SubmissionContext {
    pub submitted_by: Option<String>,
}

/// What the customer gets back after a successful submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub request_id: String,
    pub tracking_number: Option<String>,
    pub status: RequestStatus,
    pub estimated_price: f64,
    pub distribution: ShareDistribution,
    /// Absent when no payment provider is configured
    pub payment: Option<PaymentSession>,
}

pub struct IntakeService {
    store: Arc<dyn PersistenceGateway>,
    payments: Option<Arc<dyn PaymentGateway>>,
    notifications: Arc<NotificationService>,
    pricing: PricingConfig,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn PersistenceGateway>,
        payments: Option<Arc<dyn PaymentGateway>>,
        notifications: Arc<NotificationService>,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            store,
            payments,
            notifications,
            pricing,
        }
    }

    /// Validate, compute, store and open a payment session for `draft`
    pub async fn submit(
        &self,
        draft: &CompanyRequestDraft,
        context: &SubmissionContext,
    ) -> Result<SubmissionReceipt> {
        validate_draft(draft)?;

        let distribution = calculate_distribution(&draft.contribution_records(), draft.declared_capital());
        if let Some(advisory) = &distribution.advisory {
            warn!("Submission for {}: {}", draft.contact_name, advisory);
        }

        let estimated_price = estimate_price(&draft.region, &draft.services(), &self.pricing);

        let new_request = company_request_row(draft, context, estimated_price);
        let mut record = self.store.create_request(&new_request).await.map_err(|e| {
            LegalFormError::from(e).with_context("failed to create company request")
        })?;
        info!(
            "Created company request {} ({})",
            record.id,
            record.reference()
        );

        let rows = associate_rows(&record.id, draft, &distribution);
        if let Err(e) = self.store.insert_associates(&rows).await {
            error!("Associate insert failed for request {}: {}", record.id, e);
            self.compensate(&record.id, false).await;
            return Err(LegalFormError::from(e).with_context("failed to save associates"));
        }
        debug!("Stored {} associates for request {}", rows.len(), record.id);

        let payment = match &self.payments {
            Some(gateway) => {
                let request = payment_request(&record);
                match gateway.create_session(&request).await {
                    Ok(session) => Some(session),
                    Err(e) => {
                        error!(
                            "Payment initiation failed for request {} (transient: {}): {}",
                            record.id,
                            e.is_transient(),
                            e
                        );
                        self.compensate(&record.id, true).await;
                        return Err(LegalFormError::payment_with_code(
                            ErrorCode::PAYMENT_TRANSACTION_FAILED,
                            "failed to create payment session",
                            None,
                        )
                        .with_source(e)
                        .with_request_id(&record.id));
                    }
                }
            }
            None => {
                debug!("No payment gateway configured, request {} stays pending", record.id);
                None
            }
        };

        if payment.is_some() {
            match self
                .store
                .update_request_status(&record.id, RequestStatus::PaymentPending)
                .await
            {
                Ok(()) => record.request.status = RequestStatus::PaymentPending,
                Err(e) => warn!("Could not mark request {} as payment pending: {}", record.id, e),
            }
        }

        let extras = NotificationExtras {
            payment_url: payment.as_ref().map(|p| p.payment_url.clone()),
        };
        if let Err(e) = self
            .notifications
            .notify_record(&record, NotificationKind::NewRequest, &extras)
            .await
        {
            warn!("New request notification failed for {}: {}", record.id, e);
        }

        Ok(SubmissionReceipt {
            request_id: record.id.clone(),
            tracking_number: record.tracking_number.clone(),
            status: record.request.status,
            estimated_price,
            distribution,
            payment,
        })
    }

    /// Open a payment session for an already stored request
    pub async fn initiate_payment(&self, request_id: &str) -> Result<PaymentSession> {
        let gateway = self.payments.as_ref().ok_or_else(|| {
            LegalFormError::payment_with_code(
                ErrorCode::PAYMENT_NOT_CONFIGURED,
                "payments are not configured",
                Some(request_id.to_string()),
            )
        })?;

        let record = self
            .store
            .get_request(request_id)
            .await?
            .ok_or_else(|| common::request_not_found(request_id))?;

        let session = gateway
            .create_session(&payment_request(&record))
            .await
            .map_err(|e| {
                LegalFormError::payment_with_code(
                    ErrorCode::PAYMENT_TRANSACTION_FAILED,
                    "failed to create payment session",
                    None,
                )
                .with_source(e)
                .with_request_id(request_id)
            })?;

        if let Err(e) = self
            .store
            .update_request_status(request_id, RequestStatus::PaymentPending)
            .await
        {
            warn!("Could not mark request {} as payment pending: {}", request_id, e);
        }

        info!(
            "Payment session {} opened for request {}",
            session.transaction_id, request_id
        );
        Ok(session)
    }

    /// Undo the rows written so far. Failures are logged only.
    async fn compensate(&self, request_id: &str, associates_written: bool) {
        if associates_written {
            if let Err(e) = self.store.delete_associates(request_id).await {
                error!(
                    "[E{:04}] Could not delete associates of request {}: {}",
                    ErrorCode::PERSISTENCE_COMPENSATION_FAILED,
                    request_id,
                    e
                );
            }
        }
        match self.store.delete_request(request_id).await {
            Ok(()) => info!("Rolled back company request {}", request_id),
            Err(e) => error!(
                "[E{:04}] Could not delete request {}: {}",
                ErrorCode::PERSISTENCE_COMPENSATION_FAILED,
                request_id,
                e
            ),
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn company_request_row(
    draft: &CompanyRequestDraft,
    context: &SubmissionContext,
    estimated_price: f64,
) -> NewCompanyRequest {
    let associates_count = non_empty(&draft.associates_count)
        .unwrap_or_else(|| draft.associates.len().to_string());

    NewCompanyRequest {
        user_id: context.submitted_by.clone(),
        structure_type: draft.structure_type.trim().to_ascii_lowercase(),
        company_name: non_empty(&draft.company_name),
        region: draft.region.trim().to_string(),
        city: non_empty(&draft.city),
        address: draft.address.trim().to_string(),
        activity: non_empty(&draft.activity),
        capital: non_empty(&draft.capital),
        associates_count: Some(associates_count),
        contact_name: draft.contact_name.trim().to_string(),
        phone: draft.phone.trim().to_string(),
        email: draft.email.trim().to_string(),
        additional_services: draft
            .services()
            .iter()
            .map(|s| s.id().to_string())
            .collect(),
        estimated_price,
        status: RequestStatus::Pending,
    }
}

fn associate_row(
    request_id: &str,
    associate: &AssociateDraft,
    allocation: &ShareAllocation,
) -> NewAssociate {
    NewAssociate {
        company_request_id: request_id.to_string(),
        full_name: associate.full_name.trim().to_string(),
        phone: associate.phone.clone(),
        email: associate.email.clone(),
        id_number: associate.id_number.clone(),
        birth_date: associate.birth_date.clone(),
        birth_place: associate.birth_place.clone(),
        marital_status: associate.marital_status.clone(),
        marital_regime: associate.marital_regime.clone(),
        children_count: associate.children_count,
        residence_address: associate.residence_address.clone(),
        is_manager: associate.is_manager,
        cash_contribution: associate.cash_contribution,
        nature_contribution_description: associate.nature_contribution_description.clone(),
        nature_contribution_value: associate.nature_contribution_value,
        total_contribution: associate.total_contribution(),
        percentage: allocation.percentage,
        number_of_shares: allocation.number_of_shares,
        share_start: allocation.share_range_start,
        share_end: allocation.share_range_end,
    }
}

/// Merge each associate with its computed allocation, in wizard order
fn associate_rows(
    request_id: &str,
    draft: &CompanyRequestDraft,
    distribution: &ShareDistribution,
) -> Vec<NewAssociate> {
    draft
        .associates
        .iter()
        .zip(&distribution.allocations)
        .map(|(associate, allocation)| associate_row(request_id, associate, allocation))
        .collect()
}

fn payment_request(record: &CompanyRequestRecord) -> PaymentRequest {
    let structure = record.request.structure_type.to_uppercase();
    let description = match &record.request.company_name {
        Some(name) => format!("Création {structure} - {name} ({})", record.reference()),
        None => format!("Création {structure} ({})", record.reference()),
    };

    PaymentRequest {
        amount: record.request.estimated_price,
        description,
        request_id: record.id.clone(),
        customer_email: record.request.email.clone(),
        customer_name: record.request.contact_name.clone(),
        customer_phone: record.request.phone.clone(),
    }
}
