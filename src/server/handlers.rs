//! Route handlers

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use super::AppState;
use crate::documents::{DocumentUpload, UploadedDocument};
use crate::error::{ErrorCode, LegalFormError};
use crate::gateway::PaymentSession;
use crate::intake::{
    lenient_amount, AdditionalService, CompanyRequestDraft, StructureType, SubmissionContext,
    SubmissionReceipt, REGIONS,
};
use crate::notifications::{NotificationKind, NotificationOutcome};
use crate::payments::WebhookOutcome;
use crate::shares::{calculate_distribution, ContributionRecord, ShareDistribution, SHARE_PRICE};

/// Header carrying the id of the signed-in customer, if any
pub const USER_ID_HEADER: &str = "x-user-id";

/// API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

/// Error returned by handlers, rendered inside the response envelope
#[derive(Debug)]
pub struct ApiError(pub LegalFormError);

impl From<LegalFormError> for ApiError {
    fn from(err: LegalFormError) -> Self {
        Self(err)
    }
}

/// HTTP status for an error
pub fn status_for(err: &LegalFormError) -> StatusCode {
    if err.is_not_found() {
        return StatusCode::NOT_FOUND;
    }
    if err.is_client_error() {
        return StatusCode::BAD_REQUEST;
    }
    match err {
        LegalFormError::Payment { code, .. } if *code == ErrorCode::PAYMENT_NOT_CONFIGURED => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        LegalFormError::Payment { .. }
        | LegalFormError::Notification { .. }
        | LegalFormError::Document { .. } => StatusCode::BAD_GATEWAY,
        LegalFormError::Persistence { code, .. }
            if *code == ErrorCode::PERSISTENCE_UNAVAILABLE
                || *code == ErrorCode::PERSISTENCE_GENERIC =>
        {
            StatusCode::BAD_GATEWAY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let message = if status.is_client_error() || status == StatusCode::SERVICE_UNAVAILABLE {
            debug!("Request rejected: {}", self.0);
            self.0.user_message()
        } else {
            error!("Request failed: {}", self.0.developer_message());
            "The operation could not be completed, please try again later".to_string()
        };
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body).map_err(LegalFormError::from)?)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthInfo {
    pub status: &'static str,
    pub version: &'static str,
    pub payments_enabled: bool,
    pub email_enabled: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthInfo>> {
    Json(ApiResponse::success(HealthInfo {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        payments_enabled: state.payments_enabled,
        email_enabled: state.notifications.email_enabled(),
    }))
}

#[derive(Debug, Serialize)]
pub struct CatalogueEntry {
    pub id: &'static str,
    pub label: &'static str,
}

/// Choices offered by the wizard
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalogue {
    pub structure_types: Vec<CatalogueEntry>,
    pub regions: Vec<&'static str>,
    pub additional_services: Vec<CatalogueEntry>,
    pub share_price: f64,
}

pub async fn catalogue() -> Json<ApiResponse<Catalogue>> {
    Json(ApiResponse::success(Catalogue {
        structure_types: StructureType::ALL
            .iter()
            .map(|t| CatalogueEntry {
                id: t.as_str(),
                label: t.label(),
            })
            .collect(),
        regions: REGIONS.to_vec(),
        additional_services: AdditionalService::ALL
            .iter()
            .map(|s| CatalogueEntry {
                id: s.id(),
                label: s.label(),
            })
            .collect(),
        share_price: SHARE_PRICE,
    }))
}

/// One associate in a preview request; amounts may be half-typed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewAssociate {
    pub associate_id: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub cash_contribution: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub in_kind_contribution_value: f64,
}

impl From<PreviewAssociate> for ContributionRecord {
    fn from(associate: PreviewAssociate) -> Self {
        ContributionRecord::new(
            associate.associate_id,
            associate.cash_contribution,
            associate.in_kind_contribution_value,
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePreviewRequest {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub declared_capital: f64,
    #[serde(default)]
    pub associates: Vec<PreviewAssociate>,
}

pub async fn preview_shares(body: Bytes) -> ApiResult<ShareDistribution> {
    let request: SharePreviewRequest = parse_body(&body)?;
    let associates: Vec<ContributionRecord> =
        request.associates.into_iter().map(Into::into).collect();
    let distribution = calculate_distribution(&associates, request.declared_capital);
    Ok(Json(ApiResponse::success(distribution)))
}

pub async fn submit_request(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<SubmissionReceipt> {
    let draft: CompanyRequestDraft = parse_body(&body)?;
    let context = SubmissionContext {
        submitted_by: headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    };

    let receipt = state.intake.submit(&draft, &context).await?;
    Ok(Json(ApiResponse::success(receipt)))
}

pub async fn initiate_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<PaymentSession> {
    let session = state.intake.initiate_payment(&id).await?;
    Ok(Json(ApiResponse::success(session)))
}

pub async fn payment_webhook(State(state): State<AppState>, body: Bytes) -> ApiResult<WebhookOutcome> {
    let payload: serde_json::Value = parse_body(&body)?;
    let outcome = state.webhooks.handle(&payload).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub request_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub new_status: Option<String>,
}

pub async fn send_notification(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<NotificationOutcome> {
    let request: NotificationRequest = parse_body(&body)?;
    let kind = NotificationKind::parse(&request.kind, request.new_status.as_deref())?;
    let outcome = state.notifications.notify(&request.request_id, kind).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError(
        LegalFormError::validation_with_code(
            ErrorCode::VALIDATION_INVALID_FORMAT,
            "Invalid multipart body",
            None,
        )
        .with_context(err),
    )
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub async fn upload_document(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadedDocument> {
    let mut upload = DocumentUpload::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.original_name = field.file_name().unwrap_or_default().to_string();
                upload.content_type = field.content_type().unwrap_or_default().to_string();
                upload.bytes = field.bytes().await.map_err(multipart_error)?.to_vec();
            }
            "companyRequestId" => {
                upload.company_request_id = field.text().await.map_err(multipart_error)?
            }
            "associateId" => {
                upload.associate_id = non_empty(field.text().await.map_err(multipart_error)?)
            }
            "documentType" => upload.document_type = field.text().await.map_err(multipart_error)?,
            "associateName" => {
                upload.associate_name = field.text().await.map_err(multipart_error)?
            }
            "isManager" => upload.is_manager = field.text().await.map_err(multipart_error)? == "true",
            "uploadedBy" => {
                upload.uploaded_by = non_empty(field.text().await.map_err(multipart_error)?)
            }
            other => debug!("Ignoring multipart field {}", other),
        }
    }

    let uploaded = state.documents.upload(upload).await?;
    Ok(Json(ApiResponse::success(uploaded)))
}
