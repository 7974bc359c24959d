//! Rows exchanged with the data store
//!
//! Field names follow the hosted schema (`company_requests`,
//! `company_associates`, `company_documents`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Processing status of a company request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    PaymentPending,
    PaymentConfirmed,
    PaymentFailed,
    #[serde(alias = "en_cours")]
    InProgress,
    #[serde(alias = "documents_requis")]
    DocumentsRequired,
    #[serde(alias = "en_attente_paiement")]
    AwaitingPayment,
    #[serde(alias = "complete")]
    Completed,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PaymentPending => "payment_pending",
            Self::PaymentConfirmed => "payment_confirmed",
            Self::PaymentFailed => "payment_failed",
            Self::InProgress => "in_progress",
            Self::DocumentsRequired => "documents_required",
            Self::AwaitingPayment => "awaiting_payment",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "payment_pending" => Ok(Self::PaymentPending),
            "payment_confirmed" => Ok(Self::PaymentConfirmed),
            "payment_failed" => Ok(Self::PaymentFailed),
            "in_progress" | "en_cours" => Ok(Self::InProgress),
            "documents_required" | "documents_requis" => Ok(Self::DocumentsRequired),
            "awaiting_payment" | "en_attente_paiement" => Ok(Self::AwaitingPayment),
            "completed" | "complete" => Ok(Self::Completed),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("Unknown request status: {other}")),
        }
    }
}

/// Treat an explicit `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Company request as inserted by the intake wizard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCompanyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub structure_type: String,
    #[serde(default)]
    pub company_name: Option<String>,
    pub region: String,
    #[serde(default)]
    pub city: Option<String>,
    pub address: String,
    #[serde(default)]
    pub activity: Option<String>,
    /// Declared capital as entered in the wizard
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub associates_count: Option<String>,
    pub contact_name: String,
    pub phone: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_services: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estimated_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RequestStatus,
}

/// Stored company request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRequestRecord {
    pub id: String,
    #[serde(default)]
    pub tracking_number: Option<String>,
    #[serde(flatten)]
    pub request: NewCompanyRequest,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompanyRequestRecord {
    /// Tracking number shown to the customer, falling back to the row id
    pub fn reference(&self) -> &str {
        self.tracking_number.as_deref().unwrap_or(&self.id)
    }
}

/// Associate row, carrying both the raw contribution fields and the computed
/// share allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssociate {
    pub company_request_id: String,
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub birth_place: Option<String>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub marital_regime: Option<String>,
    #[serde(default)]
    pub children_count: Option<u32>,
    #[serde(default)]
    pub residence_address: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_manager: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cash_contribution: f64,
    #[serde(default)]
    pub nature_contribution_description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nature_contribution_value: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_contribution: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub percentage: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub number_of_shares: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub share_start: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub share_end: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociateRecord {
    pub id: String,
    #[serde(flatten)]
    pub associate: NewAssociate,
    pub created_at: DateTime<Utc>,
}

/// Reference to an uploaded document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDocument {
    pub company_request_id: String,
    #[serde(default)]
    pub associate_id: Option<String>,
    pub document_type: String,
    pub file_name: String,
    pub file_path: String,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(flatten)]
    pub document: NewDocument,
    pub uploaded_at: DateTime<Utc>,
}
