//! Identity document upload
//!
//! Files are stored under `{request_id}/{file_name}` where the file name is
//! derived from the document type, the associate's role and name, so that a
//! re-upload of the same document replaces the previous file.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::config::DocumentConfig;
use crate::error::{ErrorCode, LegalFormError, Result};
use crate::gateway::{DocumentStorage, NewDocument, PersistenceGateway};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Valid regex pattern"));

static NAME_FORBIDDEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9_]").expect("Valid regex pattern"));

/// File name prefix for a document type tag; unknown tags are used as is
pub fn document_type_prefix(document_type: &str) -> &str {
    match document_type {
        "id_document" => "CNI",
        "birth_certificate" => "ExtraitNaissance",
        "criminal_record" => "CasierJudiciaire",
        other => other,
    }
}

pub fn role_label(is_manager: bool) -> &'static str {
    if is_manager {
        "Gerant"
    } else {
        "Associe"
    }
}

/// Whitespace runs become `_`, then anything outside `[A-Za-z0-9_]` is dropped
pub fn sanitize_name(name: &str) -> String {
    let underscored = WHITESPACE_RUN.replace_all(name, "_");
    NAME_FORBIDDEN.replace_all(&underscored, "").into_owned()
}

/// Text after the last `.`; the whole name when there is no dot
pub fn file_extension(original_name: &str) -> &str {
    original_name
        .rsplit_once('.')
        .map_or(original_name, |(_, ext)| ext)
}

/// `{prefix}_{role}_{sanitized name}.{ext}`
pub fn document_file_name(
    document_type: &str,
    is_manager: bool,
    associate_name: &str,
    original_name: &str,
) -> String {
    format!(
        "{}_{}_{}.{}",
        document_type_prefix(document_type),
        role_label(is_manager),
        sanitize_name(associate_name),
        file_extension(original_name)
    )
}

/// One uploaded file with its form fields
#[derive(Debug, Clone, Default)]
pub struct DocumentUpload {
    pub company_request_id: String,
    pub associate_id: Option<String>,
    pub document_type: String,
    pub associate_name: String,
    pub is_manager: bool,
    pub uploaded_by: Option<String>,
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.bytes.is_empty() || self.original_name.trim().is_empty() {
            missing.push("file");
        }
        if self.company_request_id.trim().is_empty() {
            missing.push("companyRequestId");
        }
        if self.document_type.trim().is_empty() {
            missing.push("documentType");
        }
        if self.associate_name.trim().is_empty() {
            missing.push("associateName");
        }
        missing
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub document_id: String,
    pub file_name: String,
    pub file_path: String,
}

pub struct DocumentService {
    storage: Arc<dyn DocumentStorage>,
    store: Arc<dyn PersistenceGateway>,
    settings: DocumentConfig,
}

impl DocumentService {
    pub fn new(
        storage: Arc<dyn DocumentStorage>,
        store: Arc<dyn PersistenceGateway>,
        settings: DocumentConfig,
    ) -> Self {
        Self {
            storage,
            store,
            settings,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.settings.max_upload_bytes
    }

    /// Store the file and record it against the company request
    pub async fn upload(&self, upload: DocumentUpload) -> Result<UploadedDocument> {
        let missing = upload.missing_fields();
        if !missing.is_empty() {
            return Err(LegalFormError::document_with_code(
                ErrorCode::DOCUMENT_MISSING_FIELD,
                format!("Missing required fields: {}", missing.join(", ")),
                None,
            ));
        }

        if upload.bytes.len() > self.settings.max_upload_bytes {
            return Err(LegalFormError::validation_with_code(
                ErrorCode::VALIDATION_OUT_OF_RANGE,
                format!(
                    "file is {} bytes, the limit is {}",
                    upload.bytes.len(),
                    self.settings.max_upload_bytes
                ),
                Some("file".to_string()),
            ));
        }

        let file_name = document_file_name(
            &upload.document_type,
            upload.is_manager,
            &upload.associate_name,
            &upload.original_name,
        );
        let file_path = format!("{}/{}", upload.company_request_id, file_name);
        debug!(
            "Uploading {} ({}) to {}/{}",
            upload.original_name, upload.document_type, self.settings.bucket, file_path
        );

        let content_type = if upload.content_type.is_empty() {
            "application/octet-stream"
        } else {
            upload.content_type.as_str()
        };
        self.storage
            .upload(&file_path, upload.bytes, content_type)
            .await
            .map_err(|e| {
                LegalFormError::document_with_code(
                    ErrorCode::DOCUMENT_UPLOAD_FAILED,
                    "upload failed",
                    Some(file_path.clone()),
                )
                .with_source(e)
            })?;

        let row = NewDocument {
            company_request_id: upload.company_request_id.clone(),
            associate_id: upload.associate_id.clone(),
            document_type: upload.document_type.clone(),
            file_name: file_name.clone(),
            file_path: file_path.clone(),
            uploaded_by: upload.uploaded_by.clone(),
            original_name: Some(upload.original_name.clone()),
        };
        let record = match self.store.insert_document(&row).await {
            Ok(record) => record,
            Err(e) => {
                if let Err(remove_err) = self.storage.remove(&file_path).await {
                    error!("Could not remove orphaned file {}: {}", file_path, remove_err);
                }
                return Err(LegalFormError::from(e).with_context("failed to record document"));
            }
        };

        info!("Document uploaded successfully: {}", file_path);
        Ok(UploadedDocument {
            document_id: record.id,
            file_name,
            file_path,
        })
    }
}
