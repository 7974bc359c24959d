use std::fmt::Display;
use thiserror::Error;

pub mod codes;
pub mod helpers;

pub use codes::{describe_error_code, ErrorCode};
pub use helpers::{common, ErrorExt};

/// The unified error type for the LegalForm service
#[derive(Error, Debug)]
pub enum LegalFormError {
    #[error("[E{code:04}] Configuration error: {message}")]
    Config {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Persistence error: {message}")]
    Persistence {
        code: u16,
        message: String,
        table: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Payment error: {message}")]
    Payment {
        code: u16,
        message: String,
        request_id: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Notification error: {message}")]
    Notification {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Document error: {message}")]
    Document {
        code: u16,
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] Validation error: {message}")]
    Validation {
        code: u16,
        message: String,
        field: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("[E{code:04}] {message}")]
    Other {
        code: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl LegalFormError {
    /// Create a configuration error with specific code
    pub fn config_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Config {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a persistence error with specific code and table
    pub fn persistence_with_code(
        code: u16,
        message: impl Into<String>,
        table: Option<String>,
    ) -> Self {
        Self::Persistence {
            code,
            message: message.into(),
            table,
            source: None,
        }
    }

    /// Create a payment error with specific code and request
    pub fn payment_with_code(
        code: u16,
        message: impl Into<String>,
        request_id: Option<String>,
    ) -> Self {
        Self::Payment {
            code,
            message: message.into(),
            request_id,
            source: None,
        }
    }

    /// Create a notification error with specific code
    pub fn notification_with_code(code: u16, message: impl Into<String>) -> Self {
        Self::Notification {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create a document error with specific code and storage path
    pub fn document_with_code(code: u16, message: impl Into<String>, path: Option<String>) -> Self {
        Self::Document {
            code,
            message: message.into(),
            path,
            source: None,
        }
    }

    /// Create a validation error with specific code and field
    pub fn validation_with_code(
        code: u16,
        message: impl Into<String>,
        field: Option<String>,
    ) -> Self {
        Self::Validation {
            code,
            message: message.into(),
            field,
            source: None,
        }
    }

    /// Create a generic other error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            code: ErrorCode::OTHER_GENERIC,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error to this error
    pub fn with_source(
        mut self,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        match &mut self {
            Self::Config { source: src, .. }
            | Self::Persistence { source: src, .. }
            | Self::Payment { source: src, .. }
            | Self::Notification { source: src, .. }
            | Self::Document { source: src, .. }
            | Self::Validation { source: src, .. }
            | Self::Other { source: src, .. } => {
                *src = Some(source.into());
            }
        }
        self
    }

    /// Add context to the error message
    pub fn with_context(mut self, context: impl Display) -> Self {
        match &mut self {
            Self::Config { message, .. }
            | Self::Persistence { message, .. }
            | Self::Payment { message, .. }
            | Self::Notification { message, .. }
            | Self::Document { message, .. }
            | Self::Validation { message, .. }
            | Self::Other { message, .. } => {
                *message = format!("{}: {}", message, context);
            }
        }
        self
    }

    /// Attach the company request the payment error relates to
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        if let Self::Payment {
            request_id: ref mut r,
            ..
        } = self
        {
            *r = Some(id.into());
        }
        self
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config { .. } => 2,
            Self::Persistence { .. } => 3,
            Self::Payment { .. } => 4,
            Self::Notification { .. } => 5,
            Self::Document { .. } => 6,
            Self::Validation { .. } => 8,
            Self::Other { .. } => 1,
        }
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Config { code, .. }
            | Self::Persistence { code, .. }
            | Self::Payment { code, .. }
            | Self::Notification { code, .. }
            | Self::Document { code, .. }
            | Self::Validation { code, .. }
            | Self::Other { code, .. } => *code,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message, .. } => format!("Configuration problem: {}", message),
            Self::Persistence { message, table, .. } => {
                if let Some(t) = table {
                    format!("Data store error on '{}': {}", t, message)
                } else {
                    format!("Data store error: {}", message)
                }
            }
            Self::Payment {
                message,
                request_id,
                ..
            } => {
                if let Some(id) = request_id {
                    format!("Payment for request {} failed: {}", id, message)
                } else {
                    format!("Payment error: {}", message)
                }
            }
            Self::Notification { message, .. } => format!("Notification error: {}", message),
            Self::Document { message, path, .. } => {
                if let Some(p) = path {
                    format!("Document error at {}: {}", p, message)
                } else {
                    format!("Document error: {}", message)
                }
            }
            Self::Validation { message, field, .. } => {
                if let Some(f) = field {
                    format!("Validation error for '{}': {}", f, message)
                } else {
                    format!("Validation error: {}", message)
                }
            }
            Self::Other { message, .. } => message.clone(),
        }
    }

    /// Get a developer-friendly error message with full chain
    pub fn developer_message(&self) -> String {
        format!("{:#}", self)
    }

    /// Errors caused by the caller's input rather than by a collaborator
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Validation { .. } => true,
            Self::Persistence { code, .. } => *code == ErrorCode::PERSISTENCE_NOT_FOUND,
            Self::Payment { code, .. } => *code == ErrorCode::PAYMENT_INVALID_WEBHOOK,
            Self::Document { code, .. } => *code == ErrorCode::DOCUMENT_MISSING_FIELD,
            _ => false,
        }
    }

    /// Whether the error reports a missing record
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Persistence { code, .. } if *code == ErrorCode::PERSISTENCE_NOT_FOUND
        )
    }
}

/// Type alias for Results using LegalFormError
pub type Result<T> = std::result::Result<T, LegalFormError>;

/// Type alias for application Results (using anyhow for flexibility)
pub type AppResult<T> = anyhow::Result<T>;

// Conversion from common error types

/// I/O failures only happen while reading configuration files
impl From<std::io::Error> for LegalFormError {
    fn from(err: std::io::Error) -> Self {
        let (code, message) = match err.kind() {
            std::io::ErrorKind::NotFound => (ErrorCode::CONFIG_NOT_FOUND, "File not found"),
            std::io::ErrorKind::PermissionDenied => {
                (ErrorCode::CONFIG_PATH_ERROR, "Permission denied")
            }
            _ => (ErrorCode::CONFIG_GENERIC, "Failed to read file"),
        };
        LegalFormError::config_with_code(code, message).with_source(err)
    }
}

impl From<toml::de::Error> for LegalFormError {
    fn from(err: toml::de::Error) -> Self {
        LegalFormError::config_with_code(ErrorCode::CONFIG_INVALID_TOML, "Invalid TOML syntax")
            .with_source(err)
    }
}

impl From<serde_json::Error> for LegalFormError {
    fn from(err: serde_json::Error) -> Self {
        LegalFormError::validation_with_code(
            ErrorCode::VALIDATION_INVALID_FORMAT,
            "Invalid JSON payload",
            None,
        )
        .with_source(err)
    }
}

impl From<tera::Error> for LegalFormError {
    fn from(err: tera::Error) -> Self {
        LegalFormError::notification_with_code(
            ErrorCode::NOTIFICATION_TEMPLATE_ERROR,
            "Failed to render notification template",
        )
        .with_source(err)
    }
}

// Conversion from gateway errors
impl From<crate::gateway::GatewayError> for LegalFormError {
    fn from(err: crate::gateway::GatewayError) -> Self {
        use crate::gateway::GatewayError;

        match err {
            GatewayError::NotFound(msg) => {
                LegalFormError::persistence_with_code(ErrorCode::PERSISTENCE_NOT_FOUND, msg, None)
            }
            GatewayError::Unavailable(msg) => {
                LegalFormError::persistence_with_code(ErrorCode::PERSISTENCE_UNAVAILABLE, msg, None)
            }
            GatewayError::InvalidResponse(msg) | GatewayError::Serialization(msg) => {
                LegalFormError::persistence_with_code(
                    ErrorCode::PERSISTENCE_INVALID_RESPONSE,
                    msg,
                    None,
                )
            }
            GatewayError::Rejected { status, body } => LegalFormError::persistence_with_code(
                ErrorCode::PERSISTENCE_GENERIC,
                format!("Request rejected with status {}: {}", status, body),
                None,
            ),
            GatewayError::Configuration(msg) => {
                LegalFormError::config_with_code(ErrorCode::CONFIG_MISSING_REQUIRED, msg)
            }
            GatewayError::Http(http_err) => LegalFormError::persistence_with_code(
                ErrorCode::PERSISTENCE_UNAVAILABLE,
                "HTTP request failed",
                None,
            )
            .with_source(http_err),
        }
    }
}

#[cfg(test)]
mod tests;
