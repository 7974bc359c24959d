use super::{ErrorCode, LegalFormError};

/// Extension trait for convenient error conversion
pub trait ErrorExt<T> {
    /// Convert to LegalFormError with context
    fn to_legalform(self, context: impl Into<String>) -> Result<T, LegalFormError>;
}

impl<T, E> ErrorExt<T> for Result<T, E>
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    fn to_legalform(self, context: impl Into<String>) -> Result<T, LegalFormError> {
        self.map_err(|e| LegalFormError::other(context).with_source(e))
    }
}

/// Helper functions for common error scenarios
pub mod common {
    use super::*;

    /// Create a not found error for configuration
    pub fn config_not_found(path: impl AsRef<std::path::Path>) -> LegalFormError {
        LegalFormError::config_with_code(
            ErrorCode::CONFIG_NOT_FOUND,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
    }

    /// Create a missing setting error
    pub fn missing_setting(setting: &str) -> LegalFormError {
        LegalFormError::config_with_code(
            ErrorCode::CONFIG_MISSING_REQUIRED,
            format!("Setting '{}' is required", setting),
        )
    }

    /// Create a company request not found error
    pub fn request_not_found(request_id: &str) -> LegalFormError {
        LegalFormError::persistence_with_code(
            ErrorCode::PERSISTENCE_NOT_FOUND,
            format!("Company request '{}' not found", request_id),
            Some("company_requests".to_string()),
        )
    }

    /// Create a validation error for missing field
    pub fn missing_required_field(field: &str) -> LegalFormError {
        LegalFormError::validation_with_code(
            ErrorCode::VALIDATION_REQUIRED_FIELD,
            format!("Required field '{}' is missing", field),
            Some(field.to_string()),
        )
    }

    /// Create a webhook error for a payload without request reference
    pub fn webhook_missing_request_id() -> LegalFormError {
        LegalFormError::payment_with_code(
            ErrorCode::PAYMENT_INVALID_WEBHOOK,
            "Missing request_id",
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_extension_trait() {
        let io_result: Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "test"));

        let err = io_result.to_legalform("Failed to bind 0.0.0.0:8080").unwrap_err();
        assert_eq!(err.code(), ErrorCode::OTHER_GENERIC);
        assert_eq!(err.to_string(), "[E9000] Failed to bind 0.0.0.0:8080");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_common_error_helpers() {
        let err = common::config_not_found("/etc/legalform/legalform.toml");
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert!(err.user_message().contains("Configuration problem"));

        let err = common::request_not_found("req-1");
        assert!(err.is_not_found());
        assert!(err.user_message().contains("company_requests"));
    }
}
