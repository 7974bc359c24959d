use super::*;
use crate::gateway::GatewayError;

#[test]
fn test_legalform_error_construction() {
    let err = LegalFormError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, "bad port");
    assert!(matches!(err, LegalFormError::Config { .. }));
    assert_eq!(err.exit_code(), 2);

    let err = LegalFormError::persistence_with_code(
        ErrorCode::PERSISTENCE_GENERIC,
        "Insert failed",
        None,
    );
    assert!(matches!(err, LegalFormError::Persistence { .. }));
    assert_eq!(err.exit_code(), 3);

    let err = LegalFormError::payment_with_code(
        ErrorCode::PAYMENT_TRANSACTION_FAILED,
        "Gateway down",
        None,
    );
    assert!(matches!(err, LegalFormError::Payment { .. }));
    assert_eq!(err.exit_code(), 4);

    let err = LegalFormError::notification_with_code(
        ErrorCode::NOTIFICATION_TEMPLATE_ERROR,
        "Bad template",
    );
    assert_eq!(err.exit_code(), 5);

    let err = LegalFormError::document_with_code(
        ErrorCode::DOCUMENT_UPLOAD_FAILED,
        "Upload failed",
        None,
    );
    assert_eq!(err.exit_code(), 6);

    let err = LegalFormError::validation_with_code(
        ErrorCode::VALIDATION_INVALID_INPUT,
        "Invalid input",
        None,
    );
    assert!(matches!(err, LegalFormError::Validation { .. }));
    assert_eq!(err.exit_code(), 8);
    assert_eq!(err.code(), ErrorCode::VALIDATION_INVALID_INPUT);

    let err = LegalFormError::other("Unknown error");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(err.code(), ErrorCode::OTHER_GENERIC);
}

#[test]
fn test_error_with_context() {
    let err = LegalFormError::persistence_with_code(
        ErrorCode::PERSISTENCE_GENERIC,
        "Insert failed",
        None,
    )
    .with_context("company_associates");
    assert!(err.to_string().contains("Insert failed: company_associates"));
    assert!(err.to_string().starts_with("[E2000]"));
}

#[test]
fn test_error_chain_keeps_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
    let err = LegalFormError::payment_with_code(
        ErrorCode::PAYMENT_TRANSACTION_FAILED,
        "Transaction failed",
        None,
    )
    .with_source(io_err);

    let source = std::error::Error::source(&err).expect("source should be kept");
    assert_eq!(source.to_string(), "reset");
}

#[test]
fn test_payment_error_carries_request_id() {
    let err = LegalFormError::payment_with_code(
        ErrorCode::PAYMENT_TRANSACTION_FAILED,
        "Declined",
        None,
    )
    .with_request_id("req-42");
    assert!(err.user_message().contains("req-42"));

    // Request id only applies to payment errors
    let err = LegalFormError::document_with_code(
        ErrorCode::DOCUMENT_UPLOAD_FAILED,
        "Upload failed",
        None,
    )
    .with_request_id("req-42");
    assert!(!err.user_message().contains("req-42"));
}

#[test]
fn test_validation_field_in_user_message() {
    let err = common::missing_required_field("email");
    assert_eq!(err.code(), ErrorCode::VALIDATION_REQUIRED_FIELD);
    assert_eq!(
        err.user_message(),
        "Validation error for 'email': Required field 'email' is missing"
    );
    assert!(err.is_client_error());
}

#[test]
fn test_client_error_classification() {
    assert!(common::request_not_found("r").is_client_error());
    assert!(common::webhook_missing_request_id().is_client_error());
    assert!(!LegalFormError::persistence_with_code(ErrorCode::PERSISTENCE_UNAVAILABLE, "down", None)
        .is_client_error());
    assert!(!LegalFormError::payment_with_code(ErrorCode::PAYMENT_NOT_CONFIGURED, "off", None)
        .is_client_error());
}

#[test]
fn test_gateway_error_conversion() {
    let err: LegalFormError = GatewayError::not_found("company_requests/abc").into();
    assert!(err.is_not_found());

    let err: LegalFormError = GatewayError::unavailable("connection refused").into();
    assert_eq!(err.code(), ErrorCode::PERSISTENCE_UNAVAILABLE);

    let err: LegalFormError = GatewayError::Rejected {
        status: 409,
        body: "duplicate key".to_string(),
    }
    .into();
    assert!(err.to_string().contains("409"));

    let err: LegalFormError = GatewayError::configuration("missing key").into();
    assert_eq!(err.code(), ErrorCode::CONFIG_MISSING_REQUIRED);
}

#[test]
fn test_toml_error_conversion() {
    let toml_err = toml::from_str::<toml::Table>("not = [valid").unwrap_err();
    let err: LegalFormError = toml_err.into();
    assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
}

#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err: LegalFormError = json_err.into();
    assert_eq!(err.code(), ErrorCode::VALIDATION_INVALID_FORMAT);
    assert!(err.is_client_error());
}

#[test]
fn test_io_error_conversion() {
    let err: LegalFormError =
        std::io::Error::new(std::io::ErrorKind::NotFound, "legalform.toml").into();
    assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);

    let err: LegalFormError =
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "legalform.toml").into();
    assert_eq!(err.code(), ErrorCode::CONFIG_PATH_ERROR);

    let err: LegalFormError = std::io::Error::other("boom").into();
    assert_eq!(err.code(), ErrorCode::CONFIG_GENERIC);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_developer_message_includes_code() {
    let err = LegalFormError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, "bad port");
    assert!(err.developer_message().contains("[E1005]"));
}
