/// Error code registry for LegalForm
///
/// Error codes are organized by category:
/// - 1000-1999: Configuration errors
/// - 2000-2999: Persistence errors
/// - 3000-3999: Payment errors
/// - 4000-4999: Notification errors
/// - 5000-5999: Document errors
/// - 7000-7999: Validation errors
/// - 9000-9999: Other errors
#[allow(dead_code)]
pub struct ErrorCode;

impl ErrorCode {
    // Configuration errors (1000-1999)
    pub const CONFIG_GENERIC: u16 = 1000;
    pub const CONFIG_NOT_FOUND: u16 = 1001;
    pub const CONFIG_INVALID_TOML: u16 = 1002;
    pub const CONFIG_MISSING_REQUIRED: u16 = 1004;
    pub const CONFIG_INVALID_VALUE: u16 = 1005;
    pub const CONFIG_PATH_ERROR: u16 = 1006;

    // Persistence errors (2000-2999)
    pub const PERSISTENCE_GENERIC: u16 = 2000;
    pub const PERSISTENCE_NOT_FOUND: u16 = 2001;
    pub const PERSISTENCE_UNAVAILABLE: u16 = 2005;
    pub const PERSISTENCE_INVALID_RESPONSE: u16 = 2006;
    pub const PERSISTENCE_COMPENSATION_FAILED: u16 = 2007;

    // Payment errors (3000-3999)
    pub const PAYMENT_TRANSACTION_FAILED: u16 = 3001;
    pub const PAYMENT_INVALID_WEBHOOK: u16 = 3003;
    pub const PAYMENT_NOT_CONFIGURED: u16 = 3004;

    // Notification errors (4000-4999)
    pub const NOTIFICATION_TEMPLATE_ERROR: u16 = 4001;

    // Document errors (5000-5999)
    pub const DOCUMENT_UPLOAD_FAILED: u16 = 5001;
    pub const DOCUMENT_MISSING_FIELD: u16 = 5002;

    // Validation errors (7000-7999)
    pub const VALIDATION_REQUIRED_FIELD: u16 = 7001;
    pub const VALIDATION_OUT_OF_RANGE: u16 = 7003;
    pub const VALIDATION_INVALID_FORMAT: u16 = 7005;
    pub const VALIDATION_INVALID_INPUT: u16 = 7008;

    // Other errors (9000-9999)
    pub const OTHER_GENERIC: u16 = 9000;
}

/// Get a human-readable description for an error code
pub fn describe_error_code(code: u16) -> &'static str {
    match code {
        // Configuration errors
        1000 => "Generic configuration error",
        1001 => "Configuration file not found",
        1002 => "Invalid TOML syntax in configuration",
        1004 => "Required configuration field is missing",
        1005 => "Invalid value in configuration",
        1006 => "Configuration path error",

        // Persistence errors
        2000 => "Generic persistence error",
        2001 => "Record not found",
        2005 => "Data store unavailable",
        2006 => "Unexpected response from data store",
        2007 => "Failed to undo a partially applied submission",

        // Payment errors
        3001 => "Payment transaction could not be created",
        3003 => "Invalid payment webhook payload",
        3004 => "Payment gateway is not configured",

        // Notification errors
        4001 => "Notification template could not be rendered",

        // Document errors
        5001 => "Document upload failed",
        5002 => "Document upload is missing a required field",

        // Validation errors
        7001 => "Required field is missing",
        7003 => "Value out of range",
        7005 => "Invalid format",
        7008 => "Invalid input",

        // Other errors
        9000 => "Generic error",

        _ => "Unknown error code",
    }
}
