//! Company creation wizard backend
//!
//! Holds the wizard's typed state, the checks run before submission, the
//! price estimate and the submission flow that ties the share calculation
//! to the data store, the payment provider and the customer notification.

pub mod pricing;
pub mod submission;
pub mod types;
pub mod validation;

pub use pricing::estimate_price;
pub use submission::{IntakeService, SubmissionContext, SubmissionReceipt};
pub use types::{
    is_known_region, lenient_amount, parse_amount, AdditionalService, AssociateDraft, CompanyRequestDraft,
    StructureType, REGIONS,
};
pub use validation::{collect_issues, validate_draft, ValidationIssue, MAX_AMOUNT};
