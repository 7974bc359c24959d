//! Checks run on a wizard draft before anything is computed or stored

use std::collections::HashSet;
use std::fmt;

use super::types::{is_known_region, CompanyRequestDraft, StructureType};
use crate::error::{ErrorCode, LegalFormError, Result};

/// One problem found in a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
    pub code: u16,
}

impl ValidationIssue {
    fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            message: format!("{field} is required"),
            field,
            code: ErrorCode::VALIDATION_REQUIRED_FIELD,
        }
    }

    fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: ErrorCode::VALIDATION_INVALID_INPUT,
        }
    }

    fn out_of_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: ErrorCode::VALIDATION_OUT_OF_RANGE,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Largest amount, in FCFA, accepted for the capital or a single contribution
pub const MAX_AMOUNT: f64 = 1e15;

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Collect every problem in `draft`, in wizard step order
pub fn collect_issues(draft: &CompanyRequestDraft) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if blank(&draft.structure_type) {
        issues.push(ValidationIssue::missing("structureType"));
    } else if draft.structure_type.parse::<StructureType>().is_err() {
        issues.push(ValidationIssue::invalid(
            "structureType",
            format!("unknown structure type '{}'", draft.structure_type),
        ));
    }

    if blank(&draft.region) {
        issues.push(ValidationIssue::missing("region"));
    } else if !is_known_region(&draft.region) {
        issues.push(ValidationIssue::invalid(
            "region",
            format!("unknown region '{}'", draft.region),
        ));
    }
    if blank(&draft.address) {
        issues.push(ValidationIssue::missing("address"));
    }

    for (field, value) in [
        ("contactName", &draft.contact_name),
        ("phone", &draft.phone),
        ("email", &draft.email),
    ] {
        if blank(value) {
            issues.push(ValidationIssue::missing(field));
        }
    }

    let capital = draft.capital.trim();
    if !capital.is_empty() {
        let declared = draft.declared_capital();
        if declared < 0.0 {
            issues.push(ValidationIssue::out_of_range(
                "capital",
                "capital must not be negative",
            ));
        } else if declared > MAX_AMOUNT {
            issues.push(ValidationIssue::out_of_range(
                "capital",
                format!("capital must not exceed {MAX_AMOUNT:.0} FCFA"),
            ));
        }
    }

    if draft.associates.is_empty() {
        issues.push(ValidationIssue::invalid(
            "associates",
            "at least one associate is required",
        ));
    }

    let mut seen = HashSet::new();
    for (index, associate) in draft.associates.iter().enumerate() {
        let prefix = format!("associates[{index}]");

        if blank(&associate.full_name) {
            issues.push(ValidationIssue::missing(format!("{prefix}.fullName")));
        }

        for (field, value) in [
            ("cashContribution", associate.cash_contribution),
            ("natureContributionValue", associate.nature_contribution_value),
        ] {
            if !value.is_finite() || value < 0.0 {
                issues.push(ValidationIssue::out_of_range(
                    format!("{prefix}.{field}"),
                    format!("{prefix}.{field} must be a non-negative amount"),
                ));
            } else if value > MAX_AMOUNT {
                issues.push(ValidationIssue::out_of_range(
                    format!("{prefix}.{field}"),
                    format!("{prefix}.{field} must not exceed {MAX_AMOUNT:.0} FCFA"),
                ));
            }
        }

        if !seen.insert(draft.associate_key(index)) {
            issues.push(ValidationIssue::invalid(
                format!("{prefix}.id"),
                format!("duplicate associate id '{}'", associate.id),
            ));
        }
    }

    issues
}

/// Reject `draft` if any issue is found; the error lists all of them
pub fn validate_draft(draft: &CompanyRequestDraft) -> Result<()> {
    let issues = collect_issues(draft);
    let Some(first) = issues.first() else {
        return Ok(());
    };

    let message = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");

    Err(LegalFormError::validation_with_code(
        first.code,
        message,
        Some(first.field.clone()),
    ))
}
