//! Share distribution for company formation
//!
//! Converts the associates' cash and in-kind contributions into ownership
//! percentages, share counts and contiguous share-number ranges. Shares have a
//! fixed nominal value of [`SHARE_PRICE`] FCFA.
//!
//! The calculation is pure and cheap, so the wizard re-runs it on every edit
//! to show a live preview. It never fails: degenerate inputs (zero capital,
//! zero contributions) produce zeroed allocations, and negative amounts are
//! passed through the arithmetic unchanged. Rejecting negative amounts is the
//! job of [`crate::intake::validate_draft`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use tracing::trace;

/// Nominal value of one share in FCFA.
pub const SHARE_PRICE: f64 = 5000.0;

/// Difference between declared capital and summed contributions above which
/// an advisory is attached to the result.
pub const CAPITAL_MISMATCH_THRESHOLD: f64 = 1000.0;

/// Contribution of one associate to the company capital
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    /// Identifier of the associate, unique within one calculation
    pub associate_id: String,
    /// Cash brought to the company
    #[serde(default)]
    pub cash_contribution: f64,
    /// Valuation of goods or services brought to the company
    #[serde(default)]
    pub in_kind_contribution_value: f64,
}

impl ContributionRecord {
    pub fn new(associate_id: impl Into<String>, cash: f64, in_kind: f64) -> Self {
        Self {
            associate_id: associate_id.into(),
            cash_contribution: cash,
            in_kind_contribution_value: in_kind,
        }
    }

    /// Cash plus in-kind value
    pub fn total_contribution(&self) -> f64 {
        self.cash_contribution + self.in_kind_contribution_value
    }
}

/// Computed ownership of one associate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareAllocation {
    pub associate_id: String,
    pub total_contribution: f64,
    /// Share of the capital base, rounded to two decimals
    pub percentage: f64,
    pub number_of_shares: i64,
    /// First share number owned (1-based)
    pub share_range_start: i64,
    /// Last share number owned; `share_range_start - 1` when no shares are owned
    pub share_range_end: i64,
}

impl ShareAllocation {
    /// Share numbers owned by the associate, `None` when the range is empty.
    pub fn share_range(&self) -> Option<RangeInclusive<i64>> {
        if self.number_of_shares > 0 {
            Some(self.share_range_start..=self.share_range_end)
        } else {
            None
        }
    }
}

/// Non-blocking notice that the declared capital and the summed
/// contributions diverge by more than [`CAPITAL_MISMATCH_THRESHOLD`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalMismatch {
    pub declared_capital: f64,
    pub total_contributions: f64,
}

impl CapitalMismatch {
    pub fn difference(&self) -> f64 {
        (self.declared_capital - self.total_contributions).abs()
    }
}

impl fmt::Display for CapitalMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "declared capital ({:.0} FCFA) differs from total contributions ({:.0} FCFA)",
            self.declared_capital, self.total_contributions
        )
    }
}

/// Result of one calculation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareDistribution {
    /// Amount the percentages are computed against
    pub capital_base: f64,
    pub total_contributions: f64,
    /// One entry per associate, in input order
    pub allocations: Vec<ShareAllocation>,
    pub advisory: Option<CapitalMismatch>,
}

impl ShareDistribution {
    pub fn total_shares(&self) -> i64 {
        self.allocations
            .iter()
            .fold(0i64, |total, a| total.saturating_add(a.number_of_shares))
    }

    pub fn allocation_for(&self, associate_id: &str) -> Option<&ShareAllocation> {
        self.allocations
            .iter()
            .find(|a| a.associate_id == associate_id)
    }
}

/// Compute the share distribution for `associates` against `declared_capital`.
///
/// A declared capital of zero (or a non-finite value) falls back to the sum
/// of all contributions. Share ranges are assigned in input order starting at
/// share number 1.
pub fn calculate_distribution(
    associates: &[ContributionRecord],
    declared_capital: f64,
) -> ShareDistribution {
    let declared_capital = if declared_capital.is_finite() {
        declared_capital
    } else {
        0.0
    };

    let total_contributions: f64 = associates.iter().map(|a| a.total_contribution()).sum();

    let capital_base = if declared_capital > 0.0 {
        declared_capital
    } else {
        total_contributions
    };

    let advisory = (declared_capital > 0.0
        && (declared_capital - total_contributions).abs() > CAPITAL_MISMATCH_THRESHOLD)
        .then(|| CapitalMismatch {
            declared_capital,
            total_contributions,
        });

    let allocations = if capital_base == 0.0 {
        associates.iter().map(zeroed_allocation).collect()
    } else {
        allocate_shares(associates, capital_base)
    };

    trace!(
        associates = associates.len(),
        capital_base,
        total_contributions,
        mismatch = advisory.is_some(),
        "Computed share distribution"
    );

    ShareDistribution {
        capital_base,
        total_contributions,
        allocations,
        advisory,
    }
}

fn allocate_shares(associates: &[ContributionRecord], capital_base: f64) -> Vec<ShareAllocation> {
    let mut next_share_number: i64 = 1;

    associates
        .iter()
        .map(|associate| {
            let total = associate.total_contribution();
            let number_of_shares = shares_for(total);
            let share_range_start = next_share_number;
            // Saturate so amounts past i64 shares clamp instead of overflowing
            let share_range_end = share_range_start
                .saturating_add(number_of_shares)
                .saturating_sub(1);
            next_share_number = share_range_end.saturating_add(1);

            ShareAllocation {
                associate_id: associate.associate_id.clone(),
                total_contribution: total,
                percentage: round_percentage(total / capital_base * 100.0),
                number_of_shares,
                share_range_start,
                share_range_end,
            }
        })
        .collect()
}

fn zeroed_allocation(associate: &ContributionRecord) -> ShareAllocation {
    ShareAllocation {
        associate_id: associate.associate_id.clone(),
        total_contribution: associate.total_contribution(),
        percentage: 0.0,
        number_of_shares: 0,
        share_range_start: 0,
        share_range_end: 0,
    }
}

/// Whole shares covered by `amount`; never rounds up.
fn shares_for(amount: f64) -> i64 {
    // `as` saturates and maps NaN to 0
    (amount / SHARE_PRICE).floor() as i64
}

fn round_percentage(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, cash: f64, in_kind: f64) -> ContributionRecord {
        ContributionRecord::new(id, cash, in_kind)
    }

    #[test]
    fn test_single_associate_owns_everything() {
        let result = calculate_distribution(&[record("a", 500_000.0, 0.0)], 500_000.0);

        let a = &result.allocations[0];
        assert_eq!(a.percentage, 100.0);
        assert_eq!(a.number_of_shares, 100);
        assert_eq!(a.share_range(), Some(1..=100));
        assert!(result.advisory.is_none());
    }

    #[test]
    fn test_in_kind_value_counts_towards_shares() {
        let result = calculate_distribution(&[record("a", 10_000.0, 15_000.0)], 25_000.0);

        let a = &result.allocations[0];
        assert_eq!(a.total_contribution, 25_000.0);
        assert_eq!(a.number_of_shares, 5);
        assert_eq!(a.percentage, 100.0);
    }

    #[test]
    fn test_zero_capital_and_zero_contributions() {
        let associates = vec![record("a", 0.0, 0.0), record("b", 0.0, 0.0)];
        let result = calculate_distribution(&associates, 0.0);

        assert_eq!(result.capital_base, 0.0);
        for allocation in &result.allocations {
            assert_eq!(allocation.percentage, 0.0);
            assert_eq!(allocation.number_of_shares, 0);
            assert_eq!(allocation.share_range_start, 0);
            assert_eq!(allocation.share_range_end, 0);
            assert!(allocation.share_range().is_none());
        }
    }

    #[test]
    fn test_associate_without_shares_does_not_advance_counter() {
        let associates = vec![
            record("a", 10_000.0, 0.0),
            record("b", 4_999.0, 0.0),
            record("c", 5_000.0, 0.0),
        ];
        let result = calculate_distribution(&associates, 0.0);

        let b = &result.allocations[1];
        assert_eq!(b.number_of_shares, 0);
        assert_eq!(b.share_range_start, 3);
        assert_eq!(b.share_range_end, 2);

        let c = &result.allocations[2];
        assert_eq!(c.share_range_start, 3);
        assert_eq!(c.share_range_end, 3);
    }

    #[test]
    fn test_percentage_is_rounded_to_two_decimals() {
        let associates = vec![
            record("a", 10_000.0, 0.0),
            record("b", 10_000.0, 0.0),
            record("c", 10_000.0, 0.0),
        ];
        let result = calculate_distribution(&associates, 0.0);

        for allocation in &result.allocations {
            assert_eq!(allocation.percentage, 33.33);
        }
    }

    #[test]
    fn test_small_difference_is_not_reported() {
        let result = calculate_distribution(&[record("a", 499_500.0, 0.0)], 500_000.0);
        assert!(result.advisory.is_none());
    }

    #[test]
    fn test_advisory_message_mentions_both_amounts() {
        let result = calculate_distribution(&[record("a", 350_000.0, 0.0)], 500_000.0);

        let advisory = result.advisory.expect("mismatch expected");
        assert_eq!(advisory.difference(), 150_000.0);
        let message = advisory.to_string();
        assert!(message.contains("500000"));
        assert!(message.contains("350000"));
    }

    #[test]
    fn test_non_finite_declared_capital_falls_back_to_contributions() {
        let result = calculate_distribution(&[record("a", 10_000.0, 0.0)], f64::NAN);

        assert_eq!(result.capital_base, 10_000.0);
        assert!(result.advisory.is_none());
        assert_eq!(result.allocations[0].percentage, 100.0);
    }

    #[test]
    fn test_negative_contribution_passes_through() {
        let associates = vec![record("a", -10_000.0, 0.0), record("b", 20_000.0, 0.0)];
        let result = calculate_distribution(&associates, 0.0);

        let a = &result.allocations[0];
        assert_eq!(a.number_of_shares, -2);
        assert_eq!(a.percentage, -100.0);
        assert_eq!(result.allocations.len(), 2);
    }

    #[test]
    fn test_huge_amounts_clamp_instead_of_overflowing() {
        let result = calculate_distribution(&[record("a", 1e300, 0.0)], 0.0);
        let a = &result.allocations[0];
        assert_eq!(a.number_of_shares, i64::MAX);
        assert_eq!(a.share_range_start, 1);
        assert_eq!(a.share_range_end, i64::MAX - 1);

        let associates = vec![record("a", 3e22, 0.0), record("b", 3e22, 0.0)];
        let result = calculate_distribution(&associates, 0.0);
        assert_eq!(result.allocations.len(), 2);
        assert_eq!(result.allocations[0].percentage, 50.0);
        assert_eq!(result.allocations[0].share_range_end, 6_000_000_000_000_000_000);
        assert_eq!(result.allocations[1].share_range_start, 6_000_000_000_000_000_001);
        assert_eq!(result.allocations[1].share_range_end, i64::MAX - 1);
        assert_eq!(result.total_shares(), i64::MAX);
    }

    #[test]
    fn test_empty_list_yields_empty_result() {
        let result = calculate_distribution(&[], 500_000.0);
        assert!(result.allocations.is_empty());
        assert_eq!(result.total_shares(), 0);
    }

    #[test]
    fn test_allocation_lookup_by_associate() {
        let associates = vec![record("a", 300_000.0, 0.0), record("b", 200_000.0, 0.0)];
        let result = calculate_distribution(&associates, 500_000.0);

        assert_eq!(result.total_shares(), 100);
        assert_eq!(
            result.allocation_for("b").map(|a| a.share_range_start),
            Some(61)
        );
        assert!(result.allocation_for("z").is_none());
    }
}
