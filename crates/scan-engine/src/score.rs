//! Compliance summary and AIM score

use std::collections::BTreeMap;

use shared_types::{Issue, StandardCounts};

use crate::options::AccessibilityStandard;

// Penalties in hundredths of a point
const ERROR_PENALTY: i64 = 40;
const WARNING_PENALTY: i64 = 15;
const NOTICE_PENALTY: i64 = 5;
const MAX_SCORE: i64 = 1000;

/// Partition issues by type
pub fn summarize(issues: &[Issue]) -> StandardCounts {
    StandardCounts::from_issues(issues)
}

/// `clamp(10 - 0.4e - 0.15w - 0.05n, 0, 10)` rounded half-up to one decimal.
///
/// Evaluated in integer hundredths so values like 8.45 round to 8.5 exactly.
pub fn aim_score(counts: &StandardCounts) -> f64 {
    let penalty = ERROR_PENALTY
        .saturating_mul(counts.errors as i64)
        .saturating_add(WARNING_PENALTY.saturating_mul(counts.warnings as i64))
        .saturating_add(NOTICE_PENALTY.saturating_mul(counts.notices as i64));
    let hundredths = MAX_SCORE - penalty.clamp(0, MAX_SCORE);
    let tenths = (hundredths + 5) / 10;
    tenths as f64 / 10.0
}

/// Standards map for a report: one entry for the standard that was tested
pub fn standards_for(
    standard: AccessibilityStandard,
    counts: StandardCounts,
) -> BTreeMap<String, StandardCounts> {
    let mut standards = BTreeMap::new();
    standards.insert(standard.as_str().to_string(), counts);
    standards
}
