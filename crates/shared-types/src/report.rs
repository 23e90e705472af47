//! Scan report returned by `POST /analyse`

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{Issue, IssueType};

/// Issue counts for one standard, partitioned by issue type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardCounts {
    pub errors: usize,
    pub warnings: usize,
    pub notices: usize,
}

impl StandardCounts {
    /// Count issues into exactly one bucket each
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            match issue.issue_type {
                IssueType::Error => counts.errors += 1,
                IssueType::Warning => counts.warnings += 1,
                IssueType::Notice => counts.notices += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings + self.notices
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub document_title: String,
    pub page_url: String,
    pub issues: Vec<Issue>,
    /// Keyed by standard name, e.g. `WCAG2AA`
    pub standards: BTreeMap<String, StandardCounts>,
    /// Score in [0, 10], one decimal
    pub aim_score: f64,
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}
