//! Shared data model for the accessibility analyzer.
//!
//! The scanner produces [`Issue`]s, the scan engine wraps them in a
//! [`ScanReport`], and the explain engine turns a single issue into an
//! [`ExplanationRecord`].

pub mod explanation;
pub mod report;
pub mod types;

pub use explanation::{CodeFix, ExplanationRecord, IssueDetails, Suggestion};
pub use report::{ScanReport, StandardCounts};
pub use types::{Issue, IssueType, ParseEnumError, Priority, Severity};
