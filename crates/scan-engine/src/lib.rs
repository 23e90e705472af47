//! Scan orchestration
//!
//! Validates a scan request, runs the external scanner once with normalised
//! options, and reshapes its output into a [`ScanReport`] with per-standard
//! counts and an AIM score.

pub mod error;
pub mod options;
pub mod scanner;
pub mod score;

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use shared_types::{Issue, ScanReport};
use tracing::info;

pub use error::ScanError;
pub use options::{AccessibilityStandard, ChromeLaunchConfig, ScanOptions, ScanRequest, ScanTarget};
pub use scanner::{Pa11yCli, RawIssue, RawScanResult, RemoteScanner, Scanner};
pub use score::{aim_score, summarize};

/// ScanEngine entry point
#[derive(Clone)]
pub struct ScanEngine {
    scanner: Arc<dyn Scanner>,
}

impl ScanEngine {
    pub fn new(scanner: Arc<dyn Scanner>) -> Self {
        Self { scanner }
    }

    pub fn scanner_name(&self) -> &str {
        self.scanner.name()
    }

    /// Validate `request`, scan once, and build the report.
    ///
    /// Validation failures return before the scanner is touched.
    pub async fn analyze(&self, request: ScanRequest) -> Result<ScanReport, ScanError> {
        let target = ScanTarget::from_request(request)?;

        info!(
            url = %target.url,
            standard = %target.options.standard,
            scanner = self.scanner.name(),
            "Starting accessibility scan"
        );

        let raw = self.scanner.scan(&target).await?;
        Ok(build_report(&target, raw))
    }
}

/// Reshape raw scanner output into a report
pub fn build_report(target: &ScanTarget, raw: RawScanResult) -> ScanReport {
    let issues: Vec<Issue> = raw.issues.into_iter().map(Issue::from).collect();
    let counts = summarize(&issues);

    ScanReport {
        document_title: raw.document_title,
        page_url: if raw.page_url.is_empty() {
            target.url.to_string()
        } else {
            raw.page_url
        },
        standards: score::standards_for(target.options.standard, counts),
        aim_score: aim_score(&counts),
        issues,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared_types::IssueType;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scanner double returning canned issues and counting calls
    struct CannedScanner {
        calls: AtomicUsize,
        issues: Vec<(&'static str, IssueType)>,
    }

    impl CannedScanner {
        fn new(issues: Vec<(&'static str, IssueType)>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                issues,
            })
        }
    }

    #[async_trait]
    impl Scanner for CannedScanner {
        fn name(&self) -> &str {
            "canned"
        }

        async fn scan(&self, target: &ScanTarget) -> Result<RawScanResult, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawScanResult {
                document_title: "Example Domain".into(),
                page_url: target.url.to_string(),
                issues: self
                    .issues
                    .iter()
                    .map(|(code, t)| RawIssue {
                        code: code.to_string(),
                        issue_type: *t,
                        type_code: None,
                        message: format!("{} message", code),
                        context: Some("<img src=\"logo.png\">".into()),
                        selector: Some("img".into()),
                        runner_extras: None,
                    })
                    .collect(),
            })
        }
    }

    struct FailingScanner;

    #[async_trait]
    impl Scanner for FailingScanner {
        fn name(&self) -> &str {
            "failing"
        }

        async fn scan(&self, _target: &ScanTarget) -> Result<RawScanResult, ScanError> {
            Err(ScanError::Scanner("net::ERR_NAME_NOT_RESOLVED".into()))
        }
    }

    #[tokio::test]
    async fn test_analyze_builds_report() {
        let scanner = CannedScanner::new(vec![
            ("H30", IssueType::Error),
            ("H30", IssueType::Error),
            ("H30", IssueType::Error),
            ("G18", IssueType::Warning),
            ("G18", IssueType::Warning),
            ("H48", IssueType::Notice),
        ]);
        let engine = ScanEngine::new(scanner.clone());

        let report = engine
            .analyze(ScanRequest::for_url("https://example.com"))
            .await
            .unwrap();

        assert_eq!(scanner.calls.load(Ordering::SeqCst), 1);
        assert_eq!(report.document_title, "Example Domain");
        assert_eq!(report.page_url, "https://example.com/");
        assert_eq!(report.issues.len(), 6);
        assert_eq!(report.aim_score, 8.5);

        let wcag2aa = &report.standards["WCAG2AA"];
        assert_eq!((wcag2aa.errors, wcag2aa.warnings, wcag2aa.notices), (3, 2, 1));
        assert_eq!(wcag2aa.total(), report.issues.len());
        assert!(chrono::DateTime::parse_from_rfc3339(&report.timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_scanner() {
        let scanner = CannedScanner::new(vec![]);
        let engine = ScanEngine::new(scanner.clone());

        let err = engine
            .analyze(ScanRequest::for_url("not-a-url"))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(scanner.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scanner_failure_is_wrapped() {
        let engine = ScanEngine::new(Arc::new(FailingScanner));
        let err = engine
            .analyze(ScanRequest::for_url("https://nope.invalid"))
            .await
            .unwrap_err();
        assert!(!err.is_validation());
        assert_eq!(
            err.to_string(),
            "Failed to analyze website: net::ERR_NAME_NOT_RESOLVED"
        );
    }

    #[tokio::test]
    async fn test_standard_key_follows_request() {
        let engine = ScanEngine::new(CannedScanner::new(vec![("X", IssueType::Notice)]));
        let request = ScanRequest {
            standard: Some("Section508".into()),
            ..ScanRequest::for_url("https://example.com")
        };
        let report = engine.analyze(request).await.unwrap();
        assert!(report.standards.contains_key("Section508"));
        assert_eq!(report.aim_score, 10.0);
    }
}
