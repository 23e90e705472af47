//! External scanner backends
//!
//! The scanner itself (pa11y driving headless Chromium) is a black box. A
//! backend only has to turn a [`ScanTarget`] into a [`RawScanResult`]:
//!
//! - [`Pa11yCli`] runs the `pa11y` executable as a child process
//! - [`RemoteScanner`] posts the target to a scanner service over HTTP

mod pa11y;
mod remote;

pub use pa11y::Pa11yCli;
pub use remote::RemoteScanner;

use async_trait::async_trait;
use serde::Deserialize;
use shared_types::{Issue, IssueType};

use crate::error::ScanError;
use crate::options::ScanTarget;

/// One issue as emitted by pa11y
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawIssue {
    pub code: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    #[serde(default)]
    pub type_code: Option<u8>,
    pub message: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub selector: Option<String>,
    #[serde(default)]
    pub runner_extras: Option<serde_json::Value>,
}

impl From<RawIssue> for Issue {
    fn from(raw: RawIssue) -> Self {
        Issue {
            code: raw.code,
            message: raw.message,
            issue_type: raw.issue_type,
            selector: raw.selector.unwrap_or_default(),
            context: raw.context.unwrap_or_default(),
            runner_extras: raw.runner_extras,
        }
    }
}

/// pa11y's result object
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScanResult {
    #[serde(default)]
    pub document_title: String,
    #[serde(default)]
    pub page_url: String,
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[async_trait]
pub trait Scanner: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Run one scan. Called exactly once per analysis request.
    async fn scan(&self, target: &ScanTarget) -> Result<RawScanResult, ScanError>;
}
