//! Scan request validation and option normalisation

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Default scanner timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default wait before testing
pub const DEFAULT_WAIT_MS: u64 = 0;

/// Chrome flags needed to run headless inside containers
pub const DEFAULT_CHROME_ARGS: &[&str] = &["--no-sandbox", "--disable-setuid-sandbox"];

/// Body of `POST /analyse`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub url: Option<String>,
    pub standard: Option<String>,
    pub include_warnings: Option<bool>,
    pub include_notices: Option<bool>,
    /// pa11y actions, e.g. `click element #accept-cookies`
    pub actions: Option<Vec<String>>,
    /// Milliseconds to wait after load
    pub wait: Option<u64>,
    /// Scanner timeout in milliseconds
    pub timeout: Option<u64>,
    /// CSS selector list of elements to hide from the test
    pub hide_elements: Option<String>,
    pub chrome_launch_config: Option<ChromeLaunchConfig>,
}

impl ScanRequest {
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeLaunchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<String>,
}

/// Accessibility standard understood by pa11y
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum AccessibilityStandard {
    Wcag2A,
    #[default]
    Wcag2AA,
    Wcag2AAA,
    Section508,
}

impl AccessibilityStandard {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessibilityStandard::Wcag2A => "WCAG2A",
            AccessibilityStandard::Wcag2AA => "WCAG2AA",
            AccessibilityStandard::Wcag2AAA => "WCAG2AAA",
            AccessibilityStandard::Section508 => "Section508",
        }
    }
}

impl fmt::Display for AccessibilityStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessibilityStandard {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WCAG2A" => Ok(AccessibilityStandard::Wcag2A),
            "WCAG2AA" => Ok(AccessibilityStandard::Wcag2AA),
            "WCAG2AAA" => Ok(AccessibilityStandard::Wcag2AAA),
            "SECTION508" => Ok(AccessibilityStandard::Section508),
            _ => Err(ScanError::Validation(format!(
                "Unsupported standard '{}'. Supported: WCAG2A, WCAG2AA, WCAG2AAA, Section508",
                s
            ))),
        }
    }
}

impl Serialize for AccessibilityStandard {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Scanner options after defaults have been applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub standard: AccessibilityStandard,
    pub include_warnings: bool,
    pub include_notices: bool,
    pub actions: Vec<String>,
    pub wait: Duration,
    pub timeout: Duration,
    pub hide_elements: Option<String>,
    pub chrome_launch_config: ChromeLaunchConfig,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            standard: AccessibilityStandard::default(),
            include_warnings: true,
            include_notices: true,
            actions: Vec::new(),
            wait: Duration::from_millis(DEFAULT_WAIT_MS),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            hide_elements: None,
            chrome_launch_config: ChromeLaunchConfig {
                args: Some(DEFAULT_CHROME_ARGS.iter().map(|a| a.to_string()).collect()),
                executable_path: None,
            },
        }
    }
}

impl ScanOptions {
    /// Options in the shape pa11y accepts in its config file
    pub fn to_pa11y(&self) -> Pa11yOptions {
        Pa11yOptions {
            standard: self.standard,
            include_warnings: self.include_warnings,
            include_notices: self.include_notices,
            timeout: self.timeout.as_millis() as u64,
            wait: self.wait.as_millis() as u64,
            actions: self.actions.clone(),
            hide_elements: self.hide_elements.clone(),
            chrome_launch_config: self.chrome_launch_config.clone(),
        }
    }
}

/// pa11y option object (camelCase, as in its JSON config)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pa11yOptions {
    pub standard: AccessibilityStandard,
    pub include_warnings: bool,
    pub include_notices: bool,
    pub timeout: u64,
    pub wait: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_elements: Option<String>,
    pub chrome_launch_config: ChromeLaunchConfig,
}

/// A validated URL together with normalised options
#[derive(Debug, Clone)]
pub struct ScanTarget {
    pub url: Url,
    pub options: ScanOptions,
}

impl ScanTarget {
    /// Validate a request and apply defaults.
    ///
    /// # Errors
    ///
    /// `ScanError::Validation` when the URL is missing, blank or not an
    /// absolute URL, or when the standard is unknown.
    pub fn from_request(request: ScanRequest) -> Result<Self, ScanError> {
        let raw_url = request
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ScanError::Validation("URL is required".to_string()))?;

        let url = Url::parse(raw_url)
            .map_err(|_| ScanError::Validation("Invalid URL provided".to_string()))?;

        let defaults = ScanOptions::default();
        let standard = match request.standard.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse()?,
            _ => defaults.standard,
        };

        let chrome_launch_config = match request.chrome_launch_config {
            Some(mut config) => {
                if config.args.is_none() {
                    config.args = defaults.chrome_launch_config.args.clone();
                }
                config
            }
            None => defaults.chrome_launch_config.clone(),
        };

        let options = ScanOptions {
            standard,
            include_warnings: request.include_warnings.unwrap_or(defaults.include_warnings),
            include_notices: request.include_notices.unwrap_or(defaults.include_notices),
            actions: request.actions.unwrap_or_default(),
            wait: request.wait.map(Duration::from_millis).unwrap_or(defaults.wait),
            timeout: request
                .timeout
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            hide_elements: request.hide_elements.filter(|h| !h.trim().is_empty()),
            chrome_launch_config,
        };

        Ok(Self { url, options })
    }
}
