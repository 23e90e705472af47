use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{debug, info};

use super::{RawScanResult, Scanner};
use crate::error::ScanError;
use crate::options::{Pa11yOptions, ScanTarget};

#[derive(Serialize)]
struct RemoteScanBody<'a> {
    url: &'a str,
    options: Pa11yOptions,
}

/// Delegates scans to a pa11y service reachable over HTTP.
///
/// The service receives `{url, options}` and answers with pa11y's result
/// object `{documentTitle, pageUrl, issues}`.
#[derive(Debug, Clone)]
pub struct RemoteScanner {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl RemoteScanner {
    pub fn new(endpoint: Url, api_key: Option<String>) -> Self {
        Self::with_client(Client::new(), endpoint, api_key)
    }

    pub fn with_client(client: Client, endpoint: Url, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Scanner for RemoteScanner {
    fn name(&self) -> &str {
        "remote"
    }

    async fn scan(&self, target: &ScanTarget) -> Result<RawScanResult, ScanError> {
        let body = RemoteScanBody {
            url: target.url.as_str(),
            options: target.options.to_pa11y(),
        };

        debug!(endpoint = %self.endpoint, url = %target.url, "Posting scan to remote scanner");

        let mut request = self.client.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ScanError::Scanner(format!("Scanner service unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ScanError::Scanner(format!(
                "Scanner service returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let mut result: RawScanResult = response
            .json()
            .await
            .map_err(|e| ScanError::Scanner(format!("Unreadable scanner response: {}", e)))?;

        if result.page_url.is_empty() {
            result.page_url = target.url.to_string();
        }

        info!(url = %target.url, issues = result.issues.len(), "Remote scan complete");
        Ok(result)
    }
}
