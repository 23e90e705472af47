use std::ffi::OsString;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::{RawIssue, RawScanResult, Scanner};
use crate::error::ScanError;
use crate::options::{Pa11yOptions, ScanTarget};

/// Extra time granted to the child on top of pa11y's own timeout
const GUARD_SLACK: Duration = Duration::from_secs(10);

/// Longest stderr excerpt carried into an error message
const STDERR_EXCERPT: usize = 500;

/// pa11y exits with 2 when it found issues, which is still a successful run
const EXIT_OK: i32 = 0;
const EXIT_ISSUES_FOUND: i32 = 2;

/// The JSON reporter prints a bare issue array; accept a full result too
#[derive(Deserialize)]
#[serde(untagged)]
enum ReporterOutput {
    Issues(Vec<RawIssue>),
    Full(RawScanResult),
}

/// Runs `pa11y --reporter json` as a child process
#[derive(Debug, Clone)]
pub struct Pa11yCli {
    program: Option<PathBuf>,
    guard_slack: Duration,
}

impl Pa11yCli {
    /// Use `program` if given, otherwise look `pa11y` up on `PATH` at scan time
    pub fn new(program: Option<PathBuf>) -> Self {
        Self {
            program,
            guard_slack: GUARD_SLACK,
        }
    }

    /// Override the time allowed past pa11y's own timeout before the child is killed
    pub fn with_guard_slack(mut self, slack: Duration) -> Self {
        self.guard_slack = slack;
        self
    }

    fn resolve_program(&self) -> Result<PathBuf, ScanError> {
        match &self.program {
            Some(path) => Ok(path.clone()),
            None => which::which("pa11y")
                .map_err(|e| ScanError::Scanner(format!("pa11y executable not found: {}", e))),
        }
    }

    fn write_config(options: &Pa11yOptions) -> Result<NamedTempFile, ScanError> {
        let mut file = tempfile::Builder::new()
            .prefix("pa11y-")
            .suffix(".json")
            .tempfile()
            .map_err(|e| ScanError::Scanner(format!("Failed to create pa11y config: {}", e)))?;
        serde_json::to_writer(&mut file, options)
            .map_err(|e| ScanError::Scanner(format!("Failed to write pa11y config: {}", e)))?;
        file.flush()
            .map_err(|e| ScanError::Scanner(format!("Failed to write pa11y config: {}", e)))?;
        Ok(file)
    }

    fn build_args(target: &ScanTarget, config_path: &Path) -> Vec<OsString> {
        let options = &target.options;
        let mut args: Vec<OsString> = vec![
            "--reporter".into(),
            "json".into(),
            "--config".into(),
            config_path.as_os_str().to_owned(),
            "--standard".into(),
            options.standard.as_str().into(),
            "--timeout".into(),
            options.timeout.as_millis().to_string().into(),
            "--wait".into(),
            options.wait.as_millis().to_string().into(),
        ];
        if options.include_warnings {
            args.push("--include-warnings".into());
        }
        if options.include_notices {
            args.push("--include-notices".into());
        }
        if let Some(hide) = &options.hide_elements {
            args.push("--hide-elements".into());
            args.push(hide.into());
        }
        args.push(target.url.as_str().into());
        args
    }

    fn parse_output(stdout: &[u8], target: &ScanTarget) -> Result<RawScanResult, ScanError> {
        let output: ReporterOutput = serde_json::from_slice(stdout)
            .map_err(|e| ScanError::Scanner(format!("Unreadable pa11y output: {}", e)))?;

        Ok(match output {
            ReporterOutput::Issues(issues) => RawScanResult {
                document_title: String::new(),
                page_url: target.url.to_string(),
                issues,
            },
            ReporterOutput::Full(mut result) => {
                if result.page_url.is_empty() {
                    result.page_url = target.url.to_string();
                }
                result
            }
        })
    }
}

#[async_trait]
impl Scanner for Pa11yCli {
    fn name(&self) -> &str {
        "pa11y-cli"
    }

    async fn scan(&self, target: &ScanTarget) -> Result<RawScanResult, ScanError> {
        let program = self.resolve_program()?;
        let config = Self::write_config(&target.options.to_pa11y())?;
        let args = Self::build_args(target, config.path());

        debug!(program = %program.display(), ?args, "Spawning pa11y");

        let child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ScanError::Scanner(format!("Failed to start pa11y: {}", e)))?;

        let guard = target.options.timeout + target.options.wait + self.guard_slack;
        let output = match tokio::time::timeout(guard, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ScanError::Scanner(format!("pa11y did not finish: {}", e)));
            }
            Err(_elapsed) => {
                warn!(
                    url = %target.url,
                    guard_ms = guard.as_millis() as u64,
                    "pa11y exceeded guard timeout"
                );
                return Err(ScanError::Scanner(format!(
                    "pa11y timed out after {}ms",
                    guard.as_millis()
                )));
            }
        };

        match output.status.code() {
            Some(EXIT_OK) | Some(EXIT_ISSUES_FOUND) => {}
            code => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
                warn!(?code, stderr = %excerpt, "pa11y exited with failure");
                return Err(ScanError::Scanner(if excerpt.is_empty() {
                    format!("pa11y exited with status {:?}", code)
                } else {
                    excerpt
                }));
            }
        }

        let result = Self::parse_output(&output.stdout, target)?;
        info!(url = %target.url, issues = result.issues.len(), "pa11y scan complete");
        Ok(result)
    }
}
