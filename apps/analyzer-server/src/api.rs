//! API handlers for the analyzer server
//!
//! Provides REST endpoints for:
//! - Website scans with per-standard counts and an AIM score
//! - Per-issue explanations
//! - A static WCAG level summary

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{SecondsFormat, Utc};
use explain_engine::ExplainRequest;
use scan_engine::ScanRequest;
use serde::Serialize;
use shared_types::{ExplanationRecord, ScanReport};
use tracing::info;

use crate::error::ServerError;
use crate::AppState;

/// ISO-8601 UTC timestamp with millisecond precision
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub status: &'static str,
}

/// Handler: GET /
pub async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Accessibility Analyzer Backend API is running!",
        timestamp: timestamp(),
        status: "success",
    })
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "accessibility-analyzer",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: timestamp(),
    })
}

#[derive(Serialize)]
pub struct GuidelineLevel {
    pub name: &'static str,
    pub description: &'static str,
    pub criteria: &'static [&'static str],
}

#[derive(Serialize)]
pub struct GuidelinesResponse {
    pub wcag2a: GuidelineLevel,
    pub wcag2aa: GuidelineLevel,
    pub wcag2aaa: GuidelineLevel,
}

/// Handler: GET /api/v1/guidelines
pub async fn handle_guidelines() -> Json<GuidelinesResponse> {
    Json(GuidelinesResponse {
        wcag2a: GuidelineLevel {
            name: "WCAG 2.1 Level A",
            description: "Basic accessibility requirements",
            criteria: &[
                "1.1.1 Non-text Content",
                "1.2.1 Audio-only and Video-only (Prerecorded)",
                "1.2.2 Captions (Prerecorded)",
                "1.2.3 Audio Description or Media Alternative (Prerecorded)",
            ],
        },
        wcag2aa: GuidelineLevel {
            name: "WCAG 2.1 Level AA",
            description: "Enhanced accessibility requirements",
            criteria: &[
                "1.4.3 Contrast (Minimum)",
                "1.4.4 Resize Text",
                "2.4.6 Headings and Labels",
                "2.4.7 Focus Visible",
            ],
        },
        wcag2aaa: GuidelineLevel {
            name: "WCAG 2.1 Level AAA",
            description: "Highest level of accessibility",
            criteria: &[
                "1.4.6 Contrast (Enhanced)",
                "1.4.8 Visual Presentation",
                "2.1.3 Keyboard (No Exception)",
                "2.2.3 No Timing",
            ],
        },
    })
}

/// Handler: POST /api/v1/analyse
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanReport>, ServerError> {
    let Json(req) = payload?;
    let report = state.scan.analyze(req).await?;

    info!(
        url = %report.page_url,
        issues = report.issues.len(),
        aim_score = report.aim_score,
        "Scan complete"
    );

    Ok(Json(report))
}

/// Handler: POST /api/v1/explain-issue
pub async fn handle_explain_issue(
    State(state): State<AppState>,
    payload: Result<Json<ExplainRequest>, JsonRejection>,
) -> Result<Json<ExplanationRecord>, ServerError> {
    let Json(req) = payload?;
    let issue = req.into_issue()?;

    info!(
        code = %issue.code,
        issue_type = %issue.issue_type,
        ai = state.explainer.is_ai_enabled(),
        "Explaining issue"
    );

    let record = state.explainer.explain(&issue).await?;
    Ok(Json(record))
}
