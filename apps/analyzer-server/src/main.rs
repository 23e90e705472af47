//! Accessibility Analyzer Server
//!
//! REST API in front of the pa11y accessibility scanner. Provides:
//!
//! - Website scans reshaped into reports with an AIM score
//! - Plain-language explanations of single issues (LLM with a rule-based
//!   fallback)
//! - A static WCAG level summary
//!
//! ## Scanner backends
//!
//! By default pa11y runs as a local child process. Passing `--scanner-url`
//! delegates scans to a pa11y service over HTTP instead.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use clap::Parser;
use explain_engine::{ExplainConfig, Explainer};
use governor::middleware::NoOpMiddleware;
use scan_engine::{Pa11yCli, RemoteScanner, ScanEngine, Scanner};
use tower_governor::{
    governor::{GovernorConfig, GovernorConfigBuilder},
    key_extractor::PeerIpKeyExtractor,
    GovernorLayer,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{
    handle_analyze, handle_explain_issue, handle_guidelines, handle_health, handle_root,
};

/// Command-line arguments for the analyzer server
#[derive(Parser, Debug)]
#[command(name = "analyzer-server")]
#[command(about = "Accessibility analyzer API over pa11y")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "3001")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Rate limit: requests per second per IP
    #[arg(long, env = "RATE_LIMIT", default_value = "10")]
    rate_limit: u32,

    /// Allowed CORS origin (any when unset)
    #[arg(long, env = "FRONTEND_URL")]
    frontend_url: Option<String>,

    /// pa11y executable (looked up on PATH when unset)
    #[arg(long, env = "PA11Y_BIN")]
    pa11y_bin: Option<PathBuf>,

    /// Remote pa11y service endpoint; replaces the local CLI
    #[arg(long, env = "SCANNER_URL")]
    scanner_url: Option<String>,

    /// Bearer token for the remote pa11y service
    #[arg(long, env = "SCANNER_API_KEY", hide_env_values = true)]
    scanner_api_key: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub scan: ScanEngine,
    pub explainer: Arc<Explainer>,
}

/// Security headers set on every response
const SECURITY_HEADERS: &[(&str, &str)] = &[
    (
        "content-security-policy",
        "default-src 'self';base-uri 'self';font-src 'self' https: data:;form-action 'self';\
         frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
         script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests",
    ),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("referrer-policy", "no-referrer"),
    ("strict-transport-security", "max-age=15552000; includeSubDomains"),
    ("x-content-type-options", "nosniff"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

/// API routes without connection-level middleware
pub fn router(state: AppState) -> Router {
    let v1 = Router::new()
        .route("/health", get(handle_health))
        .route("/guidelines", get(handle_guidelines))
        .route("/analyse", post(handle_analyze))
        .route("/analyze", post(handle_analyze))
        .route("/explain-issue", post(handle_explain_issue));

    let app = Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .nest("/api/v1", v1)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    SECURITY_HEADERS.iter().fold(app, |app, &(name, value)| {
        app.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    })
}

fn build_scanner(args: &Args) -> anyhow::Result<Arc<dyn Scanner>> {
    match &args.scanner_url {
        Some(url) => {
            let endpoint = reqwest::Url::parse(url)
                .with_context(|| format!("Invalid SCANNER_URL '{}'", url))?;
            Ok(Arc::new(RemoteScanner::new(
                endpoint,
                args.scanner_api_key.clone(),
            )))
        }
        None => Ok(Arc::new(Pa11yCli::new(args.pa11y_bin.clone()))),
    }
}

/// CORS for the frontend; credentials only travel to an explicit origin
fn build_cors(frontend_url: Option<&str>) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);
    Ok(match frontend_url {
        Some(origin) => cors
            .allow_origin(
                origin
                    .parse::<HeaderValue>()
                    .with_context(|| format!("Invalid FRONTEND_URL '{}'", origin))?,
            )
            .allow_credentials(true),
        None => cors.allow_origin(Any),
    })
}

/// Per-IP limiter allowing `rate_limit` requests per second with a burst of twice that
fn governor_config(
    rate_limit: u32,
) -> anyhow::Result<GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>> {
    anyhow::ensure!(rate_limit > 0, "RATE_LIMIT must be at least 1");
    GovernorConfigBuilder::default()
        .per_millisecond((1000 / u64::from(rate_limit)).max(1))
        .burst_size(rate_limit.saturating_mul(2))
        .finish()
        .context("Invalid rate limit configuration")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting accessibility analyzer on {}:{}", args.host, args.port);

    // Create rate limiter configuration
    let governor_conf = Arc::new(governor_config(args.rate_limit)?);

    // Create shared state
    let scanner = build_scanner(&args)?;
    let explainer = Explainer::new(ExplainConfig::from_env()?)?;
    info!(
        scanner = scanner.name(),
        ai = explainer.is_ai_enabled(),
        "Services configured"
    );

    let state = AppState {
        scan: ScanEngine::new(scanner),
        explainer: Arc::new(explainer),
    };

    let app = router(state)
        .layer(GovernorLayer {
            config: governor_conf,
        })
        .layer(build_cors(args.frontend_url.as_deref())?);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Rate limit: {} requests/second per IP", args.rate_limit);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
