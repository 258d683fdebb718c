//! HTTP surface and request pipeline
//!
//! A request to `/proxy` walks Sourcing -> Pooling -> Validating ->
//! Publishing; the first fatal error short-circuits the rest and maps to
//! a status code. Auth is checked before any stage runs.

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::proxy::{
    build_pool, EngineConfig, FeedConfig, FeedReader, HttpProber, ProberConfig, ValidationEngine,
};
use crate::publish::{CatboxPublisher, Publish, PublisherConfig};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Static usage documentation served at `/` and `/home`
const USAGE_HTML: &str = r#"<h1>Proxy Harvest API</h1>
<p>Serves freshly validated live HTTP proxies as a downloadable text file.</p>
<h2>Endpoint: <code>/proxy</code></h2>
<ul>
  <li><strong>Method:</strong> <code>GET</code></li>
  <li><code>key</code> (required): admin API key.</li>
  <li><code>count</code> (optional): desired number of live proxies, clamped to the configured maximum.</li>
</ul>
<h3>Example</h3>
<p><code>/proxy?count=200&amp;key=your_secret_key</code></p>
<h3>Success</h3>
<pre>{"success":true,"message":"...","proxy_count":200,"url":"https://files.catbox.moe/xxxxxx.txt"}</pre>
<h3>Failure</h3>
<pre>{"success":false,"message":"..."}</pre>
"#;

/// Shared per-process state handed to every request
#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    reader: Arc<FeedReader>,
    engine: Arc<ValidationEngine>,
    publisher: Arc<dyn Publish>,
}

impl AppState {
    /// Wire the real collaborators from the process configuration
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let reader = FeedReader::with_config(FeedConfig::new().with_timeout(config.feed_timeout))?;

        let prober = HttpProber::with_config(
            ProberConfig::new()
                .with_timeout(config.probe_timeout)
                .with_target(config.validation_target.clone()),
        );
        let engine = ValidationEngine::with_config(
            EngineConfig::new()
                .with_concurrency(config.probe_concurrency)
                .with_multiplier(config.candidate_multiplier)
                .with_strategy(config.strategy),
            Arc::new(prober),
        );

        let publisher = CatboxPublisher::with_config(
            PublisherConfig::new()
                .with_api_url(config.catbox_api_url.clone())
                .with_userhash(config.catbox_userhash.clone()),
        )?;

        Ok(Self {
            config: Arc::new(config),
            reader: Arc::new(reader),
            engine: Arc::new(engine),
            publisher: Arc::new(publisher),
        })
    }

    /// Wire explicit collaborators (used by tests to inject fakes)
    pub fn new(
        config: AppConfig,
        reader: FeedReader,
        engine: ValidationEngine,
        publisher: Arc<dyn Publish>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            reader: Arc::new(reader),
            engine: Arc::new(engine),
            publisher,
        }
    }
}

/// Query parameters for `/proxy`
#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    key: Option<String>,
    count: Option<String>,
}

/// JSON body returned by `/proxy`
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ApiResponse {
    fn ok(proxy_count: usize, url: String) -> Self {
        Self {
            success: true,
            message: format!("Generated {} live proxies", proxy_count),
            proxy_count: Some(proxy_count),
            url: Some(url),
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            message,
            proxy_count: None,
            url: None,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/home", get(home))
        .route("/proxy", get(get_proxy))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

async fn home() -> Html<&'static str> {
    Html(USAGE_HTML)
}

async fn get_proxy(
    State(state): State<AppState>,
    Query(params): Query<ProxyParams>,
) -> (StatusCode, Json<ApiResponse>) {
    if !authorized(&state.config, params.key.as_deref()) {
        let err = Error::Unauthorized;
        return (StatusCode::UNAUTHORIZED, Json(ApiResponse::err(err.to_string())));
    }

    // Non-numeric counts silently fall back to the default
    let requested = params.count.as_deref().and_then(|c| c.parse::<usize>().ok());
    let count = state.config.clamp_count(requested);

    match run_pipeline(&state, count).await {
        Ok((proxy_count, url)) => (StatusCode::OK, Json(ApiResponse::ok(proxy_count, url))),
        Err(e) => (status_for(&e), Json(ApiResponse::err(e.to_string()))),
    }
}

fn authorized(config: &AppConfig, key: Option<&str>) -> bool {
    match (&config.admin_key, key) {
        (Some(expected), Some(provided)) => expected == provided,
        _ => false,
    }
}

fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::Sourcing(_) | Error::Validation(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Run the full pipeline for one request
async fn run_pipeline(state: &AppState, count: usize) -> Result<(usize, String)> {
    info!(count, feeds = state.config.feeds.len(), "sourcing candidates");
    let candidates = state.reader.source(&state.config.feeds).await?;

    let pool = build_pool(candidates, state.config.shuffle);
    info!(pool = pool.len(), "pool built");

    let live = state.engine.validate(pool, count).await?;

    let content = live
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    let url = state.publisher.publish(content).await?;

    Ok((live.len(), url))
}
