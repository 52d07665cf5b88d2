//! Web dashboard

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use equity_core::report::{Formatter, HtmlFormatter, escape_html};
use equity_core::{
    AnalyzeOptions, BacktestOutcome, ChartOutcome, ResearchError, ResearchOutcome,
    ResearchPipeline, SearchResult,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const DEFAULT_SEARCH_LIMIT: usize = 10;
const DEFAULT_CAPITAL: f64 = 10_000.0;
const DEFAULT_CHART_DAYS: usize = 90;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ResearchPipeline>,
}

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

pub struct AppError(ResearchError);

impl From<ResearchError> for AppError {
    fn from(err: ResearchError) -> Self {
        Self(err)
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            ResearchError::InvalidSymbol(_) | ResearchError::ConfigError(_) => {
                StatusCode::BAD_REQUEST
            }
            ResearchError::DataUnavailable { .. } => StatusCode::NOT_FOUND,
            ResearchError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ResearchError::RateLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(ApiResponse::<()>::error(self.0.to_string()))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CacheQuery {
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub ticker: String,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BacktestQuery {
    pub capital: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub days: Option<usize>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/report", get(report_form))
        .route("/report/:ticker", get(report_page))
        .route("/api/analyze/:ticker", get(analyze))
        .route("/api/search", get(search))
        .route("/api/backtest/:ticker", get(backtest))
        .route("/api/chart/:ticker", get(chart))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(pipeline: Arc<ResearchPipeline>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(AppState { pipeline });
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Dashboard listening");
    println!("🌐 Dashboard running at http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let popular: String = state
        .pipeline
        .searcher()
        .popular()
        .iter()
        .map(|stock| {
            format!(
                "<li><a href=\"/report/{0}\">{0}</a> {1}</li>",
                escape_html(&stock.symbol),
                escape_html(&stock.name)
            )
        })
        .collect();

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\">\
         <title>Equity Research</title></head>\n<body>\n\
         <h1>Equity Research</h1>\n\
         <form action=\"/report\" method=\"get\">\
         <input name=\"ticker\" placeholder=\"Ticker or company\" required> \
         <label><input type=\"checkbox\" name=\"use_cache\" value=\"false\"> refresh</label> \
         <button type=\"submit\">Analyze</button></form>\n\
         <h2>Popular</h2>\n<ul>{popular}</ul>\n</body>\n</html>"
    ))
}

async fn report_form(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> (StatusCode, Html<String>) {
    render_report(&state, &query.ticker, query.use_cache).await
}

async fn report_page(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<CacheQuery>,
) -> (StatusCode, Html<String>) {
    render_report(&state, &ticker, query.use_cache).await
}

async fn render_report(state: &AppState, ticker: &str, use_cache: bool) -> (StatusCode, Html<String>) {
    // Page views are read-only; saved reports come from the CLI and JSON API
    let options = AnalyzeOptions {
        use_cache,
        save_report: false,
        ..AnalyzeOptions::default()
    };
    match state.pipeline.analyze(ticker, &options).await {
        Ok(outcome) => (StatusCode::OK, Html(HtmlFormatter.render(&outcome.report))),
        Err(e) => {
            let error = AppError(e);
            tracing::warn!(ticker, error = %error.0, "Report failed");
            (error.status(), Html(HtmlFormatter.format_error(&error.0.to_string())))
        }
    }
}

async fn analyze(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<CacheQuery>,
) -> Result<Json<ApiResponse<ResearchOutcome>>, AppError> {
    let options = AnalyzeOptions {
        use_cache: query.use_cache,
        ..AnalyzeOptions::default()
    };
    let outcome = state.pipeline.analyze(&ticker, &options).await?;
    tracing::info!(symbol = %outcome.symbol.symbol, "Served analysis");
    Ok(Json(ApiResponse::success(outcome)))
}

async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<ApiResponse<Vec<SearchResult>>> {
    let limit = query.limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
    Json(ApiResponse::success(
        state.pipeline.searcher().find(&query.q, limit),
    ))
}

async fn backtest(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<BacktestQuery>,
) -> Result<Json<ApiResponse<BacktestOutcome>>, AppError> {
    let capital = query.capital.unwrap_or(DEFAULT_CAPITAL);
    let outcome = state.pipeline.backtest(&ticker, capital).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

async fn chart(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ApiResponse<ChartOutcome>>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_CHART_DAYS);
    let outcome = state.pipeline.chart(&ticker, days).await?;
    Ok(Json(ApiResponse::success(outcome)))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use equity_core::data::{MarketDataProvider, PriceBar, TickerInfo};
    use equity_core::{ResearchConfig, StockDatabase};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl MarketDataProvider for Offline {
        async fn history(&self, symbol: &str, _range: &str) -> equity_core::Result<Vec<PriceBar>> {
            Err(ResearchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "offline".to_string(),
            })
        }

        async fn ticker_info(&self, symbol: &str) -> equity_core::Result<TickerInfo> {
            Err(ResearchError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    fn pipeline(dir: &TempDir) -> Arc<ResearchPipeline> {
        let config = ResearchConfig::builder()
            .cache_dir(dir.path().join("cache"))
            .output_dir(dir.path().join("outputs"))
            .build()
            .unwrap();
        Arc::new(ResearchPipeline::with_provider(
            config,
            Arc::new(Offline),
            StockDatabase::builtin(),
        ))
    }

    fn app(dir: &TempDir) -> Router {
        router(AppState {
            pipeline: pipeline(dir),
        })
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/health").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/api/search?q=fiserw&limit=3").await;
        assert_eq!(status, StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"][0]["symbol"], "FISV");
        assert_eq!(json["data"][0]["match_type"], "search_term");
    }

    #[tokio::test]
    async fn test_index_lists_popular_tickers() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<form action=\"/report\""));
        assert!(body.contains("/report/AAPL"));
    }

    #[tokio::test]
    async fn test_invalid_symbol_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/api/analyze/no%20such%20company%20at%20all").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("Invalid symbol"));
    }

    #[tokio::test]
    async fn test_report_error_page_is_escaped_html() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/report?ticker=%3Cb%3Ebad%20input%20here%3C%2Fb%3E").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("<h1>Error</h1>"));
        assert!(!body.contains("<b>bad"));
    }

    #[tokio::test]
    async fn test_report_page_does_not_write_files() {
        let dir = TempDir::new().unwrap();
        let (status, body) = get(app(&dir), "/report/AAPL").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("AAPL"));

        let outputs = dir.path().join("outputs");
        let written = std::fs::read_dir(&outputs).map(|entries| entries.count()).unwrap_or(0);
        assert_eq!(written, 0);
    }
}
