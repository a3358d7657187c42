use anyhow::Result;
use axum::{extract::{Query, State}, http::StatusCode, routing::get, Json, Router};
use search_core::corpus::load_pages;
use search_core::{EngineConfig, RankingPolicy, SearchEngine};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub mode: RankingPolicy,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Deserialize)]
pub struct PageParams {
    pub url: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: RankingPolicy,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub url: String,
    pub title: String,
    pub score: f64,
    pub page_rank: f64,
    pub snippet: Option<String>,
}

#[derive(Serialize)]
pub struct PageRankResponse {
    pub iterations: usize,
    pub converged: bool,
    pub delta: f64,
    pub ranks: BTreeMap<String, f64>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

/// Load the crawl at `pages`, build the engine, then wire the routes. Nothing is served
/// until the engine is fully built.
pub fn build_app(pages: &str, config: &EngineConfig) -> Result<Router> {
    let pages = load_pages(pages)?;
    let engine = SearchEngine::from_config(pages, config)?;
    Ok(router(Arc::new(engine)))
}

pub fn router(engine: Arc<SearchEngine>) -> Router {
    let app_state = AppState { engine };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/page", get(page_handler))
        .route("/pagerank", get(pagerank_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let words: Vec<&str> = params.q.split_whitespace().collect();
    let hits = state
        .engine
        .rank(params.mode, &words)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let total_hits = hits.len();
    let k = params.k.clamp(1, 100);
    let mut results = Vec::with_capacity(k.min(total_hits));
    for hit in hits.into_iter().take(k) {
        let title = state.engine.page(&hit.url).map(|p| p.title().to_string()).unwrap_or_default();
        let snippet = Some(state.engine.snippet(&hit.url, &words))
            .filter(|s| !s.is_empty())
            .map(|s| highlight_terms(&s, &words));
        let page_rank = state.engine.page_rank(&hit.url).unwrap_or(0.0);
        results.push(SearchHit { url: hit.url, title, score: hit.score, page_rank, snippet });
    }

    tracing::debug!(query = %params.q, mode = %params.mode, total_hits, "search served");
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, mode: params.mode, took_s: elapsed.as_secs_f64(), total_hits, results }))
}

pub async fn page_handler(State(state): State<AppState>, Query(params): Query<PageParams>) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let Some(page) = state.engine.page(&params.url) else {
        return Err((StatusCode::NOT_FOUND, format!("no page with url {}", params.url)));
    };
    let incoming = state.engine.page_rank_solver().incoming(page.url()).cloned().unwrap_or_default();
    Ok(Json(serde_json::json!({
        "url": page.url(),
        "title": page.title(),
        "header": page.header(),
        "body": page.body(),
        "links": page.links(),
        "incoming": incoming,
        "page_rank": state.engine.page_rank(page.url()),
    })))
}

pub async fn pagerank_handler(State(state): State<AppState>) -> Json<PageRankResponse> {
    let solver = state.engine.page_rank_solver();
    Json(PageRankResponse {
        iterations: solver.iterations(),
        converged: solver.converged(),
        delta: solver.delta(),
        ranks: solver.ranks().clone(),
    })
}

fn highlight_terms(snippet: &str, terms: &[&str]) -> String {
    let mut s = snippet.to_string();
    for t in terms {
        if t.trim().is_empty() { continue; }
        let Ok(pat) = regex::RegexBuilder::new(&regex::escape(t)).case_insensitive(true).build() else { continue };
        s = pat.replace_all(&s, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string();
    }
    s
}
