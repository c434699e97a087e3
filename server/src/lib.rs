use algoseek_core::corpus::load_corpus;
use algoseek_core::{build_index, search, CorpusIndex, DocId, Document, IndexHandle, IndexStats, SearchConfig};
use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::{HeaderMap, StatusCode}, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub processed_query: String,
    pub total_results: usize,
    pub search_time_ms: f64,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub doc_id: DocId,
    #[serde(flatten)]
    pub document: Document,
    pub platform: &'static str,
    pub bm25_score: f32,
    pub title_boost: f32,
    pub final_score: f32,
    /// Final score as a percentage of the best hit in this response.
    pub relevance_score: f32,
}

/// Keys `SearchHit` writes next to the flattened document. Passthrough fields
/// with these names are dropped so each key appears once in a hit.
const HIT_KEYS: &[&str] = &["docId", "platform", "bm25Score", "titleBoost", "finalScore", "relevanceScore"];

pub struct ServerOptions {
    pub corpus: PathBuf,
    pub config: SearchConfig,
    /// Enables `POST /index/reload` when set.
    pub admin_token: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<IndexHandle>,
    pub corpus: PathBuf,
    pub config: Arc<SearchConfig>,
    pub admin_token: Option<String>,
}

/// Load the corpus, build the index and wire up the routes.
pub fn build_app(options: ServerOptions) -> Result<Router> {
    let index = load_and_build(&options.corpus, &options.config)?;
    let state = AppState {
        index: Arc::new(IndexHandle::new(index)),
        corpus: options.corpus,
        config: Arc::new(options.config),
        admin_token: options.admin_token,
    };
    Ok(router(state))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_get).post(search_post))
        .route("/stats", get(stats_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/reload", post(reload_handler))
        .with_state(state)
        .layer(cors_from_env())
        .layer(TraceLayer::new_for_http())
}

fn load_and_build(corpus: &std::path::Path, config: &SearchConfig) -> Result<CorpusIndex> {
    let documents = load_corpus(corpus)?;
    Ok(build_index(documents, config))
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_from_env() -> CorsLayer {
    let any = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                any
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => any,
    }
}

/// Display label for the site a problem comes from.
pub fn platform_for(url: &str) -> &'static str {
    if url.contains("leetcode.com") {
        "Leetcode"
    } else if url.contains("codeforces.com") {
        "Codeforces"
    } else if url.contains("cses.fi") {
        "CSES"
    } else if url.contains("interviewbit.com") {
        "InterviewBit"
    } else {
        "Other"
    }
}

fn error(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

pub async fn search_get(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    Json(run_search(&state, params.q, params.k))
}

pub async fn search_post(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = match body.get("query").and_then(|v| v.as_str()) {
        Some(q) if !q.is_empty() => q.to_string(),
        _ => {
            tracing::warn!(body = %body, "rejected search request");
            return Err(error(StatusCode::BAD_REQUEST, "Invalid query"));
        }
    };
    let limit = body.get("limit").and_then(|v| v.as_u64()).map(|v| v as usize);
    Ok(Json(run_search(&state, query, limit)))
}

fn run_search(state: &AppState, query: String, limit: Option<usize>) -> SearchResponse {
    let start = Instant::now();
    // keep one snapshot for the whole request, even if a reload lands meanwhile
    let index = state.index.snapshot();
    let outcome = search(&query, &index, state.config.clamp_limit(limit));
    let best = outcome.results.first().map(|r| r.final_score).unwrap_or(0.0);

    let results = outcome
        .results
        .iter()
        .filter_map(|r| {
            let mut document = index.document(r.doc_id)?.clone();
            document.extra.retain(|key, _| !HIT_KEYS.contains(&key.as_str()));
            Some(SearchHit {
                doc_id: r.doc_id,
                platform: platform_for(&document.url),
                document,
                bm25_score: r.bm25_score,
                title_boost: r.title_boost,
                final_score: r.final_score,
                relevance_score: if best > 0.0 { r.final_score / best * 100.0 } else { 0.0 },
            })
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::info!(query = %query, total_hits = outcome.total_hits, took_ms = elapsed.as_millis() as u64, "search");
    SearchResponse {
        query,
        processed_query: outcome.processed_query.join(" "),
        total_results: outcome.total_hits,
        search_time_ms: elapsed.as_secs_f64() * 1000.0,
        results,
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.index.snapshot().stats())
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<DocId>) -> Result<Json<Document>, ApiError> {
    state
        .index
        .snapshot()
        .document(doc_id)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "not found"))
}

/// Rebuild from the corpus path on a blocking thread, then swap the new index in.
async fn reload_handler(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<IndexStats>, ApiError> {
    authorize(&state, &headers)?;
    let corpus = state.corpus.clone();
    let config = state.config.clone();
    let built = tokio::task::spawn_blocking(move || load_and_build(&corpus, &config))
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()))?;
    let index = built.map_err(|e| {
        tracing::warn!(error = %format!("{e:#}"), "reload failed, keeping current index");
        error(StatusCode::INTERNAL_SERVER_ERROR, &format!("{e:#}"))
    })?;
    let stats = index.stats();
    state.index.replace(index);
    Ok(Json(stats))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err(error(StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set")),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "invalid admin token"))
    }
}
