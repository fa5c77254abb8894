use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use resto_core::persist::{load_index, IndexPaths};
use resto_core::{CoreError, DocId, DocumentRecord, FilterRequest, Mode, QueryRequest, SearchEngine, SearchOutcome, TermPolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;
const PREVIEW_CHARS: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub policy: Option<String>,
    /// Comma-separated lists
    #[serde(default)]
    pub facilities: Option<String>,
    #[serde(default)]
    pub cuisines: Option<String>,
    #[serde(default)]
    pub cards: Option<String>,
    #[serde(default)]
    pub price_min: Option<u8>,
    #[serde(default)]
    pub price_max: Option<u8>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub strict: bool,
}
fn default_k() -> usize { 10 }

impl SearchParams {
    fn into_request(self) -> Result<QueryRequest, CoreError> {
        let mode: Mode = match &self.mode {
            Some(m) => m.parse()?,
            None => Mode::Ranked,
        };
        let policy: TermPolicy = match &self.policy {
            Some(p) => p.parse()?,
            None => TermPolicy::Strict,
        };
        let mut request = QueryRequest::new(self.q, mode, self.k).with_policy(policy);
        if mode == Mode::Boosted {
            let defaults = FilterRequest::default();
            request = request.with_filter(FilterRequest {
                facilities: split_list(self.facilities.as_deref()),
                cuisines: split_list(self.cuisines.as_deref()),
                price_min: self.price_min.unwrap_or(defaults.price_min),
                price_max: self.price_max.unwrap_or(defaults.price_max),
                region: self.region.filter(|r| !r.trim().is_empty()),
                credit_cards: split_list(self.cards.as_deref()),
                strict: self.strict,
            });
        }
        Ok(request)
    }
}

fn split_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub mode: Mode,
    pub outcome: &'static str,
    pub took_ms: u128,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: Option<f32>,
    pub name: String,
    pub address: Option<String>,
    pub city: Option<String>,
    pub price_range: Option<String>,
    pub cuisine_type: Option<String>,
    pub description: String,
    pub website: Option<String>,
}

impl SearchHit {
    fn from_record(doc_id: DocId, score: Option<f32>, rec: &DocumentRecord) -> Self {
        Self {
            doc_id,
            score,
            name: rec.name.clone(),
            address: rec.address.clone(),
            city: rec.city.clone(),
            price_range: rec.price_range.clone(),
            cuisine_type: rec.cuisine_type.clone(),
            description: rec.description.chars().take(PREVIEW_CHARS).collect(),
            website: rec.website.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
}

/// Loads the index snapshot under `index_dir` and builds the router.
pub fn build_app(index_dir: &str) -> Result<Router> {
    let (engine, meta) = load_index(&IndexPaths::new(index_dir))?;
    tracing::info!(
        index = index_dir,
        num_docs = meta.num_docs,
        num_terms = meta.num_terms,
        created_at = %meta.created_at,
        "restaurant index loaded"
    );
    Ok(router(Arc::new(engine)))
}

pub fn router(engine: Arc<SearchEngine>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler).post(search_json_handler))
        .route("/restaurant/:doc_id", get(restaurant_handler))
        .with_state(AppState { engine })
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(std::env::var("CORS_ALLOW_ORIGIN").ok().as_deref()))
}

/// Origins come from a comma-separated list; unset or unparsable means any origin.
fn cors_layer(allowed: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed
        .unwrap_or("")
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .filter(|v: &HeaderValue| !v.is_empty())
        .collect();
    let origin = if origins.is_empty() { AllowOrigin::any() } else { AllowOrigin::list(origins) };
    CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let request = params.into_request().map_err(bad_request)?;
    run_search(&state, request)
}

pub async fn search_json_handler(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    run_search(&state, request)
}

fn run_search(state: &AppState, mut request: QueryRequest) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    request.k = request.k.clamp(1, MAX_K);
    let outcome = state.engine.search(&request).map_err(bad_request)?;

    let (label, total_hits, rows): (&'static str, usize, Vec<(DocId, Option<f32>)>) = match &outcome {
        SearchOutcome::NoRecognizedTerms => ("no_recognized_terms", 0, vec![]),
        SearchOutcome::NoMatch => ("no_match", 0, vec![]),
        SearchOutcome::Matched { documents } => {
            ("matched", documents.len(), documents.iter().take(request.k).map(|d| (*d, None)).collect())
        }
        SearchOutcome::Ranked { candidates, results } => {
            ("ranked", *candidates, results.iter().map(|r| (r.doc_id, Some(r.score))).collect())
        }
    };
    let results = rows
        .into_iter()
        .filter_map(|(doc_id, score)| state.engine.record(doc_id).map(|rec| SearchHit::from_record(doc_id, score, rec)))
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %request.text, mode = %request.mode, outcome = label, total_hits, "search served");
    Ok(Json(SearchResponse {
        query: request.text,
        mode: request.mode,
        outcome: label,
        took_ms: elapsed.as_millis(),
        took_s: elapsed.as_secs_f64(),
        total_hits,
        results,
    }))
}

pub async fn restaurant_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<DocumentRecord>, (StatusCode, String)> {
    match state.engine.record(doc_id) {
        Some(rec) => Ok(Json(rec.clone())),
        None => Err((StatusCode::NOT_FOUND, format!("restaurant {doc_id} not found"))),
    }
}

fn bad_request(err: CoreError) -> (StatusCode, String) { (StatusCode::BAD_REQUEST, err.to_string()) }
