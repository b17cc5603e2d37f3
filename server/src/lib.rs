use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use retrieval_core::corpus::load_corpus_dir;
use retrieval_core::report::RetrievedDoc;
use retrieval_core::tokenizer::tokenize;
use retrieval_core::{evaluate_single_query, Bm25Params, CorpusIndex, Document, RetrievalMetrics, Retriever};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;
const SNIPPET_LEAD: usize = 100;
const SNIPPET_LEN: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 10 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    /// Documents with a non-zero score, before truncation to `k`.
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: String,
    pub score: f64,
    pub snippet: Option<String>,
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub query: String,
    #[serde(default)]
    pub relevant_docs: HashSet<String>,
    #[serde(default = "default_eval_k")]
    pub k: usize,
}
fn default_eval_k() -> usize { 3 }

#[derive(Serialize)]
pub struct EvaluateResponse {
    pub query: String,
    pub retrieved_docs: Vec<RetrievedDoc>,
    pub metrics: RetrievalMetrics,
}

#[derive(Clone)]
pub struct AppState {
    pub retriever: Retriever,
}

/// Build the index from a corpus directory and wire up the routes.
pub fn build_app(corpus_dir: &str, params: Bm25Params) -> Result<Router> {
    params.validate()?;
    let docs = load_corpus_dir(corpus_dir)?;
    build_app_from_docs(docs, params)
}

pub fn build_app_from_docs(docs: Vec<Document>, params: Bm25Params) -> Result<Router> {
    params.validate()?;
    let index = Arc::new(CorpusIndex::build(docs));
    let app_state = AppState { retriever: Retriever::new(index, params) };

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

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/evaluate", post(evaluate_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.min(MAX_K);
    let mut ranked = state.retriever.rank(&params.q);
    let total_hits = ranked.iter().filter(|(_, s)| *s > 0.0).count();
    ranked.truncate(k);

    let highlight = highlight_regex(&query_terms(&params.q));
    let results = ranked
        .into_iter()
        .map(|(doc, score)| SearchHit { doc_id: doc.id.clone(), score, snippet: snippet(&doc.text, highlight.as_ref()) })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, k, total_hits, "search");
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<String>) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.retriever.index().get(&doc_id) {
        Some(d) => Ok(Json(serde_json::json!({
            "doc_id": d.doc.id,
            "length": d.length,
            "text": d.doc.text,
        }))),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))),
    }
}

pub async fn evaluate_handler(State(state): State<AppState>, Json(req): Json<EvaluateRequest>) -> Json<EvaluateResponse> {
    let retrieved = state.retriever.retrieve(&req.query, req.k.min(MAX_K));
    let ids: Vec<&str> = retrieved.iter().map(|(d, _)| d.id.as_str()).collect();
    let metrics = evaluate_single_query(&ids, &req.relevant_docs);
    let retrieved_docs = retrieved
        .iter()
        .map(|(d, score)| RetrievedDoc { doc_id: d.id.clone(), score: *score })
        .collect();
    Json(EvaluateResponse { query: req.query, retrieved_docs, metrics })
}

/// Distinct normalized query terms, first occurrence first.
fn query_terms(q: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    tokenize(q).into_iter().filter(|t| seen.insert(t.clone())).collect()
}

/// One case-insensitive alternation over all terms, longest first, so a
/// single pass never rescans inserted markup.
fn highlight_regex(terms: &[String]) -> Option<Regex> {
    if terms.is_empty() {
        return None;
    }
    let mut terms: Vec<&str> = terms.iter().map(String::as_str).collect();
    terms.sort_by_key(|t| std::cmp::Reverse(t.chars().count()));
    let pattern = terms.iter().map(|t| regex::escape(t)).collect::<Vec<_>>().join("|");
    RegexBuilder::new(&pattern).case_insensitive(true).build().ok()
}

/// Up to `SNIPPET_LEN` characters starting shortly before the first match,
/// with matches wrapped in `<em>`.
fn snippet(text: &str, highlight: Option<&Regex>) -> Option<String> {
    if text.is_empty() { return None; }
    let start = match highlight.and_then(|re| re.find(text)) {
        Some(m) => text[..m.start()].chars().count().saturating_sub(SNIPPET_LEAD),
        None => 0,
    };
    let excerpt: String = text.chars().skip(start).take(SNIPPET_LEN).collect();
    Some(match highlight {
        Some(re) => re.replace_all(&excerpt, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).into_owned(),
        None => excerpt,
    })
}
