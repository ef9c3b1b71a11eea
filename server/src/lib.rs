use anyhow::{Context, Result};
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::get, Json, Router};
use retrieval_core::dataset::load_corpus;
use retrieval_core::tokenizer::tokenize;
use retrieval_core::{Bm25Params, CorpusIndex, DocId, Document, ScoringModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

const MAX_K: usize = 100;
const SNIPPET_BEFORE: usize = 100;
const SNIPPET_AFTER: usize = 200;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_model")]
    pub model: ScoringModel,
}
fn default_k() -> usize { 10 }
fn default_model() -> ScoringModel { ScoringModel::Bm25 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub model: ScoringModel,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f64,
    pub title: String,
    pub snippet: Option<String>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub num_docs: u32,
    pub num_terms: usize,
    pub avg_doc_len: f64,
    pub bm25: Bm25Params,
}

#[derive(Clone)]
pub struct AppState {
    pub index: Arc<CorpusIndex>,
    pub docs: Arc<HashMap<DocId, Document>>,
    pub bm25: Bm25Params,
}

/// Load the corpus at `corpus_path` and build the router around it.
pub fn build_app(corpus_path: &str, bm25: Bm25Params) -> Result<Router> {
    let docs = load_corpus(corpus_path)?;
    build_app_from_documents(docs, bm25)
}

pub fn build_app_from_documents(docs: Vec<Document>, bm25: Bm25Params) -> Result<Router> {
    let index = CorpusIndex::build(&docs).context("building corpus index")?;
    let docs: HashMap<DocId, Document> = docs.into_iter().map(|d| (d.doc_id, d)).collect();
    let app_state = AppState { index: Arc::new(index), docs: Arc::new(docs), bm25 };

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
        .route("/stats", get(stats_handler))
        .route("/search", get(search_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let scorer = params.model.scorer(&state.index, state.bm25);
    // rank every candidate so total_hits is exact, then cut to k
    let ranked = scorer.score(&params.q, state.index.document_count() as usize);
    let total_hits = ranked.len();
    let k = params.k.clamp(1, MAX_K);

    let terms = tokenize(&params.q);
    let results: Vec<SearchHit> = ranked
        .into_iter()
        .take(k)
        .filter_map(|(doc_id, score)| {
            let doc = state.docs.get(&doc_id)?;
            Some(SearchHit { doc_id, score, title: doc.title.clone(), snippet: snippet(&doc.text, &terms) })
        })
        .collect();

    let elapsed = start.elapsed();
    tracing::debug!(query = %params.q, model = %params.model, total_hits, "search");
    Json(SearchResponse { query: params.q, model: params.model, took_s: elapsed.as_secs_f64(), total_hits, results })
}

pub async fn doc_handler(
    State(state): State<AppState>,
    Path(doc_id): Path<DocId>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    match state.docs.get(&doc_id) {
        Some(doc) => Ok(Json(serde_json::json!({
            "doc_id": doc_id,
            "title": doc.title,
            "text": doc.text,
            "length": state.index.document_length(doc_id),
        }))),
        None => Err((StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": "not found" })))),
    }
}

pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        num_docs: state.index.document_count(),
        num_terms: state.index.vocabulary_size(),
        avg_doc_len: state.index.average_document_length(),
        bm25: state.bm25,
    })
}

/// Window of `text` around the first query term, with every term wrapped in `<em>`.
/// Falls back to the start of the text when no term occurs.
fn snippet(text: &str, terms: &[String]) -> Option<String> {
    if text.is_empty() { return None; }
    // ASCII lowercasing keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();
    let first_idx = terms.iter().filter_map(|t| lower.find(t.as_str())).min();
    let window = match first_idx {
        Some(idx) => {
            let start = floor_boundary(text, idx.saturating_sub(SNIPPET_BEFORE));
            let end = ceil_boundary(text, (idx + SNIPPET_AFTER).min(text.len()));
            &text[start..end]
        }
        None => {
            let end = text.char_indices().nth(SNIPPET_AFTER).map(|(i, _)| i).unwrap_or(text.len());
            &text[..end]
        }
    };
    Some(highlight_terms(window, terms))
}

fn floor_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) { i -= 1; }
    i
}

fn ceil_boundary(s: &str, mut i: usize) -> usize {
    while !s.is_char_boundary(i) { i += 1; }
    i
}

fn highlight_terms(snippet: &str, terms: &[String]) -> String {
    if terms.is_empty() { return snippet.to_string(); }
    let alternation: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    let Ok(pat) = regex::RegexBuilder::new(&format!(r"\b(?:{})\b", alternation.join("|")))
        .case_insensitive(true)
        .build()
    else {
        return snippet.to_string();
    };
    pat.replace_all(snippet, |caps: &regex::Captures| format!("<em>{}</em>", &caps[0])).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_highlights_whole_terms() {
        let s = snippet("BM25 beats tf-idf; bm25s is different.", &["bm25".to_string()]).unwrap();
        assert_eq!(s, "<em>BM25</em> beats tf-idf; bm25s is different.");
    }

    #[test]
    fn snippet_respects_char_boundaries() {
        let text = format!("{} ranking", "é".repeat(80));
        let s = snippet(&text, &["ranking".to_string()]).unwrap();
        assert!(s.ends_with("<em>ranking</em>"));
    }

    #[test]
    fn snippet_without_match_uses_prefix() {
        assert_eq!(snippet("short text", &["zzz".to_string()]).unwrap(), "short text");
        assert!(snippet("", &[]).is_none());
    }
}
