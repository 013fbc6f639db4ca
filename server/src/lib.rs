use anyhow::Result;
use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use parking_lot::RwLock;
use searchcore::{
    Analyzer, Corpus, Document, InMemoryCorpus, InvertedIndex, PhraseOptions, RankerKind, SearchEngine, SearchOptions,
    StringFinder, SuffixArray, Trie,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Where the corpus lives and how to analyze it.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub corpus_path: PathBuf,
    pub fields: Vec<String>,
    pub stemming: bool,
}

impl AppSettings {
    fn analyzer(&self) -> Analyzer {
        if self.stemming { Analyzer::english() } else { Analyzer::simple() }
    }
}

/// Everything built from one load of the corpus. Immutable once built.
pub struct Snapshot {
    pub corpus: InMemoryCorpus,
    pub index: InvertedIndex,
    pub phrases: SuffixArray,
}

impl Snapshot {
    pub fn load(settings: &AppSettings) -> Result<Self> {
        let corpus = InMemoryCorpus::load(&settings.corpus_path)?;
        let index = InvertedIndex::build(&corpus, &settings.fields, settings.analyzer())?;
        let phrases = SuffixArray::build(&corpus, &settings.fields, settings.analyzer());
        Ok(Self { corpus, index, phrases })
    }
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub ranker: RankerKind,
    #[serde(default)]
    pub debug: bool,
}
fn default_k() -> usize { 10 }
fn default_threshold() -> f64 { 0.5 }

#[derive(Deserialize)]
pub struct PhraseParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_ms: u128,
    pub took_s: f64,
    pub results: Vec<SearchHit>,
}

#[derive(Serialize)]
pub struct SearchHit {
    pub doc_id: u32,
    pub score: f64,
    pub title: Option<String>,
    pub snippet: Option<String>,
}

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub snapshot: Arc<RwLock<Arc<Snapshot>>>,
    pub admin_token: Option<String>,
}

impl AppState {
    fn current(&self) -> Arc<Snapshot> {
        self.snapshot.read().clone()
    }
}

type ApiError = (StatusCode, String);

fn bad_request(err: searchcore::Error) -> ApiError {
    (StatusCode::BAD_REQUEST, err.to_string())
}

pub fn build_app(settings: AppSettings) -> Result<Router> {
    // Build the in-memory index at startup
    let snapshot = Snapshot::load(&settings)?;
    let admin_token = std::env::var("ADMIN_TOKEN").ok();
    let app_state = AppState {
        settings: Arc::new(settings),
        snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
        admin_token,
    };

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
        .route("/phrase", get(phrase_handler))
        .route("/doc/:doc_id", get(doc_handler))
        .route("/index/reload", post(index_reload))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    Ok(app)
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let snapshot = state.current();
    let engine = SearchEngine::new(&snapshot.corpus, &snapshot.index);
    let options = SearchOptions {
        match_threshold: params.threshold,
        hit_count: Some(params.k.clamp(1, 100)),
        debug: params.debug,
    };
    let mut ranker = params.ranker.build(&snapshot.corpus, &snapshot.index);

    let highlighter = Highlighter::new(&params.q, &snapshot.index);
    let mut results: Vec<SearchHit> = Vec::new();
    engine
        .evaluate(&params.q, &options, ranker.as_mut(), |hit| {
            results.push(SearchHit {
                doc_id: hit.document.document_id(),
                score: hit.score,
                title: hit.document.text("title").map(str::to_owned),
                snippet: highlighter.snippet(hit.document, &state.settings.fields),
            })
        })
        .map_err(bad_request)?;

    let elapsed = start.elapsed();
    tracing::info!(query = %params.q, hits = results.len(), took_ms = elapsed.as_millis() as u64, "search");
    Ok(Json(SearchResponse { query: params.q, took_ms: elapsed.as_millis(), took_s: elapsed.as_secs_f64(), results }))
}

pub async fn phrase_handler(
    State(state): State<AppState>,
    Query(params): Query<PhraseParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let start = std::time::Instant::now();
    let snapshot = state.current();
    let options = PhraseOptions { hit_count: Some(params.k.clamp(1, 100)) };
    let mut results: Vec<SearchHit> = Vec::new();
    snapshot
        .phrases
        .evaluate(&snapshot.corpus, &params.q, &options, |hit| {
            results.push(SearchHit {
                doc_id: hit.document.document_id(),
                score: hit.score,
                title: hit.document.text("title").map(str::to_owned),
                snippet: None,
            })
        })
        .map_err(bad_request)?;
    let elapsed = start.elapsed();
    Ok(Json(SearchResponse { query: params.q, took_ms: elapsed.as_millis(), took_s: elapsed.as_secs_f64(), results }))
}

pub async fn doc_handler(State(state): State<AppState>, Path(doc_id): Path<u32>) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.current();
    match snapshot.corpus.get_document(doc_id) {
        Some(doc) => {
            let mut obj = serde_json::Map::new();
            for (name, value) in doc.fields() {
                let value = serde_json::to_value(value).map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
                obj.insert(name.to_owned(), value);
            }
            // the path id wins over a stored field of the same name
            obj.insert("doc_id".to_owned(), doc_id.into());
            Ok(Json(serde_json::Value::Object(obj)))
        }
        None => Err((StatusCode::NOT_FOUND, format!("document {doc_id} not found"))),
    }
}

/// Marks query terms in document text using a trie of the analyzed query.
struct Highlighter {
    trie: Trie,
    analyzer: Analyzer,
}

impl Highlighter {
    fn new(query: &str, index: &InvertedIndex) -> Self {
        let analyzer = index.analyzer().clone();
        let mut trie = Trie::new();
        for term in analyzer.terms(query) {
            trie.insert(&term);
        }
        Self { trie, analyzer }
    }

    fn snippet(&self, doc: &Document, fields: &[String]) -> Option<String> {
        let text = fields.iter().filter(|f| f.as_str() != "title").find_map(|f| doc.text(f))?;
        if text.is_empty() {
            return None;
        }
        let mut ranges: Vec<(usize, usize)> = Vec::new();
        StringFinder::new(&self.trie, self.analyzer.clone()).scan(text, |m| ranges.push(m.range));

        let (start, end) = match ranges.first() {
            Some(&(idx, _)) => (floor_boundary(text, idx.saturating_sub(100)), floor_boundary(text, (idx + 200).min(text.len()))),
            None => (0, floor_boundary(text, text.len().min(200))),
        };
        let mut out = String::with_capacity(end - start + 16 * ranges.len());
        let mut cursor = start;
        for (s, e) in ranges {
            if s < cursor || e > end {
                continue;
            }
            out.push_str(&text[cursor..s]);
            out.push_str("<em>");
            out.push_str(&text[s..e]);
            out.push_str("</em>");
            cursor = e;
        }
        out.push_str(&text[cursor..end]);
        Some(out)
    }
}

fn floor_boundary(text: &str, mut idx: usize) -> usize {
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

// --- Admin endpoints ---
async fn index_reload(State(state): State<AppState>, headers: axum::http::HeaderMap) -> Result<Json<serde_json::Value>, ApiError> {
    authorize(&state, &headers)?;
    let settings = state.settings.clone();
    let snapshot = tokio::task::spawn_blocking(move || Snapshot::load(&settings))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}")))?;
    let body = serde_json::json!({
        "num_docs": snapshot.corpus.size(),
        "num_terms": snapshot.index.dictionary().size(),
    });
    *state.snapshot.write() = Arc::new(snapshot);
    tracing::info!(%body, "index reloaded");
    Ok(Json(body))
}

fn authorize(state: &AppState, headers: &axum::http::HeaderMap) -> Result<(), ApiError> {
    let required = match &state.admin_token {
        Some(t) => t,
        None => return Err((StatusCode::UNAUTHORIZED, "ADMIN_TOKEN not set".into())),
    };
    let provided = headers.get("X-ADMIN-TOKEN").and_then(|v| v.to_str().ok()).unwrap_or("");
    if provided == required {
        Ok(())
    } else {
        Err((StatusCode::UNAUTHORIZED, "invalid admin token".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_highlights_query_terms() {
        let mut corpus = InMemoryCorpus::new();
        corpus.add_document([("title", "Cats"), ("body", "The Cat sat on the mat.")]);
        let index = InvertedIndex::build(&corpus, &["title", "body"], Analyzer::simple()).unwrap();
        let highlighter = Highlighter::new("cat mat", &index);
        let doc = corpus.get_document(0).unwrap();
        let snippet = highlighter.snippet(doc, &["title".to_owned(), "body".to_owned()]).unwrap();
        assert_eq!(snippet, "The <em>Cat</em> sat on the <em>mat</em>.");
    }

    #[test]
    fn floor_boundary_stays_on_char_boundaries() {
        let text = "aøb";
        assert_eq!(floor_boundary(text, 2), 1);
        assert_eq!(floor_boundary(text, 3), 3);
    }
}
