use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use server::AppSettings;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tower::ServiceExt;

fn write_tiny_corpus(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("corpus.jsonl");
    let lines = [
        r#"{"title": "Doc 0", "body": "the cat sat", "static_quality_score": 0.1}"#,
        r#"{"title": "Doc 1", "body": "the cat sat on the mat", "static_quality_score": 0.2}"#,
        r#"{"title": "Doc 2", "body": "dogs chase cats", "doc_id": 99}"#,
    ];
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn settings(path: std::path::PathBuf) -> AppSettings {
    AppSettings { corpus_path: path, fields: vec!["title".into(), "body".into()], stemming: false }
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(request).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into_owned()));
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn search_returns_ranked_results() {
    let dir = tempdir().unwrap();
    let app = server::build_app(settings(write_tiny_corpus(dir.path()))).unwrap();

    let (status, json) = call(app, get("/search?q=cat%20mat&k=2&threshold=0.5&ranker=brain-dead")).await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 2);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 1);
    assert_eq!(arr[0]["score"].as_f64().unwrap(), 2.0);
    assert_eq!(arr[1]["doc_id"].as_u64().unwrap(), 0);
    assert_eq!(arr[0]["title"], "Doc 1");
    assert_eq!(arr[0]["snippet"], "the <em>cat</em> sat on the <em>mat</em>");
}

#[tokio::test]
async fn full_threshold_is_conjunctive() {
    let dir = tempdir().unwrap();
    let app = server::build_app(settings(write_tiny_corpus(dir.path()))).unwrap();
    let (status, json) = call(app, get("/search?q=cat+mat&threshold=1.0")).await;
    assert_eq!(status, StatusCode::OK);
    let arr = json["results"].as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["doc_id"].as_u64().unwrap(), 1);
}

#[tokio::test]
async fn invalid_threshold_is_a_bad_request() {
    let dir = tempdir().unwrap();
    let app = server::build_app(settings(write_tiny_corpus(dir.path()))).unwrap();
    let (status, _) = call(app, get("/search?q=cat&threshold=0")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn phrase_and_doc_endpoints() {
    let dir = tempdir().unwrap();
    let app = server::build_app(settings(write_tiny_corpus(dir.path()))).unwrap();

    let (status, json) = call(app.clone(), get("/phrase?q=the%20ca")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = json["results"].as_array().unwrap().iter().map(|h| h["doc_id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![0, 1]);

    let (status, json) = call(app.clone(), get("/doc/2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["body"], "dogs chase cats");
    assert_eq!(json["doc_id"], 2);

    let (status, _) = call(app, get("/doc/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reload_requires_admin_token() {
    let dir = tempdir().unwrap();
    std::env::remove_var("ADMIN_TOKEN");
    let app = server::build_app(settings(write_tiny_corpus(dir.path()))).unwrap();
    let request = Request::post("/index/reload").body(Body::empty()).unwrap();
    let (status, _) = call(app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
