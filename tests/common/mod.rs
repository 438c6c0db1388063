#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use site_report_nlp::{
    config::{ClassifierMode, RemoteSettings},
    nlp::{
        linear::LinearClassifier, remote::RemoteClassifier, tfidf::TfidfVectorizer, Analyzer,
        Label, ModelArtifacts, ModelStore, SegmenterKind,
    },
};

pub const ROOF_REPORT: &str = "Roof is up. Current access to the house is unsafe.";

/// Weight that puts "unsafe" at exactly 0.80 risk probability given the other logits.
pub fn risk_weight() -> f64 {
    (4.0 * (0.5f64.exp() + 2.0)).ln()
}

/// Columns: delay=0, shortage=1, unsafe=2.
pub fn test_artifacts() -> ModelArtifacts {
    let vectorizer =
        TfidfVectorizer::from_terms([("unsafe", 1.0), ("delay", 1.0), ("shortage", 1.0)], (1, 1));
    let classifier = LinearClassifier {
        classes: Label::ALL.to_vec(),
        coef: vec![
            vec![0.0, 0.0, 0.0],
            vec![4.0, 0.0, 0.0],
            vec![0.0, 0.0, risk_weight()],
            vec![0.0, 1.0, 0.0],
        ],
        intercept: vec![0.5, 0.0, 0.0, 0.0],
    };
    ModelArtifacts::new(vectorizer, classifier).expect("consistent artifacts")
}

pub fn preloaded_store() -> Arc<ModelStore> {
    Arc::new(ModelStore::preloaded(test_artifacts()))
}

pub fn remote_settings(endpoint: &str) -> RemoteSettings {
    RemoteSettings {
        endpoint: Some(endpoint.to_string()),
        api_key: Some("test-key".into()),
        deployment: Some("labeler".into()),
        api_version: "2024-10-01-preview".into(),
    }
}

pub fn analyzer(mode: ClassifierMode, models: Arc<ModelStore>, remote: RemoteSettings) -> Analyzer {
    Analyzer::with_parts(
        mode,
        SegmenterKind::Linguistic,
        models,
        RemoteClassifier::new(remote).expect("http client"),
    )
}

/// Like [`analyzer`] but with a short remote timeout so hung endpoints fail quickly.
pub fn analyzer_with_timeout(
    mode: ClassifierMode,
    models: Arc<ModelStore>,
    remote: RemoteSettings,
    timeout: Duration,
) -> Analyzer {
    Analyzer::with_parts(
        mode,
        SegmenterKind::Linguistic,
        models,
        RemoteClassifier::with_timeout(remote, timeout).expect("http client"),
    )
}

pub fn ml_analyzer() -> Analyzer {
    analyzer(ClassifierMode::Statistical, preloaded_store(), RemoteSettings::default())
}

#[derive(Debug, Clone)]
pub enum MockReply {
    Content(String),
    Status(u16),
    /// Raw 200 JSON body.
    Body(Value),
    /// Accept the request and never answer.
    Hang,
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub deployment_path: String,
    pub api_key: Option<String>,
    pub api_version: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockRemote {
    reply: MockReply,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// Start an in-process stand-in for the chat-completion endpoint.
pub async fn spawn_remote(reply: MockReply) -> (String, Arc<Mutex<Vec<RecordedCall>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let state = MockRemote {
        reply,
        calls: calls.clone(),
    };
    let app = Router::new()
        .route(
            "/openai/deployments/:deployment/chat/completions",
            post(mock_completion),
        )
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock remote");
    let addr = listener.local_addr().expect("mock address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock remote server");
    });
    (format!("http://{addr}"), calls)
}

async fn mock_completion(
    State(mock): State<MockRemote>,
    axum::extract::Path(deployment): axum::extract::Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    mock.calls.lock().expect("calls lock").push(RecordedCall {
        deployment_path: deployment,
        api_key: headers
            .get("api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string),
        api_version: params.get("api-version").cloned(),
        body,
    });
    match &mock.reply {
        MockReply::Content(content) => Json(json!({
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
        }))
        .into_response(),
        MockReply::Status(code) => StatusCode::from_u16(*code)
            .expect("valid status")
            .into_response(),
        MockReply::Body(body) => Json(body.clone()).into_response(),
        MockReply::Hang => std::future::pending().await,
    }
}
