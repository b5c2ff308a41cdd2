//! Fake upstream services for integration tests: an embeddings/chat API
//! speaking both the OpenAI and Ollama dialects, and a Pinecone-compatible
//! index, each served by axum on an ephemeral port.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{json, Value};

use talent_scout::config::{Config, IndexBackend};

/// Keywords the fake embedder projects text onto, one dimension each.
pub const KEYWORDS: [&str; 4] = ["rust", "design", "sales", "data"];

/// Texts containing this marker make the fake embeddings API fail.
pub const POISON: &str = "POISON";

pub const INDEX_API_KEY: &str = "test-index-key";

pub const LLM_API_KEY: &str = "test-llm-key";

/// Serve `app` on 127.0.0.1 and return its base URL.
pub async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn fake_embedding(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    KEYWORDS
        .iter()
        .map(|k| lower.matches(k).count() as f32 + 0.01)
        .collect()
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers.get("Authorization").and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {LLM_API_KEY}").as_str())
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad key"})))
}

fn bad_request(msg: &str) -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({"error": msg})))
}

/// Embed every input, or `None` when one of them is poisoned.
fn embed_inputs(body: &Value) -> Option<Vec<Vec<f32>>> {
    let inputs: Vec<String> = body["input"]
        .as_array()
        .map(|a| a.iter().filter_map(|v| v.as_str().map(String::from)).collect())
        .unwrap_or_default();
    if inputs.iter().any(|t| t.contains(POISON)) {
        return None;
    }
    Some(inputs.iter().map(|t| fake_embedding(t)).collect())
}

/// Picks every candidate in the prompt plus an id that is not in the pool,
/// wrapped in a markdown fence.
fn team_reply(body: &Value) -> String {
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    let mut picks: Vec<Value> = user
        .split("[id: ")
        .skip(1)
        .filter_map(|rest| rest.split(" |").next())
        .map(|id| json!({"id": id, "role": "engineer", "reason": "strong match"}))
        .collect();
    picks.insert(0, json!({"id": "not-a-candidate", "role": "ghost", "reason": "made up"}));

    let reply = json!({"team": picks, "summary": "A balanced team."});
    format!("```json\n{reply}\n```")
}

async fn openai_embeddings(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    let Some(vectors) = embed_inputs(&body) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "poisoned input"})));
    };
    let data: Vec<Value> = vectors
        .into_iter()
        .enumerate()
        .map(|(i, v)| json!({"index": i, "embedding": v}))
        .collect();
    (StatusCode::OK, Json(json!({"data": data})))
}

async fn openai_chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    let content = team_reply(&body);
    (
        StatusCode::OK,
        Json(json!({"choices": [{"message": {"role": "assistant", "content": content}}]})),
    )
}

async fn ollama_embed(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    if body["truncate"] != json!(true) {
        return bad_request("expected truncate: true");
    }
    let Some(vectors) = embed_inputs(&body) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "poisoned input"})));
    };
    (StatusCode::OK, Json(json!({"model": body["model"], "embeddings": vectors})))
}

async fn ollama_chat(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !bearer_ok(&headers) {
        return unauthorized();
    }
    if body["stream"] != json!(false) {
        return bad_request("expected stream: false");
    }
    let content = team_reply(&body);
    (
        StatusCode::OK,
        Json(json!({"message": {"role": "assistant", "content": content}, "done": true})),
    )
}

/// Serves both provider dialects; every route requires `LLM_API_KEY`.
pub fn fake_llm() -> Router {
    Router::new()
        .route("/v1/embeddings", post(openai_embeddings))
        .route("/v1/chat/completions", post(openai_chat))
        .route("/api/embed", post(ollama_embed))
        .route("/api/chat", post(ollama_chat))
}

// ─── Pinecone ────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakePinecone {
    pub vectors: Arc<Mutex<HashMap<String, HashMap<String, Vec<f32>>>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("Api-Key").and_then(|v| v.to_str().ok()) == Some(INDEX_API_KEY)
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

async fn pc_upsert(
    State(fake): State<FakePinecone>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad key"})));
    }
    let ns = body["namespace"].as_str().unwrap_or_default().to_string();
    let vectors = body["vectors"].as_array().cloned().unwrap_or_default();
    let mut store = fake.vectors.lock();
    let space = store.entry(ns).or_default();
    for v in &vectors {
        let values: Vec<f32> = serde_json::from_value(v["values"].clone()).unwrap();
        space.insert(v["id"].as_str().unwrap().to_string(), values);
    }
    (StatusCode::OK, Json(json!({"upsertedCount": vectors.len()})))
}

async fn pc_query(
    State(fake): State<FakePinecone>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad key"})));
    }
    let ns = body["namespace"].as_str().unwrap_or_default();
    let top_k = body["topK"].as_u64().unwrap_or(10) as usize;
    let query: Vec<f32> = serde_json::from_value(body["vector"].clone()).unwrap();

    let store = fake.vectors.lock();
    let mut matches: Vec<(String, f32)> = store
        .get(ns)
        .map(|space| {
            space
                .iter()
                .map(|(id, v)| (id.clone(), cosine(&query, v)))
                .collect()
        })
        .unwrap_or_default();
    matches.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
    matches.truncate(top_k);

    let matches: Vec<Value> = matches
        .into_iter()
        .map(|(id, score)| json!({"id": id, "score": score}))
        .collect();
    (StatusCode::OK, Json(json!({"matches": matches, "namespace": ns})))
}

async fn pc_delete(
    State(fake): State<FakePinecone>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad key"})));
    }
    let ns = body["namespace"].as_str().unwrap_or_default();
    if let Some(space) = fake.vectors.lock().get_mut(ns) {
        for id in body["ids"].as_array().cloned().unwrap_or_default() {
            space.remove(id.as_str().unwrap_or_default());
        }
    }
    (StatusCode::OK, Json(json!({})))
}

async fn pc_stats(State(fake): State<FakePinecone>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"message": "bad key"})));
    }
    let store = fake.vectors.lock();
    let namespaces: serde_json::Map<String, Value> = store
        .iter()
        .map(|(ns, space)| (ns.clone(), json!({"vectorCount": space.len()})))
        .collect();
    let total: usize = store.values().map(|s| s.len()).sum();
    (
        StatusCode::OK,
        Json(json!({"namespaces": namespaces, "dimension": KEYWORDS.len(), "totalVectorCount": total})),
    )
}

pub fn fake_pinecone(fake: FakePinecone) -> Router {
    Router::new()
        .route("/vectors/upsert", post(pc_upsert))
        .route("/query", post(pc_query))
        .route("/vectors/delete", post(pc_delete))
        .route("/describe_index_stats", post(pc_stats))
        .with_state(fake)
}

// ─── Fixtures ────────────────────────────────────────────

pub fn sample_candidates() -> Value {
    json!([
        {"id": "c1", "name": "Ferris Crab", "title": "Backend Engineer",
         "skills": ["rust", "tokio"], "years_experience": 6, "location": "Berlin",
         "summary": "Builds Rust services."},
        {"id": "c2", "name": "Dana Lee", "title": "Product Designer",
         "skills": ["design", "figma"], "years_experience": 4, "location": "Seoul"},
        {"id": "c3", "name": "Sam Ortiz", "title": "Account Executive",
         "skills": ["sales", "negotiation"], "years_experience": 9},
        {"id": 4, "name": "Priya Nair", "title": "Data Engineer",
         "skills": ["data", "spark"], "location": "Pune", "github": "pnair"},
        {"id": "c5", "name": "Ola Nordmann", "title": "Systems Engineer",
         "skills": ["rust", "embedded"], "years_experience": 2}
    ])
}

pub fn write_candidates(dir: &Path, candidates: &Value) -> std::path::PathBuf {
    let path = dir.join("candidates.json");
    std::fs::write(&path, serde_json::to_string_pretty(candidates).unwrap()).unwrap();
    path
}

/// A config wired to the fake LLM and the local index under `dir`.
pub fn local_config(dir: &Path, llm_url: &str) -> Config {
    let mut config = Config::default();
    config.data_dir = dir.to_path_buf();
    config.candidates_path = dir.join("candidates.json");
    config.llm.base_url = llm_url.to_string();
    config.llm.api_key = Some(LLM_API_KEY.to_string());
    config.llm.embedding_dim = KEYWORDS.len();
    config.index.backend = IndexBackend::Local;
    config.import.batch_size = 2;
    config.import.batch_delay_ms = 0;
    config
}
