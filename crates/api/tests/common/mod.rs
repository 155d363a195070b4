#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use questlog_api::auth::jwt::JwtConfig;
use questlog_api::config::ServerConfig;
use questlog_api::router::build_app_router;
use questlog_api::state::AppState;
use questlog_core::error::GenerationError;
use questlog_core::image_cache::ImageBackend;
use questlog_core::loot::{ItemType, LootDraft, LootSource, Rarity};
use questlog_core::memory::MemoryStore;
use questlog_core::quest::{QuestDraft, QuestPlanner};
use questlog_core::store::Stores;

/// PNG signature followed by the start of an IHDR chunk; enough for format
/// sniffing.
pub const PNG_BYTES: [u8; 16] = [
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13, b'I', b'H', b'D', b'R',
];

/// Build a test `ServerConfig` with a private artwork directory.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        artwork_dir: std::env::temp_dir().join(format!("questlog-test-{}", uuid::Uuid::new_v4())),
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 60,
            refresh_token_expiry_days: 30,
        },
    }
}

// ---------------------------------------------------------------------------
// Fake AI backends
// ---------------------------------------------------------------------------

pub fn sword() -> LootDraft {
    LootDraft {
        item_name: "Sword of Focus".to_string(),
        description: "Cuts through distraction".to_string(),
        item_type: ItemType::Weapon,
        rarity: Rarity::Rare,
        image_prompt: Some("Simple game icon: sword".to_string()),
    }
}

/// Replays queued loot results, then falls back to [`sword`].
#[derive(Default)]
pub struct FakeLoot {
    queue: Mutex<VecDeque<Result<LootDraft, GenerationError>>>,
}

impl FakeLoot {
    pub fn push(&self, result: Result<LootDraft, GenerationError>) {
        self.queue.lock().unwrap().push_back(result);
    }
}

#[async_trait]
impl LootSource for FakeLoot {
    async fn generate_loot(&self, _completed_task: &str) -> Result<LootDraft, GenerationError> {
        self.queue.lock().unwrap().pop_front().unwrap_or_else(|| Ok(sword()))
    }
}

/// Plans three steps for any goal, or fails when `error` is set.
#[derive(Default)]
pub struct FakePlanner {
    pub error: Mutex<Option<GenerationError>>,
}

#[async_trait]
impl QuestPlanner for FakePlanner {
    async fn plan_quests(&self, goal: &str) -> Result<Vec<QuestDraft>, GenerationError> {
        if let Some(err) = self.error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok((1..=3)
            .map(|i| QuestDraft {
                title: format!("Chapter {i}"),
                description: format!("Step {i} towards {goal}"),
                task: format!("Do part {i}"),
            })
            .collect())
    }
}

/// Returns [`PNG_BYTES`] (or a configured result) and counts calls.
pub struct FakeImages {
    pub result: Mutex<Result<Vec<u8>, GenerationError>>,
    calls: AtomicUsize,
}

impl Default for FakeImages {
    fn default() -> Self {
        Self {
            result: Mutex::new(Ok(PNG_BYTES.to_vec())),
            calls: AtomicUsize::new(0),
        }
    }
}

impl FakeImages {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_result(&self, result: Result<Vec<u8>, GenerationError>) {
        *self.result.lock().unwrap() = result;
    }
}

#[async_trait]
impl ImageBackend for FakeImages {
    fn name(&self) -> &str {
        "fake"
    }

    async fn generate_image(&self, _prompt: &str) -> Result<Vec<u8>, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.lock().unwrap().clone()
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// The application router plus handles on its fakes.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub loot: Arc<FakeLoot>,
    pub planner: Arc<FakePlanner>,
    pub images: Arc<FakeImages>,
    pub artwork_dir: PathBuf,
}

impl TestApp {
    /// A fresh handle on the router for one `oneshot` call.
    pub fn app(&self) -> Router {
        self.router.clone()
    }
}

/// Build the full application router over an in-memory store and fake AI
/// backends, using the same middleware stack as production.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let artwork_dir = config.artwork_dir.clone();
    let store = Arc::new(MemoryStore::default());
    let loot = Arc::new(FakeLoot::default());
    let planner = Arc::new(FakePlanner::default());
    let images = Arc::new(FakeImages::default());

    let state = AppState::new(
        Stores::from_backend(store.clone()),
        config.clone(),
        loot.clone(),
        planner.clone(),
        vec![images.clone() as Arc<dyn ImageBackend>],
    );

    TestApp {
        router: build_app_router(state, &config),
        store,
        loot,
        planner,
        images,
        artwork_dir,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Header pair identifying an anonymous device.
pub fn local(id: &str) -> (&'static str, String) {
    ("x-local-user-id", id.to_string())
}

/// Header pair carrying a bearer token.
pub fn bearer(token: &str) -> (&'static str, String) {
    ("authorization", format!("Bearer {token}"))
}

pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    headers: &[(&'static str, String)],
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, value.as_str());
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str, headers: &[(&'static str, String)]) -> Response<Body> {
    send(app, Method::GET, uri, headers, None).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    headers: &[(&'static str, String)],
    body: serde_json::Value,
) -> Response<Body> {
    send(app, Method::POST, uri, headers, Some(body)).await
}

pub async fn put(app: Router, uri: &str, headers: &[(&'static str, String)]) -> Response<Body> {
    send(app, Method::PUT, uri, headers, None).await
}

pub async fn delete(app: Router, uri: &str, headers: &[(&'static str, String)]) -> Response<Body> {
    send(app, Method::DELETE, uri, headers, None).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Generate a project for an anonymous device and return its JSON.
pub async fn generate_project(app: &TestApp, device: &str, goal: &str) -> serde_json::Value {
    let response = post_json(
        app.app(),
        "/api/projects/generate",
        &[local(device)],
        serde_json::json!({ "goal": goal }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
