//! Test utilities for ledgerly-core
//!
//! A mock LLM and document-renderer server speaking just enough of the
//! Ollama, OpenAI chat completions and renderer protocols for development
//! and integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Json, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Behavior knobs for the mock server
#[derive(Debug, Clone, Default)]
pub struct MockServerOptions {
    /// Answer generation and render calls with HTTP 500
    pub fail: bool,
    /// Sleep before answering generation and render calls
    pub delay: Option<Duration>,
    /// Insights per generated payload (default 3)
    pub insight_count: Option<usize>,
}

#[derive(Clone)]
struct MockState {
    options: MockServerOptions,
    prompts: Arc<Mutex<Vec<String>>>,
    documents: Arc<Mutex<Vec<Value>>>,
}

/// Mock LLM + renderer server for testing and development
pub struct MockLlmServer {
    addr: SocketAddr,
    state: MockState,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockLlmServer {
    /// Start a well-behaved server on an available port
    pub async fn start() -> Self {
        Self::start_with(MockServerOptions::default()).await
    }

    /// Start a server whose generation and render calls fail
    pub async fn start_failing() -> Self {
        Self::start_with(MockServerOptions {
            fail: true,
            ..MockServerOptions::default()
        })
        .await
    }

    pub async fn start_with(options: MockServerOptions) -> Self {
        let state = MockState {
            options,
            prompts: Arc::new(Mutex::new(Vec::new())),
            documents: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat))
            .route("/render", post(handle_render))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of the mock document renderer
    pub fn render_url(&self) -> String {
        format!("{}/render", self.url())
    }

    /// User prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.state.prompts.lock().unwrap().clone()
    }

    /// Documents posted to the renderer so far
    pub fn documents(&self) -> Vec<Value> {
        self.state.documents.lock().unwrap().clone()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockLlmServer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl MockState {
    /// Record the prompt, apply delay, and report whether to fail
    async fn begin(&self, prompt: Option<String>) -> bool {
        if let Some(prompt) = prompt {
            self.prompts.lock().unwrap().push(prompt);
        }
        if let Some(delay) = self.options.delay {
            tokio::time::sleep(delay).await;
        }
        self.options.fail
    }

    fn insights_payload(&self) -> String {
        let count = self.options.insight_count.unwrap_or(3);
        let kinds = ["positive", "warning", "info"];
        let insights: Vec<Value> = (0..count)
            .map(|i| {
                json!({
                    "title": format!("Mock insight {}", i + 1),
                    "content": format!("Mock analysis number {}", i + 1),
                    "type": kinds[i % kinds.len()],
                })
            })
            .collect();
        json!({ "insights": insights }).to_string()
    }
}

fn report_payload() -> String {
    "# Executive Summary\n\nMock report body.\n\n# Forecast and Outlook\n\nSteady.".to_string()
}

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "mock failure").into_response()
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<Value> {
    Json(json!({
        "models": [{ "name": "llama3.2:latest", "size": 4_000_000_000u64 }]
    }))
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    format: Option<String>,
}

/// Ollama generate endpoint; JSON format means an insights request
async fn handle_generate(
    State(state): State<MockState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if state.begin(Some(request.prompt)).await {
        return failure();
    }

    let response = if request.format.as_deref() == Some("json") {
        state.insights_payload()
    } else {
        report_payload()
    };

    Json(json!({ "model": request.model, "response": response, "done": true })).into_response()
}

async fn handle_models() -> Json<Value> {
    Json(json!({ "data": [{ "id": "gpt-4o" }] }))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    response_format: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// OpenAI chat completions endpoint; `response_format` means an insights request
async fn handle_chat(State(state): State<MockState>, Json(request): Json<ChatRequest>) -> Response {
    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone());
    if state.begin(prompt).await {
        return failure();
    }

    let content = if request.response_format.is_some() {
        state.insights_payload()
    } else {
        report_payload()
    };

    Json(json!({
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    }))
    .into_response()
}

/// Renderer endpoint: echoes the title inside a tiny PDF envelope
async fn handle_render(State(state): State<MockState>, Json(document): Json<Value>) -> Response {
    if state.begin(None).await {
        return failure();
    }

    let title = document["title"].as_str().unwrap_or_default().to_string();
    state.documents.lock().unwrap().push(document);

    (
        [(header::CONTENT_TYPE, "application/pdf")],
        format!("%PDF-1.4\n% {}\n%%EOF\n", title).into_bytes(),
    )
        .into_response()
}
