//! In-process stub of the Newwork backend
//!
//! Binds to an ephemeral port and records the headers of every request it receives so
//! tests can assert on what actually went over the wire.

#![allow(dead_code)]

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, ETAG, IF_MATCH},
        HeaderMap, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use newwork_client::{ApiClient, AuthService, SessionContext, SessionStore};
use newwork_core::ClientConfig;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

pub const MANAGER_EMAIL: &str = "manager@newwork.test";
pub const PASSWORD: &str = "Passw0rd!";

static TRACING: LazyLock<()> = LazyLock::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
});

/// What the stub saw for one request
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub if_match: Option<String>,
    pub content_type: Option<String>,
}

type Seen = Arc<Mutex<Vec<SeenRequest>>>;

pub struct StubBackend {
    pub base_url: String,
    seen: Seen,
}

impl StubBackend {
    pub async fn spawn() -> Self {
        LazyLock::force(&TRACING);

        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/api/profile", get(get_profile).put(put_profile))
            .route("/api/whoami", get(whoami))
            .route("/api/slow", get(slow))
            .route("/api/text", get(text))
            .route("/api/outage", get(outage))
            .route("/api/malformed", get(malformed))
            .layer(middleware::from_fn_with_state(seen.clone(), record));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub backend");
        let address = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub backend crashed");
        });

        Self {
            base_url: format!("http://{}", address),
            seen,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone())
    }

    /// A fresh, isolated client stack pointed at this stub
    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.config(), SessionStore::new()).expect("Failed to build client")
    }

    pub fn session_context(&self) -> (ApiClient, SessionContext) {
        let api = self.client();
        let context = SessionContext::from_service(AuthService::new(api.clone()));
        (api, context)
    }

    pub fn seen(&self) -> Vec<SeenRequest> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last_seen(&self, path: &str) -> SeenRequest {
        self.seen()
            .into_iter()
            .rev()
            .find(|request| request.path == path)
            .unwrap_or_else(|| panic!("No request to {} was recorded", path))
    }
}

/// Base URL of a port nothing listens on
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", address)
}

fn header(headers: &HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn record(State(seen): State<Seen>, request: Request, next: Next) -> Response {
    let headers = request.headers();
    let entry = SeenRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: header(headers, AUTHORIZATION),
        if_match: header(headers, IF_MATCH),
        content_type: header(headers, CONTENT_TYPE),
    };
    seen.lock().unwrap().push(entry);
    next.run(request).await
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    match (email, password) {
        (MANAGER_EMAIL, PASSWORD) => Json(json!({
            "token": "tok1",
            "role": "MANAGER",
            "employeeId": 42
        }))
        .into_response(),
        ("coworker@newwork.test", PASSWORD) => Json(json!({
            "token": "tok2",
            "role": "COWORKER",
            "employeeId": "0b7e9c1e-5a55-4c43-9f4e-3f1b6f1f9a10"
        }))
        .into_response(),
        ("boom@newwork.test", _) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response()
        }
        ("refused@newwork.test", _) => (
            StatusCode::UNAUTHORIZED,
            [(CONTENT_TYPE, "application/json")],
            "Unauthorized",
        )
            .into_response(),
        ("garbled@newwork.test", _) => {
            ([(CONTENT_TYPE, "application/json")], "{\"token\": ").into_response()
        }
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "Invalid credentials"})),
        )
            .into_response(),
    }
}

async fn get_profile() -> Response {
    (
        [(ETAG, "\"3\"")],
        Json(json!({"id": "e1", "phone": "555-0100", "version": 3})),
    )
        .into_response()
}

async fn put_profile(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    match header(&headers, IF_MATCH).as_deref() {
        None => (
            StatusCode::PRECONDITION_REQUIRED,
            Json(json!({"error": "if_match_required"})),
        )
            .into_response(),
        Some("\"3\"") => (
            [(ETAG, "\"4\"")],
            Json(json!({"id": "e1", "phone": body["phone"], "version": 4})),
        )
            .into_response(),
        Some(_) => (
            StatusCode::CONFLICT,
            Json(json!({"error": "version_mismatch", "currentVersion": 3})),
        )
            .into_response(),
    }
}

async fn whoami(headers: HeaderMap) -> Response {
    match header(&headers, AUTHORIZATION) {
        Some(value) => value.into_response(),
        None => StatusCode::UNAUTHORIZED.into_response(),
    }
}

async fn slow(headers: HeaderMap) -> Response {
    tokio::time::sleep(Duration::from_millis(200)).await;
    whoami(headers).await
}

async fn text() -> Response {
    (StatusCode::ACCEPTED, "queued for processing").into_response()
}

async fn outage() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, "maintenance window").into_response()
}

async fn malformed() -> Response {
    ([(CONTENT_TYPE, "application/json; charset=utf-8")], "{broken").into_response()
}
