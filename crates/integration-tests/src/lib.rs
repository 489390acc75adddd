//! Integration tests for Tienda.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tienda-integration-tests
//! ```
//!
//! Each test starts its own fake backend and storefront on ephemeral ports,
//! so no external services are needed.
//!
//! # Test Categories
//!
//! - `checkout` - Login, cart and checkout through the storefront

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::post,
};
use reqwest::Client;
use serde_json::{Value, json};
use tienda_storefront::config::{BackendConfig, StorefrontConfig};
use tienda_storefront::state::AppState;
use url::Url;

/// Token the fake backend issues at login.
pub const TEST_TOKEN: &str = "test-token-123";

/// How the fake backend answers `POST /api/checkout`.
#[derive(Debug, Clone)]
pub enum CheckoutBehavior {
    /// 201 with an order body.
    Accept,
    /// Non-2xx with an optional `msg`.
    Reject { status: u16, msg: Option<String> },
    /// Drop the connection without answering.
    Crash,
    /// Wait, then answer like `Accept`.
    Slow(Duration),
}

/// A checkout request as the fake backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedCheckout {
    pub authorization: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct BackendState {
    behavior: Arc<Mutex<CheckoutBehavior>>,
    checkouts: Arc<Mutex<Vec<RecordedCheckout>>>,
}

/// In-process stand-in for the backend API.
pub struct FakeBackend {
    pub url: String,
    state: BackendState,
}

impl FakeBackend {
    /// Start a fake backend on an ephemeral port.
    pub async fn spawn(behavior: CheckoutBehavior) -> Self {
        let state = BackendState {
            behavior: Arc::new(Mutex::new(behavior)),
            checkouts: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/checkout", post(checkout))
            .with_state(state.clone());

        let addr = serve(app).await;
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    /// Change how later checkouts are answered.
    pub fn set_behavior(&self, behavior: CheckoutBehavior) {
        *self.state.behavior.lock().unwrap() = behavior;
    }

    /// Checkout requests received so far.
    #[must_use]
    pub fn checkouts(&self) -> Vec<RecordedCheckout> {
        self.state.checkouts.lock().unwrap().clone()
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let password = body.get("password").and_then(Value::as_str);
    if password == Some("secreto") {
        Json(json!({ "token": TEST_TOKEN })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "msg": "Credenciales inválidas" })),
        )
            .into_response()
    }
}

async fn checkout(
    State(state): State<BackendState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let total = body.get("total_amount").cloned().unwrap_or(Value::Null);

    state
        .checkouts
        .lock()
        .unwrap()
        .push(RecordedCheckout {
            authorization,
            body,
        });

    let behavior = state.behavior.lock().unwrap().clone();
    match behavior {
        CheckoutBehavior::Accept => accepted(total),
        CheckoutBehavior::Slow(delay) => {
            tokio::time::sleep(delay).await;
            accepted(total)
        }
        CheckoutBehavior::Reject { status, msg } => {
            let status = StatusCode::from_u16(status).unwrap();
            match msg {
                Some(msg) => (status, Json(json!({ "msg": msg }))).into_response(),
                None => (status, Json(json!({}))).into_response(),
            }
        }
        CheckoutBehavior::Crash => panic!("simulated backend crash"),
    }
}

fn accepted(total: Value) -> Response {
    (
        StatusCode::CREATED,
        Json(json!({ "order": { "id": 42, "status": "pendiente", "total_amount": total } })),
    )
        .into_response()
}

/// Start the storefront against `backend_url` and return its base URL.
pub async fn spawn_storefront(backend_url: &str) -> String {
    let config = StorefrontConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        backend: BackendConfig {
            base_url: Url::parse(backend_url).unwrap(),
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };

    let state = AppState::new(config).unwrap();
    let addr = serve(tienda_storefront::app(state)).await;
    format!("http://{addr}")
}

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Browser-like client: keeps cookies, does not follow redirects.
#[must_use]
pub fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// A fully filled shipping form as posted by the checkout page.
#[must_use]
pub fn shipping_form() -> Vec<(&'static str, &'static str)> {
    vec![
        ("name", "Camila Rojas"),
        ("address_line", "Av. Providencia 1234"),
        ("locality", "Santiago"),
        ("region", "Metropolitana"),
        ("country", "Chile"),
        ("postal_code", "7500000"),
        ("phone", "+56 9 1234 5678"),
        ("payment_method", "tarjeta"),
    ]
}
