//! HTTP API module - REST endpoints and WebSocket

mod pool;
mod websocket;

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::dice::{Pool, PoolEvent};
pub use pool::{ErrorResponse, PoolRollResponse};
pub use websocket::{ClientMessage, ServerMessage};

/// Pool events buffered per WebSocket subscriber before it starts lagging
const EVENT_CAPACITY: usize = 256;

/// Pool shared between request handlers; never locked across an await
pub type SharedPool = Arc<Mutex<Pool>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: SharedPool,
    pub events: broadcast::Sender<PoolEvent>,
}

impl AppState {
    /// Wrap a pool and forward its events into a broadcast channel
    pub fn new(pool: Pool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        let sender = events.clone();
        pool.subscribe(move |event| {
            // No receivers just means nobody is watching
            let _ = sender.send(event.clone());
        });

        Self {
            pool: Arc::new(Mutex::new(pool)),
            events,
        }
    }
}

/// Build the API router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .route("/ws", get(websocket::ws_handler))
        .merge(pool::router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "dicecream",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let heaps = state.pool.lock().len();
    Json(HealthResponse {
        status: "healthy",
        heaps,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    heaps: usize,
}
