//! Pool API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::dice::{HeapSnapshot, PoolSnapshot};
use crate::error::DiceError;

/// Build pool router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pool", get(get_pool))
        .route("/pool/roll", post(roll_all))
        .route("/pool/heaps", post(add_heap))
        .route("/pool/heaps/{facets}", delete(remove_heap))
        .route("/pool/heaps/{facets}/dice", post(add_dice))
        .route("/pool/heaps/{facets}/roll", post(roll_heap))
        .route("/pool/heaps/{facets}/removal", post(request_removal))
}

/// Add-heap request
#[derive(Debug, Deserialize)]
pub struct AddHeapRequest {
    pub count: u32,
    pub facets: u32,
}

/// Add-dice request; negative delta removes dice
#[derive(Debug, Deserialize)]
pub struct AddDiceRequest {
    pub delta: i64,
}

/// Result of removing a heap
#[derive(Debug, Serialize)]
pub struct RemoveResponse {
    pub removed: bool,
    pub pool: PoolSnapshot,
}

/// Result of changing a heap's dice
#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub changed: bool,
    pub pool: PoolSnapshot,
}

/// Result of rolling a single heap
#[derive(Debug, Serialize)]
pub struct HeapRollResponse {
    pub facets: u32,
    pub total: u64,
    pub outcomes: Vec<u32>,
    pub descriptor: String,
}

/// Result of rolling the whole pool
#[derive(Debug, Serialize)]
pub struct PoolRollResponse {
    pub total: u64,
    pub descriptor: String,
    pub heaps: Vec<HeapSnapshot>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map a dice error to its HTTP response
fn error_response(err: DiceError) -> Response {
    let status = if err.is_invalid_argument() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::NOT_FOUND
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

/// Current pool state
async fn get_pool(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.pool.lock().snapshot())
}

/// Add dice, creating a heap for new facets
async fn add_heap(State(state): State<AppState>, Json(req): Json<AddHeapRequest>) -> Response {
    let mut pool = state.pool.lock();
    match pool.add_heap(req.count, req.facets) {
        Ok(()) => (StatusCode::CREATED, Json(pool.snapshot())).into_response(),
        Err(e) => error_response(e),
    }
}

/// Remove a heap (never the last one)
async fn remove_heap(State(state): State<AppState>, Path(facets): Path<u32>) -> impl IntoResponse {
    let mut pool = state.pool.lock();
    let removed = pool.remove_heap(facets);
    Json(RemoveResponse {
        removed,
        pool: pool.snapshot(),
    })
}

/// Let the heap ask for its own removal; the pool decides
async fn request_removal(State(state): State<AppState>, Path(facets): Path<u32>) -> Response {
    let mut pool = state.pool.lock();
    match pool.request_removal(facets) {
        Ok(removed) => Json(RemoveResponse {
            removed,
            pool: pool.snapshot(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Add or remove dice on an existing heap
async fn add_dice(
    State(state): State<AppState>,
    Path(facets): Path<u32>,
    Json(req): Json<AddDiceRequest>,
) -> Response {
    let mut pool = state.pool.lock();
    match pool.add_dice(facets, req.delta) {
        Ok(changed) => Json(ChangeResponse {
            changed,
            pool: pool.snapshot(),
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Roll one heap
async fn roll_heap(State(state): State<AppState>, Path(facets): Path<u32>) -> Response {
    let mut pool = state.pool.lock();
    let total = match pool.roll_single_heap(facets) {
        Ok(total) => total,
        Err(e) => return error_response(e),
    };

    match pool.heap(facets) {
        Some(heap) => Json(HeapRollResponse {
            facets,
            total,
            outcomes: heap.outcomes().to_vec(),
            descriptor: heap.description(),
        })
        .into_response(),
        None => error_response(DiceError::HeapNotFound { facets }),
    }
}

/// Roll every heap
async fn roll_all(State(state): State<AppState>) -> impl IntoResponse {
    let mut pool = state.pool.lock();
    let total = pool.roll_all();
    let snapshot = pool.snapshot();
    Json(PoolRollResponse {
        total,
        descriptor: snapshot.descriptor,
        heaps: snapshot.heaps,
    })
}
