//! WebSocket handler for live pool updates
//!
//! Every session receives the pool snapshot on connect and then each pool
//! event as it happens. Sessions may also drive the pool with commands.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use super::AppState;
use crate::dice::{PoolEvent, PoolSnapshot};

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full pool state
    Pool { pool: PoolSnapshot },
    /// Something changed in the pool
    Event { event: PoolEvent },
    /// Result of a roll command; `facets` is set for single-heap rolls
    Rolled {
        facets: Option<u32>,
        total: u64,
        descriptor: String,
    },
    /// Result of a remove command; `removed` is false when nothing changed
    Removed {
        facets: u32,
        removed: bool,
        pool: PoolSnapshot,
    },
    /// Command failed
    Error { message: String },
    /// Reply to ping
    Pong,
}

/// Messages sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    RollAll,
    RollHeap { facets: u32 },
    AddHeap { count: u32, facets: u32 },
    RemoveHeap { facets: u32 },
    AddDice { facets: u32, delta: i64 },
    Ping,
}

/// Handle WebSocket upgrade
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Serialize and send; false once the socket is gone
async fn send(socket: &mut WebSocket, msg: &ServerMessage) -> bool {
    match serde_json::to_string(msg) {
        Ok(json) => socket.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!("Failed to encode server message: {}", e);
            true
        }
    }
}

/// Handle an individual WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let session_id = uuid::Uuid::new_v4().to_string();
    info!("WebSocket connected: {}", session_id);

    // Subscribe before taking the snapshot so no event falls in between
    let mut events = state.events.subscribe();
    let snapshot = state.pool.lock().snapshot();

    if send(&mut socket, &ServerMessage::Pool { pool: snapshot }).await {
        loop {
            tokio::select! {
                result = events.recv() => {
                    let msg = match result {
                        Ok(event) => ServerMessage::Event { event },
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Session {} lagged, skipped {} events", session_id, skipped);
                            let pool = state.pool.lock().snapshot();
                            ServerMessage::Pool { pool }
                        }
                        Err(RecvError::Closed) => break,
                    };
                    if !send(&mut socket, &msg).await {
                        break;
                    }
                }
                result = socket.recv() => {
                    match result {
                        Some(Ok(Message::Text(text))) => {
                            let reply = match serde_json::from_str::<ClientMessage>(&text) {
                                Ok(client_msg) => handle_client_message(&state, &session_id, client_msg),
                                Err(e) => ServerMessage::Error { message: format!("bad message: {}", e) },
                            };
                            if !send(&mut socket, &reply).await {
                                break;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break,
                        _ => {}
                    }
                }
            }
        }
    }

    info!("WebSocket disconnected: {}", session_id);
}

/// Apply a client command to the pool and build the reply
fn handle_client_message(state: &AppState, session_id: &str, msg: ClientMessage) -> ServerMessage {
    debug!("Session {} sent {:?}", session_id, msg);
    let mut pool = state.pool.lock();

    let result = match msg {
        ClientMessage::Ping => return ServerMessage::Pong,
        ClientMessage::RollAll => {
            let total = pool.roll_all();
            return ServerMessage::Rolled {
                facets: None,
                total,
                descriptor: pool.describe_all(),
            };
        }
        ClientMessage::RollHeap { facets } => pool.roll_single_heap(facets).map(|total| {
            ServerMessage::Rolled {
                facets: Some(facets),
                total,
                descriptor: pool.heap(facets).map(|h| h.description()).unwrap_or_default(),
            }
        }),
        ClientMessage::AddHeap { count, facets } => pool.add_heap(count, facets).map(|()| ServerMessage::Pool {
            pool: pool.snapshot(),
        }),
        ClientMessage::RemoveHeap { facets } => {
            let removed = pool.remove_heap(facets);
            Ok(ServerMessage::Removed {
                facets,
                removed,
                pool: pool.snapshot(),
            })
        }
        ClientMessage::AddDice { facets, delta } => pool.add_dice(facets, delta).map(|_| ServerMessage::Pool {
            pool: pool.snapshot(),
        }),
    };

    result.unwrap_or_else(|e| ServerMessage::Error {
        message: e.to_string(),
    })
}
