//! WebSocket handler for real-time updates.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info, warn};

use crate::config::MIN_WS_PING_INTERVAL;
use crate::error::DashboardError;
use crate::state::{DashboardState, WsConnectionGuard};
use crate::types::LiveUpdate;

/// Handle WebSocket upgrade request for /api/ws.
pub async fn ws_upgrade(
    State(state): State<Arc<DashboardState>>,
    ws: WebSocketUpgrade,
) -> Result<Response, DashboardError> {
    let Some(slot) = state.acquire_ws_connection() else {
        let current = state.ws_connection_count();
        let max = state.config().max_ws_connections;
        return Err(DashboardError::TooManyConnections(current, max));
    };

    // The slot is released when the callback is dropped, whether or not the
    // upgrade completes.
    Ok(ws.on_upgrade(move |socket| handle_ws_connection(socket, state, slot)))
}

/// Handle an active WebSocket connection.
async fn handle_ws_connection(
    socket: WebSocket,
    state: Arc<DashboardState>,
    slot: WsConnectionGuard,
) {
    let (mut sender, mut receiver) = socket.split();

    let update_rx = state.subscribe();
    let ping_interval = state.config().ws_ping_interval;

    // New clients get the current history before any incremental update.
    let initial = LiveUpdate::HistoryUpdated {
        history: state.get_history(),
    };

    let mut send_task = tokio::spawn(async move {
        if send_update(&mut sender, &initial).await {
            forward_updates_to_ws(&mut sender, update_rx, ping_interval).await;
        }
    });

    let mut recv_task = tokio::spawn(async move {
        handle_incoming_messages(&mut receiver).await;
    });

    tokio::select! {
        _ = &mut send_task => {
            debug!("WebSocket send task completed");
            recv_task.abort();
        }
        _ = &mut recv_task => {
            debug!("WebSocket receive task completed");
            send_task.abort();
        }
    }

    drop(slot);
    info!("WebSocket connection closed");
}

/// Serialize and send one update. Returns `false` once the socket is gone.
async fn send_update(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    update: &LiveUpdate,
) -> bool {
    match serde_json::to_string(update) {
        Ok(json) => sender.send(Message::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, event = update.event_type(), "Failed to serialize update");
            true
        }
    }
}

/// Forward live updates to the WebSocket.
async fn forward_updates_to_ws(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    mut update_rx: broadcast::Receiver<LiveUpdate>,
    ping_interval: Duration,
) {
    let period = ping_interval.max(MIN_WS_PING_INTERVAL);
    // First heartbeat one period after the initial history.
    let mut ping_timer = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            update_result = update_rx.recv() => {
                match update_result {
                    Ok(update) => {
                        if !send_update(sender, &update).await {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(count = n, "WebSocket receiver lagged, dropped messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        break;
                    }
                }
            }

            _ = ping_timer.tick() => {
                let heartbeat = LiveUpdate::Heartbeat {
                    timestamp: Utc::now(),
                };
                if !send_update(sender, &heartbeat).await {
                    break;
                }
            }
        }
    }
}

/// Handle incoming WebSocket messages.
async fn handle_incoming_messages(receiver: &mut futures::stream::SplitStream<WebSocket>) {
    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Close(_)) => {
                debug!("Received close frame");
                break;
            }
            Ok(Message::Text(text)) => {
                debug!(message = %text, "Ignoring client text message");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "WebSocket receive error");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;

    #[tokio::test]
    async fn test_ws_connection_tracking() {
        let state = Arc::new(DashboardState::new(DashboardConfig::default()).unwrap());

        assert!(state.add_ws_connection());
        assert_eq!(state.ws_connection_count(), 1);

        state.remove_ws_connection();
        assert_eq!(state.ws_connection_count(), 0);
    }

    #[tokio::test]
    async fn test_heartbeat_serialization() {
        let update = LiveUpdate::Heartbeat {
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&update).unwrap();
        assert!(json.contains("Heartbeat"));

        let deserialized: LiveUpdate = serde_json::from_str(&json).unwrap();
        assert!(matches!(deserialized, LiveUpdate::Heartbeat { .. }));
    }
}
