//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{domain::PushFrame, ui::state::AppState};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains this connection's outbound queue into the socket.
///
/// Ends when the queue closes, the socket write fails, or a
/// [`PushFrame::Close`] is dequeued.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<PushFrame>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                PushFrame::Text(text) => Message::Text(text.as_ref().into()),
                PushFrame::Ping => Message::Ping(Bytes::new()),
                PushFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection's outbound frames
    let (tx, rx) = mpsc::unbounded_channel();
    let (connection_id, evicted) = state.coordinator.connect(tx).await;

    let coordinator = state.coordinator.clone();
    let reader_id = connection_id.clone();

    // Inbound frames are handled one at a time, in receipt order
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::debug!("WebSocket error on '{}': {}", reader_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", reader_id, text.as_str());
                    coordinator.handle_text(&reader_id, text.as_str()).await;
                }
                Message::Pong(_) => coordinator.hub().mark_alive(&reader_id).await,
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", reader_id);
                    break;
                }
                // Ping is answered by the WebSocket layer; binary frames are not part of the protocol
                Message::Ping(_) | Message::Binary(_) => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other.
    // Eviction aborts both, even if the writer is stuck on a dead peer.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
        _ = evicted.notified() => {
            tracing::info!("Connection '{}' evicted, dropping socket", connection_id);
            send_task.abort();
            recv_task.abort();
        }
    };

    state.coordinator.disconnect(&connection_id).await;
}
