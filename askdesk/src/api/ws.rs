use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use async_trait::async_trait;

use crate::chat::{ChatSession, EventSink};
use crate::error::{AskdeskError, Result};
use crate::models::{ClientEvent, ErrorEvent, ServerEvent};

use super::AppState;

pub async fn ws_handler(State(state): State<AppState>, upgrade: WebSocketUpgrade) -> Response {
    upgrade.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Sends server events as JSON text frames. The send completing is what the
/// pipeline awaits between fragments.
struct WsEventSink<'a> {
    socket: &'a mut WebSocket,
}

#[async_trait]
impl EventSink for WsEventSink<'_> {
    async fn emit(&mut self, event: &ServerEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        self.socket
            .send(Message::Text(payload.into()))
            .await
            .map_err(|e| AskdeskError::ChannelClosed(format!("WebSocket send failed: {e}")))
    }
}

/// One task per connection: its own conversation session, reading client
/// events until the socket closes. Turns on one connection run sequentially;
/// connections interleave freely.
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut session = ChatSession::new();

    while let Some(frame) = socket.recv().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(error) => {
                tracing::debug!(error = %error, "WebSocket receive failed");
                break;
            }
        };

        let text = match frame {
            Message::Text(text) => text,
            Message::Close(_) => break,
            // Pings are answered by axum; other frame types carry no events.
            _ => continue,
        };

        let event: ClientEvent = match serde_json::from_str(&text) {
            Ok(event) => event,
            Err(error) => {
                tracing::debug!(error = %error, "Discarding malformed client event");
                let mut sink = WsEventSink {
                    socket: &mut socket,
                };
                let _ = sink
                    .emit(&ServerEvent::Error(ErrorEvent {
                        message: "Malformed event".to_string(),
                    }))
                    .await;
                continue;
            }
        };

        match event {
            ClientEvent::Message(inbound) => {
                let selection = state.selection.read().await.clone();
                let mut sink = WsEventSink {
                    socket: &mut socket,
                };

                if let Err(error) = state
                    .pipeline
                    .handle_message(&mut session, inbound, &selection, &mut sink)
                    .await
                {
                    tracing::error!(error = %error, "Chat turn failed");

                    // Best effort: the socket may already be gone.
                    let _ = sink
                        .emit(&ServerEvent::Error(ErrorEvent {
                            message: "Failed to answer this message".to_string(),
                        }))
                        .await;

                    if matches!(error, AskdeskError::ChannelClosed(_)) {
                        break;
                    }
                }
            }
            ClientEvent::Rating(rating) => {
                state.pipeline.handle_rating(rating).await;
            }
        }
    }

    tracing::debug!("WebSocket connection closed");
}
