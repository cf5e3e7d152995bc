use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        State, WebSocketUpgrade,
    },
    response::{Json, Response},
};
use tokio::sync::broadcast;
use tracing::debug;

use crate::auth::AuthUser;
use crate::entities::message::Model as MessageModel;
use crate::events::MessageNotice;
use crate::services::messages::{MessageView, SendMessageRequest};
use crate::{ApiResponse, ApiResult, AppState};

pub async fn send_message(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<SendMessageRequest>,
) -> ApiResult<MessageModel> {
    let message = state.services.messages.send_message(&user, request).await?;
    Ok(Json(ApiResponse::success(message)))
}

pub async fn inbox(State(state): State<AppState>, user: AuthUser) -> ApiResult<Vec<MessageView>> {
    let messages = state.services.messages.inbox(&user).await?;
    Ok(Json(ApiResponse::success(messages)))
}

/// WebSocket endpoint pushing every stored message as a `newMessage`
/// event. Clients filter what concerns them.
pub async fn ws_messages(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    let rx = state.message_hub.subscribe();
    ws.on_upgrade(move |socket| handle_socket(socket, rx))
}

async fn handle_socket(mut socket: WebSocket, mut rx: broadcast::Receiver<MessageNotice>) {
    loop {
        tokio::select! {
            notice = rx.recv() => match notice {
                Ok(notice) => {
                    let payload = serde_json::json!({
                        "event": "newMessage",
                        "data": notice,
                    });
                    if socket.send(WsMessage::Text(payload.to_string())).await.is_err() {
                        break;
                    }
                }
                // A slow client missed some notices; keep streaming new ones
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Websocket client lagged behind message stream");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(_)) => continue,
                _ => break,
            },
        }
    }
}
