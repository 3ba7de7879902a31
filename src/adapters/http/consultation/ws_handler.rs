//! WebSocket handler for consultation streaming.
//!
//! # Connection Flow
//! 1. Client requests an upgrade on `/api/consultations/:id/stream`
//! 2. Server checks the consultation exists, then upgrades
//! 3. Client sends `submit`, `shortcut`, `finish` or `retry`
//! 4. Server relays `delta` increments while the reply arrives
//! 5. Server sends `turn_complete` with the committed session, or `error`

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::application::handlers::consultation::{ServiceError, TurnRequest};
use crate::domain::foundation::{ErrorCode, SessionId};

use super::dto::{WsClientMessage, WsServerMessage};
use super::handlers::{parse_session_id, ConsultationApiError, ConsultationAppState};

/// Buffered increments between the gateway task and the socket.
const DELTA_BUFFER: usize = 64;

/// Handle WebSocket upgrade for consultation streaming.
///
/// Route: `GET /api/consultations/:id/stream`
///
/// Rejects with 400/404 before the upgrade.
pub async fn consultation_ws_handler(
    ws: WebSocketUpgrade,
    Path(id): Path<String>,
    State(state): State<ConsultationAppState>,
) -> Response {
    let id = match parse_session_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match state.service.view(id).await {
        Ok(_) | Err(ServiceError::Busy(_)) => {}
        Err(e) => return ConsultationApiError::from(e).into_response(),
    }

    ws.on_upgrade(move |socket| handle_consultation_socket(socket, id, state))
}

/// Handle an established WebSocket connection.
async fn handle_consultation_socket(socket: WebSocket, id: SessionId, state: ConsultationAppState) {
    let (mut sender, mut receiver) = socket.split();

    tracing::info!(session_id = %id, "WebSocket connection established");

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<WsClientMessage>(&text) {
                Ok(client_msg) => {
                    if !run_streamed_turn(&mut sender, id, client_msg.into(), &state).await {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(session_id = %id, "Failed to parse client message: {}", e);
                    let error = WsServerMessage::error(
                        ErrorCode::ValidationFailed,
                        format!("Unrecognized message: {}", e),
                    );
                    if send_server_message(&mut sender, &error).await.is_err() {
                        break;
                    }
                }
            },
            Ok(Message::Close(_)) => {
                tracing::debug!(session_id = %id, "Client closed connection");
                break;
            }
            Ok(Message::Ping(data)) => {
                if sender.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %id, "WebSocket error: {}", e);
                break;
            }
        }
    }

    tracing::info!(session_id = %id, "WebSocket connection closed");
}

/// Runs one turn, relaying increments as they arrive.
///
/// The turn runs on its own task so that it commits even if the client
/// disconnects mid-reply. Returns false once the socket is gone.
async fn run_streamed_turn<S>(
    sender: &mut S,
    id: SessionId,
    request: TurnRequest,
    state: &ConsultationAppState,
) -> bool
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Debug,
{
    let (tx, mut rx) = mpsc::channel::<String>(DELTA_BUFFER);
    let service = state.service.clone();
    let turn = tokio::spawn(async move { service.run_turn(id, request, Some(&tx)).await });

    let mut connected = true;
    while let Some(delta) = rx.recv().await {
        if connected {
            let msg = WsServerMessage::Delta { content: delta };
            connected = send_server_message(sender, &msg).await.is_ok();
        }
    }

    let outcome = match turn.await {
        Ok(Ok(view)) => WsServerMessage::TurnComplete {
            session: view.session,
            report_ready: view.report_ready,
        },
        Ok(Err(e)) => WsServerMessage::error(e.code(), e.to_string()),
        Err(e) => {
            tracing::error!(session_id = %id, "Turn task failed: {}", e);
            WsServerMessage::error(ErrorCode::InternalError, "An internal error occurred")
        }
    };

    connected && send_server_message(sender, &outcome).await.is_ok()
}

async fn send_server_message<S>(sender: &mut S, msg: &WsServerMessage) -> Result<(), ()>
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Debug,
{
    let json = serde_json::to_string(msg).map_err(|e| {
        tracing::error!("Failed to serialize server message: {}", e);
    })?;

    sender.send(Message::Text(json)).await.map_err(|e| {
        tracing::debug!("Failed to send WebSocket message: {:?}", e);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use futures::channel::mpsc as futures_mpsc;

    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::storage::InMemorySessionStore;
    use crate::application::handlers::consultation::{
        ConsultationService, DialogueController, DialogueSettings, HealthTipGenerator,
        SuggestionGenerator, TipBoard,
    };
    use crate::domain::consultation::{HeadingReportDetector, InterviewProfile, TurnLimit};

    fn state_with(provider: MockAIProvider) -> ConsultationAppState {
        let provider = Arc::new(provider);
        let profile = InterviewProfile::wellness();
        let controller = DialogueController::new(
            provider.clone(),
            SuggestionGenerator::new(provider.clone()),
            Arc::new(HeadingReportDetector::new(profile.report_headings.iter())),
            DialogueSettings::default(),
        );
        let service = ConsultationService::new(
            Arc::new(InMemorySessionStore::new()),
            controller,
            profile,
            TurnLimit::UNLIMITED,
        );
        ConsultationAppState::new(service, Arc::new(TipBoard::new(HealthTipGenerator::new(provider))))
    }

    fn decode(msg: Message) -> serde_json::Value {
        match msg {
            Message::Text(text) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[tokio::test]
    async fn streamed_turn_sends_deltas_then_completion() {
        let state = state_with(
            MockAIProvider::new()
                .with_response("How long has this lasted?")
                .with_response("Days|Weeks"),
        );
        let id = state.service.create().await.unwrap().id;
        let (mut tx, rx) = futures_mpsc::unbounded::<Message>();

        let alive = run_streamed_turn(
            &mut tx,
            id,
            TurnRequest::Submit("I sleep badly".to_string()),
            &state,
        )
        .await;
        drop(tx);

        assert!(alive);
        let frames: Vec<serde_json::Value> = rx.map(decode).collect().await;
        let (last, deltas) = frames.split_last().unwrap();

        let streamed: String = deltas
            .iter()
            .map(|f| {
                assert_eq!(f["type"], "delta");
                f["content"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(streamed, "How long has this lasted?");
        assert_eq!(last["type"], "turn_complete");
        assert_eq!(last["session"]["stage"], "interviewing");
        assert_eq!(last["report_ready"], false);
    }

    #[tokio::test]
    async fn failed_turn_sends_error_frame() {
        let state = state_with(MockAIProvider::new());
        let id = state.service.create().await.unwrap().id;
        let (mut tx, rx) = futures_mpsc::unbounded::<Message>();

        run_streamed_turn(&mut tx, id, TurnRequest::Retry, &state).await;
        drop(tx);

        let frames: Vec<serde_json::Value> = rx.map(decode).collect().await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["type"], "error");
        assert_eq!(frames[0]["code"], "NOTHING_PENDING");
    }
}
