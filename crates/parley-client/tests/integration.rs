//! End-to-end tests against a real WebSocket server.
//!
//! The server stands in for the analysis service: it echoes every message
//! back inside an envelope with a canned sentiment, and reacts to a few
//! magic contents (`garbage`, `bye`, anything containing `terrible`).

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::time::timeout;

use parley_client::{ChatSession, Endpoint, SessionUpdate, WsConnector};
use parley_core::{Applied, ConnectionStatus, Role};

const TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Default)]
struct ServiceState {
    sessions: Arc<Mutex<Vec<String>>>,
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(session_id): Path<String>,
    State(state): State<ServiceState>,
) -> impl IntoResponse {
    state.sessions.lock().push(session_id);
    ws.on_upgrade(handle_socket)
}

fn reply_for(message: &Value) -> Value {
    let content = message["content"].as_str().unwrap_or_default();
    let (sentiment, suggestions) = if content.contains("terrible") {
        (
            json!({"sentiment": "negative", "score": -0.6, "reason": "customer is upset"}),
            json!(["Acknowledge the frustration", "Offer a concrete next step"]),
        )
    } else {
        (
            json!({"sentiment": "neutral", "score": 0, "reason": "greeting"}),
            json!([]),
        )
    };
    json!({"message": message, "sentiment": sentiment, "suggestions": suggestions})
}

async fn handle_socket(mut socket: WebSocket) {
    while let Some(Ok(msg)) = socket.recv().await {
        let WsMessage::Text(text) = msg else { continue };
        let Ok(message) = serde_json::from_str::<Value>(text.as_str()) else {
            continue;
        };
        match message["content"].as_str() {
            Some("bye") => {
                let _ = socket.send(WsMessage::Close(None)).await;
                return;
            }
            Some("garbage") => {
                let _ = socket.send(WsMessage::Text("{not json".into())).await;
            }
            _ => {}
        }
        let reply = reply_for(&message).to_string();
        if socket.send(WsMessage::Text(reply.into())).await.is_err() {
            return;
        }
    }
}

/// Boot a test service and return its port plus the recorded session ids.
async fn boot_service() -> (u16, ServiceState) {
    let state = ServiceState::default();
    let app = Router::new()
        .route("/ws/{session_id}", get(ws_handler))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    }));
    (port, state)
}

fn session_for(port: u16) -> ChatSession {
    let endpoint = Endpoint::new("127.0.0.1", port, false, "/ws").unwrap();
    let connector = WsConnector::new(Duration::from_secs(2), 16);
    ChatSession::new(&endpoint, Arc::new(connector))
}

async fn next(session: &mut ChatSession) -> SessionUpdate {
    timeout(TIMEOUT, session.next_event())
        .await
        .expect("timed out waiting for session event")
        .expect("event channel closed")
}

async fn connect(session: &mut ChatSession) {
    session.connect();
    assert_eq!(session.status(), ConnectionStatus::Connecting);
    assert_eq!(
        next(session).await,
        SessionUpdate::Status {
            from: ConnectionStatus::Connecting,
            to: ConnectionStatus::Connected,
        }
    );
}

#[tokio::test]
async fn send_and_receive_echo_envelope() {
    let (port, state) = boot_service().await;
    let mut session = session_for(port);
    connect(&mut session).await;

    assert_eq!(state.sessions.lock().as_slice(), [session.session_id().to_string()]);

    let sent = session.send("hi").expect("connected session should send");
    assert_eq!(session.conversation().len(), 1);

    let update = next(&mut session).await;
    assert_eq!(
        update,
        SessionUpdate::Envelope(Applied {
            message_id: sent.id.clone(),
            appended: false,
        })
    );

    let snap = session.snapshot();
    assert_eq!(snap.messages, [sent]);
    assert_eq!(snap.sentiment.sentiment, "neutral");
    assert_eq!(snap.sentiment.reason, "greeting");
    assert!(snap.suggestions.is_empty());
}

#[tokio::test]
async fn malformed_frame_is_skipped() {
    let (port, _state) = boot_service().await;
    let mut session = session_for(port);
    connect(&mut session).await;

    let _ = session.send("garbage").unwrap();
    assert!(matches!(next(&mut session).await, SessionUpdate::Rejected { .. }));
    assert!(matches!(next(&mut session).await, SessionUpdate::Envelope(_)));
    assert_eq!(session.status(), ConnectionStatus::Connected);
    assert_eq!(session.conversation().len(), 1);
}

#[tokio::test]
async fn negative_sentiment_brings_suggestions_for_agents() {
    let (port, _state) = boot_service().await;
    let mut session = session_for(port);
    connect(&mut session).await;

    let _ = session.send("this is terrible").unwrap();
    let _ = next(&mut session).await;

    let snap = session.snapshot();
    assert_eq!(snap.sentiment.sentiment, "negative");
    assert!((snap.sentiment.score - (-0.6)).abs() < f64::EPSILON);
    assert!(snap.visible_suggestions().is_empty());

    session.change_role(Role::SupportAgent);
    assert_eq!(session.snapshot().visible_suggestions().len(), 2);
}

#[tokio::test]
async fn remote_close_then_manual_reconnect() {
    let (port, state) = boot_service().await;
    let mut session = session_for(port);
    connect(&mut session).await;

    let _ = session.send("bye").unwrap();
    assert_eq!(
        next(&mut session).await,
        SessionUpdate::Status {
            from: ConnectionStatus::Connected,
            to: ConnectionStatus::Disconnected,
        }
    );
    assert!(session.send("anyone there?").is_none());
    assert_eq!(session.conversation().len(), 1);

    session.reconnect();
    assert_eq!(session.status(), ConnectionStatus::Connecting);
    assert_eq!(
        next(&mut session).await,
        SessionUpdate::Status {
            from: ConnectionStatus::Connecting,
            to: ConnectionStatus::Connected,
        }
    );

    let sessions = state.sessions.lock().clone();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0], sessions[1]);
}

#[tokio::test]
async fn reconnect_while_open_replaces_transport_quietly() {
    let (port, state) = boot_service().await;
    let mut session = session_for(port);
    connect(&mut session).await;

    session.reconnect();
    assert_eq!(
        next(&mut session).await,
        SessionUpdate::Status {
            from: ConnectionStatus::Connecting,
            to: ConnectionStatus::Connected,
        }
    );
    assert_eq!(state.sessions.lock().len(), 2);

    // The replaced transport must not report its close.
    let late = timeout(Duration::from_millis(300), session.next_event()).await;
    assert!(late.is_err(), "unexpected event: {late:?}");
    assert_eq!(session.status(), ConnectionStatus::Connected);
}

#[tokio::test]
async fn refused_connection_reports_error_then_disconnected() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let mut session = session_for(port);
    session.connect();
    assert_eq!(
        next(&mut session).await,
        SessionUpdate::Status {
            from: ConnectionStatus::Connecting,
            to: ConnectionStatus::Error,
        }
    );
    assert_eq!(
        next(&mut session).await,
        SessionUpdate::Status {
            from: ConnectionStatus::Error,
            to: ConnectionStatus::Disconnected,
        }
    );
    assert!(session.snapshot().offers_reconnect());
}

#[tokio::test]
async fn disconnect_is_final() {
    let (port, _state) = boot_service().await;
    let mut session = session_for(port);
    connect(&mut session).await;

    session.disconnect();
    assert_eq!(session.status(), ConnectionStatus::Disconnected);
    let late = timeout(Duration::from_millis(300), session.next_event()).await;
    assert!(late.is_err(), "unexpected event: {late:?}");
}
