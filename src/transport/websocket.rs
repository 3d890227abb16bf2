use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::spawn;
use tokio::sync::mpsc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::accept_hdr_async;
use tracing::{debug, info, warn};
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::protocol::Message as WsMessage;

use std::sync::Arc;

use crate::auth::{Authorizer, Decision, Operation, Principal};
use crate::channel::{ChannelClosed, DeliveryChannel};
use crate::dispatch::{DispatchEngine, Outcome};
use crate::registry::ConnectionId;
use crate::transport::message::ClientEvent;

/// Delivery channel backed by a connection's outbound frame queue.
///
/// Frames are handed to an unbounded channel drained by the connection's
/// writer task, so a push never blocks the dispatch fan-out loop.
pub struct WsChannel {
    connection: ConnectionId,
    sender: UnboundedSender<WsMessage>,
}

impl WsChannel {
    pub fn new(connection: ConnectionId, sender: UnboundedSender<WsMessage>) -> Self {
        Self { connection, sender }
    }
}

impl DeliveryChannel for WsChannel {
    fn push(&self, event: &str, payload: Value) -> Result<(), ChannelClosed> {
        let frame = json!({ "event": event, "data": payload });
        let text = serde_json::to_string(&frame).map_err(|e| ChannelClosed(e.to_string()))?;
        self.sender
            .send(WsMessage::text(text))
            .map_err(|_| ChannelClosed(self.connection.clone()))
    }
}

pub async fn start_websocket_server(
    addr: &str,
    engine: Arc<DispatchEngine>,
    authorizer: Arc<dyn Authorizer>,
) {
    let listener = TcpListener::bind(addr).await.expect("Can't bind");

    info!("WebSocket server listening on ws://{addr}");

    while let Ok((stream, _)) = listener.accept().await {
        let engine = engine.clone();
        let authorizer = authorizer.clone();
        let connection_id = format!("conn-{}", uuid::Uuid::new_v4());

        tokio::spawn(async move {
            handle_connection(stream, connection_id, engine, authorizer).await;
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    connection_id: ConnectionId,
    engine: Arc<DispatchEngine>,
    authorizer: Arc<dyn Authorizer>,
) {
    let mut credential: Option<String> = None;
    let ws_stream = match accept_hdr_async(
        stream,
        |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            credential = req
                .uri()
                .query()
                .and_then(|query| credential_from_query(query));
            Ok(resp)
        },
    )
    .await
    {
        Ok(ws) => ws,
        Err(e) => {
            warn!("WebSocket handshake error: {e}");
            return;
        }
    };

    // Connection-level precondition: resolve the credential before any
    // event is processed. Dropping the stream closes the connection.
    let principal = match authorizer.authorize(credential.as_deref(), Operation::Subscribe) {
        Decision::Allowed(principal) => principal,
        Decision::Forbidden => {
            warn!("closing forbidden connection {connection_id}");
            return;
        }
        Decision::Unauthenticated => {
            warn!("closing unauthenticated connection {connection_id}");
            return;
        }
    };

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Create the outbound frame queue for this connection
    let (tx, mut rx) = mpsc::unbounded_channel::<WsMessage>();
    let channel = Arc::new(WsChannel::new(connection_id.clone(), tx));

    // Spawn a task to forward frames from engine → client
    let writer_connection = connection_id.clone();
    spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Err(e) = ws_sender.send(msg).await {
                warn!("failed to send frame to {writer_connection}: {e}");
                break;
            }
        }
        debug!("send loop closed for {writer_connection}");
    });

    // Handle incoming events from the client
    while let Some(Ok(msg)) = ws_receiver.next().await {
        if msg.is_text() {
            let text = msg.to_text().unwrap();
            match serde_json::from_str::<ClientEvent>(text) {
                Ok(event) => {
                    handle_event(&engine, &connection_id, &principal, channel.clone(), event);
                }
                Err(err) => {
                    warn!("invalid client event from {connection_id}: {err}");
                }
            }
        }
    }

    info!("{connection_id} disconnected");

    // Teardown: every subscription owned by this connection goes away now.
    engine
        .registry()
        .lock()
        .unwrap()
        .on_disconnect(&connection_id);
}

/// Applies one client event against the engine and registry.
pub(crate) fn handle_event(
    engine: &DispatchEngine,
    connection: &str,
    principal: &Principal,
    channel: Arc<dyn DeliveryChannel>,
    event: ClientEvent,
) {
    match event {
        ClientEvent::Start {
            id,
            filter,
            target_type,
        } => {
            engine
                .registry()
                .lock()
                .unwrap()
                .start(connection, &id, filter, &target_type, channel);
            debug!("{connection} started subscription {id}");
        }

        ClientEvent::Stop { id } => {
            engine.registry().lock().unwrap().stop(connection, &id);
            debug!("{connection} stopped subscription {id}");
        }

        ClientEvent::Messages {
            unique_id,
            mut messages,
        } => {
            // A submitter that omits from is submitting as itself.
            for raw in messages.iter_mut() {
                raw.from.get_or_insert_with(|| principal.id.clone());
            }

            let outcomes = engine.submit(messages);
            let reply = json!({
                "messages": outcomes.iter().map(outcome_value).collect::<Vec<_>>()
            });

            if let Err(e) = channel.push(&unique_id, reply) {
                warn!("failed to reply to {connection}: {e}");
            }
        }
    }
}

/// One JSON value per outcome: the stored message, or its error.
fn outcome_value(outcome: &Outcome) -> Value {
    match outcome {
        Ok(message) => serde_json::to_value(message)
            .unwrap_or_else(|e| json!({ "error": e.to_string() })),
        Err(e) => json!({ "error": e.to_string() }),
    }
}

/// Extracts the `auth` parameter from a connection request's query string.
pub(crate) fn credential_from_query(query: &str) -> Option<String> {
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("auth="))
        .map(|token| token.to_string())
}
