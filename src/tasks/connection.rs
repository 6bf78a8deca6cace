//! Backend connection task

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info};

use crate::state::Session;

/// Own the single WebSocket connection to the timer backend.
///
/// Opens `session.backend_uri()` once, forwards queued outbound messages and
/// hands every inbound text frame to the session. There is no reconnect: when
/// the socket fails or closes the session is marked closed and the task ends.
/// Closing the outbound queue (session teardown) closes the socket. Messages
/// still queued when the socket goes away are reported as not sent.
pub async fn connection_task(
    session: Arc<Session>,
    mut outbound: mpsc::UnboundedReceiver<String>,
) {
    info!("Connecting to timer backend at {}", session.backend_uri());

    let ws_stream = match connect_async(session.backend_uri()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            error!("Failed to connect to {}: {}", session.backend_uri(), e);
            session.connection_failed(&e.to_string());
            session.connection_closed();
            return;
        }
    };

    session.connection_opened();
    let (mut ws_sink, mut ws_source) = ws_stream.split();

    loop {
        tokio::select! {
            queued = outbound.recv() => match queued {
                Some(text) => {
                    if let Err(e) = ws_sink.send(Message::text(text.clone())).await {
                        error!("Failed to send to backend: {}", e);
                        session.connection_failed(&e.to_string());
                        session.message_lost(&text);
                        break;
                    }
                }
                None => {
                    debug!("Outbound queue closed, closing backend connection");
                    if let Err(e) = ws_sink.send(Message::Close(None)).await {
                        debug!("Failed to send close frame: {}", e);
                    }
                    break;
                }
            },

            frame = ws_source.next() => match frame {
                Some(Ok(Message::Text(text))) => session.handle_message(text.as_str()),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Backend closed the connection: {:?}", frame);
                    break;
                }
                Some(Ok(other)) => debug!("Ignoring non-text frame: {:?}", other),
                Some(Err(e)) => {
                    error!("Backend connection error: {}", e);
                    session.connection_failed(&e.to_string());
                    break;
                }
                None => break,
            },
        }
    }

    session.connection_closed();

    outbound.close();
    while let Ok(message) = outbound.try_recv() {
        session.message_lost(&message);
    }
}
