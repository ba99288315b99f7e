//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade, rejection::WebSocketUpgradeRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::oneshot;

use crate::{
    domain::{RoomId, Username},
    infrastructure::connection::ChannelConnection,
    ui::{
        session::{ConnectionSession, InboundFrame},
        state::{AppState, ConnectQuery},
    },
};

/// `GET /ws?username=&room=`
///
/// Parameters are validated before the upgrade, so a blank name is a 400
/// whether or not the request asked for a WebSocket.
pub async fn websocket_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let (username, room) = match query.validate() {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!("Rejecting connection: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    match ws {
        Ok(ws) => ws
            .on_upgrade(move |socket| handle_socket(socket, state, username, room))
            .into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, username: Username, room: RoomId) {
    let (mut sink, stream) = socket.split();
    let (connection, mut outbound) = ChannelConnection::new(state.settings.outbound_buffer);

    let mut session =
        ConnectionSession::join(&state, username, room, Arc::new(connection)).await;
    let client_label = format!("{} ({})", session.client().username, session.client().id);

    // Drain this client's outbound queue into the socket
    let (writer_done_tx, writer_done_rx) = oneshot::channel::<()>();
    let mut writer = tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                tracing::debug!("Socket write failed: {}", e);
                break;
            }
        }
        // Dropping the receiver marks the connection closed before the relay is told to stop
        drop(outbound);
        let _ = writer_done_tx.send(());
        let _ = sink.close().await;
    });

    let inbound = stream.map(|frame| match frame {
        Ok(Message::Text(text)) => InboundFrame::Text(text.as_str().to_owned()),
        Ok(Message::Binary(bytes)) => InboundFrame::Binary(bytes.to_vec()),
        Ok(Message::Ping(_)) => InboundFrame::Ping,
        Ok(Message::Pong(_)) => InboundFrame::Pong,
        Ok(Message::Close(_)) => InboundFrame::Close,
        Err(e) => {
            tracing::debug!("Socket read failed: {}", e);
            InboundFrame::Close
        }
    });

    // A dead writer stops the relay between frames, never in the middle of a fan-out
    let end = session.relay_until(inbound, writer_done_rx).await;
    tracing::info!("Relay for '{}' ended: {:?}", client_label, end);

    let send_timeout = state.settings.send_timeout;
    session.close().await;

    // Closing the connection ends the writer; give it a moment to send the close frame
    if tokio::time::timeout(send_timeout, &mut writer).await.is_err() {
        writer.abort();
    }
}
