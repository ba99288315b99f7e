//! Per-connection session lifecycle.
//!
//! A connection is validated before the upgrade ([`ConnectQuery::validate`]),
//! so a session only exists once it has joined: [`ConnectionSession::join`]
//! yields a `Joined` session, [`ConnectionSession::relay`] drives `Relaying`,
//! and [`ConnectionSession::close`] consumes the session so cleanup can only
//! run once.
//!
//! [`ConnectQuery::validate`]: crate::ui::state::ConnectQuery::validate

use std::{future::Future, pin::pin, sync::Arc, time::Duration};

use futures_util::{Stream, StreamExt};

use crate::{
    config::SessionSettings,
    domain::{Client, ClientConnection, NewChatMessage, RoomId, Timestamp, Username},
    infrastructure::dto::websocket::{MessageDto, ServerEvent},
    ui::state::AppState,
    usecase::{
        ConnectParticipantUseCase, DeliverMessageUseCase, DisconnectParticipantUseCase,
        SendMessageError, SendMessageUseCase,
    },
};

/// A frame read from the client, independent of the socket library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    /// Close frame, read error or protocol violation
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Joined,
    Relaying,
    Closed,
}

/// Why the relay loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// Close frame or read error
    ClientClosed,
    /// The inbound stream ended without a close frame, or the stop signal fired
    StreamEnded,
    IdleTimeout(Duration),
    /// The connection was closed underneath us, e.g. removed after a failed delivery
    ConnectionClosed,
}

pub struct ConnectionSession {
    client: Client,
    state: SessionState,
    send_message: SendMessageUseCase,
    disconnect: DisconnectParticipantUseCase,
    settings: SessionSettings,
}

impl ConnectionSession {
    /// Register the client with its room and send the welcome notice
    pub async fn join(
        app: &AppState,
        username: Username,
        room: RoomId,
        connection: Arc<dyn ClientConnection>,
    ) -> Self {
        let client = ConnectParticipantUseCase::new(app.registry.clone())
            .execute(username, room, connection)
            .await;
        tracing::info!(
            "Client '{}' ({}) joined room '{}'",
            client.username,
            client.id,
            client.room
        );

        let deliver = DeliverMessageUseCase::new(app.registry.clone(), app.settings.send_timeout);
        let session = Self {
            send_message: SendMessageUseCase::new(
                app.repository.clone(),
                deliver,
                app.settings.persistence_policy,
            ),
            disconnect: DisconnectParticipantUseCase::new(app.registry.clone()),
            settings: app.settings,
            state: SessionState::Joined,
            client,
        };

        session.notify(&welcome_event(&session.client)).await;
        session
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Relay inbound frames until the client goes away or `stop` resolves.
    ///
    /// `stop` is only observed between frames: a frame that is already being
    /// relayed is appended and delivered in full, so a fan-out is never cut
    /// short.
    pub async fn relay_until<S, F>(&mut self, inbound: S, stop: F) -> RelayEnd
    where
        S: Stream<Item = InboundFrame>,
        F: Future,
    {
        let inbound = pin!(inbound.take_until(stop));
        self.relay(inbound).await
    }

    /// Relay inbound frames until the client goes away.
    ///
    /// Frames are handled one at a time, which keeps this sender's messages
    /// in order.
    pub async fn relay<S>(&mut self, mut inbound: S) -> RelayEnd
    where
        S: Stream<Item = InboundFrame> + Unpin,
    {
        self.state = SessionState::Relaying;

        loop {
            let next = match self.settings.idle_timeout {
                Some(limit) => match tokio::time::timeout(limit, inbound.next()).await {
                    Ok(next) => next,
                    Err(_) => return RelayEnd::IdleTimeout(limit),
                },
                None => inbound.next().await,
            };

            match next {
                Some(InboundFrame::Text(text)) => self.relay_text(text).await,
                Some(InboundFrame::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => self.relay_text(text).await,
                    Err(_) => {
                        tracing::warn!(
                            "Ignoring non UTF-8 binary frame from '{}' ({})",
                            self.client.username,
                            self.client.id
                        );
                    }
                },
                Some(InboundFrame::Ping) | Some(InboundFrame::Pong) => {}
                Some(InboundFrame::Close) => return RelayEnd::ClientClosed,
                None if self.client.connection().is_closed() => {
                    return RelayEnd::ConnectionClosed;
                }
                None => return RelayEnd::StreamEnded,
            }

            if self.client.connection().is_closed() {
                return RelayEnd::ConnectionClosed;
            }
        }
    }

    /// Leave the room and close the connection
    pub async fn close(mut self) -> SessionState {
        let removed = self.disconnect.execute(&self.client).await;
        let remaining = self
            .disconnect
            .count_remaining_participants(&self.client)
            .await;
        tracing::info!(
            "Client '{}' ({}) left room '{}' (removed here: {}, remaining: {})",
            self.client.username,
            self.client.id,
            self.client.room,
            removed,
            remaining
        );
        self.state = SessionState::Closed;
        self.state
    }

    async fn relay_text(&self, content: String) {
        let message = NewChatMessage::new(
            self.client.room.clone(),
            self.client.username.clone(),
            content,
            Timestamp::now(),
        );

        let relayed = self
            .send_message
            .execute(message, |message| ServerEvent::Message {
                message: MessageDto::from(message),
            })
            .await;

        match relayed {
            Ok(sent) => {
                tracing::debug!(
                    "Relayed message {:?} from '{}' to {} client(s) in '{}'",
                    sent.message.id,
                    self.client.username,
                    sent.report.delivered,
                    self.client.room
                );
            }
            Err(SendMessageError::NotPersisted(_)) => {
                self.notify(&ServerEvent::System {
                    text: "Your message could not be saved and was not delivered".to_string(),
                    ts: Timestamp::now().value(),
                })
                .await;
            }
        }
    }

    /// Send a session-local event to this client only
    async fn notify(&self, event: &ServerEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize system event: {}", e);
                return;
            }
        };

        let send = self.client.connection().send(&text);
        match tokio::time::timeout(self.settings.send_timeout, send).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!("Failed to notify '{}': {}", self.client.username, e);
            }
            Err(_) => {
                tracing::warn!("Timed out notifying '{}'", self.client.username);
            }
        }
    }
}

/// Welcome notice for the joining client only; never persisted
fn welcome_event(client: &Client) -> ServerEvent {
    ServerEvent::System {
        text: format!(
            "You joined room {} as {}",
            client.room.as_str(),
            client.username.as_str()
        ),
        ts: Timestamp::now().value(),
    }
}
