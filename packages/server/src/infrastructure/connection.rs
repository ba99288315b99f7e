//! Channel backed client connection.
//!
//! Each WebSocket gets a bounded outbound queue. [`ChannelConnection`] is the
//! producer side handed to the registry; [`OutboundReceiver`] is drained by the
//! task that owns the socket's write half.

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};

use crate::domain::{ClientConnection, DeliveryError};

/// Producer side of a client's outbound queue
pub struct ChannelConnection {
    sender: mpsc::Sender<String>,
    closed: watch::Sender<bool>,
}

/// Consumer side of a client's outbound queue
pub struct OutboundReceiver {
    receiver: mpsc::Receiver<String>,
    closed: watch::Receiver<bool>,
}

impl ChannelConnection {
    /// Create a connection whose queue holds at most `capacity` frames.
    ///
    /// A full queue makes `send` wait until the writer catches up.
    pub fn new(capacity: usize) -> (Self, OutboundReceiver) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let (closed_tx, closed_rx) = watch::channel(false);
        (
            Self {
                sender,
                closed: closed_tx,
            },
            OutboundReceiver {
                receiver,
                closed: closed_rx,
            },
        )
    }
}

#[async_trait]
impl ClientConnection for ChannelConnection {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }
        self.sender
            .send(text.to_owned())
            .await
            .map_err(|_| DeliveryError::Closed)
    }

    fn close(&self) {
        self.closed.send_replace(true);
    }

    fn is_closed(&self) -> bool {
        *self.closed.borrow() || self.sender.is_closed()
    }
}

impl OutboundReceiver {
    /// Next frame to write, or `None` once the connection is closed or every
    /// producer is gone.
    ///
    /// A close takes effect immediately; frames still queued are dropped.
    pub async fn recv(&mut self) -> Option<String> {
        if *self.closed.borrow() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.closed.wait_for(|closed| *closed) => None,
            frame = self.receiver.recv() => frame,
        }
    }
}
