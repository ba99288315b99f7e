//! Test doubles shared by unit tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::domain::{
    Client, ClientConnection, ConnectionIdFactory, DeliveryError, RoomId, Timestamp, Username,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Behavior {
    Healthy,
    /// Every write fails with a transport error
    Failing,
    /// Every write hangs forever
    Stalled,
}

/// Connection that records what it was sent
pub(crate) struct RecordingConnection {
    behavior: Behavior,
    sent: Mutex<Vec<String>>,
    close_calls: AtomicUsize,
}

impl RecordingConnection {
    pub(crate) fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            sent: Mutex::new(Vec::new()),
            close_calls: AtomicUsize::new(0),
        })
    }

    pub(crate) fn healthy() -> Arc<Self> {
        Self::new(Behavior::Healthy)
    }

    pub(crate) fn failing() -> Arc<Self> {
        Self::new(Behavior::Failing)
    }

    pub(crate) fn stalled() -> Arc<Self> {
        Self::new(Behavior::Stalled)
    }

    pub(crate) fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Sent frames parsed as JSON
    pub(crate) fn sent_json(&self) -> Vec<serde_json::Value> {
        self.sent()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect()
    }

    pub(crate) fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClientConnection for RecordingConnection {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        if self.is_closed() {
            return Err(DeliveryError::Closed);
        }
        match self.behavior {
            Behavior::Healthy => {
                self.sent.lock().unwrap().push(text.to_string());
                Ok(())
            }
            Behavior::Failing => Err(DeliveryError::Transport("broken pipe".to_string())),
            Behavior::Stalled => std::future::pending().await,
        }
    }

    fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.close_calls() > 0
    }
}

/// A client of `room` backed by `connection`
pub(crate) fn test_client(name: &str, room: &str, connection: Arc<RecordingConnection>) -> Client {
    Client::new(
        ConnectionIdFactory::generate(),
        Username::new(name).unwrap(),
        RoomId::new(room).unwrap(),
        Timestamp::new(1000),
        connection,
    )
}
