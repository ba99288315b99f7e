//! UseCase: ルームへのファンアウト配信
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DeliverMessageUseCase::execute() メソッド
//! - ルームのスナップショット全員への配信と、失敗した宛先の除去
//!
//! ### なぜこのテストが必要か
//! - 1 つの宛先の失敗が他の宛先への配信を妨げないことを保証
//! - 失敗・停止した接続が Registry に残り続けないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：全員に配信
//! - 異常系：書き込みに失敗する宛先、応答しない宛先（タイムアウト）
//! - エッジケース：誰も居ないルーム、別ルームの宛先

use std::{sync::Arc, time::Duration};

use futures_util::future::join_all;
use serde::Serialize;

use crate::domain::{ConnectionId, DeliveryError, RoomId, RoomRegistry};

/// Default bound on a single recipient's write
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of one fan-out
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Recipients whose write succeeded
    pub delivered: usize,
    /// Recipients that failed and were removed from the room
    pub removed: Vec<ConnectionId>,
}

/// ルーム全員への配信のユースケース
pub struct DeliverMessageUseCase {
    registry: Arc<dyn RoomRegistry>,
    send_timeout: Duration,
}

impl DeliverMessageUseCase {
    /// 新しい DeliverMessageUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>, send_timeout: Duration) -> Self {
        Self {
            registry,
            send_timeout,
        }
    }

    /// `payload` をルームの全メンバーに配信
    ///
    /// The payload is serialized once. Writes run concurrently and each one is
    /// bounded by the send timeout; a recipient whose write fails or times out
    /// is closed and removed from the room. Failures are never retried.
    pub async fn execute<T>(&self, room: &RoomId, payload: &T) -> DeliveryReport
    where
        T: Serialize + ?Sized,
    {
        let text = match serde_json::to_string(payload) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to serialize payload for room '{}': {}", room, e);
                return DeliveryReport::default();
            }
        };

        let recipients = self.registry.snapshot(room).await;
        let send_timeout = self.send_timeout;
        let text = text.as_str();

        let results = join_all(recipients.iter().map(|client| async move {
            let result = match tokio::time::timeout(send_timeout, client.connection().send(text))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(DeliveryError::Timeout(send_timeout)),
            };
            (client, result)
        }))
        .await;

        let mut report = DeliveryReport::default();
        for (client, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to deliver to '{}' ({}) in room '{}': {}. Removing client",
                        client.username,
                        client.id,
                        room,
                        e
                    );
                    client.connection().close();
                    self.registry.leave(room, &client.id).await;
                    report.removed.push(client.id);
                }
            }
        }

        tracing::debug!(
            "Delivered to {} client(s) in room '{}' ({} removed)",
            report.delivered,
            room,
            report.removed.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::ClientConnection,
        infrastructure::repository::InMemoryRoomRegistry,
        test_support::{RecordingConnection, test_client},
    };

    fn create_test_usecase(
        send_timeout: Duration,
    ) -> (Arc<InMemoryRoomRegistry>, DeliverMessageUseCase) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = DeliverMessageUseCase::new(registry.clone(), send_timeout);
        (registry, usecase)
    }

    #[tokio::test]
    async fn test_deliver_to_all_members() {
        // テスト項目: ルームの全員に同じペイロードが 1 回ずつ届く
        // given (前提条件):
        let (registry, usecase) = create_test_usecase(DEFAULT_SEND_TIMEOUT);
        let alice = RecordingConnection::healthy();
        let bob = RecordingConnection::healthy();
        registry.join(test_client("alice", "lobby", alice.clone())).await;
        registry.join(test_client("bob", "lobby", bob.clone())).await;

        // when (操作):
        let report = usecase
            .execute(&RoomId::new("lobby").unwrap(), &serde_json::json!({"n": 1}))
            .await;

        // then (期待する結果):
        assert_eq!(report.delivered, 2);
        assert!(report.removed.is_empty());
        assert_eq!(alice.sent(), vec![r#"{"n":1}"#.to_string()]);
        assert_eq!(bob.sent(), vec![r#"{"n":1}"#.to_string()]);
    }

    #[tokio::test]
    async fn test_failing_recipient_is_removed_and_others_still_receive() {
        // テスト項目: 1 人の失敗は他の K 人への配信を妨げず、失敗した宛先は除去される
        // given (前提条件):
        let (registry, usecase) = create_test_usecase(DEFAULT_SEND_TIMEOUT);
        let room = RoomId::new("lobby").unwrap();
        let broken = RecordingConnection::failing();
        let broken_client = test_client("broken", "lobby", broken.clone());
        registry.join(broken_client.clone()).await;
        let healthy: Vec<_> = (0..3).map(|_| RecordingConnection::healthy()).collect();
        for (i, conn) in healthy.iter().enumerate() {
            registry
                .join(test_client(&format!("user{i}"), "lobby", conn.clone()))
                .await;
        }

        // when (操作):
        let report = usecase.execute(&room, "hello").await;

        // then (期待する結果):
        assert_eq!(report.delivered, 3);
        assert_eq!(report.removed, vec![broken_client.id]);
        for conn in &healthy {
            assert_eq!(conn.sent().len(), 1);
        }
        assert_eq!(broken.close_calls(), 1);
        let snapshot = registry.snapshot(&room).await;
        assert_eq!(snapshot.len(), 3);
        assert!(!snapshot.contains(&broken_client));
    }

    #[tokio::test]
    async fn test_stalled_recipient_times_out_and_is_removed() {
        // テスト項目: 応答しない宛先はタイムアウトで失敗扱いになり、他の配信を止めない
        // given (前提条件):
        let (registry, usecase) = create_test_usecase(Duration::from_millis(50));
        let room = RoomId::new("lobby").unwrap();
        let stalled = RecordingConnection::stalled();
        let stalled_client = test_client("slow", "lobby", stalled.clone());
        let healthy = RecordingConnection::healthy();
        registry.join(stalled_client.clone()).await;
        registry.join(test_client("fast", "lobby", healthy.clone())).await;

        // when (操作):
        let report = tokio::time::timeout(Duration::from_secs(2), usecase.execute(&room, "hi"))
            .await
            .expect("delivery must not hang on a stalled recipient");

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.removed, vec![stalled_client.id]);
        assert_eq!(healthy.sent().len(), 1);
        assert!(stalled.is_closed());
        assert_eq!(registry.member_count(&room).await, 1);
    }

    #[tokio::test]
    async fn test_deliver_to_empty_room() {
        // テスト項目: 誰も居ないルームへの配信はエラーにならない
        // given (前提条件):
        let (_registry, usecase) = create_test_usecase(DEFAULT_SEND_TIMEOUT);

        // when (操作):
        let report = usecase.execute(&RoomId::new("empty").unwrap(), "x").await;

        // then (期待する結果):
        assert_eq!(report, DeliveryReport::default());
    }

    #[tokio::test]
    async fn test_other_rooms_receive_nothing() {
        // テスト項目: 別ルームのクライアントには配信されない
        // given (前提条件):
        let (registry, usecase) = create_test_usecase(DEFAULT_SEND_TIMEOUT);
        let lobby = RecordingConnection::healthy();
        let other = RecordingConnection::healthy();
        registry.join(test_client("alice", "lobby", lobby.clone())).await;
        registry.join(test_client("carol", "other", other.clone())).await;

        // when (操作):
        usecase.execute(&RoomId::new("lobby").unwrap(), "hello").await;

        // then (期待する結果):
        assert_eq!(lobby.sent().len(), 1);
        assert!(other.sent().is_empty());
    }

    #[tokio::test]
    async fn test_already_removed_recipient_is_tolerated() {
        // テスト項目: セッション側で既に leave 済みのクライアントが失敗しても問題ない
        // given (前提条件):
        let (registry, usecase) = create_test_usecase(DEFAULT_SEND_TIMEOUT);
        let room = RoomId::new("lobby").unwrap();
        let gone = RecordingConnection::healthy();
        let gone_client = test_client("gone", "lobby", gone.clone());
        let bob = RecordingConnection::healthy();
        registry.join(gone_client.clone()).await;
        registry.join(test_client("bob", "lobby", bob.clone())).await;
        // 切断済み（close 済み）の接続
        gone.close();

        // when (操作):
        let report = usecase.execute(&room, "still here?").await;

        // then (期待する結果):
        assert_eq!(report.delivered, 1);
        assert_eq!(report.removed, vec![gone_client.id]);
        assert!(!registry.leave(&room, &gone_client.id).await);
        assert_eq!(bob.sent().len(), 1);
    }
}
