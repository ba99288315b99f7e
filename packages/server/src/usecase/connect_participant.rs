//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 参加者の Registry への登録
//!
//! ### なぜこのテストが必要か
//! - 登録直後のスナップショットに参加者が含まれることを保証
//! - 同じ表示名でも別の接続として登録されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加者の接続
//! - エッジケース：同じ表示名での複数接続

use std::sync::Arc;

use crate::domain::{
    Client, ClientConnection, ConnectionIdFactory, RoomId, RoomRegistry, Timestamp, Username,
};

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者接続を実行
    ///
    /// # Arguments
    ///
    /// * `username` - 表示名（Domain Model）
    /// * `room` - 参加するルーム（Domain Model）
    /// * `connection` - この接続の送信ハンドル
    ///
    /// # Returns
    ///
    /// 登録されたクライアント。以降のライフサイクルは呼び出し側が所有する
    pub async fn execute(
        &self,
        username: Username,
        room: RoomId,
        connection: Arc<dyn ClientConnection>,
    ) -> Client {
        let client = Client::new(
            ConnectionIdFactory::generate(),
            username,
            room,
            Timestamp::now(),
            connection,
        );
        self.registry.join(client.clone()).await;
        client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        infrastructure::repository::InMemoryRoomRegistry, test_support::RecordingConnection,
    };

    fn create_test_usecase() -> (Arc<InMemoryRoomRegistry>, ConnectParticipantUseCase) {
        let registry = Arc::new(InMemoryRoomRegistry::new());
        let usecase = ConnectParticipantUseCase::new(registry.clone());
        (registry, usecase)
    }

    #[tokio::test]
    async fn test_connect_participant_success() {
        // テスト項目: 新規参加者が Registry に登録される
        // given (前提条件):
        let (registry, usecase) = create_test_usecase();
        let room = RoomId::new("lobby").unwrap();

        // when (操作):
        let client = usecase
            .execute(
                Username::new("alice").unwrap(),
                room.clone(),
                RecordingConnection::healthy(),
            )
            .await;

        // then (期待する結果):
        let snapshot = registry.snapshot(&room).await;
        assert_eq!(snapshot, vec![client.clone()]);
        assert_eq!(client.username.as_str(), "alice");
        assert_eq!(client.room, room);
    }

    #[tokio::test]
    async fn test_connect_same_name_twice() {
        // テスト項目: 同じ表示名でも別々のクライアントとして登録される
        // given (前提条件):
        let (registry, usecase) = create_test_usecase();
        let room = RoomId::new("lobby").unwrap();

        // when (操作):
        let first = usecase
            .execute(
                Username::new("alice").unwrap(),
                room.clone(),
                RecordingConnection::healthy(),
            )
            .await;
        let second = usecase
            .execute(
                Username::new("alice").unwrap(),
                room.clone(),
                RecordingConnection::healthy(),
            )
            .await;

        // then (期待する結果):
        assert_ne!(first.id, second.id);
        assert_eq!(registry.member_count(&room).await, 2);
    }
}
