//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - Registry からの削除と接続のクローズ
//!
//! ### なぜこのテストが必要か
//! - 配信失敗で既に削除された参加者の切断が安全であることを保証
//! - 切断後は接続が閉じられていることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断
//! - エッジケース：ブロードキャスト側で既に削除済みの参加者の切断

use std::sync::Arc;

use crate::domain::{Client, RoomRegistry};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<dyn RoomRegistry>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(registry: Arc<dyn RoomRegistry>) -> Self {
        Self { registry }
    }

    /// 参加者切断を実行
    ///
    /// # Returns
    ///
    /// * `true` - この呼び出しで Registry から削除した
    /// * `false` - 既に削除されていた（配信失敗による削除との競合）
    pub async fn execute(&self, client: &Client) -> bool {
        let removed = self.registry.leave(&client.room, &client.id).await;
        client.connection().close();
        removed
    }

    /// 残りの参加者数を取得
    pub async fn count_remaining_participants(&self, client: &Client) -> usize {
        self.registry.member_count(&client.room).await
    }
}
