//! UseCase: 履歴取得処理
//!
//! 永続ログの読み出しをページ単位で公開する読み取り専用のユースケース。

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageRepository, Pagination, RoomId};

use super::error::HistoryError;

/// 履歴取得のユースケース
pub struct GetHistoryUseCase {
    repository: Arc<dyn MessageRepository>,
}

impl GetHistoryUseCase {
    /// 新しい GetHistoryUseCase を作成
    pub fn new(repository: Arc<dyn MessageRepository>) -> Self {
        Self { repository }
    }

    /// ルームの履歴を古い順に取得
    ///
    /// Pagination has already been clamped; an empty room yields an empty vector.
    pub async fn execute(
        &self,
        room: &RoomId,
        pagination: Pagination,
    ) -> Result<Vec<ChatMessage>, HistoryError> {
        Ok(self.repository.query(room, pagination).await?)
    }
}
