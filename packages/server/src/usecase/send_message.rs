//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 永続ログへの追記と、ルーム全員へのブロードキャスト
//!
//! ### なぜこのテストが必要か
//! - 追記で割り当てられた ID が配信されるメッセージに載ることを保証
//! - 永続化に失敗したときの挙動がポリシー通りであることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：追記成功 → 送信者を含むルーム全員に配信
//! - 異常系：追記失敗（best-effort ポリシー / durable ポリシー）

use std::sync::Arc;

use serde::Serialize;

use crate::{
    config::PersistencePolicy,
    domain::{MessageRepository, NewChatMessage, RelayedMessage},
};

use super::{
    deliver_message::{DeliverMessageUseCase, DeliveryReport},
    error::SendMessageError,
};

/// Result of relaying one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// The message as it was fanned out
    pub message: RelayedMessage,
    pub report: DeliveryReport,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn MessageRepository>,
    deliver: DeliverMessageUseCase,
    policy: PersistencePolicy,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(
        repository: Arc<dyn MessageRepository>,
        deliver: DeliverMessageUseCase,
        policy: PersistencePolicy,
    ) -> Self {
        Self {
            repository,
            deliver,
            policy,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Arguments
    ///
    /// * `message` - 受信時刻が付与済みのメッセージ（Domain Model）
    /// * `to_payload` - 配信するメッセージを送信フォーマットに変換する
    ///
    /// # Returns
    ///
    /// * `Ok(SentMessage)` - 配信したメッセージと配信結果
    /// * `Err(SendMessageError)` - durable ポリシーで永続化に失敗した場合
    pub async fn execute<T, F>(
        &self,
        message: NewChatMessage,
        to_payload: F,
    ) -> Result<SentMessage, SendMessageError>
    where
        T: Serialize,
        F: FnOnce(&RelayedMessage) -> T,
    {
        // 1. 永続ログに追記
        let relayed = match self.repository.append(&message).await {
            Ok(id) => RelayedMessage::from(message.into_persisted(id)),
            Err(e) => match self.policy {
                PersistencePolicy::BestEffort => {
                    tracing::warn!(
                        "Failed to persist message from '{}' in room '{}', delivering anyway: {}",
                        message.sender,
                        message.room,
                        e
                    );
                    RelayedMessage::from(message)
                }
                PersistencePolicy::Durable => {
                    tracing::error!(
                        "Failed to persist message from '{}' in room '{}', not delivering: {}",
                        message.sender,
                        message.room,
                        e
                    );
                    return Err(SendMessageError::NotPersisted(e));
                }
            },
        };

        // 2. ルーム全員（送信者を含む）にブロードキャスト
        let payload = to_payload(&relayed);
        let report = self.deliver.execute(&relayed.room, &payload).await;

        Ok(SentMessage {
            message: relayed,
            report,
        })
    }
}
