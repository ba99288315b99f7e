//! UseCase 層のエラー定義

use thiserror::Error;

use crate::domain::RepositoryError;

/// メッセージ送信時のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SendMessageError {
    /// The log rejected the message and the durable policy forbids fan-out
    #[error("message was not persisted: {0}")]
    NotPersisted(#[source] RepositoryError),
}

/// 履歴取得時のエラー
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    #[error("failed to load history: {0}")]
    Storage(#[from] RepositoryError),
}
