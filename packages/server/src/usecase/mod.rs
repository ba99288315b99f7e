//! UseCase 層
//!
//! ビジネスロジックを実装するレイヤー。
//! UI 層から呼び出され、Domain 層を操作します。

pub mod connect_participant;
pub mod deliver_message;
pub mod disconnect_participant;
pub mod error;
pub mod get_history;
pub mod send_message;

pub use connect_participant::ConnectParticipantUseCase;
pub use deliver_message::{DeliverMessageUseCase, DeliveryReport};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{HistoryError, SendMessageError};
pub use get_history::GetHistoryUseCase;
pub use send_message::{SendMessageUseCase, SentMessage};
