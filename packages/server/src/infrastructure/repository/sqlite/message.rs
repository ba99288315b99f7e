//! SQLite Message Repository 実装
//!
//! ドメイン層が定義する MessageRepository trait の具体的な実装。
//! `messages` テーブルへの追記と、ルーム単位のページング読み出しを提供します。
//!
//! スキーマは起動時に一度だけ、単一トランザクション内の冪等な DDL で作成します。
//! WAL モードで開くため、追記中でも読み出しはブロックされません。

use std::{str::FromStr, time::Duration};

use async_trait::async_trait;
use sqlx::{
    FromRow, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};

use crate::domain::{
    ChatMessage, MessageId, MessageRepository, NewChatMessage, Pagination, RepositoryError,
    RoomId, Timestamp, Username,
};

const MAX_CONNECTIONS: u32 = 16;

const CREATE_MESSAGES_TABLE: &str = "CREATE TABLE IF NOT EXISTS messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    room TEXT NOT NULL,
    sender TEXT NOT NULL,
    content TEXT NOT NULL,
    timestamp INTEGER NOT NULL
)";

const CREATE_ROOM_TIMESTAMP_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_messages_room_timestamp ON messages (room, timestamp)";

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        RepositoryError::Storage(err.to_string())
    }
}

#[derive(Debug, FromRow)]
struct MessageRow {
    id: i64,
    room: String,
    sender: String,
    content: String,
    timestamp: i64,
}

impl TryFrom<MessageRow> for ChatMessage {
    type Error = RepositoryError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        let room = RoomId::new(row.room)
            .map_err(|e| RepositoryError::Storage(format!("row {}: {e}", row.id)))?;
        let sender = Username::new(row.sender)
            .map_err(|e| RepositoryError::Storage(format!("row {}: {e}", row.id)))?;
        Ok(ChatMessage {
            id: MessageId::new(row.id),
            room,
            sender,
            content: row.content,
            timestamp: Timestamp::new(row.timestamp),
        })
    }
}

/// SQLite Message Repository 実装
pub struct SqliteMessageRepository {
    pool: SqlitePool,
}

impl SqliteMessageRepository {
    /// Open (creating if missing) the database at `database_url` and initialize the schema.
    ///
    /// `sqlite::memory:` URLs get a single, never-recycled connection so the
    /// whole process shares one in-memory database.
    pub async fn connect(database_url: &str) -> Result<Self, RepositoryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| RepositoryError::SchemaInit(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5));

        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::SchemaInit(e.to_string()))?;

        let repository = Self { pool };
        repository.init_schema().await?;
        tracing::info!("Message log ready at '{}'", database_url);
        Ok(repository)
    }

    /// Create the table and index if absent.
    ///
    /// Runs as one transaction so concurrent initializers are serialized by
    /// SQLite's own locking.
    async fn init_schema(&self) -> Result<(), RepositoryError> {
        let schema_err = |e: sqlx::Error| RepositoryError::SchemaInit(e.to_string());

        let mut tx = self.pool.begin().await.map_err(schema_err)?;
        sqlx::query(CREATE_MESSAGES_TABLE)
            .execute(&mut *tx)
            .await
            .map_err(schema_err)?;
        sqlx::query(CREATE_ROOM_TIMESTAMP_INDEX)
            .execute(&mut *tx)
            .await
            .map_err(schema_err)?;
        tx.commit().await.map_err(schema_err)?;
        Ok(())
    }

    /// Close every pooled connection. Later calls fail with a storage error.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl MessageRepository for SqliteMessageRepository {
    async fn append(&self, message: &NewChatMessage) -> Result<MessageId, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO messages (room, sender, content, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(message.room.as_str())
        .bind(message.sender.as_str())
        .bind(&message.content)
        .bind(message.timestamp.value())
        .execute(&self.pool)
        .await?;

        Ok(MessageId::new(result.last_insert_rowid()))
    }

    async fn query(
        &self,
        room: &RoomId,
        pagination: Pagination,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows: Vec<MessageRow> = sqlx::query_as(
            "SELECT id, room, sender, content, timestamp FROM messages \
             WHERE room = ? ORDER BY timestamp ASC, id ASC LIMIT ? OFFSET ?",
        )
        .bind(room.as_str())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(ChatMessage::try_from).collect()
    }
}
