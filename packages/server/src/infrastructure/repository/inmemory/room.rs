//! InMemory Room Registry 実装
//!
//! ドメイン層が定義する RoomRegistry trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## ロック構成
//!
//! ```text
//! RwLock<HashMap<RoomId, Arc<Mutex<RoomEntry>>>>
//!        └─ トップレベル: ルームの検索・作成・削除のみ
//!                                 └─ ルーム単位: メンバーの追加・削除・スナップショット
//! ```
//!
//! メンバー操作はルーム単位の Mutex だけを取得するため、別ルームの操作は競合しません。
//! 空になったルームは削除されます。削除済みエントリに対する join は
//! `evicted` フラグで検知し、新しいエントリで再試行します。
//!
//! ロック順序はトップレベル → ルームのみ。ルームのロックを保持したまま
//! トップレベルのロックを待つ経路はありません。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};

use crate::domain::{Client, ConnectionId, RoomId, RoomRegistry};

#[derive(Default)]
struct RoomEntry {
    members: HashMap<ConnectionId, Client>,
    /// Set once the entry has been removed from the top-level map
    evicted: bool,
}

/// インメモリ Room Registry 実装
#[derive(Default)]
pub struct InMemoryRoomRegistry {
    rooms: RwLock<HashMap<RoomId, Arc<Mutex<RoomEntry>>>>,
}

impl InMemoryRoomRegistry {
    /// 新しい InMemoryRoomRegistry を作成
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms with at least one member
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    async fn entry(&self, room: &RoomId) -> Option<Arc<Mutex<RoomEntry>>> {
        self.rooms.read().await.get(room).cloned()
    }

    async fn entry_or_create(&self, room: &RoomId) -> Arc<Mutex<RoomEntry>> {
        if let Some(entry) = self.entry(room).await {
            return entry;
        }
        let mut rooms = self.rooms.write().await;
        rooms.entry(room.clone()).or_default().clone()
    }

    async fn evict_if_empty(&self, room: &RoomId) {
        let mut rooms = self.rooms.write().await;
        let Some(entry) = rooms.get(room).cloned() else {
            return;
        };
        let mut guard = entry.lock().await;
        if guard.members.is_empty() {
            guard.evicted = true;
            rooms.remove(room);
            tracing::debug!("Room '{}' is empty and was evicted", room);
        }
    }
}

#[async_trait]
impl RoomRegistry for InMemoryRoomRegistry {
    async fn join(&self, client: Client) {
        loop {
            let entry = self.entry_or_create(&client.room).await;
            let mut guard = entry.lock().await;
            if guard.evicted {
                // lost a race with eviction; the next lookup creates a fresh entry
                continue;
            }
            tracing::debug!(
                "Client '{}' ({}) joined room '{}'",
                client.username,
                client.id,
                client.room
            );
            guard.members.insert(client.id, client);
            return;
        }
    }

    async fn leave(&self, room: &RoomId, client_id: &ConnectionId) -> bool {
        let Some(entry) = self.entry(room).await else {
            return false;
        };

        let (removed, now_empty) = {
            let mut guard = entry.lock().await;
            let removed = guard.members.remove(client_id).is_some();
            (removed, guard.members.is_empty())
        };

        if removed {
            tracing::debug!("Client {} left room '{}'", client_id, room);
        }
        if now_empty {
            self.evict_if_empty(room).await;
        }
        removed
    }

    async fn snapshot(&self, room: &RoomId) -> Vec<Client> {
        match self.entry(room).await {
            Some(entry) => entry.lock().await.members.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    async fn rooms(&self) -> Vec<(RoomId, Vec<Client>)> {
        let entries: Vec<(RoomId, Arc<Mutex<RoomEntry>>)> = self
            .rooms
            .read()
            .await
            .iter()
            .map(|(room, entry)| (room.clone(), entry.clone()))
            .collect();

        let mut rooms = Vec::with_capacity(entries.len());
        for (room, entry) in entries {
            let members: Vec<Client> = entry.lock().await.members.values().cloned().collect();
            if !members.is_empty() {
                rooms.push((room, members));
            }
        }
        rooms.sort_by(|(a, _), (b, _)| a.cmp(b));
        rooms
    }

    async fn member_count(&self, room: &RoomId) -> usize {
        match self.entry(room).await {
            Some(entry) => entry.lock().await.members.len(),
            None => 0,
        }
    }
}
