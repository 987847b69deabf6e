//! インメモリ PresenceRegistry 実装
//!
//! ドメイン層が定義する PresenceRegistry trait の具体的な実装。
//! ルームは所属する接続の集合としてのみ存在し、最後のメンバーが退室した
//! 時点でブックキーピングごと破棄されます。
//!
//! 全ての変更は単一の Mutex の下で行われるため、同一ルーム内のイベント
//! 順序はロック取得順で決まります（ルーム単位の FIFO）。
//!
//! ## スケーリング上の制約
//!
//! 単一プロセス前提の設計です。複数プロセスに分散する場合、この registry
//! とブロードキャストのファンアウトは外部の pub/sub に移す必要があります。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, Departure, JoinOutcome, Participant, PresenceRegistry, TeamId,
};

/// インメモリ PresenceRegistry
///
/// プロセス起動時に一度だけ構築し、Arc で必要な場所に注入します。
/// モジュールレベルのグローバル状態は持ちません。
pub struct InMemoryPresenceRegistry {
    inner: Mutex<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// Room membership, keyed by team
    rooms: HashMap<TeamId, RoomPresence>,
    /// Which room each connection currently belongs to (at most one)
    connections: HashMap<ConnectionId, TeamId>,
}

#[derive(Default)]
struct RoomPresence {
    /// Join order is preserved; one entry per user
    members: Vec<MemberEntry>,
}

struct MemberEntry {
    participant: Participant,
    /// Connections (browser tabs) backing this entry
    connections: HashSet<ConnectionId>,
}

impl InMemoryPresenceRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner::default()),
        }
    }
}

impl Default for InMemoryPresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryInner {
    /// Remove a connection from whatever room it is attached to.
    fn detach(&mut self, connection_id: ConnectionId) -> Option<Departure> {
        let team_id = self.connections.remove(&connection_id)?;
        let (participant, user_departed, room_now_empty) = {
            let room = self.rooms.get_mut(&team_id)?;
            let index = room
                .members
                .iter()
                .position(|m| m.connections.contains(&connection_id))?;
            room.members[index].connections.remove(&connection_id);
            let user_departed = room.members[index].connections.is_empty();
            let participant = if user_departed {
                room.members.remove(index).participant
            } else {
                room.members[index].participant.clone()
            };
            (participant, user_departed, room.members.is_empty())
        };
        if room_now_empty {
            self.rooms.remove(&team_id);
        }
        Some(Departure {
            team_id,
            participant,
            user_departed,
        })
    }
}

#[async_trait]
impl PresenceRegistry for InMemoryPresenceRegistry {
    async fn join(
        &self,
        team_id: TeamId,
        connection_id: ConnectionId,
        participant: Participant,
    ) -> JoinOutcome {
        let mut inner = self.inner.lock().await;

        // A connection holds at most one room; switching rooms without an
        // explicit leave-team detaches it from the previous room first.
        let switching = inner
            .connections
            .get(&connection_id)
            .is_some_and(|current| *current != team_id);
        let previous = if switching {
            inner.detach(connection_id)
        } else {
            None
        };

        inner.connections.insert(connection_id, team_id.clone());
        let room = inner.rooms.entry(team_id).or_default();
        let newly_visible = match room
            .members
            .iter_mut()
            .find(|m| m.participant.user_id == participant.user_id)
        {
            Some(entry) => {
                entry.connections.insert(connection_id);
                false
            }
            None => {
                room.members.push(MemberEntry {
                    participant,
                    connections: HashSet::from([connection_id]),
                });
                true
            }
        };

        JoinOutcome {
            newly_visible,
            member_count: room.members.len(),
            previous,
        }
    }

    async fn leave(&self, team_id: &TeamId, connection_id: ConnectionId) -> Option<Departure> {
        let mut inner = self.inner.lock().await;
        // Ignore a leave-team for a room the connection is not in
        if inner.connections.get(&connection_id) != Some(team_id) {
            return None;
        }
        inner.detach(connection_id)
    }

    async fn remove_connection(&self, connection_id: ConnectionId) -> Option<Departure> {
        let mut inner = self.inner.lock().await;
        inner.detach(connection_id)
    }

    async fn members(&self, team_id: &TeamId) -> Vec<Participant> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(team_id)
            .map(|room| room.members.iter().map(|m| m.participant.clone()).collect())
            .unwrap_or_default()
    }

    async fn connections(&self, team_id: &TeamId) -> Vec<ConnectionId> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .get(team_id)
            .map(|room| {
                room.members
                    .iter()
                    .flat_map(|m| m.connections.iter().copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn member_count(&self, team_id: &TeamId) -> usize {
        let inner = self.inner.lock().await;
        inner.rooms.get(team_id).map_or(0, |room| room.members.len())
    }

    async fn is_empty(&self, team_id: &TeamId) -> bool {
        let inner = self.inner.lock().await;
        !inner.rooms.contains_key(team_id)
    }

    async fn team_ids(&self) -> Vec<TeamId> {
        let inner = self.inner.lock().await;
        inner.rooms.keys().cloned().collect()
    }
}
