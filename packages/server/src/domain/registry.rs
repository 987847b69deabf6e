//! PresenceRegistry trait 定義
//!
//! ユースケース層が必要とするルーム在室管理のインターフェースを定義します。
//! 具体的な実装（インメモリ）は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 在室ポリシー
//!
//! - 在室エントリは `user_id` 単位。同一ユーザーの複数タブ（複数接続）は
//!   1 つのエントリに畳み込まれ、接続単位で参照カウントされます。
//! - 1 つの接続が同時に所属できるルームは 1 つだけ。別ルームへの `join` は
//!   前のルームからの暗黙の退室として扱われます。

use async_trait::async_trait;

use super::entity::Participant;
use super::value_object::{ConnectionId, TeamId};

/// Result of admitting a connection into a team room.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// True when this join made the user visible in the room (first tab).
    /// False when another connection of the same user was already present.
    pub newly_visible: bool,
    /// Number of distinct users in the room after the join.
    pub member_count: usize,
    /// Set when the connection was still attached to another room and was
    /// implicitly detached from it first.
    pub previous: Option<Departure>,
}

/// Result of detaching a connection from a room.
#[derive(Debug, Clone)]
pub struct Departure {
    pub team_id: TeamId,
    pub participant: Participant,
    /// True when this was the user's last connection in the room, i.e. the
    /// user is no longer present and a `user-left` should be emitted.
    pub user_departed: bool,
}

/// Tracks, per team room, which participants are currently joined and
/// through which connections.
#[async_trait]
pub trait PresenceRegistry: Send + Sync {
    /// Admit a connection into a room. Idempotent per user: a second tab of
    /// the same user bumps the reference count instead of adding an entry.
    async fn join(
        &self,
        team_id: TeamId,
        connection_id: ConnectionId,
        participant: Participant,
    ) -> JoinOutcome;

    /// Remove a connection from the given room. Returns `None` when the
    /// connection was not a member (disconnect races are expected, not an
    /// error).
    async fn leave(&self, team_id: &TeamId, connection_id: ConnectionId) -> Option<Departure>;

    /// Reap whatever membership a closed connection still holds.
    async fn remove_connection(&self, connection_id: ConnectionId) -> Option<Departure>;

    /// Snapshot of the room's participants, ordered by join time.
    async fn members(&self, team_id: &TeamId) -> Vec<Participant>;

    /// Connections currently attached to the room.
    async fn connections(&self, team_id: &TeamId) -> Vec<ConnectionId>;

    /// Number of distinct users in the room.
    async fn member_count(&self, team_id: &TeamId) -> usize;

    /// True when the room has no members (its bookkeeping is discarded).
    async fn is_empty(&self, team_id: &TeamId) -> bool;

    /// Teams that currently have at least one member.
    async fn team_ids(&self) -> Vec<TeamId>;
}
