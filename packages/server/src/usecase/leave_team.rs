//! UseCase: チーム退室処理

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Departure, EventPusher, PresenceRegistry, PushError, TeamId,
};

/// チーム退室のユースケース
pub struct LeaveTeamUseCase {
    registry: Arc<dyn PresenceRegistry>,
    pusher: Arc<dyn EventPusher>,
}

impl LeaveTeamUseCase {
    pub fn new(registry: Arc<dyn PresenceRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// チーム退室を実行
    ///
    /// 接続がそのルームにいなかった場合は `None`（切断レースは想定内、
    /// エラーにしない）。
    pub async fn execute(
        &self,
        team_id: &TeamId,
        connection_id: ConnectionId,
    ) -> Option<Departure> {
        self.registry.leave(team_id, connection_id).await
    }

    /// 退室通知を残りのメンバーにブロードキャスト
    pub async fn broadcast_user_left(
        &self,
        team_id: &TeamId,
        exclude: ConnectionId,
        message: &str,
    ) -> Result<(), PushError> {
        let targets: Vec<ConnectionId> = self
            .registry
            .connections(team_id)
            .await
            .into_iter()
            .filter(|c| *c != exclude)
            .collect();
        self.pusher.broadcast(targets, message).await
    }
}
