//! UseCase: 切断処理
//!
//! トランスポートレベルの切断は leave-team を伴わないことがあるため、
//! 接続が残した在室を best-effort で reap する。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Departure, EventPusher, PresenceRegistry, PushError, TeamId,
};

/// 接続クローズ時のクリーンアップのユースケース
pub struct DisconnectUseCase {
    registry: Arc<dyn PresenceRegistry>,
    pusher: Arc<dyn EventPusher>,
}

impl DisconnectUseCase {
    pub fn new(registry: Arc<dyn PresenceRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// 接続をプッシャーから外し、在室を reap する
    ///
    /// # Returns
    ///
    /// 接続がルームに参加していた場合はその退室情報
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<Departure> {
        self.pusher.unregister(connection_id).await;
        self.registry.remove_connection(connection_id).await
    }

    /// 退室通知を残りのメンバーにブロードキャスト
    pub async fn broadcast_user_left(
        &self,
        team_id: &TeamId,
        message: &str,
    ) -> Result<(), PushError> {
        // 切断済みの接続は registry から既に消えているので除外は不要
        let targets = self.registry.connections(team_id).await;
        self.pusher.broadcast(targets, message).await
    }
}
