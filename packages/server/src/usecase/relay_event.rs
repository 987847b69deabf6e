//! UseCase: ボードイベント中継処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - RelayBoardEventUseCase::execute() メソッド
//! - ブロードキャスト対象選定（送信者の除外、空ルームの no-op）
//!
//! ### なぜこのテストが必要か
//! - 送信者に自分のイベントがエコーバックされないことを保証（no self-echo）
//! - メンバーのいないルームへの中継がエラーにならないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：同一ルームの他メンバーへの中継
//! - エッジケース：送信者のみが接続しているルーム、空のルーム

use std::sync::Arc;

use crate::domain::{ConnectionId, EventPusher, PresenceRegistry, TeamId};

/// ボードイベント中継のユースケース
///
/// task-update / column-update / user-typing の中継はポリシーが同一
/// （送信者以外の全ルームメンバーへ fire-and-forget）なので 1 つの
/// ユースケースで扱う。イベントの種類は JSON に既に焼き込まれている。
pub struct RelayBoardEventUseCase {
    registry: Arc<dyn PresenceRegistry>,
    pusher: Arc<dyn EventPusher>,
}

impl RelayBoardEventUseCase {
    pub fn new(registry: Arc<dyn PresenceRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// イベントをルーム内の送信者以外の全接続に中継
    ///
    /// # Returns
    ///
    /// 中継対象となった接続のリスト（空ルームなら空、no-op）
    pub async fn execute(
        &self,
        team_id: &TeamId,
        sender: ConnectionId,
        message: &str,
    ) -> Vec<ConnectionId> {
        let targets: Vec<ConnectionId> = self
            .registry
            .connections(team_id)
            .await
            .into_iter()
            .filter(|c| *c != sender)
            .collect();

        if targets.is_empty() {
            return targets;
        }

        if let Err(e) = self.pusher.broadcast(targets.clone(), message).await {
            tracing::warn!("Failed to relay event in team '{}': {}", team_id, e);
        }

        targets
    }
}
