//! UseCase: チーム参加処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinTeamUseCase::execute() メソッド
//! - チーム参加処理（在室登録、重複タブの畳み込み、参加通知の対象選定）
//!
//! ### なぜこのテストが必要か
//! - 参加スナップショット（active-users）が参加者本人だけに届くことを保証
//! - user-joined が既存メンバーだけにブロードキャストされることを保証
//! - 同一ユーザーの 2 つ目のタブが重複した user-joined を出さないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規ユーザーのチーム参加
//! - エッジケース：同一ユーザーの複数接続、ルーム切り替え（暗黙の退室）

use std::sync::Arc;

use crate::domain::{
    ConnectionId, EventPusher, JoinOutcome, Participant, PresenceRegistry, PushError, TeamId,
};

/// チーム参加のユースケース
pub struct JoinTeamUseCase {
    registry: Arc<dyn PresenceRegistry>,
    pusher: Arc<dyn EventPusher>,
}

impl JoinTeamUseCase {
    pub fn new(registry: Arc<dyn PresenceRegistry>, pusher: Arc<dyn EventPusher>) -> Self {
        Self { registry, pusher }
    }

    /// チーム参加を実行
    ///
    /// 在室登録のみを行う。スナップショット送信と参加通知は呼び出し側が
    /// 返り値を見て行う（通知 JSON の組み立ては DTO 層の責務のため）。
    pub async fn execute(
        &self,
        team_id: TeamId,
        connection_id: ConnectionId,
        participant: Participant,
    ) -> JoinOutcome {
        self.registry.join(team_id, connection_id, participant).await
    }

    /// 参加順に並んだ在室スナップショットを取得
    pub async fn member_list(&self, team_id: &TeamId) -> Vec<Participant> {
        self.registry.members(team_id).await
    }

    /// 参加した本人だけにメッセージを送信（active-users スナップショット用）
    pub async fn push_to_joiner(
        &self,
        connection_id: ConnectionId,
        message: &str,
    ) -> Result<(), PushError> {
        self.pusher.push_to(connection_id, message).await
    }

    /// ルーム内の指定接続以外の全接続にメッセージをブロードキャスト
    pub async fn broadcast_to_team(
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
