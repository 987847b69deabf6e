//! UseCase: 在室状況の照会（HTTP API 用）

use std::sync::Arc;

use crate::domain::{Participant, PresenceRegistry, TeamId};

/// 在室照会のユースケース
pub struct GetPresenceUseCase {
    registry: Arc<dyn PresenceRegistry>,
}

impl GetPresenceUseCase {
    pub fn new(registry: Arc<dyn PresenceRegistry>) -> Self {
        Self { registry }
    }

    /// アクティブなチームとそのメンバー数の一覧
    pub async fn team_summaries(&self) -> Vec<(TeamId, usize)> {
        let mut summaries = Vec::new();
        for team_id in self.registry.team_ids().await {
            let count = self.registry.member_count(&team_id).await;
            summaries.push((team_id, count));
        }
        // Sort by team id for consistent ordering
        summaries.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        summaries
    }

    /// 指定チームの在室スナップショット（参加順）
    pub async fn members(&self, team_id: &TeamId) -> Vec<Participant> {
        self.registry.members(team_id).await
    }
}
