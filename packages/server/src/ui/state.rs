//! Server state shared across handlers.

use std::sync::Arc;

use crate::domain::EventPusher;
use crate::usecase::{
    DisconnectUseCase, GetPresenceUseCase, JoinTeamUseCase, LeaveTeamUseCase,
    RelayBoardEventUseCase,
};

/// Shared application state.
///
/// Everything here is constructed once at process start and injected; there
/// is no module-level mutable state anywhere in the server.
pub struct AppState {
    /// EventPusher（接続への送信の抽象化）
    pub pusher: Arc<dyn EventPusher>,
    /// JoinTeamUseCase（チーム参加のユースケース）
    pub join_team_usecase: Arc<JoinTeamUseCase>,
    /// LeaveTeamUseCase（チーム退室のユースケース）
    pub leave_team_usecase: Arc<LeaveTeamUseCase>,
    /// RelayBoardEventUseCase（ボードイベント中継のユースケース）
    pub relay_event_usecase: Arc<RelayBoardEventUseCase>,
    /// DisconnectUseCase（切断クリーンアップのユースケース）
    pub disconnect_usecase: Arc<DisconnectUseCase>,
    /// GetPresenceUseCase（在室照会のユースケース）
    pub presence_usecase: Arc<GetPresenceUseCase>,
}
