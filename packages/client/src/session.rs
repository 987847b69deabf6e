//! WebSocket sync session.
//!
//! `SyncSession` owns the single persistent connection of a board session
//! and its state machine:
//!
//! ```text
//! Disconnected -(connect)-> Connected -(join_team)-> Joined(team)
//! Joined(team) -(leave_team / join_team other)-> Connected / Joined(other)
//! any state -(transport drop)-> reconnecting -(re-emit join-team)-> Joined
//! ```
//!
//! The server does not remember room membership across a transport-level
//! disconnect, so the session remembers the last joined room itself and
//! silently re-emits `join-team` after a reconnect.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use bansou_server::infrastructure::dto::websocket::{
    ActiveUsersEvent, ClientEvent, ColumnUpdatePayload, ColumnsUpdatedEvent, PresenceChangeEvent,
    ServerEvent, TaskAction, TaskUpdatePayload, TaskUpdatedEvent, TeamIdentity, UserTypingPayload,
};

use crate::callbacks::CallbackRegistry;
use crate::domain::should_attempt_reconnect;
use crate::error::ClientError;

const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;
const DEFAULT_RECONNECT_INTERVAL_SECS: u64 = 5;

/// Connection settings for a sync session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// WebSocket URL of the sync server (e.g., "ws://127.0.0.1:5000/ws")
    pub url: String,
    pub max_reconnect_attempts: u32,
    pub reconnect_interval: Duration,
}

impl SessionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_reconnect_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            reconnect_interval: Duration::from_secs(DEFAULT_RECONNECT_INTERVAL_SECS),
        }
    }
}

/// Where the session currently is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    /// Connected, not in any room
    Connected,
    /// Connected and joined to one team room
    Joined(TeamIdentity),
}

enum Command {
    Send(ClientEvent),
    Disconnect,
}

enum DriveOutcome {
    /// The application asked for the disconnect; do not reconnect
    LocalDisconnect,
    /// The transport dropped underneath us; eligible for reconnect
    TransportDropped,
}

/// The client sync adapter: one persistent connection, one room at a time.
pub struct SyncSession {
    config: SessionConfig,
    state: Arc<Mutex<SessionState>>,
    callbacks: Arc<Mutex<CallbackRegistry>>,
    command_tx: Option<mpsc::UnboundedSender<Command>>,
}

impl SyncSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(SessionState::Disconnected)),
            callbacks: Arc::new(Mutex::new(CallbackRegistry::new())),
            command_tx: None,
        }
    }

    /// Snapshot of the current session state.
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    // ---- subscription registration (replace, not stack) ----

    pub fn on_task_updated(&self, callback: impl Fn(TaskUpdatedEvent) + Send + 'static) {
        self.callbacks.lock().on_task_updated(callback);
    }

    pub fn on_columns_updated(&self, callback: impl Fn(ColumnsUpdatedEvent) + Send + 'static) {
        self.callbacks.lock().on_columns_updated(callback);
    }

    pub fn on_user_typing(&self, callback: impl Fn(UserTypingPayload) + Send + 'static) {
        self.callbacks.lock().on_user_typing(callback);
    }

    pub fn on_user_joined(&self, callback: impl Fn(PresenceChangeEvent) + Send + 'static) {
        self.callbacks.lock().on_user_joined(callback);
    }

    pub fn on_user_left(&self, callback: impl Fn(PresenceChangeEvent) + Send + 'static) {
        self.callbacks.lock().on_user_left(callback);
    }

    pub fn on_active_users(&self, callback: impl Fn(ActiveUsersEvent) + Send + 'static) {
        self.callbacks.lock().on_active_users(callback);
    }

    // ---- lifecycle ----

    /// Open the connection and start the background io task.
    ///
    /// Returns once the first connection attempt has succeeded or failed.
    pub async fn connect(&mut self) -> Result<(), ClientError> {
        if !matches!(*self.state.lock(), SessionState::Disconnected) {
            return Err(ClientError::AlreadyConnected);
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        tokio::spawn(supervisor(
            self.config.clone(),
            self.state.clone(),
            self.callbacks.clone(),
            command_rx,
            ready_tx,
        ));

        match ready_rx.await {
            Ok(Ok(())) => {
                self.command_tx = Some(command_tx);
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ClientError::Connection(
                "connection task ended unexpectedly".to_string(),
            )),
        }
    }

    /// Close the connection. The remembered room is forgotten; a later
    /// `connect` starts from a clean slate.
    pub fn disconnect(&mut self) {
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(Command::Disconnect);
        }
        *self.state.lock() = SessionState::Disconnected;
    }

    /// Join a team room, leaving the current one first if needed.
    pub fn join_team(
        &self,
        team_id: &str,
        user_id: &str,
        user_name: &str,
    ) -> Result<(), ClientError> {
        let tx = self.command_tx.as_ref().ok_or(ClientError::NotConnected)?;

        // One room at a time: switching teams means leave then join
        let previous = match &*self.state.lock() {
            SessionState::Joined(identity) if identity.team_id != team_id => {
                Some(identity.clone())
            }
            _ => None,
        };
        if let Some(identity) = previous {
            tx.send(Command::Send(ClientEvent::LeaveTeam(identity)))
                .map_err(|_| ClientError::NotConnected)?;
        }

        let identity = TeamIdentity {
            team_id: team_id.to_string(),
            user_id: user_id.to_string(),
            user_name: user_name.to_string(),
        };
        tx.send(Command::Send(ClientEvent::JoinTeam(identity.clone())))
            .map_err(|_| ClientError::NotConnected)?;
        *self.state.lock() = SessionState::Joined(identity);

        Ok(())
    }

    /// Leave the current team room, staying connected.
    pub fn leave_team(&self) -> Result<(), ClientError> {
        let tx = self.command_tx.as_ref().ok_or(ClientError::NotConnected)?;
        let identity = self.joined_identity()?;

        tx.send(Command::Send(ClientEvent::LeaveTeam(identity)))
            .map_err(|_| ClientError::NotConnected)?;
        *self.state.lock() = SessionState::Connected;

        Ok(())
    }

    // ---- outbound events ----

    pub fn emit_task_update(&self, task: Value, action: TaskAction) -> Result<(), ClientError> {
        let identity = self.joined_identity()?;
        self.send_event(ClientEvent::TaskUpdate(TaskUpdatePayload {
            team_id: identity.team_id,
            task,
            action,
        }))
    }

    pub fn emit_column_update(&self, columns: Value) -> Result<(), ClientError> {
        let identity = self.joined_identity()?;
        self.send_event(ClientEvent::ColumnUpdate(ColumnUpdatePayload {
            team_id: identity.team_id,
            columns,
        }))
    }

    pub fn emit_typing(&self, task_id: &str) -> Result<(), ClientError> {
        let identity = self.joined_identity()?;
        self.send_event(ClientEvent::UserTyping(UserTypingPayload {
            team_id: identity.team_id,
            user_name: identity.user_name,
            task_id: task_id.to_string(),
        }))
    }

    fn joined_identity(&self) -> Result<TeamIdentity, ClientError> {
        match &*self.state.lock() {
            SessionState::Joined(identity) => Ok(identity.clone()),
            SessionState::Connected => Err(ClientError::NotJoined),
            SessionState::Disconnected => Err(ClientError::NotConnected),
        }
    }

    fn send_event(&self, event: ClientEvent) -> Result<(), ClientError> {
        let tx = self.command_tx.as_ref().ok_or(ClientError::NotConnected)?;
        tx.send(Command::Send(event))
            .map_err(|_| ClientError::NotConnected)
    }
}

/// Background task owning the actual WebSocket, reconnecting on transport
/// drops with a capped number of attempts.
async fn supervisor(
    config: SessionConfig,
    state: Arc<Mutex<SessionState>>,
    callbacks: Arc<Mutex<CallbackRegistry>>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    ready_tx: oneshot::Sender<Result<(), ClientError>>,
) {
    let mut ready = Some(ready_tx);
    let mut attempts: u32 = 0;

    loop {
        match connect_async(config.url.as_str()).await {
            Ok((ws, _response)) => {
                attempts = 0;
                tracing::info!("Connected to sync server at {}", config.url);

                // The server forgot our room on disconnect; re-emit
                // join-team for the room we remember, if any.
                let rejoin = {
                    let mut current = state.lock();
                    match &*current {
                        SessionState::Joined(identity) => Some(identity.clone()),
                        _ => {
                            *current = SessionState::Connected;
                            None
                        }
                    }
                };

                if let Some(tx) = ready.take() {
                    let _ = tx.send(Ok(()));
                }

                match drive(ws, rejoin, &mut command_rx, &callbacks).await {
                    DriveOutcome::LocalDisconnect => {
                        *state.lock() = SessionState::Disconnected;
                        return;
                    }
                    DriveOutcome::TransportDropped => {
                        tracing::warn!("Connection to sync server lost");
                    }
                }
            }
            Err(e) => {
                if let Some(tx) = ready.take() {
                    // First connection never came up; report and stop
                    let _ = tx.send(Err(ClientError::Connection(e.to_string())));
                    return;
                }
                tracing::warn!("Reconnect attempt failed: {}", e);
            }
        }

        attempts += 1;
        if !should_attempt_reconnect(attempts, config.max_reconnect_attempts) {
            tracing::error!(
                "Failed to reconnect after {} attempts. Giving up.",
                config.max_reconnect_attempts
            );
            *state.lock() = SessionState::Disconnected;
            return;
        }
        tracing::info!(
            "Reconnecting in {:?} (attempt {}/{})",
            config.reconnect_interval,
            attempts,
            config.max_reconnect_attempts
        );
        tokio::time::sleep(config.reconnect_interval).await;
    }
}

async fn drive(
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    rejoin: Option<TeamIdentity>,
    command_rx: &mut mpsc::UnboundedReceiver<Command>,
    callbacks: &Arc<Mutex<CallbackRegistry>>,
) -> DriveOutcome {
    let (mut write, mut read) = ws.split();

    if let Some(identity) = rejoin {
        tracing::info!("Re-joining team '{}' after reconnect", identity.team_id);
        match serde_json::to_string(&ClientEvent::JoinTeam(identity)) {
            Ok(frame) => {
                if write.send(Message::Text(frame.into())).await.is_err() {
                    return DriveOutcome::TransportDropped;
                }
            }
            Err(e) => tracing::error!("Failed to serialize join-team: {}", e),
        }
    }

    loop {
        tokio::select! {
            command = command_rx.recv() => match command {
                Some(Command::Send(event)) => {
                    let frame = match serde_json::to_string(&event) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::error!("Failed to serialize event: {}", e);
                            continue;
                        }
                    };
                    if write.send(Message::Text(frame.into())).await.is_err() {
                        return DriveOutcome::TransportDropped;
                    }
                }
                // Session handle dropped or explicit disconnect
                Some(Command::Disconnect) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    return DriveOutcome::LocalDisconnect;
                }
            },
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => callbacks.lock().dispatch(event),
                        Err(e) => tracing::warn!("Dropping unrecognized frame: {}", e),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    tracing::info!("Server closed the connection");
                    return DriveOutcome::TransportDropped;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return DriveOutcome::TransportDropped;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_disconnected() {
        // テスト項目: 生成直後のセッションは Disconnected 状態
        // given (前提条件):
        let config = SessionConfig::new("ws://127.0.0.1:5000/ws");

        // when (操作):
        let session = SyncSession::new(config);

        // then (期待する結果):
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_join_team_requires_connection() {
        // テスト項目: 未接続での join_team は NotConnected エラー
        // given (前提条件):
        let session = SyncSession::new(SessionConfig::new("ws://127.0.0.1:5000/ws"));

        // when (操作):
        let result = session.join_team("team-1", "u1", "Uday");

        // then (期待する結果):
        assert!(matches!(result.unwrap_err(), ClientError::NotConnected));
    }

    #[test]
    fn test_emit_requires_joined_room() {
        // テスト項目: 未参加での emit は NotConnected / NotJoined エラー
        // given (前提条件):
        let session = SyncSession::new(SessionConfig::new("ws://127.0.0.1:5000/ws"));

        // when (操作):
        let result = session.emit_task_update(serde_json::json!({}), TaskAction::Create);

        // then (期待する結果):
        assert!(matches!(result.unwrap_err(), ClientError::NotConnected));
    }

    #[test]
    fn test_session_config_defaults() {
        // テスト項目: SessionConfig のデフォルト値（5 回 / 5 秒間隔）
        // given (前提条件):

        // when (操作):
        let config = SessionConfig::new("ws://example/ws");

        // then (期待する結果):
        assert_eq!(config.max_reconnect_attempts, 5);
        assert_eq!(config.reconnect_interval, Duration::from_secs(5));
    }
}
