//! WebSocket connection handlers.
//!
//! One dispatch loop per connection. Malformed frames are logged and
//! dropped; nothing a client sends can take the loop down.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitStream, StreamExt},
};
use tokio::sync::mpsc;

use bansou_shared::time::now_jst_millis;

use crate::domain::{ConnectionId, Participant, TeamId, Timestamp, UserId, UserName};
use crate::infrastructure::dto::websocket::{
    ActiveUsersEvent, ClientEvent, ColumnUpdatePayload, ColumnsUpdatedEvent, PresenceChangeEvent,
    ServerEvent, TaskUpdatePayload, TaskUpdatedEvent, TeamIdentity, UserTypingPayload,
};

use super::super::state::AppState;

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    // Identity is carried by join-team events, not by the connection;
    // the transport session just gets an opaque id.
    let connection_id = ConnectionId::generate();
    tracing::info!("Connection '{}' upgrading to WebSocket", connection_id);

    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that drains the connection's event channel into the
/// WebSocket sink.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, receiver) = socket.split();

    // Channel through which broadcasts reach this connection
    let (tx, rx) = mpsc::unbounded_channel();
    state.pusher.register(connection_id, tx).await;

    let mut send_task = pusher_loop(rx, sender);
    let state_for_recv = state.clone();
    let mut recv_task =
        tokio::spawn(async move { receive_loop(receiver, state_for_recv, connection_id).await });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Best-effort reap: a transport drop does not carry leave-team
    if let Some(departure) = state.disconnect_usecase.execute(connection_id).await {
        tracing::info!(
            "Connection '{}' disconnected, left team '{}'",
            connection_id,
            departure.team_id
        );
        if departure.user_departed {
            let message = user_left_json(&departure.participant);
            if let Err(e) = state
                .disconnect_usecase
                .broadcast_user_left(&departure.team_id, &message)
                .await
            {
                tracing::warn!("Failed to broadcast user-left: {}", e);
            }
        }
    } else {
        tracing::info!("Connection '{}' disconnected", connection_id);
    }
}

async fn receive_loop(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    connection_id: ConnectionId,
) {
    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                Ok(event) => dispatch_event(&state, connection_id, event).await,
                Err(e) => {
                    tracing::warn!(
                        "Dropping malformed frame from '{}': {}",
                        connection_id,
                        e
                    );
                }
            },
            Message::Ping(_) => {
                tracing::debug!("Received ping from '{}'", connection_id);
                // Ping/pong is handled automatically by the WebSocket protocol
            }
            Message::Close(_) => {
                tracing::info!("Connection '{}' requested close", connection_id);
                break;
            }
            _ => {}
        }
    }
}

async fn dispatch_event(state: &Arc<AppState>, connection_id: ConnectionId, event: ClientEvent) {
    match event {
        ClientEvent::JoinTeam(identity) => handle_join(state, connection_id, identity).await,
        ClientEvent::LeaveTeam(identity) => handle_leave(state, connection_id, identity).await,
        ClientEvent::TaskUpdate(payload) => handle_task_update(state, connection_id, payload).await,
        ClientEvent::ColumnUpdate(payload) => {
            handle_column_update(state, connection_id, payload).await
        }
        ClientEvent::UserTyping(payload) => handle_user_typing(state, connection_id, payload).await,
    }
}

async fn handle_join(state: &Arc<AppState>, connection_id: ConnectionId, identity: TeamIdentity) {
    let (team_id, participant) = match parse_identity(identity) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!("Rejecting join-team from '{}': {}", connection_id, e);
            return;
        }
    };

    let outcome = state
        .join_team_usecase
        .execute(team_id.clone(), connection_id, participant.clone())
        .await;

    // Switching rooms without an explicit leave-team: notify the old room
    if let Some(previous) = outcome.previous {
        if previous.user_departed {
            let message = user_left_json(&previous.participant);
            if let Err(e) = state
                .join_team_usecase
                .broadcast_to_team(&previous.team_id, connection_id, &message)
                .await
            {
                tracing::warn!("Failed to broadcast user-left: {}", e);
            }
        }
    }

    // Presence snapshot goes to the joining connection only
    let users: Vec<String> = state
        .join_team_usecase
        .member_list(&team_id)
        .await
        .into_iter()
        .map(|p| p.user_id.into_string())
        .collect();
    let snapshot =
        serde_json::to_string(&ServerEvent::ActiveUsers(ActiveUsersEvent { users })).unwrap();
    if let Err(e) = state
        .join_team_usecase
        .push_to_joiner(connection_id, &snapshot)
        .await
    {
        tracing::warn!("Failed to send active-users to '{}': {}", connection_id, e);
    }

    // Another tab of the same user is already visible; don't announce twice
    if outcome.newly_visible {
        let joined = serde_json::to_string(&ServerEvent::UserJoined(PresenceChangeEvent {
            user_id: participant.user_id.as_str().to_string(),
            user_name: participant.user_name.as_str().to_string(),
            timestamp: now_jst_millis(),
        }))
        .unwrap();
        if let Err(e) = state
            .join_team_usecase
            .broadcast_to_team(&team_id, connection_id, &joined)
            .await
        {
            tracing::warn!("Failed to broadcast user-joined: {}", e);
        }
    }

    tracing::info!(
        "User '{}' joined team '{}' ({} members)",
        participant.user_name,
        team_id,
        outcome.member_count
    );
}

async fn handle_leave(state: &Arc<AppState>, connection_id: ConnectionId, identity: TeamIdentity) {
    let team_id = match TeamId::try_from(identity.team_id) {
        Ok(team_id) => team_id,
        Err(e) => {
            tracing::warn!("Rejecting leave-team from '{}': {}", connection_id, e);
            return;
        }
    };

    if let Some(departure) = state
        .leave_team_usecase
        .execute(&team_id, connection_id)
        .await
    {
        if departure.user_departed {
            let message = user_left_json(&departure.participant);
            if let Err(e) = state
                .leave_team_usecase
                .broadcast_user_left(&team_id, connection_id, &message)
                .await
            {
                tracing::warn!("Failed to broadcast user-left: {}", e);
            }
        }
        tracing::info!(
            "User '{}' left team '{}'",
            departure.participant.user_name,
            team_id
        );
    }
}

async fn handle_task_update(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    payload: TaskUpdatePayload,
) {
    let team_id = match TeamId::try_from(payload.team_id) {
        Ok(team_id) => team_id,
        Err(e) => {
            tracing::warn!("Rejecting task-update from '{}': {}", connection_id, e);
            return;
        }
    };

    let message = serde_json::to_string(&ServerEvent::TaskUpdated(TaskUpdatedEvent {
        task: payload.task,
        action: payload.action,
        timestamp: now_jst_millis(),
    }))
    .unwrap();

    let targets = state
        .relay_event_usecase
        .execute(&team_id, connection_id, &message)
        .await;
    tracing::debug!(
        "Relayed task-update in team '{}' to {} connections",
        team_id,
        targets.len()
    );
}

async fn handle_column_update(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    payload: ColumnUpdatePayload,
) {
    let team_id = match TeamId::try_from(payload.team_id) {
        Ok(team_id) => team_id,
        Err(e) => {
            tracing::warn!("Rejecting column-update from '{}': {}", connection_id, e);
            return;
        }
    };

    let message = serde_json::to_string(&ServerEvent::ColumnsUpdated(ColumnsUpdatedEvent {
        columns: payload.columns,
        timestamp: now_jst_millis(),
    }))
    .unwrap();

    let targets = state
        .relay_event_usecase
        .execute(&team_id, connection_id, &message)
        .await;
    tracing::debug!(
        "Relayed column-update in team '{}' to {} connections",
        team_id,
        targets.len()
    );
}

async fn handle_user_typing(
    state: &Arc<AppState>,
    connection_id: ConnectionId,
    payload: UserTypingPayload,
) {
    let team_id = match TeamId::try_from(payload.team_id.clone()) {
        Ok(team_id) => team_id,
        Err(e) => {
            tracing::warn!("Rejecting user-typing from '{}': {}", connection_id, e);
            return;
        }
    };

    // Advisory pass-through; never stored, late joiners never see it
    let message = serde_json::to_string(&ServerEvent::UserTypingUpdate(payload)).unwrap();

    state
        .relay_event_usecase
        .execute(&team_id, connection_id, &message)
        .await;
}

fn parse_identity(identity: TeamIdentity) -> Result<(TeamId, Participant), crate::domain::DomainError> {
    let team_id = TeamId::try_from(identity.team_id)?;
    let user_id = UserId::try_from(identity.user_id)?;
    let user_name = UserName::try_from(identity.user_name)?;
    let participant = Participant::new(user_id, user_name, Timestamp::new(now_jst_millis()));
    Ok((team_id, participant))
}

fn user_left_json(participant: &Participant) -> String {
    serde_json::to_string(&ServerEvent::UserLeft(PresenceChangeEvent {
        user_id: participant.user_id.as_str().to_string(),
        user_name: participant.user_name.as_str().to_string(),
        timestamp: now_jst_millis(),
    }))
    .unwrap()
}
