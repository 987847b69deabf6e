//! WebSocket event envelopes.
//!
//! Every frame is a JSON object tagged with a kebab-case `type` field,
//! e.g. `{"type":"join-team","teamId":"t1","userId":"u1","userName":"Ann"}`.
//!
//! Task and column payloads are carried as opaque JSON. Receivers treat
//! `task-updated` / `columns-updated` as invalidation signals and re-fetch
//! authoritative board state from the REST API rather than trusting the
//! payload, so the envelope never needs to know the board schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Events emitted by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    JoinTeam(TeamIdentity),
    LeaveTeam(TeamIdentity),
    TaskUpdate(TaskUpdatePayload),
    ColumnUpdate(ColumnUpdatePayload),
    UserTyping(UserTypingPayload),
}

/// Events pushed by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    TaskUpdated(TaskUpdatedEvent),
    ColumnsUpdated(ColumnsUpdatedEvent),
    /// Pass-through of a client's `user-typing`; advisory only, never stored.
    UserTypingUpdate(UserTypingPayload),
    UserJoined(PresenceChangeEvent),
    UserLeft(PresenceChangeEvent),
    /// Presence snapshot, sent to the joining connection only.
    ActiveUsers(ActiveUsersEvent),
}

/// Who is joining or leaving which team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamIdentity {
    pub team_id: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskAction {
    Create,
    Update,
    Delete,
    Move,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdatePayload {
    pub team_id: String,
    /// Opaque task document as the client last saw it
    pub task: Value,
    pub action: TaskAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnUpdatePayload {
    pub team_id: String,
    /// Opaque column layout
    pub columns: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingPayload {
    pub team_id: String,
    pub user_name: String,
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdatedEvent {
    pub task: Value,
    pub action: TaskAction,
    /// Server-side relay timestamp (JST milliseconds); advisory only
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnsUpdatedEvent {
    pub columns: Value,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceChangeEvent {
    pub user_id: String,
    pub user_name: String,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUsersEvent {
    /// User ids of everyone currently in the room, ordered by join time
    pub users: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_team_wire_format() {
        // テスト項目: join-team イベントが期待する JSON 形式にシリアライズされる
        // given (前提条件):
        let event = ClientEvent::JoinTeam(TeamIdentity {
            team_id: "team-42".to_string(),
            user_id: "u1".to_string(),
            user_name: "Uday".to_string(),
        });

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "join-team");
        assert_eq!(json["teamId"], "team-42");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["userName"], "Uday");
    }

    #[test]
    fn test_task_update_is_parsed_from_wire() {
        // テスト項目: task-update イベントがワイヤ形式からパースされる
        // given (前提条件):
        let raw = r#"{"type":"task-update","teamId":"t1","task":{"id":"abc","title":"Fix login"},"action":"move"}"#;

        // when (操作):
        let event: ClientEvent = serde_json::from_str(raw).unwrap();

        // then (期待する結果):
        match event {
            ClientEvent::TaskUpdate(payload) => {
                assert_eq!(payload.team_id, "t1");
                assert_eq!(payload.action, TaskAction::Move);
                assert_eq!(payload.task["title"], "Fix login");
            }
            other => panic!("expected task-update, got {:?}", other),
        }
    }

    #[test]
    fn test_task_updated_wire_format() {
        // テスト項目: task-updated イベントが type タグとタイムスタンプを持つ
        // given (前提条件):
        let event = ServerEvent::TaskUpdated(TaskUpdatedEvent {
            task: serde_json::json!({"id": "abc"}),
            action: TaskAction::Create,
            timestamp: 1700000000000,
        });

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "task-updated");
        assert_eq!(json["action"], "create");
        assert_eq!(json["timestamp"], 1700000000000i64);
    }

    #[test]
    fn test_user_typing_update_passes_payload_through() {
        // テスト項目: user-typing-update がクライアントのペイロードをそのまま運ぶ
        // given (前提条件):
        let payload = UserTypingPayload {
            team_id: "t1".to_string(),
            user_name: "Ann".to_string(),
            task_id: "task-9".to_string(),
        };

        // when (操作):
        let json = serde_json::to_value(ServerEvent::UserTypingUpdate(payload)).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "user-typing-update");
        assert_eq!(json["teamId"], "t1");
        assert_eq!(json["taskId"], "task-9");
    }

    #[test]
    fn test_active_users_wire_format() {
        // テスト項目: active-users イベントがユーザー ID の配列を運ぶ
        // given (前提条件):
        let event = ServerEvent::ActiveUsers(ActiveUsersEvent {
            users: vec!["u1".to_string(), "u2".to_string()],
        });

        // when (操作):
        let json = serde_json::to_value(&event).unwrap();

        // then (期待する結果):
        assert_eq!(json["type"], "active-users");
        assert_eq!(json["users"], serde_json::json!(["u1", "u2"]));
    }

    #[test]
    fn test_unknown_event_type_is_rejected() {
        // テスト項目: 未知の type タグを持つフレームはパースに失敗する
        // given (前提条件):
        let raw = r#"{"type":"drop-table","teamId":"t1"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(raw);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_malformed_payload_is_rejected() {
        // テスト項目: 必須フィールドを欠くフレームはパースに失敗する
        // given (前提条件):
        let raw = r#"{"type":"join-team","teamId":"t1"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientEvent>(raw);

        // then (期待する結果):
        assert!(result.is_err());
    }
}
