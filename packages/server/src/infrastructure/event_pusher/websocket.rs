//! WebSocket を使った EventPusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - 接続へのイベント送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成と writer タスクは UI 層（`ui::handler::websocket`）が
//! 行います。この実装は生成された `UnboundedSender` を受け取り、イベント
//! 送信にのみ使用します。チャンネルへの書き込みはノンブロッキングなので
//! ブロードキャストはディスパッチループを待たせません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, EventPusher, PushError, PusherChannel};

/// WebSocket event pusher keyed by connection id.
pub struct WebSocketEventPusher {
    connections: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketEventPusher {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketEventPusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPusher for WebSocketEventPusher {
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to EventPusher", connection_id);
    }

    async fn unregister(&self, connection_id: ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(&connection_id);
        tracing::debug!("Connection '{}' unregistered from EventPusher", connection_id);
    }

    async fn push_to(&self, connection_id: ConnectionId, payload: &str) -> Result<(), PushError> {
        let connections = self.connections.lock().await;

        if let Some(sender) = connections.get(&connection_id) {
            sender
                .send(payload.to_string())
                .map_err(|e| PushError::PushFailed(e.to_string()))?;
            tracing::debug!("Pushed event to connection '{}'", connection_id);
            Ok(())
        } else {
            Err(PushError::ConnectionNotFound(connection_id.to_string()))
        }
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        payload: &str,
    ) -> Result<(), PushError> {
        let connections = self.connections.lock().await;

        for target in targets {
            if let Some(sender) = connections.get(&target) {
                // ブロードキャストでは一部の送信失敗を許容する
                if let Err(e) = sender.send(payload.to_string()) {
                    tracing::warn!("Failed to push event to connection '{}': {}", target, e);
                }
            } else {
                tracing::warn!(
                    "Connection '{}' not found during broadcast, skipping",
                    target
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にイベントを送信できる
        // given (前提条件):
        let pusher = WebSocketEventPusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let conn = ConnectionId::generate();
        pusher.register(conn, tx).await;

        // when (操作):
        let result = pusher.push_to(conn, r#"{"type":"active-users","users":[]}"#).await;

        // then (期待する結果):
        assert!(result.is_ok());
        let received = rx.recv().await;
        assert_eq!(
            received,
            Some(r#"{"type":"active-users","users":[]}"#.to_string())
        );
    }

    #[tokio::test]
    async fn test_push_to_unknown_connection_fails() {
        // テスト項目: 未登録の接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketEventPusher::new();

        // when (操作):
        let result = pusher.push_to(ConnectionId::generate(), "payload").await;

        // then (期待する結果):
        assert!(matches!(
            result.unwrap_err(),
            PushError::ConnectionNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_targets() {
        // テスト項目: 複数の接続にイベントをブロードキャストできる
        // given (前提条件):
        let pusher = WebSocketEventPusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let conn1 = ConnectionId::generate();
        let conn2 = ConnectionId::generate();
        pusher.register(conn1, tx1).await;
        pusher.register(conn2, tx2).await;

        // when (操作):
        let result = pusher.broadcast(vec![conn1, conn2], "event").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx1.recv().await, Some("event".to_string()));
        assert_eq!(rx2.recv().await, Some("event".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_tolerates_missing_target() {
        // テスト項目: ブロードキャスト時、一部の接続が存在しなくても残りに届く
        // given (前提条件):
        let pusher = WebSocketEventPusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let known = ConnectionId::generate();
        pusher.register(known, tx).await;

        // when (操作):
        let result = pusher
            .broadcast(vec![known, ConnectionId::generate()], "event")
            .await;

        // then (期待する結果): 部分失敗は許容される
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("event".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_with_empty_targets_is_a_noop() {
        // テスト項目: 空のターゲットリストでもエラーにならない
        // given (前提条件):
        let pusher = WebSocketEventPusher::new();

        // when (操作):
        let result = pusher.broadcast(vec![], "event").await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_push_after_unregister_fails() {
        // テスト項目: 登録解除後の接続への送信はエラーになる
        // given (前提条件):
        let pusher = WebSocketEventPusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let conn = ConnectionId::generate();
        pusher.register(conn, tx).await;

        // when (操作):
        pusher.unregister(conn).await;
        let result = pusher.push_to(conn, "payload").await;

        // then (期待する結果):
        assert!(result.is_err());
    }
}
