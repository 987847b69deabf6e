//! EventPusher trait 定義
//!
//! ユースケース層が必要とするイベント送信のインターフェースを定義します。
//! 具体的な実装（WebSocket）は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::PushError;
use super::value_object::ConnectionId;

/// Channel used to hand serialized events to a connection's writer task.
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Delivery of serialized events to live connections.
///
/// Delivery is fire-and-forget: `broadcast` tolerates individual target
/// failures and never aborts the remaining fan-out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPusher: Send + Sync {
    /// 接続をプッシャーに登録（WebSocket アップグレード時に呼ばれる）
    async fn register(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続をプッシャーから登録解除（切断時に呼ばれる）
    async fn unregister(&self, connection_id: ConnectionId);

    /// 単一の接続にイベントを送信
    async fn push_to(&self, connection_id: ConnectionId, payload: &str) -> Result<(), PushError>;

    /// 複数の接続にイベントをブロードキャスト（部分失敗を許容）
    async fn broadcast(&self, targets: Vec<ConnectionId>, payload: &str) -> Result<(), PushError>;
}
