//! Integration tests for the sync session against a real in-process server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bansou_client::session::{SessionConfig, SessionState, SyncSession};
use bansou_server::{
    infrastructure::{event_pusher::WebSocketEventPusher, registry::InMemoryPresenceRegistry},
    ui::Server,
    usecase::{
        DisconnectUseCase, GetPresenceUseCase, JoinTeamUseCase, LeaveTeamUseCase,
        RelayBoardEventUseCase,
    },
};
use bansou_server::infrastructure::dto::websocket::TaskAction;

async fn spawn_server() -> SocketAddr {
    let registry = Arc::new(InMemoryPresenceRegistry::new());
    let pusher = Arc::new(WebSocketEventPusher::new());

    let server = Server::new(
        pusher.clone(),
        Arc::new(JoinTeamUseCase::new(registry.clone(), pusher.clone())),
        Arc::new(LeaveTeamUseCase::new(registry.clone(), pusher.clone())),
        Arc::new(RelayBoardEventUseCase::new(registry.clone(), pusher.clone())),
        Arc::new(DisconnectUseCase::new(registry.clone(), pusher.clone())),
        Arc::new(GetPresenceUseCase::new(registry)),
    );
    let app = server.into_router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn ws_url(addr: SocketAddr) -> String {
    format!("ws://{}/ws", addr)
}

/// Poll a predicate until it holds or the timeout elapses.
async fn wait_until(predicate: impl Fn() -> bool, timeout: Duration) -> bool {
    let start = tokio::time::Instant::now();
    while start.elapsed() < timeout {
        if predicate() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    predicate()
}

#[tokio::test]
async fn test_task_update_fires_peer_callback_once_and_not_the_sender() {
    // テスト項目: A の task-update で B のコールバックが一度だけ呼ばれ、
    // A 自身のコールバックは呼ばれない
    // given (前提条件): A と B が同じチームに参加済み
    let addr = spawn_server().await;

    let mut session_a = SyncSession::new(SessionConfig::new(ws_url(addr)));
    let mut session_b = SyncSession::new(SessionConfig::new(ws_url(addr)));

    let a_received = Arc::new(AtomicUsize::new(0));
    let b_received = Arc::new(AtomicUsize::new(0));
    let b_snapshots = Arc::new(AtomicUsize::new(0));

    {
        let count = a_received.clone();
        session_a.on_task_updated(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let count = b_received.clone();
        session_b.on_task_updated(move |event| {
            assert_eq!(event.action, TaskAction::Move);
            assert_eq!(event.task["id"], "task-1");
            count.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let count = b_snapshots.clone();
        session_b.on_active_users(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        });
    }

    session_a.connect().await.unwrap();
    session_a.join_team("team-7", "uA", "Alice").unwrap();
    session_b.connect().await.unwrap();
    session_b.join_team("team-7", "uB", "Bob").unwrap();

    // B のスナップショット受信 = B の join がサーバーで処理済み
    assert!(
        wait_until(
            || b_snapshots.load(Ordering::SeqCst) == 1,
            Duration::from_secs(2)
        )
        .await
    );

    // when (操作): A がタスク移動を送信する
    session_a
        .emit_task_update(
            serde_json::json!({"id": "task-1", "status": "doing"}),
            TaskAction::Move,
        )
        .unwrap();

    // then (期待する結果): B に一度だけ届く
    assert!(
        wait_until(
            || b_received.load(Ordering::SeqCst) == 1,
            Duration::from_secs(2)
        )
        .await
    );
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(b_received.load(Ordering::SeqCst), 1);
    assert_eq!(a_received.load(Ordering::SeqCst), 0);

    session_a.disconnect();
    session_b.disconnect();
}

#[tokio::test]
async fn test_session_state_follows_join_and_leave() {
    // テスト項目: セッションの状態遷移（Disconnected → Connected → Joined → Connected）
    // given (前提条件):
    let addr = spawn_server().await;
    let mut session = SyncSession::new(SessionConfig::new(ws_url(addr)));
    assert_eq!(session.state(), SessionState::Disconnected);

    // when (操作):
    session.connect().await.unwrap();
    assert_eq!(session.state(), SessionState::Connected);

    session.join_team("team-1", "u1", "Uday").unwrap();
    let joined = matches!(session.state(), SessionState::Joined(identity) if identity.team_id == "team-1");
    assert!(joined);

    session.leave_team().unwrap();

    // then (期待する結果):
    assert_eq!(session.state(), SessionState::Connected);

    session.disconnect();
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_connect_to_unreachable_server_fails() {
    // テスト項目: 到達不能なサーバーへの接続はエラーを返す
    // given (前提条件): 何も listen していないポート
    let mut session = SyncSession::new(SessionConfig::new("ws://127.0.0.1:1/ws"));

    // when (操作):
    let result = session.connect().await;

    // then (期待する結果):
    assert!(result.is_err());
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[tokio::test]
async fn test_presence_callbacks_fire_on_peer_join_and_leave() {
    // テスト項目: 相手の参加・退室で user-joined / user-left コールバックが呼ばれる
    // given (前提条件):
    let addr = spawn_server().await;

    let mut session_a = SyncSession::new(SessionConfig::new(ws_url(addr)));
    let joined_seen = Arc::new(AtomicUsize::new(0));
    let left_seen = Arc::new(AtomicUsize::new(0));
    {
        let count = joined_seen.clone();
        session_a.on_user_joined(move |event| {
            assert_eq!(event.user_id, "uB");
            count.fetch_add(1, Ordering::SeqCst);
        });
    }
    {
        let count = left_seen.clone();
        session_a.on_user_left(move |event| {
            assert_eq!(event.user_id, "uB");
            count.fetch_add(1, Ordering::SeqCst);
        });
    }

    session_a.connect().await.unwrap();
    session_a.join_team("team-p", "uA", "Alice").unwrap();

    // when (操作): B が参加して退室する
    let mut session_b = SyncSession::new(SessionConfig::new(ws_url(addr)));
    session_b.connect().await.unwrap();
    session_b.join_team("team-p", "uB", "Bob").unwrap();
    assert!(
        wait_until(
            || joined_seen.load(Ordering::SeqCst) == 1,
            Duration::from_secs(2)
        )
        .await
    );

    session_b.leave_team().unwrap();

    // then (期待する結果):
    assert!(
        wait_until(
            || left_seen.load(Ordering::SeqCst) == 1,
            Duration::from_secs(2)
        )
        .await
    );

    session_a.disconnect();
    session_b.disconnect();
}
