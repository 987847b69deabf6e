//! Domain logic for client-side operations.
//!
//! This module contains pure functions that implement reconnection policy
//! without side effects, making them easy to test.

/// Check if the client should attempt to reconnect after a transport drop.
///
/// # Arguments
///
/// * `current_attempt` - The number of reconnection attempts already made
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(current_attempt: u32, max_attempts: u32) -> bool {
    current_attempt < max_attempts
}

/// Check if a session that ended deliberately (local `disconnect`) should
/// be resumed. It never should: reconnection is only for transport drops.
pub fn should_resume_after_local_disconnect() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_attempt_reconnect_first_attempt() {
        // テスト項目: 初回の再接続試行では再接続すべきと判定される
        // given (前提条件):
        let current_attempt = 0;
        let max_attempts = 5;

        // when (操作):
        let result = should_attempt_reconnect(current_attempt, max_attempts);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_one_before_limit() {
        // テスト項目: 上限の 1 回前の再接続試行では再接続すべきと判定される
        // given (前提条件):
        let current_attempt = 4;
        let max_attempts = 5;

        // when (操作):
        let result = should_attempt_reconnect(current_attempt, max_attempts);

        // then (期待する結果):
        assert!(result);
    }

    #[test]
    fn test_should_attempt_reconnect_at_limit() {
        // テスト項目: 再接続回数が上限に達した場合、再接続すべきではないと判定される
        // given (前提条件):
        let current_attempt = 5;
        let max_attempts = 5;

        // when (操作):
        let result = should_attempt_reconnect(current_attempt, max_attempts);

        // then (期待する結果):
        assert!(!result);
    }

    #[test]
    fn test_local_disconnect_is_never_resumed() {
        // テスト項目: 明示的な切断の後は再接続しない
        // given (前提条件):

        // when (操作):
        let result = should_resume_after_local_disconnect();

        // then (期待する結果):
        assert!(!result);
    }
}
