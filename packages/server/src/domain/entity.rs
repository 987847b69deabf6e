//! Domain entities.

use super::value_object::{Timestamp, UserId, UserName};

/// A user currently present in a team room.
///
/// Presence is keyed by user, not by connection: two browser tabs of the
/// same user collapse into one `Participant` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: UserId,
    pub user_name: UserName,
    pub joined_at: Timestamp,
}

impl Participant {
    pub fn new(user_id: UserId, user_name: UserName, joined_at: Timestamp) -> Self {
        Self {
            user_id,
            user_name,
            joined_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_holds_identity_and_join_time() {
        // テスト項目: Participant が識別子と参加時刻を保持する
        // given (前提条件):
        let user_id = UserId::new("u1".to_string()).unwrap();
        let user_name = UserName::new("Uday".to_string()).unwrap();

        // when (操作):
        let participant = Participant::new(user_id.clone(), user_name.clone(), Timestamp::new(1000));

        // then (期待する結果):
        assert_eq!(participant.user_id, user_id);
        assert_eq!(participant.user_name, user_name);
        assert_eq!(participant.joined_at.value(), 1000);
    }
}
