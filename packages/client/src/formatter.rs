//! Message formatting utilities for client display.

use bansou_server::infrastructure::dto::websocket::TaskAction;
use bansou_shared::time::to_jst_rfc3339;

fn action_label(action: TaskAction) -> &'static str {
    match action {
        TaskAction::Create => "created",
        TaskAction::Update => "updated",
        TaskAction::Delete => "deleted",
        TaskAction::Move => "moved",
    }
}

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the active-users snapshot received on joining a room.
    pub fn format_active_users(users: &[String], current_user_id: &str) -> String {
        let mut output = String::new();
        output.push_str("\n\n============================================================\n");
        output.push_str("Online:\n");

        if users.is_empty() {
            output.push_str("(Nobody online)\n");
        } else {
            for user_id in users {
                let me_suffix = if user_id == current_user_id { " (me)" } else { "" };
                output.push_str(&format!("{}{}\n", user_id, me_suffix));
            }
        }

        output.push_str("============================================================\n");
        output
    }

    pub fn format_user_joined(user_name: &str, timestamp: i64) -> String {
        format!("\n+ {} joined at {}\n", user_name, to_jst_rfc3339(timestamp))
    }

    pub fn format_user_left(user_name: &str, timestamp: i64) -> String {
        format!("\n- {} left at {}\n", user_name, to_jst_rfc3339(timestamp))
    }

    pub fn format_task_updated(action: TaskAction, timestamp: i64) -> String {
        format!(
            "\n* a task was {} at {}\n",
            action_label(action),
            to_jst_rfc3339(timestamp)
        )
    }

    pub fn format_columns_updated(timestamp: i64) -> String {
        format!(
            "\n* the column layout changed at {}\n",
            to_jst_rfc3339(timestamp)
        )
    }

    pub fn format_user_typing(user_name: &str, task_id: &str) -> String {
        format!("\n~ {} is typing on task {}\n", user_name, task_id)
    }

    /// Format the result of a board re-fetch after an update signal.
    pub fn format_board_refreshed(team_id: &str, task_count: usize) -> String {
        format!(
            "\n= board '{}' refreshed: {} tasks\n",
            team_id, task_count
        )
    }

    pub fn format_sent_confirmation(event_name: &str) -> String {
        format!("sent {}\n", event_name)
    }
}
