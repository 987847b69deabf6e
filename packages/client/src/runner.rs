//! Client execution logic: session wiring and the interactive loop.

use std::sync::Arc;

use parking_lot::Mutex;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde_json::Value;
use tokio::sync::mpsc;

use bansou_server::infrastructure::dto::websocket::TaskAction;

use crate::formatter::MessageFormatter;
use crate::reconcile::BoardApi;
use crate::session::{SessionConfig, SyncSession};
use crate::ui::redisplay_prompt;

/// Options resolved from the command line.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// WebSocket URL of the sync server
    pub url: String,
    /// Base URL of the REST API for board re-fetches (optional)
    pub api_url: Option<String>,
    pub team_id: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, PartialEq)]
enum CliCommand {
    Task { action: TaskAction, task: Value },
    Columns { columns: Value },
    Typing { task_id: String },
    Join { team_id: String },
    Leave,
    Help,
    Quit,
}

const HELP_TEXT: &str = "\
commands:
  task <create|update|delete|move> [json]   broadcast a task mutation
  columns <json>                            broadcast a column layout change
  typing <task-id>                          send a typing indicator
  join <team-id>                            switch to another team room
  leave                                     leave the current team room
  quit                                      disconnect and exit
";

fn parse_action(value: &str) -> Result<TaskAction, String> {
    match value {
        "create" => Ok(TaskAction::Create),
        "update" => Ok(TaskAction::Update),
        "delete" => Ok(TaskAction::Delete),
        "move" => Ok(TaskAction::Move),
        other => Err(format!(
            "unknown action '{}', expected create|update|delete|move",
            other
        )),
    }
}

fn parse_command(line: &str) -> Result<CliCommand, String> {
    let line = line.trim();
    let (head, rest) = match line.split_once(' ') {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head {
        "task" => {
            let (action, json) = match rest.split_once(' ') {
                Some((action, json)) => (action, json.trim()),
                None => (rest, ""),
            };
            if action.is_empty() {
                return Err("usage: task <create|update|delete|move> [json]".to_string());
            }
            let action = parse_action(action)?;
            let task = if json.is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(json).map_err(|e| format!("invalid task json: {}", e))?
            };
            Ok(CliCommand::Task { action, task })
        }
        "columns" => {
            if rest.is_empty() {
                return Err("usage: columns <json>".to_string());
            }
            let columns =
                serde_json::from_str(rest).map_err(|e| format!("invalid columns json: {}", e))?;
            Ok(CliCommand::Columns { columns })
        }
        "typing" => {
            if rest.is_empty() {
                return Err("usage: typing <task-id>".to_string());
            }
            Ok(CliCommand::Typing {
                task_id: rest.to_string(),
            })
        }
        "join" => {
            if rest.is_empty() {
                return Err("usage: join <team-id>".to_string());
            }
            Ok(CliCommand::Join {
                team_id: rest.to_string(),
            })
        }
        "leave" => Ok(CliCommand::Leave),
        "help" => Ok(CliCommand::Help),
        "quit" | "exit" => Ok(CliCommand::Quit),
        other => Err(format!("unknown command '{}', type 'help'", other)),
    }
}

/// Run the interactive sync client.
pub async fn run_client(options: ClientOptions) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = SyncSession::new(SessionConfig::new(options.url.clone()));

    let prompt_label = options.user_name.clone();
    // The reconcile callbacks need the room we are in *now*, not the one
    // we joined at startup
    let current_team = Arc::new(Mutex::new(options.team_id.clone()));
    let board_api = options.api_url.as_deref().map(BoardApi::new);

    {
        let me = options.user_id.clone();
        let label = prompt_label.clone();
        session.on_active_users(move |event| {
            print!("{}", MessageFormatter::format_active_users(&event.users, &me));
            redisplay_prompt(&label);
        });
    }
    {
        let label = prompt_label.clone();
        session.on_user_joined(move |event| {
            print!(
                "{}",
                MessageFormatter::format_user_joined(&event.user_name, event.timestamp)
            );
            redisplay_prompt(&label);
        });
    }
    {
        let label = prompt_label.clone();
        session.on_user_left(move |event| {
            print!(
                "{}",
                MessageFormatter::format_user_left(&event.user_name, event.timestamp)
            );
            redisplay_prompt(&label);
        });
    }
    {
        let label = prompt_label.clone();
        session.on_user_typing(move |event| {
            print!(
                "{}",
                MessageFormatter::format_user_typing(&event.user_name, &event.task_id)
            );
            redisplay_prompt(&label);
        });
    }
    {
        let api = board_api.clone();
        let team = current_team.clone();
        let label = prompt_label.clone();
        session.on_task_updated(move |event| {
            print!(
                "{}",
                MessageFormatter::format_task_updated(event.action, event.timestamp)
            );
            refresh_board(api.clone(), team.lock().clone(), label.clone());
            redisplay_prompt(&label);
        });
    }
    {
        let api = board_api.clone();
        let team = current_team.clone();
        let label = prompt_label.clone();
        session.on_columns_updated(move |event| {
            print!("{}", MessageFormatter::format_columns_updated(event.timestamp));
            refresh_board(api.clone(), team.lock().clone(), label.clone());
            redisplay_prompt(&label);
        });
    }

    session.connect().await?;
    session.join_team(&options.team_id, &options.user_id, &options.user_name)?;

    println!(
        "\nJoined team '{}' as '{}'. Type 'help' for commands, Ctrl+C to exit.\n",
        options.team_id, options.user_name
    );

    // Rustyline is synchronous; run it on its own thread and feed lines
    // into the async loop through a channel
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = format!("{}> ", prompt_label);
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    while let Some(line) = input_rx.recv().await {
        match parse_command(&line) {
            Ok(CliCommand::Task { action, task }) => match session.emit_task_update(task, action) {
                Ok(()) => print!("{}", MessageFormatter::format_sent_confirmation("task-update")),
                Err(e) => println!("error: {}", e),
            },
            Ok(CliCommand::Columns { columns }) => match session.emit_column_update(columns) {
                Ok(()) => print!(
                    "{}",
                    MessageFormatter::format_sent_confirmation("column-update")
                ),
                Err(e) => println!("error: {}", e),
            },
            Ok(CliCommand::Typing { task_id }) => match session.emit_typing(&task_id) {
                Ok(()) => print!("{}", MessageFormatter::format_sent_confirmation("user-typing")),
                Err(e) => println!("error: {}", e),
            },
            Ok(CliCommand::Join { team_id }) => {
                match session.join_team(&team_id, &options.user_id, &options.user_name) {
                    Ok(()) => {
                        *current_team.lock() = team_id.clone();
                        println!("joined team '{}'", team_id);
                    }
                    Err(e) => println!("error: {}", e),
                }
            }
            Ok(CliCommand::Leave) => match session.leave_team() {
                Ok(()) => println!("left the team room"),
                Err(e) => println!("error: {}", e),
            },
            Ok(CliCommand::Help) => println!("{}", HELP_TEXT),
            Ok(CliCommand::Quit) => break,
            Err(message) => println!("{}", message),
        }
    }

    session.disconnect();
    tracing::info!("Client session ended");

    Ok(())
}

/// Kick off an async board re-fetch; the inbound event was only a signal.
fn refresh_board(api: Option<BoardApi>, team_id: String, label: String) {
    let Some(api) = api else {
        return;
    };
    tokio::spawn(async move {
        match api.fetch_board(&team_id).await {
            Ok(snapshot) => {
                print!(
                    "{}",
                    MessageFormatter::format_board_refreshed(&team_id, snapshot.tasks.len())
                );
                redisplay_prompt(&label);
            }
            Err(e) => tracing::warn!("Board re-fetch for '{}' failed: {}", team_id, e),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_command_with_json() {
        // テスト項目: task コマンドがアクションと JSON ペイロードにパースされる
        // given (前提条件):
        let line = r#"task move {"id":"t1","status":"doing"}"#;

        // when (操作):
        let command = parse_command(line).unwrap();

        // then (期待する結果):
        match command {
            CliCommand::Task { action, task } => {
                assert_eq!(action, TaskAction::Move);
                assert_eq!(task["id"], "t1");
            }
            other => panic!("expected task command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_task_command_without_json_defaults_to_empty_object() {
        // テスト項目: JSON 省略時は空オブジェクトが使われる
        // given (前提条件):
        let line = "task create";

        // when (操作):
        let command = parse_command(line).unwrap();

        // then (期待する結果):
        match command {
            CliCommand::Task { action, task } => {
                assert_eq!(action, TaskAction::Create);
                assert_eq!(task, serde_json::json!({}));
            }
            other => panic!("expected task command, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_task_command_rejects_unknown_action() {
        // テスト項目: 未知のアクションはエラーになる
        // given (前提条件):
        let line = "task explode {}";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert!(result.unwrap_err().contains("unknown action"));
    }

    #[test]
    fn test_parse_columns_command() {
        // テスト項目: columns コマンドが JSON にパースされる
        // given (前提条件):
        let line = r#"columns ["todo","doing","done"]"#;

        // when (操作):
        let command = parse_command(line).unwrap();

        // then (期待する結果):
        assert_eq!(
            command,
            CliCommand::Columns {
                columns: serde_json::json!(["todo", "doing", "done"])
            }
        );
    }

    #[test]
    fn test_parse_typing_and_join_commands() {
        // テスト項目: typing / join コマンドが引数を取り出す
        // given (前提条件):

        // when (操作):
        let typing = parse_command("typing task-9").unwrap();
        let join = parse_command("join team-7").unwrap();

        // then (期待する結果):
        assert_eq!(
            typing,
            CliCommand::Typing {
                task_id: "task-9".to_string()
            }
        );
        assert_eq!(
            join,
            CliCommand::Join {
                team_id: "team-7".to_string()
            }
        );
    }

    #[test]
    fn test_parse_bare_commands() {
        // テスト項目: 引数なしコマンドのパース
        // given (前提条件):

        // when (操作):

        // then (期待する結果):
        assert_eq!(parse_command("leave").unwrap(), CliCommand::Leave);
        assert_eq!(parse_command("help").unwrap(), CliCommand::Help);
        assert_eq!(parse_command("quit").unwrap(), CliCommand::Quit);
        assert_eq!(parse_command("exit").unwrap(), CliCommand::Quit);
    }

    #[test]
    fn test_parse_unknown_command_is_rejected() {
        // テスト項目: 未知のコマンドがエラーになる
        // given (前提条件):
        let line = "dance";

        // when (操作):
        let result = parse_command(line);

        // then (期待する結果):
        assert!(result.unwrap_err().contains("unknown command"));
    }
}
