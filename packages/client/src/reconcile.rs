//! Board reconciliation against the REST API.
//!
//! Inbound `task-updated` / `columns-updated` events are wake-up signals,
//! not state. The authoritative board lives behind the REST API; after a
//! signal the client re-fetches it here. Last fetch wins, the database is
//! the single source of truth, so concurrent edits can never corrupt local
//! state (at worst the UI is briefly stale).

use serde::Deserialize;
use serde_json::Value;

use crate::error::ClientError;

/// Authoritative board state as returned by the board-fetch endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardSnapshot {
    #[serde(default)]
    pub tasks: Vec<Value>,
    #[serde(default)]
    pub columns: Value,
}

/// Client for the board-fetch endpoints of the REST collaborator.
#[derive(Debug, Clone)]
pub struct BoardApi {
    base_url: String,
    http: reqwest::Client,
}

impl BoardApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Re-fetch the current task list and column layout for a team board.
    pub async fn fetch_board(&self, team_id: &str) -> Result<BoardSnapshot, ClientError> {
        let url = format!("{}/api/teams/{}/board", self.base_url, team_id);
        let snapshot = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<BoardSnapshot>()
            .await?;
        Ok(snapshot)
    }
}
