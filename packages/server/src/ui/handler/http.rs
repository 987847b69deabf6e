//! HTTP API handlers.

use std::sync::Arc;

use axum::{Json, extract::Path, extract::State, http::StatusCode};

use crate::domain::TeamId;
use crate::infrastructure::dto::http::{ParticipantDto, TeamPresenceDto, TeamSummaryDto};

use super::super::state::AppState;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// List teams that currently have members online
pub async fn get_teams(State(state): State<Arc<AppState>>) -> Json<Vec<TeamSummaryDto>> {
    let summaries = state
        .presence_usecase
        .team_summaries()
        .await
        .into_iter()
        .map(|(team_id, member_count)| TeamSummaryDto {
            team_id: team_id.into_string(),
            member_count,
        })
        .collect();

    Json(summaries)
}

/// Presence snapshot for one team, ordered by join time
pub async fn get_team_presence(
    State(state): State<Arc<AppState>>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamPresenceDto>, StatusCode> {
    let team_id = TeamId::try_from(team_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let members = state.presence_usecase.members(&team_id).await;
    // Rooms exist only through their membership; an empty room is no room
    if members.is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    let presence = TeamPresenceDto {
        team_id: team_id.into_string(),
        members: members.into_iter().map(ParticipantDto::from).collect(),
    };

    Ok(Json(presence))
}
