//! HTTP API response DTOs.

use serde::Serialize;

/// Summary of an active team room.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummaryDto {
    pub team_id: String,
    pub member_count: usize,
}

/// Presence snapshot of a single team room.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPresenceDto {
    pub team_id: String,
    pub members: Vec<ParticipantDto>,
}

/// One participant entry, ordered by join time in `TeamPresenceDto`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub user_id: String,
    pub user_name: String,
    /// RFC 3339 (JST)
    pub joined_at: String,
}
