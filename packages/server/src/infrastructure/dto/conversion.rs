//! Conversion logic between DTOs and domain entities.

use bansou_shared::time::to_jst_rfc3339;

use crate::domain::Participant;
use crate::infrastructure::dto::http::ParticipantDto;

impl From<Participant> for ParticipantDto {
    fn from(model: Participant) -> Self {
        Self {
            user_id: model.user_id.into_string(),
            user_name: model.user_name.into_string(),
            joined_at: to_jst_rfc3339(model.joined_at.value()),
        }
    }
}
