//! UseCase layer: one struct per room-router operation.
//!
//! UseCases depend only on the domain traits (`PresenceRegistry`,
//! `EventPusher`); DTO serialization stays in the ui layer.

mod disconnect;
mod join_team;
mod leave_team;
mod presence_query;
mod relay_event;

pub use disconnect::DisconnectUseCase;
pub use join_team::JoinTeamUseCase;
pub use leave_team::LeaveTeamUseCase;
pub use presence_query::GetPresenceUseCase;
pub use relay_event::RelayBoardEventUseCase;
