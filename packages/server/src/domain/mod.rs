//! Domain layer for the sync server.
//!
//! Value objects, the presence entities and the two seams the usecase layer
//! depends on: `PresenceRegistry` (who is in which team room) and
//! `EventPusher` (delivery of serialized events to connections). Concrete
//! implementations live in the infrastructure layer.

mod entity;
mod error;
mod pusher;
mod registry;
mod value_object;

pub use entity::Participant;
pub use error::{DomainError, PushError};
pub use pusher::{EventPusher, PusherChannel};
pub use registry::{Departure, JoinOutcome, PresenceRegistry};
pub use value_object::{ConnectionId, TeamId, Timestamp, UserId, UserName};

#[cfg(test)]
pub use pusher::MockEventPusher;
