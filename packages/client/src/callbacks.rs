//! Inbound event callback registry.
//!
//! One callback slot per event type. Re-registering a callback for the same
//! event replaces the previous one, so repeated subscription calls (e.g. a
//! UI component re-mounting) never produce duplicate handling.

use bansou_server::infrastructure::dto::websocket::{
    ActiveUsersEvent, ColumnsUpdatedEvent, PresenceChangeEvent, ServerEvent, TaskUpdatedEvent,
    UserTypingPayload,
};

type Callback<T> = Box<dyn Fn(T) + Send + 'static>;

/// Callback slots for every server event.
#[derive(Default)]
pub struct CallbackRegistry {
    task_updated: Option<Callback<TaskUpdatedEvent>>,
    columns_updated: Option<Callback<ColumnsUpdatedEvent>>,
    user_typing: Option<Callback<UserTypingPayload>>,
    user_joined: Option<Callback<PresenceChangeEvent>>,
    user_left: Option<Callback<PresenceChangeEvent>>,
    active_users: Option<Callback<ActiveUsersEvent>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_task_updated(&mut self, callback: impl Fn(TaskUpdatedEvent) + Send + 'static) {
        self.task_updated = Some(Box::new(callback));
    }

    pub fn on_columns_updated(&mut self, callback: impl Fn(ColumnsUpdatedEvent) + Send + 'static) {
        self.columns_updated = Some(Box::new(callback));
    }

    pub fn on_user_typing(&mut self, callback: impl Fn(UserTypingPayload) + Send + 'static) {
        self.user_typing = Some(Box::new(callback));
    }

    pub fn on_user_joined(&mut self, callback: impl Fn(PresenceChangeEvent) + Send + 'static) {
        self.user_joined = Some(Box::new(callback));
    }

    pub fn on_user_left(&mut self, callback: impl Fn(PresenceChangeEvent) + Send + 'static) {
        self.user_left = Some(Box::new(callback));
    }

    pub fn on_active_users(&mut self, callback: impl Fn(ActiveUsersEvent) + Send + 'static) {
        self.active_users = Some(Box::new(callback));
    }

    /// Route an inbound event to its registered callback, if any.
    pub fn dispatch(&self, event: ServerEvent) {
        match event {
            ServerEvent::TaskUpdated(payload) => {
                if let Some(callback) = &self.task_updated {
                    callback(payload);
                }
            }
            ServerEvent::ColumnsUpdated(payload) => {
                if let Some(callback) = &self.columns_updated {
                    callback(payload);
                }
            }
            ServerEvent::UserTypingUpdate(payload) => {
                if let Some(callback) = &self.user_typing {
                    callback(payload);
                }
            }
            ServerEvent::UserJoined(payload) => {
                if let Some(callback) = &self.user_joined {
                    callback(payload);
                }
            }
            ServerEvent::UserLeft(payload) => {
                if let Some(callback) = &self.user_left {
                    callback(payload);
                }
            }
            ServerEvent::ActiveUsers(payload) => {
                if let Some(callback) = &self.active_users {
                    callback(payload);
                }
            }
        }
    }
}
