//! Identity of whoever triggered a state change.

use serde::{Deserialize, Serialize};

/// The acting user behind a command, recorded for audit display.
///
/// `id` is the Telegram numeric user id; `name` is whatever display name the
/// wire layer extracted (first name, username, ...). The name is only ever
/// shown back to the chat, never used for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
}

impl Actor {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
