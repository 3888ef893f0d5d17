//! Command and reply types crossing the transport boundary.
//!
//! The host layer owns the actual Telegram wire format; these types are
//! what it hands in (a routed command) and gets back (display text plus an
//! optional inline keyboard).

use crate::models::Actor;

/// An inbound command, already split into verb and trailing text by the
/// host router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// Lowercase verb without the leading slash, e.g. `fast`.
    pub verb: String,
    /// Raw text after the verb; may be empty.
    pub args: String,
    pub actor: Actor,
    pub chat_id: i64,
}

impl CommandRequest {
    pub fn new(
        verb: impl Into<String>,
        args: impl Into<String>,
        actor: Actor,
        chat_id: i64,
    ) -> Self {
        Self {
            verb: verb.into(),
            args: args.into(),
            actor,
            chat_id,
        }
    }
}

/// What the bot sends back for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Rows of labeled actions rendered as inline buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn single_row(buttons: Vec<Button>) -> Self {
        Self {
            rows: vec![buttons],
        }
    }
}

/// One inline button. `action` is the opaque callback string handed back
/// when the button is pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}
