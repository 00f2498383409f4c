//! Transport-agnostic conversation layer.
//!
//! A chat transport hands each event to [`Bot::handle`] as an [`Inbound`] and
//! renders the returned [`Reply`]: text plus an optional inline keyboard.

pub mod action;
pub mod bot;
pub mod format;
pub mod keyboard;
pub mod session;

pub use action::ButtonAction;
pub use bot::Bot;
pub use session::{ConversationId, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Command { name: String, args: Vec<String> },
    Text(String),
    /// Raw callback data of a pressed button
    Button(String),
}

impl Inbound {
    /// Reads one line typed into a console channel.
    ///
    /// `/name args` is a command (a `@botname` suffix is ignored), `!id` a
    /// button press, anything else plain text. Blank lines yield `None`.
    pub fn from_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        if let Some(id) = line.strip_prefix('!') {
            return Some(Inbound::Button(id.trim().to_string()));
        }
        if let Some(command) = line.strip_prefix('/') {
            let mut parts = command.split_whitespace();
            let name = parts.next()?;
            let name = name.split('@').next().unwrap_or(name).to_lowercase();
            return Some(Inbound::Command {
                name,
                args: parts.map(str::to_string).collect(),
            });
        }
        Some(Inbound::Text(line.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: ButtonAction) -> Self {
        Button {
            label: label.into(),
            action,
        }
    }
}

pub type Keyboard = Vec<Vec<Button>>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            keyboard: Vec::new(),
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = keyboard;
        self
    }
}
