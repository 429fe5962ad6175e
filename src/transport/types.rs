//! Transport-neutral message vocabulary

use crate::session::{ArtifactId, SessionKey};

/// How the message text should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Html,
    Markdown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub text: String,
    pub format: TextFormat,
    pub markup: Markup,
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            markup: Markup::None,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Html,
            ..Self::text(text)
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self {
            format: TextFormat::Markdown,
            ..Self::text(text)
        }
    }

    #[must_use]
    pub fn with_markup(mut self, markup: Markup) -> Self {
        self.markup = markup;
        self
    }

    #[must_use]
    pub fn with_inline(self, keyboard: InlineKeyboard) -> Self {
        self.with_markup(Markup::Inline(keyboard))
    }

    #[must_use]
    pub fn with_reply(self, keyboard: ReplyKeyboard) -> Self {
        self.with_markup(Markup::Reply(keyboard))
    }
}

/// Controls attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Markup {
    #[default]
    None,
    /// Buttons under the message that send back an action token
    Inline(InlineKeyboard),
    /// Replacement keyboard that sends its label as text
    Reply(ReplyKeyboard),
    /// Hide any reply keyboard
    RemoveKeyboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn row(buttons: Vec<InlineButton>) -> Self {
        Self { rows: vec![buttons] }
    }

    pub fn rows(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub action: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<ReplyButton>>,
    pub one_time: bool,
    pub resize: bool,
}

impl ReplyKeyboard {
    pub fn new(rows: Vec<Vec<ReplyButton>>) -> Self {
        Self {
            rows,
            one_time: true,
            resize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyButton {
    pub label: String,
    pub request: Option<ShareRequest>,
}

impl ReplyButton {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            request: None,
        }
    }

    pub fn requesting(label: impl Into<String>, request: ShareRequest) -> Self {
        Self {
            label: label.into(),
            request: Some(request),
        }
    }
}

/// Data a reply button asks the client to share
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareRequest {
    Contact,
    Location,
}

/// Normalized inbound event
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message {
        session: SessionKey,
        content: MessageContent,
    },
    Control {
        session: SessionKey,
        /// Message that carried the pressed control
        artifact: ArtifactId,
        action: String,
        callback_id: String,
    },
}

impl Inbound {
    pub fn session(&self) -> SessionKey {
        match self {
            Self::Message { session, .. } | Self::Control { session, .. } => *session,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Command {
        name: String,
        args: Vec<String>,
    },
    Contact {
        first_name: String,
        last_name: String,
        phone: String,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    /// Largest available size of a sent photo
    Photo {
        file_id: String,
    },
    Text(String),
}
