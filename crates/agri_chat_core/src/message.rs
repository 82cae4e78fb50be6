use chrono::{DateTime, Utc};

pub type Timestamp = DateTime<Utc>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    User,
    Bot,
}

/// One entry of a transcript. Never modified after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    author: Author,
    text: String,
    timestamp: Timestamp,
    is_error: bool,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            author: Author::User,
            text: text.into(),
            timestamp,
            is_error: false,
        }
    }

    pub fn bot(text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            author: Author::Bot,
            text: text.into(),
            timestamp,
            is_error: false,
        }
    }

    pub fn bot_error(text: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            is_error: true,
            ..Self::bot(text, timestamp)
        }
    }

    pub fn author(&self) -> Author {
        self.author
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }
}

/// A completed question/answer pair as it is written to persisted history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: String,
    pub bot: String,
    pub timestamp: Timestamp,
}
