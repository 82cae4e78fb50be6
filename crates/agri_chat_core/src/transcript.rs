use std::collections::VecDeque;

use crate::{Exchange, Message};

/// Maximum number of exchanges kept in persisted history.
pub const HISTORY_CAPACITY: usize = 50;
/// Number of persisted exchanges replayed into a fresh transcript.
pub const REPLAY_COUNT: usize = 5;

/// Append-only, in-memory message log for one chat instance.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn snapshot(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Appends the most recent persisted exchanges as alternating user/bot messages.
    pub fn replay(&mut self, history: &[Exchange]) {
        let start = history.len().saturating_sub(REPLAY_COUNT);
        for exchange in &history[start..] {
            self.append(Message::user(exchange.user.clone(), exchange.timestamp));
            self.append(Message::bot(exchange.bot.clone(), exchange.timestamp));
        }
    }
}

/// Bounded FIFO of completed exchanges. The oldest entry is evicted first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryLog {
    entries: VecDeque<Exchange>,
    capacity: usize,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Builds a log from stored entries, keeping only the newest `capacity` of them.
    pub fn from_entries(entries: impl IntoIterator<Item = Exchange>) -> Self {
        let mut log = Self::new();
        for exchange in entries {
            log.push(exchange);
        }
        log
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.entries.push_back(exchange);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.entries.iter()
    }

    /// The newest `count` exchanges in chronological order.
    pub fn recent(&self, count: usize) -> Vec<Exchange> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn into_vec(self) -> Vec<Exchange> {
        self.entries.into()
    }
}
