use std::path::PathBuf;

use agri_chat_core::{Exchange, HistoryLog};
use agri_logging::{agri_debug, agri_warn};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::{LocalStorage, StorageError};

/// Fixed namespace of the persisted widget history.
pub const HISTORY_KEY: &str = "agribot_history";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedExchange {
    user: String,
    bot: String,
    /// ISO-8601, UTC.
    timestamp: String,
}

impl PersistedExchange {
    fn from_exchange(exchange: &Exchange) -> Self {
        Self {
            user: exchange.user.clone(),
            bot: exchange.bot.clone(),
            timestamp: exchange
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    fn into_exchange(self) -> Option<Exchange> {
        let timestamp = DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()?
            .with_timezone(&Utc);
        Some(Exchange {
            user: self.user,
            bot: self.bot,
            timestamp,
        })
    }
}

/// Bounded FIFO of completed exchanges stored as one JSON document.
///
/// Every write is a read-modify-write of the whole entry without locking.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    storage: LocalStorage,
    key: String,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_key(dir, HISTORY_KEY)
    }

    pub fn with_key(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            storage: LocalStorage::new(dir),
            key: key.into(),
        }
    }

    /// File backing this history, or `None` if the key is unusable.
    pub fn path(&self) -> Option<PathBuf> {
        self.storage.path_for(&self.key).ok()
    }

    /// Loads the stored history. Missing or corrupt data yields an empty log.
    pub fn load(&self) -> HistoryLog {
        match self.storage.get(&self.key) {
            Ok(Some(content)) => parse_history(&content, &self.key),
            Ok(None) => HistoryLog::new(),
            Err(err) => {
                agri_warn!("Failed to read chat history {:?}: {}", self.key, err);
                HistoryLog::new()
            }
        }
    }

    /// Appends one exchange, evicting the oldest entries beyond capacity.
    pub fn persist(&self, exchange: &Exchange) -> Result<(), StorageError> {
        let mut log = self.load();
        log.push(exchange.clone());
        self.write(log)
    }

    fn write(&self, log: HistoryLog) -> Result<(), StorageError> {
        let entries: Vec<PersistedExchange> = log
            .into_vec()
            .iter()
            .map(PersistedExchange::from_exchange)
            .collect();
        let content = serde_json::to_string(&entries)?;
        self.storage.set(&self.key, &content)?;
        agri_debug!("Persisted {} chat exchanges under {:?}", entries.len(), self.key);
        Ok(())
    }
}

fn parse_history(content: &str, key: &str) -> HistoryLog {
    let entries: Vec<PersistedExchange> = match serde_json::from_str(content) {
        Ok(entries) => entries,
        Err(err) => {
            agri_warn!("Ignoring unparsable chat history {:?}: {}", key, err);
            return HistoryLog::new();
        }
    };
    let total = entries.len();
    let exchanges: Vec<Exchange> = entries
        .into_iter()
        .filter_map(PersistedExchange::into_exchange)
        .collect();
    if exchanges.len() != total {
        agri_warn!(
            "Skipped {} chat history entries with bad timestamps in {:?}",
            total - exchanges.len(),
            key
        );
    }
    HistoryLog::from_entries(exchanges)
}
