//! AgriBot chat engine: backend client, request execution and history storage.
mod client;
mod engine;
mod history;
mod storage;
mod types;

pub use client::{AdvisorApi, ClientSettings, ReqwestAdvisorApi, DEFAULT_BASE_URL};
pub use engine::{EngineHandle, EngineRequest, EngineStopped};
pub use history::{HistoryStore, HISTORY_KEY};
pub use storage::{LocalStorage, StorageError};
pub use types::{ApiError, EngineEvent, FailureKind};
