//! AgriBot chat core: pure state machine, message formatting and view-model helpers.
mod account;
mod advisory;
mod chat;
mod effect;
pub mod format;
mod input;
mod message;
mod msg;
mod reply;
mod session;
mod state;
mod suggestions;
mod transcript;
mod update;
mod view_model;

pub use account::{AccountMsg, AccountState, FeedbackForm, LoginForm, SignupForm, ROLES};
pub use advisory::{
    AdvisoryMsg, AdvisoryState, CropField, CropForm, CropInputs, CropPrediction, FertilizerAdvice,
    FertilizerQuery, FertilizerResult, Forecast, ForecastDay, WeatherCondition,
};
pub use chat::{ChatState, InstanceKind, RequestId, RequestPhase};
pub use effect::Effect;
pub use format::{escape_text, format_message, sanitize_text, SafeMarkup};
pub use input::{InputController, Key, KeyOutcome};
pub use message::{Author, Exchange, Message, Timestamp};
pub use msg::{ChatMsg, Msg};
pub use reply::{ChatReply, ServiceReply};
pub use session::{
    Notice, SessionContext, Toast, ToastId, ToastKind, ToastQueue, UserSession, TOAST_LIFETIME,
};
pub use state::AppState;
pub use suggestions::SuggestionSet;
pub use transcript::{HistoryLog, Transcript, HISTORY_CAPACITY, REPLAY_COUNT};
pub use update::update;
pub use view_model::{
    AdvisoryViewModel, AppViewModel, ChatViewModel, ChipView, CropCardView, CropFieldView,
    EntryView, FertilizerView, ForecastDayView, ForecastView, MessageView, ToastView,
    WELCOME_INTRO, WELCOME_TITLE, WELCOME_TOPICS,
};
