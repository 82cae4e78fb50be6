use crate::{
    AccountMsg, AdvisoryMsg, ChatReply, Exchange, InstanceKind, Key, RequestId, Timestamp, ToastId,
    UserSession,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Host finished building the UI; triggers the initial session check.
    AppStarted,
    /// An event addressed to one chat instance, stamped with the time the host saw it.
    Chat {
        instance: InstanceKind,
        at: Timestamp,
        event: ChatMsg,
    },
    /// Result of `GET /api/user`. `None` when nobody is signed in.
    SessionChecked(Option<UserSession>),
    /// User clicked Logout.
    LogoutClicked,
    /// The logout call finished. `ok` is false on transport failure.
    LoggedOut { ok: bool },
    /// Crop, fertilizer and weather panels.
    Advisory(AdvisoryMsg),
    /// Login, signup and feedback forms.
    Account(AccountMsg),
    /// A toast reached the end of its lifetime.
    ToastDismissed(ToastId),
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMsg {
    /// User edited the chat input box.
    InputChanged(String),
    /// A key the input controller cares about. `newline_modifier` is Shift.
    KeyPressed { key: Key, newline_modifier: bool },
    /// User clicked the send affordance.
    SendClicked,
    /// User activated the suggestion chip at `index`.
    SuggestionClicked(usize),
    /// The backend call for `request_id` completed.
    ResponseReceived {
        request_id: RequestId,
        reply: ChatReply,
    },
    /// Previously persisted exchanges, oldest first.
    RestoreHistory(Vec<Exchange>),
    /// User clicked the show/hide toggle.
    ToggleClicked,
}
