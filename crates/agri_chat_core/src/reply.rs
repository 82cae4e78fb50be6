/// Outcome of one `/api/chatbot` round trip, as seen by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// `success: true` with a non-empty answer.
    Answered {
        response: String,
        suggestions: Vec<String>,
    },
    /// `success: true` but no usable answer text.
    Empty,
    /// `success: false`, optionally carrying the backend's explanation.
    Rejected { error: Option<String> },
    /// Connection failure, timeout, non-2xx status or undecodable payload.
    Transport { reason: String },
}

impl ChatReply {
    pub fn kind_label(&self) -> &'static str {
        match self {
            ChatReply::Answered { .. } => "answered",
            ChatReply::Empty => "empty",
            ChatReply::Rejected { .. } => "rejected",
            ChatReply::Transport { .. } => "transport",
        }
    }
}

/// Outcome of a form-style backend call answering `{ success, error?, ... }`.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceReply<T> {
    Done(T),
    /// `success: false`, optionally carrying the backend's explanation.
    Rejected { error: Option<String> },
    /// The call never produced a usable body.
    Transport { reason: String },
}

impl<T> ServiceReply<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ServiceReply<U> {
        match self {
            ServiceReply::Done(value) => ServiceReply::Done(f(value)),
            ServiceReply::Rejected { error } => ServiceReply::Rejected { error },
            ServiceReply::Transport { reason } => ServiceReply::Transport { reason },
        }
    }

    /// Chains a conversion that can itself turn a success into a failure.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> ServiceReply<U>) -> ServiceReply<U> {
        match self {
            ServiceReply::Done(value) => f(value),
            ServiceReply::Rejected { error } => ServiceReply::Rejected { error },
            ServiceReply::Transport { reason } => ServiceReply::Transport { reason },
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            ServiceReply::Done(_) => "done",
            ServiceReply::Rejected { .. } => "rejected",
            ServiceReply::Transport { .. } => "transport",
        }
    }
}
