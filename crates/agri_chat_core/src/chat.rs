use agri_logging::{agri_debug, agri_info, agri_warn};

use crate::{
    ChatMsg, ChatReply, Effect, Exchange, InputController, KeyOutcome, Message,
    SuggestionSet, Timestamp, Transcript,
};

pub type RequestId = u64;

const REJECTED_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";
const WIDGET_TRANSPORT_FALLBACK: &str =
    "Sorry, I'm having trouble connecting. Please check your internet connection and try again.";
const PANEL_TRANSPORT_FALLBACK: &str =
    "Sorry, I'm having trouble connecting. Please try again later.";

/// The two independent embeddings of the chat component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum InstanceKind {
    /// Floating widget behind a toggle; keeps persisted history.
    Widget,
    /// In-page panel; transient.
    Panel,
}

impl InstanceKind {
    pub fn label(self) -> &'static str {
        match self {
            InstanceKind::Widget => "widget",
            InstanceKind::Panel => "panel",
        }
    }

    pub fn persists_history(self) -> bool {
        matches!(self, InstanceKind::Widget)
    }

    fn starts_open(self) -> bool {
        matches!(self, InstanceKind::Panel)
    }

    /// Chip clicks on the widget go through the input box; the panel leaves the draft alone.
    fn chip_clears_input(self) -> bool {
        matches!(self, InstanceKind::Widget)
    }

    fn rejection_text(self, backend_error: Option<String>) -> String {
        match (self, backend_error) {
            (InstanceKind::Panel, Some(error)) if !error.trim().is_empty() => error,
            _ => REJECTED_FALLBACK.to_string(),
        }
    }

    fn transport_text(self) -> &'static str {
        match self {
            InstanceKind::Widget => WIDGET_TRANSPORT_FALLBACK,
            InstanceKind::Panel => PANEL_TRANSPORT_FALLBACK,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Pending {
        request_id: RequestId,
        message: String,
    },
}

/// State of one chat instance: transcript, draft, chips and the request coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatState {
    kind: InstanceKind,
    transcript: Transcript,
    input: InputController,
    suggestions: SuggestionSet,
    phase: RequestPhase,
    last_request_id: RequestId,
    open: bool,
    dirty: bool,
}

impl ChatState {
    pub fn new(kind: InstanceKind) -> Self {
        Self {
            kind,
            transcript: Transcript::new(),
            input: InputController::new(),
            suggestions: SuggestionSet::new(),
            phase: RequestPhase::Idle,
            last_request_id: 0,
            open: kind.starts_open(),
            dirty: false,
        }
    }

    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn input(&self) -> &InputController {
        &self.input
    }

    pub fn suggestions(&self) -> &SuggestionSet {
        &self.suggestions
    }

    pub fn phase(&self) -> &RequestPhase {
        &self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, RequestPhase::Pending { .. })
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Applies one chat event and returns the effects it requires.
    pub(crate) fn apply(&mut self, at: Timestamp, event: ChatMsg) -> Vec<Effect> {
        match event {
            ChatMsg::InputChanged(text) => {
                self.input.set_text(text);
                self.mark_dirty();
                Vec::new()
            }
            ChatMsg::KeyPressed {
                key,
                newline_modifier,
            } => match self.input.handle_key(key, newline_modifier) {
                KeyOutcome::Submit => self.submit_from_input(at),
                KeyOutcome::InsertNewline => {
                    self.mark_dirty();
                    Vec::new()
                }
                KeyOutcome::Ignored => Vec::new(),
            },
            ChatMsg::SendClicked => self.submit_from_input(at),
            ChatMsg::SuggestionClicked(index) => self.submit_suggestion(index, at),
            ChatMsg::ResponseReceived { request_id, reply } => {
                self.complete(request_id, reply, at)
            }
            ChatMsg::RestoreHistory(history) => {
                if self.kind.persists_history() {
                    self.transcript.replay(&history);
                    self.mark_dirty();
                }
                Vec::new()
            }
            ChatMsg::ToggleClicked => {
                self.open = !self.open;
                self.mark_dirty();
                if self.open {
                    vec![Effect::FocusInput { instance: self.kind }]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn submit_from_input(&mut self, at: Timestamp) -> Vec<Effect> {
        if self.is_pending() {
            agri_debug!(
                "{}: submit ignored while a request is pending",
                self.kind.label()
            );
            return Vec::new();
        }
        match self.input.take_submission() {
            Some(text) => self.begin_request(text, at),
            None => Vec::new(),
        }
    }

    fn submit_suggestion(&mut self, index: usize, at: Timestamp) -> Vec<Effect> {
        if self.is_pending() {
            agri_debug!(
                "{}: suggestion ignored while a request is pending",
                self.kind.label()
            );
            return Vec::new();
        }
        let Some(chip) = self.suggestions.get(index) else {
            agri_warn!("{}: no suggestion at index {}", self.kind.label(), index);
            return Vec::new();
        };
        // Same validation as typed input: the chip text is trimmed and blanks are ignored.
        let text = chip.trim().to_owned();
        if text.is_empty() {
            agri_debug!("{}: blank suggestion {} ignored", self.kind.label(), index);
            return Vec::new();
        }
        if self.kind.chip_clears_input() {
            self.input.clear();
        }
        self.begin_request(text, at)
    }

    fn begin_request(&mut self, text: String, at: Timestamp) -> Vec<Effect> {
        self.transcript.append(Message::user(text.clone(), at));
        self.suggestions.clear();
        self.last_request_id += 1;
        let request_id = self.last_request_id;
        self.phase = RequestPhase::Pending {
            request_id,
            message: text.clone(),
        };
        self.mark_dirty();
        agri_info!(
            "{}: request {} issued (len={})",
            self.kind.label(),
            request_id,
            text.len()
        );
        vec![Effect::SendChat {
            instance: self.kind,
            request_id,
            message: text,
        }]
    }

    fn complete(&mut self, request_id: RequestId, reply: ChatReply, at: Timestamp) -> Vec<Effect> {
        let user_text = match &self.phase {
            RequestPhase::Pending {
                request_id: pending,
                message,
            } if *pending == request_id => message.clone(),
            _ => {
                agri_warn!(
                    "{}: dropping stale response for request {}",
                    self.kind.label(),
                    request_id
                );
                return Vec::new();
            }
        };

        // Leaving Pending removes the busy indicator before the transcript changes.
        self.phase = RequestPhase::Idle;
        self.mark_dirty();
        agri_info!(
            "{}: request {} completed ({})",
            self.kind.label(),
            request_id,
            reply.kind_label()
        );

        match reply {
            ChatReply::Answered {
                response,
                suggestions,
            } => {
                self.transcript.append(Message::bot(response.clone(), at));
                self.suggestions.replace(suggestions);
                if self.kind.persists_history() {
                    vec![Effect::PersistExchange {
                        exchange: Exchange {
                            user: user_text,
                            bot: response,
                            timestamp: at,
                        },
                    }]
                } else {
                    Vec::new()
                }
            }
            ChatReply::Empty => {
                self.transcript
                    .append(Message::bot_error(self.kind.rejection_text(None), at));
                Vec::new()
            }
            ChatReply::Rejected { error } => {
                self.transcript
                    .append(Message::bot_error(self.kind.rejection_text(error), at));
                Vec::new()
            }
            ChatReply::Transport { reason } => {
                agri_warn!(
                    "{}: request {} failed: {}",
                    self.kind.label(),
                    request_id,
                    reason
                );
                self.transcript
                    .append(Message::bot_error(self.kind.transport_text(), at));
                Vec::new()
            }
        }
    }
}
