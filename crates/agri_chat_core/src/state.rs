use crate::view_model::{AdvisoryViewModel, AppViewModel, ChatViewModel, ToastView};
use crate::{AccountState, AdvisoryState, ChatState, InstanceKind, SessionContext, ToastQueue};

/// Whole-page state: two independent chat instances, the advisory panels,
/// account forms, session and toasts.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    widget: ChatState,
    panel: ChatState,
    advisory: AdvisoryState,
    account: AccountState,
    session: SessionContext,
    toasts: ToastQueue,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            widget: ChatState::new(InstanceKind::Widget),
            panel: ChatState::new(InstanceKind::Panel),
            advisory: AdvisoryState::new(),
            account: AccountState::default(),
            session: SessionContext::new(),
            toasts: ToastQueue::default(),
            dirty: false,
        }
    }

    pub fn chat(&self, instance: InstanceKind) -> &ChatState {
        match instance {
            InstanceKind::Widget => &self.widget,
            InstanceKind::Panel => &self.panel,
        }
    }

    pub(crate) fn chat_mut(&mut self, instance: InstanceKind) -> &mut ChatState {
        match instance {
            InstanceKind::Widget => &mut self.widget,
            InstanceKind::Panel => &mut self.panel,
        }
    }

    pub fn advisory(&self) -> &AdvisoryState {
        &self.advisory
    }

    pub(crate) fn advisory_mut(&mut self) -> &mut AdvisoryState {
        &mut self.advisory
    }

    pub fn account(&self) -> &AccountState {
        &self.account
    }

    /// Account forms and the session they sign into, borrowed together.
    pub(crate) fn account_and_session_mut(&mut self) -> (&mut AccountState, &mut SessionContext) {
        (&mut self.account, &mut self.session)
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut SessionContext {
        &mut self.session
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub(crate) fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            widget: ChatViewModel::from_state(&self.widget),
            panel: ChatViewModel::from_state(&self.panel),
            advisory: AdvisoryViewModel::from_state(&self.advisory),
            logout_label: self.session.logout_label(),
            toasts: self.toasts.iter().map(ToastView::from_toast).collect(),
            dirty: self.dirty
                || self.widget.is_dirty()
                || self.panel.is_dirty()
                || self.advisory.is_dirty(),
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call and resets the flags.
    pub fn consume_dirty(&mut self) -> bool {
        let own = std::mem::take(&mut self.dirty);
        let widget = self.widget.consume_dirty();
        let panel = self.panel.consume_dirty();
        let advisory = self.advisory.consume_dirty();
        own || widget || panel || advisory
    }
}
