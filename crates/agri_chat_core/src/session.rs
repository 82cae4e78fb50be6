use std::collections::VecDeque;
use std::time::Duration;

/// How long a toast stays on screen before the host dismisses it.
pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

pub type ToastId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user: String,
    pub role: String,
}

/// Signed-in user, populated by a session check and cleared on logout.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionContext {
    current: Option<UserSession>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn populate(&mut self, session: Option<UserSession>) {
        self.current = session;
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&UserSession> {
        self.current.as_ref()
    }

    pub fn logout_label(&self) -> Option<String> {
        self.current
            .as_ref()
            .map(|session| format!("Logout ({})", session.user))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Danger,
}

/// A toast requested by a state transition, before it gets an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn danger(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Danger,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Danger notice using the backend's error when it sent a non-blank one.
    pub(crate) fn rejected(title: &str, error: Option<String>, fallback: &str) -> Self {
        let message = error
            .filter(|error| !error.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Self::danger(title, message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToastQueue {
    toasts: VecDeque<Toast>,
    next_id: ToastId,
}

impl ToastQueue {
    pub fn post(&mut self, notice: Notice) -> ToastId {
        self.next_id += 1;
        let id = self.next_id;
        self.toasts.push_back(Toast {
            id,
            kind: notice.kind,
            title: notice.title,
            message: notice.message,
        });
        id
    }

    /// Returns `true` if a toast with `id` was showing.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|toast| toast.id != id);
        self.toasts.len() != before
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }
}
