use agri_logging::agri_info;

use crate::{AppState, Effect, Msg, Notice, TOAST_LIFETIME};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::AppStarted => vec![Effect::CheckSession],
        Msg::Chat {
            instance,
            at,
            event,
        } => state.chat_mut(instance).apply(at, event),
        Msg::SessionChecked(session) => {
            match &session {
                Some(user) => agri_info!("Session active for {} ({})", user.user, user.role),
                None => agri_info!("No active session"),
            }
            state.session_mut().populate(session);
            state.mark_dirty();
            Vec::new()
        }
        Msg::LogoutClicked => {
            if state.session().current().is_some() {
                vec![Effect::Logout]
            } else {
                Vec::new()
            }
        }
        Msg::LoggedOut { ok } => {
            // The local session ends even when the backend could not be reached.
            state.session_mut().clear();
            let notice = if ok {
                Notice::success("Signed out", "You have been logged out.")
            } else {
                Notice::danger(
                    "Logout Error",
                    "Could not reach the server; you have been signed out locally.",
                )
            };
            vec![post(&mut state, notice)]
        }
        Msg::Advisory(event) => {
            let outcome = state.advisory_mut().apply(event);
            finish(&mut state, outcome.effects, outcome.notices)
        }
        Msg::Account(event) => {
            let (account, session) = state.account_and_session_mut();
            let outcome = account.apply(event, session);
            state.mark_dirty();
            finish(&mut state, outcome.effects, outcome.notices)
        }
        Msg::ToastDismissed(id) => {
            if state.toasts_mut().dismiss(id) {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Shows `notice` as a toast and schedules its dismissal.
fn post(state: &mut AppState, notice: Notice) -> Effect {
    let toast_id = state.toasts_mut().post(notice);
    state.mark_dirty();
    Effect::ScheduleToastDismiss {
        toast_id,
        after: TOAST_LIFETIME,
    }
}

fn finish(state: &mut AppState, mut effects: Vec<Effect>, notices: Vec<Notice>) -> Vec<Effect> {
    for notice in notices {
        effects.push(post(state, notice));
    }
    effects
}
