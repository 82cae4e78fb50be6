use std::sync::mpsc;
use std::thread;

use agri_chat_core::{AccountMsg, AdvisoryMsg, ChatMsg, Effect, HistoryLog, InstanceKind, Msg};
use agri_chat_engine::{
    ApiError, EngineEvent, EngineHandle, EngineRequest, EngineStopped, HistoryStore,
};
use agri_logging::{agri_debug, agri_error, agri_info};
use chrono::Utc;

use super::config::AppConfig;

/// Executes core effects against the engine and the history store.
pub struct EffectRunner {
    engine: EngineHandle,
    history: HistoryStore,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(config: &AppConfig, msg_tx: mpsc::Sender<Msg>) -> Result<Self, ApiError> {
        let engine = EngineHandle::new(config.client_settings())?;
        let history = HistoryStore::new(config.history_dir.clone());
        match history.path() {
            Some(path) => agri_info!("Backend {} (history in {})", config.base_url, path.display()),
            None => agri_info!("Backend {} (history disabled)", config.base_url),
        }
        Ok(Self {
            engine,
            history,
            msg_tx,
        })
    }

    pub fn load_history(&self) -> HistoryLog {
        self.history.load()
    }

    /// Runs `effects` in order. Returns the instance that asked for input focus, if any.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Option<InstanceKind> {
        let mut focus = None;
        for effect in effects {
            match effect {
                Effect::SendChat {
                    instance,
                    request_id,
                    message,
                } => {
                    agri_debug!(
                        "SendChat instance={} request_id={} len={}",
                        instance.label(),
                        request_id,
                        message.len()
                    );
                    self.submit(EngineRequest::Chat {
                        instance,
                        request_id,
                        message,
                    });
                }
                Effect::PersistExchange { exchange } => {
                    if let Err(err) = self.history.persist(&exchange) {
                        agri_error!("Failed to persist chat history: {}", err);
                    }
                }
                Effect::FocusInput { instance } => focus = Some(instance),
                Effect::CheckSession => self.submit(EngineRequest::CheckSession),
                Effect::Logout => self.submit(EngineRequest::Logout),
                Effect::PredictCrop { inputs } => self.submit(EngineRequest::PredictCrop(inputs)),
                Effect::RecommendFertilizer { query } => {
                    self.submit(EngineRequest::RecommendFertilizer(query))
                }
                Effect::FetchForecast { city } => self.submit(EngineRequest::Forecast { city }),
                Effect::SubmitFeedback(form) => self.submit(EngineRequest::Feedback(form)),
                Effect::Login(form) => self.submit(EngineRequest::Login(form)),
                Effect::Signup(form) => self.submit(EngineRequest::Signup(form)),
                Effect::ScheduleToastDismiss { toast_id, after } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(after);
                        let _ = msg_tx.send(Msg::ToastDismissed(toast_id));
                    });
                }
            }
        }
        focus
    }

    /// Hands `request` to the engine. If the engine is gone the request fails
    /// right away, so the state waiting on it is released.
    fn submit(&self, request: EngineRequest) {
        if let Err(stopped) = self.engine.submit(request) {
            let _ = self.msg_tx.send(undelivered(stopped));
        }
    }

    /// Forwards finished engine work to the message queue.
    pub fn pump_engine_events(&self) {
        while let Some(event) = self.engine.try_recv() {
            let _ = self.msg_tx.send(map_event(event));
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::ChatCompleted {
            instance,
            request_id,
            reply,
        } => Msg::Chat {
            instance,
            at: Utc::now(),
            event: ChatMsg::ResponseReceived { request_id, reply },
        },
        EngineEvent::SessionChecked(session) => Msg::SessionChecked(session),
        EngineEvent::LoggedOut { ok } => Msg::LoggedOut { ok },
        EngineEvent::CropPredicted(reply) => Msg::Advisory(AdvisoryMsg::CropPredicted(reply)),
        EngineEvent::FertilizerAdvised { crop, reply } => {
            Msg::Advisory(AdvisoryMsg::FertilizerAdvised { crop, reply })
        }
        EngineEvent::ForecastFetched(reply) => Msg::Advisory(AdvisoryMsg::ForecastFetched(reply)),
        EngineEvent::FeedbackSent(reply) => Msg::Account(AccountMsg::FeedbackSent(reply)),
        EngineEvent::LoggedIn(reply) => Msg::Account(AccountMsg::LoggedIn(reply)),
        EngineEvent::SignedUp(reply) => Msg::Account(AccountMsg::SignedUp(reply)),
    }
}

fn undelivered(stopped: EngineStopped) -> Msg {
    agri_error!("Dropping request, {}", stopped);
    let reason = stopped.to_string();
    map_event(stopped.0.failed(reason))
}
