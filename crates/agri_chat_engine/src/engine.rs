use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use agri_chat_core::{
    ChatReply, CropInputs, FeedbackForm, FertilizerQuery, InstanceKind, LoginForm, RequestId,
    ServiceReply, SignupForm,
};
use agri_logging::{agri_error, agri_warn};

use crate::client::{AdvisorApi, ClientSettings, ReqwestAdvisorApi};
use crate::{ApiError, EngineEvent};

/// One backend call for the engine to run.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineRequest {
    Chat {
        instance: InstanceKind,
        request_id: RequestId,
        message: String,
    },
    CheckSession,
    Logout,
    PredictCrop(CropInputs),
    RecommendFertilizer(FertilizerQuery),
    Forecast { city: String },
    Feedback(FeedbackForm),
    Login(LoginForm),
    Signup(SignupForm),
}

impl EngineRequest {
    /// The completion reported when this request cannot be carried out.
    pub fn failed(self, reason: String) -> EngineEvent {
        fn transport_reply<T>(reason: &str) -> ServiceReply<T> {
            ServiceReply::Transport {
                reason: reason.to_string(),
            }
        }
        match self {
            EngineRequest::Chat {
                instance,
                request_id,
                ..
            } => EngineEvent::ChatCompleted {
                instance,
                request_id,
                reply: ChatReply::Transport {
                    reason: reason.clone(),
                },
            },
            EngineRequest::CheckSession => EngineEvent::SessionChecked(None),
            EngineRequest::Logout => EngineEvent::LoggedOut { ok: false },
            EngineRequest::PredictCrop(_) => EngineEvent::CropPredicted(transport_reply(&reason)),
            EngineRequest::RecommendFertilizer(query) => EngineEvent::FertilizerAdvised {
                crop: query.crop,
                reply: transport_reply(&reason),
            },
            EngineRequest::Forecast { .. } => EngineEvent::ForecastFetched(transport_reply(&reason)),
            EngineRequest::Feedback(_) => EngineEvent::FeedbackSent(transport_reply(&reason)),
            EngineRequest::Login(_) => EngineEvent::LoggedIn(transport_reply(&reason)),
            EngineRequest::Signup(_) => EngineEvent::SignedUp(transport_reply(&reason)),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            EngineRequest::Chat { .. } => "chat request",
            EngineRequest::CheckSession => "session check",
            EngineRequest::Logout => "logout",
            EngineRequest::PredictCrop(_) => "crop prediction",
            EngineRequest::RecommendFertilizer(_) => "fertilizer request",
            EngineRequest::Forecast { .. } => "forecast request",
            EngineRequest::Feedback(_) => "feedback",
            EngineRequest::Login(_) => "login",
            EngineRequest::Signup(_) => "signup",
        }
    }
}

/// The engine thread is gone; the request was not sent.
#[derive(Debug, thiserror::Error)]
#[error("engine is not running")]
pub struct EngineStopped(pub EngineRequest);

/// Runs backend calls on a background tokio runtime and reports completions as events.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineRequest>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let api = ReqwestAdvisorApi::new(settings)?;
        Ok(Self::with_api(Arc::new(api)))
    }

    pub fn with_api(api: Arc<dyn AdvisorApi>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    agri_error!("Failed to start engine runtime: {}", err);
                    return;
                }
            };
            while let Ok(request) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_request(api.as_ref(), request).await;
                    let _ = event_tx.send(event);
                });
            }
        });

        Self { cmd_tx, event_rx }
    }

    /// Queues `request`; its completion arrives later as an [`EngineEvent`].
    pub fn submit(&self, request: EngineRequest) -> Result<(), EngineStopped> {
        self.cmd_tx
            .send(request)
            .map_err(|mpsc::SendError(request)| EngineStopped(request))
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

async fn handle_request(api: &dyn AdvisorApi, request: EngineRequest) -> EngineEvent {
    let outcome = match &request {
        EngineRequest::Chat {
            instance,
            request_id,
            message,
        } => api.chat(message).await.map(|reply| EngineEvent::ChatCompleted {
            instance: *instance,
            request_id: *request_id,
            reply,
        }),
        EngineRequest::CheckSession => api.current_user().await.map(EngineEvent::SessionChecked),
        EngineRequest::Logout => api
            .logout()
            .await
            .map(|()| EngineEvent::LoggedOut { ok: true }),
        EngineRequest::PredictCrop(inputs) => {
            api.predict_crop(inputs).await.map(EngineEvent::CropPredicted)
        }
        EngineRequest::RecommendFertilizer(query) => api
            .recommend_fertilizer(query)
            .await
            .map(|reply| EngineEvent::FertilizerAdvised {
                crop: query.crop.clone(),
                reply,
            }),
        EngineRequest::Forecast { city } => {
            api.forecast(city).await.map(EngineEvent::ForecastFetched)
        }
        EngineRequest::Feedback(form) => {
            api.submit_feedback(form).await.map(EngineEvent::FeedbackSent)
        }
        EngineRequest::Login(form) => api.login(form).await.map(EngineEvent::LoggedIn),
        EngineRequest::Signup(form) => api.signup(form).await.map(EngineEvent::SignedUp),
    };
    match outcome {
        Ok(event) => event,
        Err(err) => {
            agri_warn!("{} failed: {}", request.label(), err);
            request.failed(err.to_string())
        }
    }
}
