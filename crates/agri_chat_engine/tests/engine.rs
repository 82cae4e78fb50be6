use std::sync::{Arc, Mutex};
use std::time::Duration;

use agri_chat_core::{
    ChatReply, CropInputs, CropPrediction, FeedbackForm, FertilizerAdvice, FertilizerQuery,
    Forecast, InstanceKind, LoginForm, ServiceReply, SignupForm, UserSession,
};
use agri_chat_engine::{
    AdvisorApi, ApiError, EngineEvent, EngineHandle, EngineRequest, FailureKind,
};

/// Scripted backend that records every chat message it receives.
struct FakeApi {
    seen: Arc<Mutex<Vec<String>>>,
    chat_result: Result<ChatReply, ApiError>,
    logout_ok: bool,
}

#[async_trait::async_trait]
impl AdvisorApi for FakeApi {
    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        self.seen.lock().unwrap().push(message.to_string());
        self.chat_result.clone()
    }

    async fn current_user(&self) -> Result<Option<UserSession>, ApiError> {
        Ok(Some(UserSession {
            user: "asha".to_string(),
            role: "farmer".to_string(),
        }))
    }

    async fn logout(&self) -> Result<(), ApiError> {
        if self.logout_ok {
            Ok(())
        } else {
            Err(ApiError {
                kind: FailureKind::Network,
                message: "connection refused".to_string(),
            })
        }
    }

    async fn predict_crop(
        &self,
        _inputs: &CropInputs,
    ) -> Result<ServiceReply<Vec<CropPrediction>>, ApiError> {
        Ok(ServiceReply::Done(vec![CropPrediction {
            crop: "rice".to_string(),
            probability: 0.9,
        }]))
    }

    async fn recommend_fertilizer(
        &self,
        query: &FertilizerQuery,
    ) -> Result<ServiceReply<FertilizerAdvice>, ApiError> {
        Ok(ServiceReply::Done(FertilizerAdvice::Unavailable {
            error: format!("no data for {}", query.crop),
        }))
    }

    async fn forecast(&self, _city: &str) -> Result<ServiceReply<Forecast>, ApiError> {
        Err(ApiError {
            kind: FailureKind::HttpStatus(502),
            message: "502 Bad Gateway".to_string(),
        })
    }

    async fn submit_feedback(&self, _form: &FeedbackForm) -> Result<ServiceReply<()>, ApiError> {
        Ok(ServiceReply::Done(()))
    }

    async fn login(&self, form: &LoginForm) -> Result<ServiceReply<UserSession>, ApiError> {
        Ok(ServiceReply::Done(UserSession {
            user: form.username.clone(),
            role: form.role.clone(),
        }))
    }

    async fn signup(&self, _form: &SignupForm) -> Result<ServiceReply<String>, ApiError> {
        Ok(ServiceReply::Rejected {
            error: Some("Username or email already exists".to_string()),
        })
    }
}

fn fake(chat_result: Result<ChatReply, ApiError>, logout_ok: bool) -> EngineHandle {
    EngineHandle::with_api(Arc::new(FakeApi {
        seen: Arc::new(Mutex::new(Vec::new())),
        chat_result,
        logout_ok,
    }))
}

const WAIT: Duration = Duration::from_secs(5);

#[test]
fn chat_completion_is_reported_with_instance_and_request_id() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let engine = EngineHandle::with_api(Arc::new(FakeApi {
        seen: seen.clone(),
        chat_result: Ok(ChatReply::Answered {
            response: "Sow after the first rain.".to_string(),
            suggestions: Vec::new(),
        }),
        logout_ok: true,
    }));

    engine
        .submit(EngineRequest::Chat {
            instance: InstanceKind::Panel,
            request_id: 3,
            message: "When to sow?".to_string(),
        })
        .expect("engine running");

    let event = engine.recv_timeout(WAIT).expect("event");
    assert_eq!(
        event,
        EngineEvent::ChatCompleted {
            instance: InstanceKind::Panel,
            request_id: 3,
            reply: ChatReply::Answered {
                response: "Sow after the first rain.".to_string(),
                suggestions: Vec::new(),
            },
        }
    );
    assert_eq!(*seen.lock().unwrap(), vec!["When to sow?".to_string()]);
}

#[test]
fn api_errors_become_transport_replies() {
    let engine = fake(
        Err(ApiError {
            kind: FailureKind::Timeout,
            message: "operation timed out".to_string(),
        }),
        false,
    );

    engine
        .submit(EngineRequest::Chat {
            instance: InstanceKind::Widget,
            request_id: 1,
            message: "hi".to_string(),
        })
        .expect("engine running");

    match engine.recv_timeout(WAIT).expect("event") {
        EngineEvent::ChatCompleted {
            instance,
            request_id,
            reply: ChatReply::Transport { reason },
        } => {
            assert_eq!(instance, InstanceKind::Widget);
            assert_eq!(request_id, 1);
            assert!(reason.contains("timeout"));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    engine.submit(EngineRequest::Logout).expect("engine running");
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::LoggedOut { ok: false })
    );
}

#[test]
fn session_check_reports_user() {
    let engine = fake(Ok(ChatReply::Empty), true);

    engine
        .submit(EngineRequest::CheckSession)
        .expect("engine running");
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::SessionChecked(Some(UserSession {
            user: "asha".to_string(),
            role: "farmer".to_string(),
        })))
    );
    assert!(engine.try_recv().is_none());
}

#[test]
fn form_requests_report_their_own_events() {
    let engine = fake(Ok(ChatReply::Empty), true);

    engine
        .submit(EngineRequest::RecommendFertilizer(FertilizerQuery {
            crop: "jute".to_string(),
            nitrogen: 10.0,
            phosphorus: 20.0,
            potassium: 30.0,
        }))
        .expect("engine running");
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::FertilizerAdvised {
            crop: "jute".to_string(),
            reply: ServiceReply::Done(FertilizerAdvice::Unavailable {
                error: "no data for jute".to_string()
            }),
        })
    );

    engine
        .submit(EngineRequest::Login(LoginForm {
            username: "ravi".to_string(),
            password: "farmer123".to_string(),
            role: "farmer".to_string(),
        }))
        .expect("engine running");
    assert_eq!(
        engine.recv_timeout(WAIT),
        Some(EngineEvent::LoggedIn(ServiceReply::Done(UserSession {
            user: "ravi".to_string(),
            role: "farmer".to_string(),
        })))
    );
}

#[test]
fn failed_forecast_becomes_transport_reply() {
    let engine = fake(Ok(ChatReply::Empty), true);

    engine
        .submit(EngineRequest::Forecast {
            city: "Pune".to_string(),
        })
        .expect("engine running");
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::ForecastFetched(ServiceReply::Transport { reason })) => {
            assert!(reason.contains("502"));
        }
        other => panic!("unexpected event: {other:?}"),
    }
}
