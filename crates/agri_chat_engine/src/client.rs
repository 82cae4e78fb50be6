use std::time::Duration;

use agri_chat_core::{
    ChatReply, CropInputs, CropPrediction, FeedbackForm, FertilizerAdvice, FertilizerQuery,
    Forecast, LoginForm, ServiceReply, SignupForm, UserSession,
};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Serialize;
use url::Url;

use crate::types::{
    AccountResponseBody, ChatRequestBody, ChatResponseBody, CityRequestBody, CropRequestBody,
    CropResponseBody, EnvelopeHead, FeedbackRequestBody, FertilizerRequestBody,
    FertilizerResponseBody, ForecastResponseBody, LoginRequestBody, SignupRequestBody,
    UserResponseBody,
};
use crate::{ApiError, FailureKind};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/";

const CHAT_PATH: &str = "api/chatbot";
const USER_PATH: &str = "api/user";
const LOGOUT_PATH: &str = "api/logout";
const CROP_PATH: &str = "api/predict/crop";
const FERTILIZER_PATH: &str = "api/predict/fertilizer";
const FORECAST_PATH: &str = "api/weather/forecast";
const FEEDBACK_PATH: &str = "api/feedback";
const LOGIN_PATH: &str = "api/login";
const SIGNUP_PATH: &str = "api/signup";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientSettings {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Resolves an endpoint below the base URL, keeping any path prefix.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|url| url.join(path))
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }
}

/// The backend endpoints this client consumes.
#[async_trait::async_trait]
pub trait AdvisorApi: Send + Sync {
    /// `POST /api/chatbot`. `Err` means the exchange never produced a usable body.
    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError>;

    /// `GET /api/user`. `Ok(None)` when nobody is signed in.
    async fn current_user(&self) -> Result<Option<UserSession>, ApiError>;

    /// `POST /api/logout`.
    async fn logout(&self) -> Result<(), ApiError>;

    /// `POST /api/predict/crop`: the most likely crops, best first.
    async fn predict_crop(
        &self,
        inputs: &CropInputs,
    ) -> Result<ServiceReply<Vec<CropPrediction>>, ApiError>;

    /// `POST /api/predict/fertilizer`.
    async fn recommend_fertilizer(
        &self,
        query: &FertilizerQuery,
    ) -> Result<ServiceReply<FertilizerAdvice>, ApiError>;

    /// `POST /api/weather/forecast`.
    async fn forecast(&self, city: &str) -> Result<ServiceReply<Forecast>, ApiError>;

    /// `POST /api/feedback`.
    async fn submit_feedback(&self, form: &FeedbackForm) -> Result<ServiceReply<()>, ApiError>;

    /// `POST /api/login`. The backend also starts its cookie session.
    async fn login(&self, form: &LoginForm) -> Result<ServiceReply<UserSession>, ApiError>;

    /// `POST /api/signup`. `Done` carries the created username.
    async fn signup(&self, form: &SignupForm) -> Result<ServiceReply<String>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestAdvisorApi {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ReqwestAdvisorApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Posts `body` as JSON and decodes the `{success, error, ...}` envelope.
    async fn post_envelope<B, T>(&self, path: &str, body: &B) -> Result<ServiceReply<T>, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.settings.endpoint(path)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        decode_envelope(status, &bytes)
    }
}

/// Application failures arrive as `success: false` JSON, on error statuses too.
fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    bytes: &[u8],
) -> Result<ServiceReply<T>, ApiError> {
    match serde_json::from_slice::<EnvelopeHead>(bytes) {
        Ok(head) if !head.success => Ok(ServiceReply::Rejected { error: head.error }),
        Ok(_) if !status.is_success() => Err(status_error(status)),
        Ok(_) => serde_json::from_slice::<T>(bytes)
            .map(ServiceReply::Done)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string())),
        Err(_) if !status.is_success() => Err(status_error(status)),
        Err(err) => Err(ApiError::new(FailureKind::Decode, err.to_string())),
    }
}

#[async_trait::async_trait]
impl AdvisorApi for ReqwestAdvisorApi {
    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        let url = self.settings.endpoint(CHAT_PATH)?;
        let response = self
            .client
            .post(url)
            .json(&ChatRequestBody { message })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        // The backend reports application failures as JSON on error statuses too.
        match serde_json::from_slice::<ChatResponseBody>(&bytes) {
            Ok(body) if status.is_success() || !body.success => Ok(body.into_reply()),
            Ok(_) => Err(status_error(status)),
            Err(_) if !status.is_success() => Err(status_error(status)),
            Err(err) => Err(ApiError::new(FailureKind::Decode, err.to_string())),
        }
    }

    async fn current_user(&self) -> Result<Option<UserSession>, ApiError> {
        let url = self.settings.endpoint(USER_PATH)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error(status));
        }
        let body: UserResponseBody = response.json().await.map_err(map_reqwest_error)?;
        Ok(body.into_session())
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.settings.endpoint(LOGOUT_PATH)?;
        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(status_error(status))
        }
    }

    async fn predict_crop(
        &self,
        inputs: &CropInputs,
    ) -> Result<ServiceReply<Vec<CropPrediction>>, ApiError> {
        let reply = self
            .post_envelope::<_, CropResponseBody>(CROP_PATH, &CropRequestBody::from(inputs))
            .await?;
        Ok(reply.map(CropResponseBody::into_predictions))
    }

    async fn recommend_fertilizer(
        &self,
        query: &FertilizerQuery,
    ) -> Result<ServiceReply<FertilizerAdvice>, ApiError> {
        let reply = self
            .post_envelope::<_, FertilizerResponseBody>(
                FERTILIZER_PATH,
                &FertilizerRequestBody::from(query),
            )
            .await?;
        Ok(reply.map(|body| body.data.into_advice()))
    }

    async fn forecast(&self, city: &str) -> Result<ServiceReply<Forecast>, ApiError> {
        let reply = self
            .post_envelope::<_, ForecastResponseBody>(FORECAST_PATH, &CityRequestBody { city })
            .await?;
        Ok(reply.and_then(|body| body.data.into_reply()))
    }

    async fn submit_feedback(&self, form: &FeedbackForm) -> Result<ServiceReply<()>, ApiError> {
        let reply = self
            .post_envelope::<_, IgnoredAny>(FEEDBACK_PATH, &FeedbackRequestBody::from(form))
            .await?;
        Ok(reply.map(|_| ()))
    }

    async fn login(&self, form: &LoginForm) -> Result<ServiceReply<UserSession>, ApiError> {
        let reply = self
            .post_envelope::<_, AccountResponseBody>(LOGIN_PATH, &LoginRequestBody::from(form))
            .await?;
        Ok(reply.map(|body| UserSession {
            user: body.user.unwrap_or_else(|| form.username.clone()),
            role: body.role.unwrap_or_else(|| form.role.clone()),
        }))
    }

    async fn signup(&self, form: &SignupForm) -> Result<ServiceReply<String>, ApiError> {
        let reply = self
            .post_envelope::<_, AccountResponseBody>(SIGNUP_PATH, &SignupRequestBody::from(form))
            .await?;
        Ok(reply.map(|body| body.user.unwrap_or_else(|| form.username.clone())))
    }
}

fn status_error(status: StatusCode) -> ApiError {
    ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_keeps_path_prefix() {
        let settings = ClientSettings::with_base_url("http://farm.example/app");
        assert_eq!(
            settings.endpoint(CHAT_PATH).unwrap().as_str(),
            "http://farm.example/app/api/chatbot"
        );
    }

    #[test]
    fn endpoint_rejects_garbage_base() {
        let settings = ClientSettings::with_base_url("not a url");
        assert_eq!(
            settings.endpoint(CHAT_PATH).unwrap_err().kind,
            FailureKind::InvalidUrl
        );
    }

    #[test]
    fn envelope_failure_is_rejection_on_any_status() {
        let reply = decode_envelope::<IgnoredAny>(
            StatusCode::UNAUTHORIZED,
            br#"{"success":false,"error":"Invalid username or password"}"#,
        )
        .unwrap();
        assert_eq!(
            reply.map(|_| ()),
            ServiceReply::Rejected {
                error: Some("Invalid username or password".into())
            }
        );
    }

    #[test]
    fn envelope_without_json_reports_status() {
        let err = decode_envelope::<IgnoredAny>(StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert_eq!(err.kind, FailureKind::HttpStatus(502));

        let err = decode_envelope::<IgnoredAny>(StatusCode::OK, b"<html>").unwrap_err();
        assert_eq!(err.kind, FailureKind::Decode);
    }
}
