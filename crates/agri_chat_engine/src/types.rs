use std::fmt;

use agri_chat_core::{
    ChatReply, CropInputs, CropPrediction, FeedbackForm, FertilizerAdvice, FertilizerQuery,
    Forecast, ForecastDay, InstanceKind, LoginForm, RequestId, ServiceReply, SignupForm,
    UserSession,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ChatCompleted {
        instance: InstanceKind,
        request_id: RequestId,
        reply: ChatReply,
    },
    SessionChecked(Option<UserSession>),
    LoggedOut { ok: bool },
    CropPredicted(ServiceReply<Vec<CropPrediction>>),
    FertilizerAdvised {
        crop: String,
        reply: ServiceReply<FertilizerAdvice>,
    },
    ForecastFetched(ServiceReply<Forecast>),
    FeedbackSent(ServiceReply<()>),
    LoggedIn(ServiceReply<UserSession>),
    /// Carries the created username.
    SignedUp(ServiceReply<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response"),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequestBody<'a> {
    pub message: &'a str,
}

/// Body of `/api/chatbot` responses. Every field is optional on the wire.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatResponseBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatResponseBody {
    pub(crate) fn into_reply(self) -> ChatReply {
        if !self.success {
            return ChatReply::Rejected { error: self.error };
        }
        match self.response {
            Some(response) if !response.trim().is_empty() => ChatReply::Answered {
                response,
                suggestions: self.suggestions.unwrap_or_default(),
            },
            _ => ChatReply::Empty,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserResponseBody {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl UserResponseBody {
    pub(crate) fn into_session(self) -> Option<UserSession> {
        if !self.success {
            return None;
        }
        Some(UserSession {
            user: self.user?,
            role: self.role.unwrap_or_default(),
        })
    }
}

/// Fields every JSON reply of the form endpoints shares.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnvelopeHead {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CropRequestBody {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl From<&CropInputs> for CropRequestBody {
    fn from(inputs: &CropInputs) -> Self {
        Self {
            nitrogen: inputs.nitrogen,
            phosphorus: inputs.phosphorus,
            potassium: inputs.potassium,
            temperature: inputs.temperature,
            humidity: inputs.humidity,
            ph: inputs.ph,
            rainfall: inputs.rainfall,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CropResponseBody {
    #[serde(default)]
    pub predictions: Vec<PredictionBody>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PredictionBody {
    pub crop: String,
    #[serde(default)]
    pub probability: f64,
}

impl CropResponseBody {
    pub(crate) fn into_predictions(self) -> Vec<CropPrediction> {
        self.predictions
            .into_iter()
            .map(|body| CropPrediction {
                crop: body.crop,
                probability: body.probability,
            })
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FertilizerRequestBody<'a> {
    pub crop: &'a str,
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
}

impl<'a> From<&'a FertilizerQuery> for FertilizerRequestBody<'a> {
    fn from(query: &'a FertilizerQuery) -> Self {
        Self {
            crop: &query.crop,
            nitrogen: query.nitrogen,
            phosphorus: query.phosphorus,
            potassium: query.potassium,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct FertilizerResponseBody {
    #[serde(default)]
    pub data: FertilizerData,
}

/// One of three shapes: `{error}`, `{message, type: "balanced"}` or a deficiency.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct FertilizerData {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub nutrient: Option<String>,
    #[serde(default)]
    pub deficiency: Option<f64>,
    #[serde(default)]
    pub recommendation: Option<String>,
    #[serde(default)]
    pub fertilizer_type: Option<String>,
}

impl FertilizerData {
    pub(crate) fn into_advice(self) -> FertilizerAdvice {
        if let Some(error) = self.error {
            return FertilizerAdvice::Unavailable { error };
        }
        if let Some(message) = self.message {
            return FertilizerAdvice::Adequate { message };
        }
        FertilizerAdvice::Deficiency {
            nutrient: self.nutrient.unwrap_or_default(),
            deficiency: self.deficiency.unwrap_or_default(),
            recommendation: self.recommendation.unwrap_or_default(),
            fertilizer_type: self.fertilizer_type.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CityRequestBody<'a> {
    pub city: &'a str,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ForecastResponseBody {
    #[serde(default)]
    pub data: ForecastData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ForecastData {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub days: Vec<ForecastDayBody>,
}

impl ForecastData {
    /// A forecast carrying an `error` is a rejection even under `success: true`.
    pub(crate) fn into_reply(self) -> ServiceReply<Forecast> {
        if let Some(error) = self.error {
            return ServiceReply::Rejected { error: Some(error) };
        }
        ServiceReply::Done(Forecast {
            city: self.city,
            country: self.country,
            days: self.days.into_iter().map(ForecastDayBody::into_day).collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastDayBody {
    pub dt: DayStamp,
    #[serde(default)]
    pub temp_max: Option<f64>,
    #[serde(default)]
    pub temp_min: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i64>,
}

/// Forecast days arrive as `YYYY-MM-DD` or as unix seconds.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum DayStamp {
    Unix(i64),
    Text(String),
}

impl ForecastDayBody {
    fn into_day(self) -> ForecastDay {
        let date = match self.dt {
            DayStamp::Text(text) => text,
            DayStamp::Unix(seconds) => DateTime::<Utc>::from_timestamp(seconds, 0)
                .map(|stamp| stamp.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| seconds.to_string()),
        };
        ForecastDay {
            date,
            temp_max: self.temp_max,
            temp_min: self.temp_min,
            humidity: self.humidity,
            weather_code: self.weather_code,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct FeedbackRequestBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub message: &'a str,
}

impl<'a> From<&'a FeedbackForm> for FeedbackRequestBody<'a> {
    fn from(form: &'a FeedbackForm) -> Self {
        Self {
            name: &form.name,
            email: &form.email,
            message: &form.message,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequestBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

impl<'a> From<&'a LoginForm> for LoginRequestBody<'a> {
    fn from(form: &'a LoginForm) -> Self {
        Self {
            username: &form.username,
            password: &form.password,
            role: &form.role,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupRequestBody<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub role: &'a str,
    pub terms_accepted: bool,
}

impl<'a> From<&'a SignupForm> for SignupRequestBody<'a> {
    fn from(form: &'a SignupForm) -> Self {
        Self {
            first_name: &form.first_name,
            last_name: &form.last_name,
            email: &form.email,
            username: &form.username,
            password: &form.password,
            confirm_password: &form.confirm_password,
            role: &form.role,
            terms_accepted: form.terms_accepted,
        }
    }
}

/// Login and signup replies both name the account in `user`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AccountResponseBody {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChatReply {
        serde_json::from_str::<ChatResponseBody>(json)
            .unwrap()
            .into_reply()
    }

    #[test]
    fn success_with_suggestions() {
        assert_eq!(
            parse(r#"{"success":true,"response":"Plant rice","suggestions":["Soil Tips"]}"#),
            ChatReply::Answered {
                response: "Plant rice".into(),
                suggestions: vec!["Soil Tips".into()],
            }
        );
    }

    #[test]
    fn missing_suggestions_become_empty() {
        assert_eq!(
            parse(r#"{"success":true,"response":"ok"}"#),
            ChatReply::Answered {
                response: "ok".into(),
                suggestions: Vec::new(),
            }
        );
    }

    #[test]
    fn success_without_text_is_empty() {
        assert_eq!(parse(r#"{"success":true}"#), ChatReply::Empty);
        assert_eq!(parse(r#"{"success":true,"response":"  "}"#), ChatReply::Empty);
    }

    #[test]
    fn missing_success_flag_is_rejection() {
        assert_eq!(
            parse(r#"{"error":"No message provided"}"#),
            ChatReply::Rejected {
                error: Some("No message provided".into())
            }
        );
    }

    #[test]
    fn user_body_maps_to_session() {
        let body: UserResponseBody =
            serde_json::from_str(r#"{"success":true,"user":"asha","role":"admin"}"#).unwrap();
        assert_eq!(
            body.into_session(),
            Some(UserSession {
                user: "asha".into(),
                role: "admin".into()
            })
        );
        let body: UserResponseBody =
            serde_json::from_str(r#"{"success":false,"error":"Not logged in"}"#).unwrap();
        assert_eq!(body.into_session(), None);
    }

    #[test]
    fn fertilizer_shapes_map_to_advice() {
        let data = |json: &str| serde_json::from_str::<FertilizerData>(json).unwrap().into_advice();
        assert_eq!(
            data(r#"{"error":"Crop not found in database"}"#),
            FertilizerAdvice::Unavailable {
                error: "Crop not found in database".into()
            }
        );
        assert_eq!(
            data(r#"{"message":"Soil nutrients are adequate for this crop","type":"balanced"}"#),
            FertilizerAdvice::Adequate {
                message: "Soil nutrients are adequate for this crop".into()
            }
        );
        assert_eq!(
            data(
                r#"{"type":"Potassium","deficiency":7.25,"recommendation":"Add 7.25 units of Potassium fertilizer","fertilizer_type":"Potash or MOP"}"#
            ),
            FertilizerAdvice::Deficiency {
                nutrient: "Potassium".into(),
                deficiency: 7.25,
                recommendation: "Add 7.25 units of Potassium fertilizer".into(),
                fertilizer_type: "Potash or MOP".into(),
            }
        );
    }

    #[test]
    fn forecast_days_accept_text_or_unix_dates() {
        let data: ForecastData = serde_json::from_str(
            r#"{"city":"Pune","country":"IN","days":[
                {"dt":"2024-06-03","temp_max":31.0,"temp_min":22.0,"weather_code":61},
                {"dt":1717459200}
            ]}"#,
        )
        .unwrap();
        let ServiceReply::Done(forecast) = data.into_reply() else {
            panic!("expected a forecast");
        };
        assert_eq!(forecast.days[0].date, "2024-06-03");
        assert_eq!(forecast.days[1].date, "2024-06-04");
        assert_eq!(forecast.days[1].temp_max, None);
    }

    #[test]
    fn forecast_error_is_rejection() {
        let data: ForecastData = serde_json::from_str(r#"{"error":"City not found"}"#).unwrap();
        assert_eq!(
            data.into_reply(),
            ServiceReply::Rejected {
                error: Some("City not found".into())
            }
        );
    }

    #[test]
    fn signup_body_uses_camel_case() {
        let form = SignupForm {
            first_name: "Asha".into(),
            confirm_password: "harvest2024".into(),
            terms_accepted: true,
            ..SignupForm::default()
        };
        let json = serde_json::to_value(SignupRequestBody::from(&form)).unwrap();
        assert_eq!(json["firstName"], "Asha");
        assert_eq!(json["confirmPassword"], "harvest2024");
        assert_eq!(json["termsAccepted"], true);
    }
}
