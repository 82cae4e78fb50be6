use std::time::Duration;

use agri_chat_core::{
    ChatReply, CropInputs, CropPrediction, FeedbackForm, FertilizerAdvice, FertilizerQuery,
    LoginForm, ServiceReply, SignupForm, UserSession,
};
use agri_chat_engine::{AdvisorApi, ClientSettings, FailureKind, ReqwestAdvisorApi};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestAdvisorApi {
    ReqwestAdvisorApi::new(ClientSettings::with_base_url(server.uri())).expect("client")
}

#[tokio::test]
async fn chat_posts_message_and_returns_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot"))
        .and(body_json(json!({ "message": "Which crop for loam?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "response": "**Maize** grows well.",
            "suggestions": ["Fertilizer Advice", "Weather Update"],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = api_for(&server)
        .chat("Which crop for loam?")
        .await
        .expect("chat ok");

    assert_eq!(
        reply,
        ChatReply::Answered {
            response: "**Maize** grows well.".to_string(),
            suggestions: vec!["Fertilizer Advice".to_string(), "Weather Update".to_string()],
        }
    );
}

#[tokio::test]
async fn chat_maps_backend_failure_body_on_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "Chatbot service temporarily unavailable",
        })))
        .mount(&server)
        .await;

    let reply = api_for(&server).chat("hi").await.expect("body decoded");
    assert_eq!(
        reply,
        ChatReply::Rejected {
            error: Some("Chatbot service temporarily unavailable".to_string())
        }
    );
}

#[tokio::test]
async fn chat_fails_on_status_without_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = api_for(&server).chat("hi").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
}

#[tokio::test]
async fn chat_fails_on_malformed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).chat("hi").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
}

#[tokio::test]
async fn chat_times_out_on_slow_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chatbot"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "success": true, "response": "late" })),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::with_base_url(server.uri())
    };
    let api = ReqwestAdvisorApi::new(settings).expect("client");

    let err = api.chat("hi").await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn chat_reports_network_error_when_nothing_listens() {
    let settings = ClientSettings {
        connect_timeout: Duration::from_millis(200),
        ..ClientSettings::with_base_url("http://127.0.0.1:9")
    };
    let api = ReqwestAdvisorApi::new(settings).expect("client");

    let err = api.chat("hi").await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
}

#[tokio::test]
async fn current_user_reads_session_or_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": "asha",
            "role": "farmer",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "success": false, "error": "Not logged in" })),
        )
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(
        api.current_user().await.unwrap(),
        Some(UserSession {
            user: "asha".to_string(),
            role: "farmer".to_string(),
        })
    );
    assert_eq!(api.current_user().await.unwrap(), None);
}

#[tokio::test]
async fn logout_posts_and_checks_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/logout"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "message": "Logged out successfully" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    api_for(&server).logout().await.expect("logout ok");
}

#[tokio::test]
async fn crop_prediction_sends_npk_keys() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predict/crop"))
        .and(body_json(json!({
            "N": 90.0, "P": 40.0, "K": 40.0,
            "temperature": 20.5, "humidity": 80.0, "ph": 6.5, "rainfall": 200.0,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "predictions": [
                { "crop": "rice", "probability": 0.82 },
                { "crop": "jute", "probability": 0.11 },
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let inputs = CropInputs {
        nitrogen: 90.0,
        phosphorus: 40.0,
        potassium: 40.0,
        temperature: 20.5,
        humidity: 80.0,
        ph: 6.5,
        rainfall: 200.0,
    };
    let reply = api_for(&server).predict_crop(&inputs).await.expect("decoded");
    assert_eq!(
        reply,
        ServiceReply::Done(vec![
            CropPrediction {
                crop: "rice".to_string(),
                probability: 0.82,
            },
            CropPrediction {
                crop: "jute".to_string(),
                probability: 0.11,
            },
        ])
    );
}

#[tokio::test]
async fn crop_prediction_failure_carries_backend_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predict/crop"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Missing feature: ph",
        })))
        .mount(&server)
        .await;

    let inputs = CropInputs {
        nitrogen: 0.0,
        phosphorus: 0.0,
        potassium: 0.0,
        temperature: 0.0,
        humidity: 0.0,
        ph: 0.0,
        rainfall: 0.0,
    };
    let reply = api_for(&server).predict_crop(&inputs).await.expect("decoded");
    assert_eq!(
        reply,
        ServiceReply::Rejected {
            error: Some("Missing feature: ph".to_string())
        }
    );
}

#[tokio::test]
async fn fertilizer_advice_reads_data_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/predict/fertilizer"))
        .and(body_json(json!({ "crop": "rice", "N": 20.0, "P": 40.0, "K": 40.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "type": "Nitrogen",
                "deficiency": 60.0,
                "recommendation": "Add 60.0 units of Nitrogen fertilizer",
                "fertilizer_type": "Urea or Ammonium Nitrate",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = FertilizerQuery {
        crop: "rice".to_string(),
        nitrogen: 20.0,
        phosphorus: 40.0,
        potassium: 40.0,
    };
    let reply = api_for(&server)
        .recommend_fertilizer(&query)
        .await
        .expect("decoded");
    assert_eq!(
        reply,
        ServiceReply::Done(FertilizerAdvice::Deficiency {
            nutrient: "Nitrogen".to_string(),
            deficiency: 60.0,
            recommendation: "Add 60.0 units of Nitrogen fertilizer".to_string(),
            fertilizer_type: "Urea or Ammonium Nitrate".to_string(),
        })
    );
}

#[tokio::test]
async fn forecast_posts_city_and_reads_days() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/weather/forecast"))
        .and(body_json(json!({ "city": "Pune" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {
                "success": true,
                "city": "Pune",
                "country": "India",
                "days": [
                    { "dt": "2024-06-03", "temp_min": 22.1, "temp_max": 31.4,
                      "humidity": 64, "weather_code": 61 },
                ],
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let ServiceReply::Done(forecast) = api_for(&server).forecast("Pune").await.expect("decoded")
    else {
        panic!("expected a forecast");
    };
    assert_eq!(forecast.city, "Pune");
    assert_eq!(forecast.country, "India");
    assert_eq!(forecast.days.len(), 1);
    assert_eq!(forecast.days[0].date, "2024-06-03");
    assert_eq!(forecast.days[0].humidity, Some(64.0));
    assert_eq!(forecast.days[0].weather_code, Some(61));
}

#[tokio::test]
async fn forecast_unknown_city_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/weather/forecast"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "City not found",
        })))
        .mount(&server)
        .await;

    assert_eq!(
        api_for(&server).forecast("Atlantis").await.expect("decoded"),
        ServiceReply::Rejected {
            error: Some("City not found".to_string())
        }
    );
}

#[tokio::test]
async fn feedback_posts_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/feedback"))
        .and(body_json(json!({
            "name": "Ravi",
            "email": "ravi@example.com",
            "message": "Great advice",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Feedback submitted successfully",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let form = FeedbackForm {
        name: "Ravi".to_string(),
        email: "ravi@example.com".to_string(),
        message: "Great advice".to_string(),
    };
    assert_eq!(
        api_for(&server).submit_feedback(&form).await.expect("decoded"),
        ServiceReply::Done(())
    );
}

#[tokio::test]
async fn login_returns_session_or_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({
            "username": "ravi", "password": "farmer123", "role": "farmer",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "user": "ravi",
            "role": "farmer",
            "message": "Login successful",
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "error": "Invalid username or password",
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let mut form = LoginForm {
        username: "ravi".to_string(),
        password: "farmer123".to_string(),
        role: "farmer".to_string(),
    };
    assert_eq!(
        api.login(&form).await.expect("decoded"),
        ServiceReply::Done(UserSession {
            user: "ravi".to_string(),
            role: "farmer".to_string(),
        })
    );

    form.password = "wrong-password".to_string();
    assert_eq!(
        api.login(&form).await.expect("decoded"),
        ServiceReply::Rejected {
            error: Some("Invalid username or password".to_string())
        }
    );
}

#[tokio::test]
async fn signup_sends_camel_case_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/signup"))
        .and(body_json(json!({
            "firstName": "Asha",
            "lastName": "Rao",
            "email": "asha@example.com",
            "username": "asha",
            "password": "harvest2024",
            "confirmPassword": "harvest2024",
            "role": "officer",
            "termsAccepted": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Account created successfully",
            "user": "asha",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let form = SignupForm {
        first_name: "Asha".to_string(),
        last_name: "Rao".to_string(),
        email: "asha@example.com".to_string(),
        username: "asha".to_string(),
        password: "harvest2024".to_string(),
        confirm_password: "harvest2024".to_string(),
        role: "officer".to_string(),
        terms_accepted: true,
    };
    assert_eq!(
        api_for(&server).signup(&form).await.expect("decoded"),
        ServiceReply::Done("asha".to_string())
    );
}
