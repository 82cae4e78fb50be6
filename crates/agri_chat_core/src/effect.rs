use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// POST `{ message }` to the chat endpoint on behalf of `instance`.
    SendChat {
        instance: crate::InstanceKind,
        request_id: crate::RequestId,
        message: String,
    },
    /// Append a completed exchange to persisted history.
    PersistExchange { exchange: crate::Exchange },
    /// Move keyboard focus to the input of `instance`.
    FocusInput { instance: crate::InstanceKind },
    /// Ask the backend who is signed in.
    CheckSession,
    /// End the backend session.
    Logout,
    /// POST the crop form to the prediction endpoint.
    PredictCrop { inputs: crate::CropInputs },
    /// Ask for fertilizer advice for one predicted crop.
    RecommendFertilizer { query: crate::FertilizerQuery },
    /// Fetch the 7-day forecast for `city`.
    FetchForecast { city: String },
    SubmitFeedback(crate::FeedbackForm),
    Login(crate::LoginForm),
    Signup(crate::SignupForm),
    /// Deliver `Msg::ToastDismissed(toast_id)` once `after` has elapsed.
    ScheduleToastDismiss {
        toast_id: crate::ToastId,
        after: Duration,
    },
}
