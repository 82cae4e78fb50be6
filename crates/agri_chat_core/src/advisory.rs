//! Crop recommendation, fertilizer advice and weather forecast panels.

use agri_logging::{agri_debug, agri_info, agri_warn};

use crate::{Effect, Notice, ServiceReply};

const CROP_TITLE: &str = "Crop Recommendation";
const CROP_FALLBACK: &str = "Failed to get crop recommendation. Please try again.";
const FERTILIZER_TITLE: &str = "Fertilizer Recommendation";
const FERTILIZER_FALLBACK: &str = "Failed to get fertilizer recommendation.";
const FERTILIZER_NEEDS_CROP: &str = "Please get a crop recommendation first.";
const WEATHER_TITLE: &str = "Weather Information";
const WEATHER_FALLBACK: &str = "Failed to get weather data. Please try again.";
const WEATHER_NEEDS_CITY: &str = "City name is required";

/// Soil and climate measurements of the crop form, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CropField {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
}

impl CropField {
    pub const ALL: [CropField; 7] = [
        CropField::Nitrogen,
        CropField::Phosphorus,
        CropField::Potassium,
        CropField::Temperature,
        CropField::Humidity,
        CropField::Ph,
        CropField::Rainfall,
    ];

    pub fn label(self) -> &'static str {
        match self {
            CropField::Nitrogen => "Nitrogen (N)",
            CropField::Phosphorus => "Phosphorus (P)",
            CropField::Potassium => "Potassium (K)",
            CropField::Temperature => "Temperature (°C)",
            CropField::Humidity => "Humidity (%)",
            CropField::Ph => "pH",
            CropField::Rainfall => "Rainfall (mm)",
        }
    }

    fn sample(self) -> &'static str {
        match self {
            CropField::Nitrogen => "90",
            CropField::Phosphorus => "40",
            CropField::Potassium => "40",
            CropField::Temperature => "20.5",
            CropField::Humidity => "80",
            CropField::Ph => "6.5",
            CropField::Rainfall => "200",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Parsed crop form, the body of `/api/predict/crop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropInputs {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

/// Draft values of the crop form as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CropForm {
    values: [String; 7],
}

impl CropForm {
    pub fn value(&self, field: CropField) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: CropField, value: impl Into<String>) {
        self.values[field.index()] = value.into();
    }

    pub fn fill_sample(&mut self) {
        for field in CropField::ALL {
            self.set(field, field.sample());
        }
    }

    /// Parses every field, reporting the first one that is not a finite number.
    pub fn parse(&self) -> Result<CropInputs, CropField> {
        let read = |field: CropField| {
            self.value(field)
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or(field)
        };
        Ok(CropInputs {
            nitrogen: read(CropField::Nitrogen)?,
            phosphorus: read(CropField::Phosphorus)?,
            potassium: read(CropField::Potassium)?,
            temperature: read(CropField::Temperature)?,
            humidity: read(CropField::Humidity)?,
            ph: read(CropField::Ph)?,
            rainfall: read(CropField::Rainfall)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CropPrediction {
    pub crop: String,
    /// Model confidence in `0.0..=1.0`.
    pub probability: f64,
}

/// Body of `/api/predict/fertilizer`: a crop plus the N/P/K of the analysed soil.
#[derive(Debug, Clone, PartialEq)]
pub struct FertilizerQuery {
    pub crop: String,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub potassium: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FertilizerAdvice {
    /// The most deficient nutrient and how to correct it.
    Deficiency {
        nutrient: String,
        deficiency: f64,
        recommendation: String,
        fertilizer_type: String,
    },
    /// Soil already meets the crop's needs.
    Adequate { message: String },
    /// The backend has no data for this crop.
    Unavailable { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FertilizerResult {
    pub crop: String,
    pub advice: FertilizerAdvice,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub city: String,
    pub country: String,
    pub days: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    /// Calendar date as `YYYY-MM-DD`.
    pub date: String,
    pub temp_max: Option<f64>,
    pub temp_min: Option<f64>,
    pub humidity: Option<f64>,
    /// WMO weather interpretation code.
    pub weather_code: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherCondition {
    Clear,
    PartlyCloudy,
    Fog,
    Drizzle,
    Rain,
    Snow,
    Thunderstorm,
}

impl WeatherCondition {
    /// Maps a WMO code; unknown or missing codes read as partly cloudy.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(0) => WeatherCondition::Clear,
            Some(1..=3) => WeatherCondition::PartlyCloudy,
            Some(45 | 48) => WeatherCondition::Fog,
            Some(51..=57) => WeatherCondition::Drizzle,
            Some(61..=67 | 80..=82) => WeatherCondition::Rain,
            Some(71..=77) => WeatherCondition::Snow,
            Some(95..=99) => WeatherCondition::Thunderstorm,
            _ => WeatherCondition::PartlyCloudy,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::PartlyCloudy => "partly cloudy",
            WeatherCondition::Fog => "fog",
            WeatherCondition::Drizzle => "drizzle",
            WeatherCondition::Rain => "rain",
            WeatherCondition::Snow => "snow",
            WeatherCondition::Thunderstorm => "thunderstorm",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvisoryMsg {
    CropFieldChanged { field: CropField, value: String },
    /// Fill the crop form with the demo measurements.
    SampleDataFilled,
    CropSubmitted,
    CropPredicted(ServiceReply<Vec<CropPrediction>>),
    /// User picked the crop card at `index` to get fertilizer advice.
    FertilizerRequested(usize),
    FertilizerAdvised {
        crop: String,
        reply: ServiceReply<FertilizerAdvice>,
    },
    ForecastRequested(String),
    ForecastFetched(ServiceReply<Forecast>),
}

/// Effects and toasts produced by one advisory or account transition.
#[derive(Debug, Default)]
pub(crate) struct Outcome {
    pub effects: Vec<Effect>,
    pub notices: Vec<Notice>,
}

impl Outcome {
    pub(crate) fn effect(effect: Effect) -> Self {
        Self {
            effects: vec![effect],
            notices: Vec::new(),
        }
    }

    pub(crate) fn notice(notice: Notice) -> Self {
        Self {
            effects: Vec::new(),
            notices: vec![notice],
        }
    }
}

/// State of the crop, fertilizer and weather panels.
///
/// Each panel allows one request in flight; further submits are dropped until
/// the reply arrives.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AdvisoryState {
    crop_form: CropForm,
    crop_pending: Option<CropInputs>,
    predictions: Vec<CropPrediction>,
    /// Measurements behind the current predictions, reused for fertilizer queries.
    analysed: Option<CropInputs>,
    fertilizer_pending: bool,
    fertilizer: Option<FertilizerResult>,
    weather_pending: bool,
    forecast: Option<Forecast>,
    dirty: bool,
}

impl AdvisoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crop_form(&self) -> &CropForm {
        &self.crop_form
    }

    pub fn crop_pending(&self) -> bool {
        self.crop_pending.is_some()
    }

    pub fn predictions(&self) -> &[CropPrediction] {
        &self.predictions
    }

    pub fn fertilizer_pending(&self) -> bool {
        self.fertilizer_pending
    }

    pub fn fertilizer(&self) -> Option<&FertilizerResult> {
        self.fertilizer.as_ref()
    }

    pub fn weather_pending(&self) -> bool {
        self.weather_pending
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn apply(&mut self, event: AdvisoryMsg) -> Outcome {
        match event {
            AdvisoryMsg::CropFieldChanged { field, value } => {
                self.crop_form.set(field, value);
                self.dirty = true;
                Outcome::default()
            }
            AdvisoryMsg::SampleDataFilled => {
                self.crop_form.fill_sample();
                self.dirty = true;
                Outcome::default()
            }
            AdvisoryMsg::CropSubmitted => self.submit_crop(),
            AdvisoryMsg::CropPredicted(reply) => self.crop_predicted(reply),
            AdvisoryMsg::FertilizerRequested(index) => self.request_fertilizer(index),
            AdvisoryMsg::FertilizerAdvised { crop, reply } => self.fertilizer_advised(crop, reply),
            AdvisoryMsg::ForecastRequested(city) => self.request_forecast(&city),
            AdvisoryMsg::ForecastFetched(reply) => self.forecast_fetched(reply),
        }
    }

    fn submit_crop(&mut self) -> Outcome {
        if self.crop_pending() {
            agri_debug!("crop form submit ignored while a prediction is pending");
            return Outcome::default();
        }
        match self.crop_form.parse() {
            Ok(inputs) => {
                self.crop_pending = Some(inputs);
                self.dirty = true;
                agri_info!("crop prediction requested");
                Outcome::effect(Effect::PredictCrop { inputs })
            }
            Err(field) => Outcome::notice(Notice::danger(
                CROP_TITLE,
                format!("Please enter a number for {}.", field.label()),
            )),
        }
    }

    fn crop_predicted(&mut self, reply: ServiceReply<Vec<CropPrediction>>) -> Outcome {
        let Some(inputs) = self.crop_pending.take() else {
            agri_warn!("dropping crop prediction nobody asked for");
            return Outcome::default();
        };
        self.dirty = true;
        agri_info!("crop prediction completed ({})", reply.kind_label());
        match reply {
            ServiceReply::Done(predictions) => {
                self.predictions = predictions;
                self.analysed = Some(inputs);
                Outcome::default()
            }
            ServiceReply::Rejected { error } => {
                Outcome::notice(Notice::rejected(CROP_TITLE, error, CROP_FALLBACK))
            }
            ServiceReply::Transport { reason } => {
                agri_warn!("crop prediction failed: {}", reason);
                Outcome::notice(Notice::danger(CROP_TITLE, CROP_FALLBACK))
            }
        }
    }

    fn request_fertilizer(&mut self, index: usize) -> Outcome {
        let Some(inputs) = self.analysed else {
            return Outcome::notice(Notice::danger(FERTILIZER_TITLE, FERTILIZER_NEEDS_CROP));
        };
        if self.fertilizer_pending {
            agri_debug!("fertilizer request ignored while another is pending");
            return Outcome::default();
        }
        let Some(prediction) = self.predictions.get(index) else {
            agri_warn!("no crop card at index {}", index);
            return Outcome::default();
        };
        self.fertilizer_pending = true;
        self.dirty = true;
        Outcome::effect(Effect::RecommendFertilizer {
            query: FertilizerQuery {
                crop: prediction.crop.clone(),
                nitrogen: inputs.nitrogen,
                phosphorus: inputs.phosphorus,
                potassium: inputs.potassium,
            },
        })
    }

    fn fertilizer_advised(
        &mut self,
        crop: String,
        reply: ServiceReply<FertilizerAdvice>,
    ) -> Outcome {
        self.fertilizer_pending = false;
        self.dirty = true;
        match reply {
            ServiceReply::Done(advice) => {
                self.fertilizer = Some(FertilizerResult { crop, advice });
                Outcome::default()
            }
            ServiceReply::Rejected { error } => {
                Outcome::notice(Notice::rejected(FERTILIZER_TITLE, error, FERTILIZER_FALLBACK))
            }
            ServiceReply::Transport { reason } => {
                agri_warn!("fertilizer request for {} failed: {}", crop, reason);
                Outcome::notice(Notice::danger(FERTILIZER_TITLE, FERTILIZER_FALLBACK))
            }
        }
    }

    fn request_forecast(&mut self, city: &str) -> Outcome {
        if self.weather_pending {
            agri_debug!("forecast request ignored while another is pending");
            return Outcome::default();
        }
        let city = city.trim();
        if city.is_empty() {
            return Outcome::notice(Notice::danger(WEATHER_TITLE, WEATHER_NEEDS_CITY));
        }
        self.weather_pending = true;
        self.dirty = true;
        Outcome::effect(Effect::FetchForecast {
            city: city.to_string(),
        })
    }

    fn forecast_fetched(&mut self, reply: ServiceReply<Forecast>) -> Outcome {
        self.weather_pending = false;
        self.dirty = true;
        match reply {
            ServiceReply::Done(forecast) => {
                self.forecast = Some(forecast);
                Outcome::default()
            }
            ServiceReply::Rejected { error } => {
                Outcome::notice(Notice::rejected(WEATHER_TITLE, error, WEATHER_FALLBACK))
            }
            ServiceReply::Transport { reason } => {
                agri_warn!("forecast request failed: {}", reason);
                Outcome::notice(Notice::danger(WEATHER_TITLE, WEATHER_FALLBACK))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn sample_fill_parses_to_demo_measurements() {
        let mut form = CropForm::default();
        form.fill_sample();
        assert_eq!(
            form.parse(),
            Ok(CropInputs {
                nitrogen: 90.0,
                phosphorus: 40.0,
                potassium: 40.0,
                temperature: 20.5,
                humidity: 80.0,
                ph: 6.5,
                rainfall: 200.0,
            })
        );
    }

    #[test]
    fn parse_reports_first_bad_field() {
        let mut form = CropForm::default();
        form.fill_sample();
        form.set(CropField::Ph, "acidic");
        form.set(CropField::Rainfall, "");
        assert_eq!(form.parse(), Err(CropField::Ph));

        form.set(CropField::Ph, " 7 ");
        form.set(CropField::Rainfall, "NaN");
        assert_eq!(form.parse(), Err(CropField::Rainfall));
    }

    #[test]
    fn weather_codes_map_to_conditions() {
        assert_eq!(WeatherCondition::from_code(Some(0)), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::from_code(Some(48)), WeatherCondition::Fog);
        assert_eq!(WeatherCondition::from_code(Some(81)), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::from_code(Some(96)), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::from_code(Some(42)), WeatherCondition::PartlyCloudy);
        assert_eq!(WeatherCondition::from_code(None), WeatherCondition::PartlyCloudy);
    }
}
