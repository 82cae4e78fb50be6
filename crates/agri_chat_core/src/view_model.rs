use chrono::NaiveDate;

use crate::format::{escape_text, format_message, sanitize_text, SafeMarkup};
use crate::{
    AdvisoryState, Author, ChatState, CropField, FertilizerAdvice, Forecast, ForecastDay,
    InstanceKind, Timestamp, Toast, ToastId, ToastKind, WeatherCondition,
};

pub const WELCOME_TITLE: &str = "Welcome to AgriBot!";
pub const WELCOME_INTRO: &str = "I'm your AI farming assistant. I can help you with:";
pub const WELCOME_TOPICS: [&str; 4] = [
    "Crop recommendations",
    "Fertilizer advice",
    "Weather insights",
    "Soil management tips",
];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub widget: ChatViewModel,
    pub panel: ChatViewModel,
    pub advisory: AdvisoryViewModel,
    pub logout_label: Option<String>,
    pub toasts: Vec<ToastView>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn chat(&self, instance: InstanceKind) -> &ChatViewModel {
        match instance {
            InstanceKind::Widget => &self.widget,
            InstanceKind::Panel => &self.panel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatViewModel {
    pub open: bool,
    /// Shown only while the widget transcript is empty.
    pub show_welcome: bool,
    pub entries: Vec<EntryView>,
    pub chips: Vec<ChipView>,
    pub input_text: String,
    pub send_enabled: bool,
}

impl ChatViewModel {
    pub(crate) fn from_state(state: &ChatState) -> Self {
        let mut entries: Vec<EntryView> = state
            .transcript()
            .snapshot()
            .iter()
            .map(|message| {
                EntryView::Message(MessageView {
                    author: message.author(),
                    markup: format_message(message.text()),
                    timestamp: message.timestamp(),
                    is_error: message.is_error(),
                })
            })
            .collect();
        if state.is_pending() {
            entries.push(EntryView::Busy);
        }

        let chips = state
            .suggestions()
            .items()
            .iter()
            .enumerate()
            .map(|(index, label)| ChipView {
                index,
                label: sanitize_text(label),
            })
            .collect();

        Self {
            open: state.is_open(),
            show_welcome: state.kind() == InstanceKind::Widget && state.transcript().is_empty(),
            entries,
            chips,
            input_text: state.input().raw_text().to_owned(),
            send_enabled: !state.is_pending(),
        }
    }

    pub fn busy(&self) -> bool {
        matches!(self.entries.last(), Some(EntryView::Busy))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryView {
    Message(MessageView),
    /// Bot-side placeholder while a request is in flight.
    Busy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub author: Author,
    pub markup: SafeMarkup,
    pub timestamp: Timestamp,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipView {
    pub index: usize,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub id: ToastId,
    pub kind: ToastKind,
    pub title: SafeMarkup,
    pub message: SafeMarkup,
}

impl ToastView {
    pub(crate) fn from_toast(toast: &Toast) -> Self {
        Self {
            id: toast.id,
            kind: toast.kind,
            title: escape_text(&toast.title),
            message: escape_text(&toast.message),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvisoryViewModel {
    pub crop_fields: Vec<CropFieldView>,
    pub crop_busy: bool,
    pub crop_cards: Vec<CropCardView>,
    pub fertilizer_busy: bool,
    pub fertilizer: Option<FertilizerView>,
    pub weather_busy: bool,
    pub forecast: Option<ForecastView>,
}

impl AdvisoryViewModel {
    pub(crate) fn from_state(state: &AdvisoryState) -> Self {
        let crop_fields = CropField::ALL
            .iter()
            .map(|&field| CropFieldView {
                label: field.label(),
                value: sanitize_text(state.crop_form().value(field)),
            })
            .collect();

        let crop_cards = state
            .predictions()
            .iter()
            .enumerate()
            .map(|(index, prediction)| CropCardView {
                index,
                name: capitalize(&sanitize_text(&prediction.crop)),
                recommended: index == 0,
                match_percent: format!("{:.1}%", prediction.probability * 100.0),
            })
            .collect();

        let fertilizer = state.fertilizer().map(|result| FertilizerView {
            crop: capitalize(&sanitize_text(&result.crop)),
            lines: fertilizer_lines(&result.advice),
        });

        Self {
            crop_fields,
            crop_busy: state.crop_pending(),
            crop_cards,
            fertilizer_busy: state.fertilizer_pending(),
            fertilizer,
            weather_busy: state.weather_pending(),
            forecast: state.forecast().map(ForecastView::from_forecast),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropFieldView {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropCardView {
    pub index: usize,
    pub name: String,
    /// The most probable crop is highlighted.
    pub recommended: bool,
    pub match_percent: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FertilizerView {
    pub crop: String,
    pub lines: Vec<String>,
}

fn fertilizer_lines(advice: &FertilizerAdvice) -> Vec<String> {
    match advice {
        FertilizerAdvice::Deficiency {
            nutrient,
            deficiency,
            recommendation,
            fertilizer_type,
        } => vec![
            format!("Type: {}", sanitize_text(nutrient)),
            format!("Deficiency: {deficiency} units"),
            format!("Recommendation: {}", sanitize_text(recommendation)),
            format!("Fertilizer type: {}", sanitize_text(fertilizer_type)),
        ],
        FertilizerAdvice::Adequate { message } => vec![sanitize_text(message)],
        FertilizerAdvice::Unavailable { error } => vec![sanitize_text(error)],
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastView {
    /// "City, Country", or just the city when the country is unknown.
    pub location: String,
    pub days: Vec<ForecastDayView>,
}

impl ForecastView {
    fn from_forecast(forecast: &Forecast) -> Self {
        let city = sanitize_text(&forecast.city);
        let location = if forecast.country.trim().is_empty() {
            city
        } else {
            format!("{}, {}", city, sanitize_text(&forecast.country))
        };
        Self {
            location,
            days: forecast.days.iter().map(ForecastDayView::from_day).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastDayView {
    /// Short weekday name, or the raw date when it does not parse.
    pub day: String,
    pub temperature: String,
    pub humidity: String,
    pub condition: &'static str,
}

impl ForecastDayView {
    fn from_day(day: &ForecastDay) -> Self {
        let name = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d")
            .map(|date| date.format("%a").to_string())
            .unwrap_or_else(|_| sanitize_text(&day.date));
        let temperature = match (day.temp_max, day.temp_min) {
            (Some(max), Some(min)) => format!("{max:.0}° / {min:.0}°C"),
            _ => "--".to_string(),
        };
        let humidity = day
            .humidity
            .map(|value| format!("{value:.0}%"))
            .unwrap_or_else(|| "--".to_string());
        Self {
            day: name,
            temperature,
            humidity,
            condition: WeatherCondition::from_code(day.weather_code).label(),
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
