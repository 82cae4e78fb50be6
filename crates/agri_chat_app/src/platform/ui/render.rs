use std::collections::BTreeSet;

use agri_chat_core::{
    AdvisoryViewModel, AppViewModel, Author, ChatViewModel, ChipView, EntryView, InstanceKind,
    MessageView, ToastId, ToastKind, ToastView, WELCOME_INTRO, WELCOME_TITLE, WELCOME_TOPICS,
};
use chrono::Local;

use super::constants::*;

/// What has already been printed for one chat instance.
#[derive(Debug, Default)]
struct InstanceCursor {
    entries_shown: usize,
    busy_shown: bool,
    welcome_shown: bool,
    chips_shown: Vec<ChipView>,
}

/// Tracks printed output so each render only emits what changed.
#[derive(Debug, Default)]
pub struct RenderCursor {
    widget: InstanceCursor,
    panel: InstanceCursor,
    advisory: AdvisoryViewModel,
    toasts_shown: BTreeSet<ToastId>,
    logout_label: Option<String>,
}

impl RenderCursor {
    fn instance(&mut self, instance: InstanceKind) -> &mut InstanceCursor {
        match instance {
            InstanceKind::Widget => &mut self.widget,
            InstanceKind::Panel => &mut self.panel,
        }
    }
}

pub fn render(view: &AppViewModel, cursor: &mut RenderCursor) -> Vec<String> {
    let mut lines = Vec::new();

    if view.logout_label != cursor.logout_label {
        if let Some(label) = &view.logout_label {
            lines.push(format!("{ANSI_DIM}[{label}]{ANSI_RESET}"));
        }
        cursor.logout_label = view.logout_label.clone();
    }

    for instance in [InstanceKind::Panel, InstanceKind::Widget] {
        render_chat(
            instance,
            view.chat(instance),
            cursor.instance(instance),
            &mut lines,
        );
    }

    render_advisory(&view.advisory, &mut cursor.advisory, &mut lines);

    for toast in &view.toasts {
        if cursor.toasts_shown.insert(toast.id) {
            lines.push(format_toast(toast));
        }
    }
    cursor
        .toasts_shown
        .retain(|id| view.toasts.iter().any(|toast| toast.id == *id));

    lines
}

fn render_chat(
    instance: InstanceKind,
    chat: &ChatViewModel,
    cursor: &mut InstanceCursor,
    lines: &mut Vec<String>,
) {
    // A hidden widget keeps its output until it is opened again.
    if !chat.open {
        return;
    }
    let tag = format!("{ANSI_DIM}[{}]{ANSI_RESET}", instance.label());

    if chat.show_welcome && !cursor.welcome_shown {
        lines.push(format!("{tag} {ANSI_GREEN}{WELCOME_TITLE}{ANSI_RESET}"));
        lines.push(format!("{tag} {WELCOME_INTRO}"));
        for topic in WELCOME_TOPICS {
            lines.push(format!("{tag} {INDENT}• {topic}"));
        }
        cursor.welcome_shown = true;
    }

    let messages: Vec<&MessageView> = chat
        .entries
        .iter()
        .filter_map(|entry| match entry {
            EntryView::Message(message) => Some(message),
            EntryView::Busy => None,
        })
        .collect();
    // Entries only ever grow, but a fresh view can never be shorter than what was shown.
    let start = cursor.entries_shown.min(messages.len());
    for message in &messages[start..] {
        lines.push(format!("{tag} {}", format_message_line(instance, message)));
    }
    cursor.entries_shown = messages.len();

    let busy = chat.busy();
    if busy && !cursor.busy_shown {
        lines.push(format!(
            "{tag} {ANSI_DIM}{} {BUSY_TEXT}{ANSI_RESET}",
            bot_name(instance)
        ));
    }
    cursor.busy_shown = busy;

    if chat.chips != cursor.chips_shown {
        if !chat.chips.is_empty() {
            let chips: Vec<String> = chat
                .chips
                .iter()
                .map(|chip| format!("[{}] {}", chip.index + 1, chip.label))
                .collect();
            lines.push(format!("{tag} {ANSI_CYAN}{}{ANSI_RESET}", chips.join("  ")));
        }
        cursor.chips_shown = chat.chips.clone();
    }
}

/// Prints each advisory section again whenever it changed since last shown.
fn render_advisory(
    view: &AdvisoryViewModel,
    shown: &mut AdvisoryViewModel,
    lines: &mut Vec<String>,
) {
    let crop = format!("{ANSI_DIM}{CROP_TAG}{ANSI_RESET}");
    let form_filled = view.crop_fields.iter().any(|field| !field.value.is_empty());
    if view.crop_fields != shown.crop_fields && form_filled {
        let fields: Vec<String> = view
            .crop_fields
            .iter()
            .map(|field| format!("{}={}", field.label, field.value))
            .collect();
        lines.push(format!("{crop} {}", fields.join("  ")));
    }
    if view.crop_busy && !shown.crop_busy {
        lines.push(format!("{crop} {ANSI_DIM}{CROP_BUSY_TEXT}{ANSI_RESET}"));
    }
    if view.crop_cards != shown.crop_cards {
        for card in &view.crop_cards {
            let star = if card.recommended { " (recommended)" } else { "" };
            lines.push(format!(
                "{crop} [{}] {ANSI_BOLD}{}{ANSI_BOLD_OFF} {} match{star}",
                card.index + 1,
                card.name,
                card.match_percent
            ));
        }
    }

    let fertilizer = format!("{ANSI_DIM}{FERTILIZER_TAG}{ANSI_RESET}");
    if view.fertilizer_busy && !shown.fertilizer_busy {
        lines.push(format!("{fertilizer} {ANSI_DIM}{FERTILIZER_BUSY_TEXT}{ANSI_RESET}"));
    }
    if view.fertilizer != shown.fertilizer {
        if let Some(result) = &view.fertilizer {
            lines.push(format!(
                "{fertilizer} {ANSI_BOLD}Fertilizer Recommendation for {}{ANSI_BOLD_OFF}",
                result.crop
            ));
            for line in &result.lines {
                lines.push(format!("{fertilizer} {INDENT}{line}"));
            }
        }
    }

    let weather = format!("{ANSI_DIM}{WEATHER_TAG}{ANSI_RESET}");
    if view.weather_busy && !shown.weather_busy {
        lines.push(format!("{weather} {ANSI_DIM}{WEATHER_BUSY_TEXT}{ANSI_RESET}"));
    }
    if view.forecast != shown.forecast {
        if let Some(forecast) = &view.forecast {
            lines.push(format!(
                "{weather} {ANSI_BOLD}7-Day Forecast for {}{ANSI_BOLD_OFF}",
                forecast.location
            ));
            for day in &forecast.days {
                lines.push(format!(
                    "{weather} {INDENT}{}  {}  humidity {}  {}",
                    day.day, day.temperature, day.humidity, day.condition
                ));
            }
        }
    }

    *shown = view.clone();
}

fn bot_name(instance: InstanceKind) -> &'static str {
    match instance {
        InstanceKind::Widget => WIDGET_BOT_NAME,
        InstanceKind::Panel => PANEL_BOT_NAME,
    }
}

fn format_message_line(instance: InstanceKind, message: &MessageView) -> String {
    let name = match message.author {
        Author::User => USER_NAME,
        Author::Bot => bot_name(instance),
    };
    let time = message
        .timestamp
        .with_timezone(&Local)
        .format("%-I:%M %p");
    let body = markup_to_terminal(message.markup.as_str());
    if message.is_error {
        format!("{ANSI_RED}{name} ({time}): {body}{ANSI_RESET}")
    } else {
        format!("{ANSI_BOLD}{name}{ANSI_BOLD_OFF} ({time}): {body}")
    }
}

fn format_toast(toast: &ToastView) -> String {
    let color = match toast.kind {
        ToastKind::Success => ANSI_GREEN,
        ToastKind::Danger => ANSI_RED,
    };
    format!(
        "{color}** {}: {}{ANSI_RESET}",
        markup_to_terminal(toast.title.as_str()),
        markup_to_terminal(toast.message.as_str())
    )
}

/// Maps the whitelisted chat markup to terminal styling and unescapes text.
pub fn markup_to_terminal(markup: &str) -> String {
    let line_break = format!("\n{INDENT}");
    let item = format!("\n{INDENT}• ");
    let styled = markup
        .replace("<br><ul>", "<ul>")
        .replace("<strong>", ANSI_BOLD)
        .replace("</strong>", ANSI_BOLD_OFF)
        .replace("<em>", ANSI_ITALIC)
        .replace("</em>", ANSI_ITALIC_OFF)
        .replace("<br>", &line_break)
        .replace("<ul>", "")
        .replace("</ul>", &line_break)
        .replace("<li>", &item)
        .replace("</li>", "");
    let styled = styled.strip_suffix(line_break.as_str()).unwrap_or(&styled);
    unescape(styled)
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
