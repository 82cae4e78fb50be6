//! Lightweight markup for chat messages.
//!
//! Message text comes straight from the network and is untrusted. Every
//! character is escaped first; only the whitelisted constructs below are
//! turned into markup afterwards:
//!
//! 1. `**x**` becomes `<strong>x</strong>`
//! 2. `*x*` becomes `<em>x</em>`
//! 3. a newline becomes `<br>`
//! 4. a line starting with `•` or `-` followed by whitespace becomes `<li>`,
//!    and each consecutive run of items is wrapped in one `<ul>`.
//!
//! Because escaping happens first, formatting already formatted output turns
//! the earlier tags into literal text. No element is ever wrapped twice.
//!
//! Control characters other than newline never survive: a tab becomes a space
//! and everything else (ESC, BEL, C1 codes, lone carriage returns) becomes
//! U+FFFD, so terminal escape sequences are shown rather than executed.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

const BULLET_MARKERS: [char; 2] = ['•', '-'];
const REPLACEMENT: char = '\u{FFFD}';

static BOLD_REGEX: OnceLock<Regex> = OnceLock::new();
static ITALIC_REGEX: OnceLock<Regex> = OnceLock::new();

fn bold_regex() -> &'static Regex {
    BOLD_REGEX.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold pattern compiles"))
}

fn italic_regex() -> &'static Regex {
    ITALIC_REGEX.get_or_init(|| Regex::new(r"\*(.+?)\*").expect("italic pattern compiles"))
}

/// Display markup that is safe to inject into a host document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Replaces control characters so untrusted text cannot drive the display.
pub fn sanitize_text(raw: &str) -> String {
    raw.chars().map(sanitize_char).collect()
}

fn sanitize_char(ch: char) -> char {
    match ch {
        '\n' => ch,
        '\t' => ' ',
        _ if ch.is_control() => REPLACEMENT,
        _ => ch,
    }
}

/// Escapes text so it is always displayed literally.
pub fn escape_text(raw: &str) -> SafeMarkup {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars().map(sanitize_char) {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    SafeMarkup(out)
}

/// Converts raw message text into safe display markup.
pub fn format_message(raw: &str) -> SafeMarkup {
    let normalized = raw.replace("\r\n", "\n");
    let escaped = escape_text(&normalized).into_string();
    let bold = bold_regex().replace_all(&escaped, "<strong>$1</strong>");
    let emphasized = italic_regex().replace_all(&bold, "<em>$1</em>");
    SafeMarkup(layout_lines(&emphasized))
}

fn layout_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut list_open = false;

    for (index, line) in text.split('\n').enumerate() {
        // A closed list is a block of its own and needs no break after it.
        if index > 0 && !list_open {
            out.push_str("<br>");
        }
        match bullet_item(line) {
            Some(item) => {
                if !list_open {
                    out.push_str("<ul>");
                    list_open = true;
                }
                out.push_str("<li>");
                out.push_str(item);
                out.push_str("</li>");
            }
            None => {
                if list_open {
                    out.push_str("</ul>");
                    list_open = false;
                }
                out.push_str(line);
            }
        }
    }
    if list_open {
        out.push_str("</ul>");
    }
    out
}

fn bullet_item(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let rest = trimmed.strip_prefix(&BULLET_MARKERS[..])?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let item = rest.trim();
    (!item.is_empty()).then_some(item)
}
