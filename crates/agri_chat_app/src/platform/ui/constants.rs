pub const WIDGET_BOT_NAME: &str = "AgriBot";
pub const PANEL_BOT_NAME: &str = "Smart Farmer";
pub const USER_NAME: &str = "You";
pub const BUSY_TEXT: &str = "is typing...";
pub const PROMPT: &str = "> ";

pub const CROP_TAG: &str = "[crop]";
pub const FERTILIZER_TAG: &str = "[fertilizer]";
pub const WEATHER_TAG: &str = "[weather]";
pub const CROP_BUSY_TEXT: &str = "Analyzing soil...";
pub const FERTILIZER_BUSY_TEXT: &str = "Checking nutrients...";
pub const WEATHER_BUSY_TEXT: &str = "Fetching forecast...";

pub const INDENT: &str = "    ";

pub const ANSI_BOLD: &str = "\x1b[1m";
pub const ANSI_BOLD_OFF: &str = "\x1b[22m";
pub const ANSI_ITALIC: &str = "\x1b[3m";
pub const ANSI_ITALIC_OFF: &str = "\x1b[23m";
pub const ANSI_RED: &str = "\x1b[31m";
pub const ANSI_GREEN: &str = "\x1b[32m";
pub const ANSI_CYAN: &str = "\x1b[36m";
pub const ANSI_DIM: &str = "\x1b[2m";
pub const ANSI_RESET: &str = "\x1b[0m";
