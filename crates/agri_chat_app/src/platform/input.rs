//! Translates terminal lines into host commands.
//!
//! Enter submits the line. A trailing backslash stands in for Shift+Enter and
//! continues the draft on a new line instead.

use agri_chat_core::{FeedbackForm, LoginForm, SignupForm};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCommand {
    /// Text typed into the active chat input.
    Type { text: String, newline: bool },
    /// Make the floating widget the active instance.
    FocusWidget,
    /// Make the in-page panel the active instance.
    FocusPanel,
    /// Show or hide the floating widget.
    ToggleWidget,
    /// Activate suggestion chip `index` (zero based) of the active instance.
    Chip(usize),
    /// Fill the crop form with demo measurements.
    Sample,
    /// Submit the crop form, first replacing all seven fields when given.
    Crop(Option<[String; 7]>),
    /// Fertilizer advice for crop card `index` (zero based).
    Fertilizer(usize),
    Weather(String),
    Feedback(FeedbackForm),
    Login(LoginForm),
    Signup(SignupForm),
    Logout,
    Help,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "\
Commands:
  /widget        chat in the floating widget (keeps history)
  /panel         chat in the in-page panel
  /toggle        show or hide the widget
  /chip N        send suggestion N
  /sample        fill the crop form with sample data
  /crop [N P K TEMP HUMIDITY PH RAIN]
                 recommend crops for the form or the given values
  /fert N        fertilizer advice for crop card N
  /weather CITY  7-day forecast
  /feedback NAME | EMAIL | MESSAGE
  /login USER PASSWORD ROLE
  /signup FIRST LAST EMAIL USER PASSWORD CONFIRM ROLE [accept]
                 roles: farmer, officer, normal_user
  /logout        end the session
  /quit          exit
End a line with \\ to continue the message on a new line.";

pub fn parse_line(line: &str) -> HostCommand {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if let Some(command) = line.strip_prefix('/') {
        return parse_command(command).unwrap_or_else(|| HostCommand::Unknown(line.to_string()));
    }
    match line.strip_suffix('\\') {
        Some(text) => HostCommand::Type {
            text: text.to_string(),
            newline: true,
        },
        None => HostCommand::Type {
            text: line.to_string(),
            newline: false,
        },
    }
}

fn parse_command(command: &str) -> Option<HostCommand> {
    let (name, rest) = match command.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (command, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();
    let owned = |args: &[&str]| args.iter().map(|arg| arg.to_string()).collect::<Vec<_>>();
    let command = match (name, args.as_slice()) {
        ("widget", []) => HostCommand::FocusWidget,
        ("panel", []) => HostCommand::FocusPanel,
        ("toggle", []) => HostCommand::ToggleWidget,
        ("chip", [n]) => HostCommand::Chip(card_index(n)?),
        ("sample", []) => HostCommand::Sample,
        ("crop", []) => HostCommand::Crop(None),
        ("crop", values) => HostCommand::Crop(Some(owned(values).try_into().ok()?)),
        ("fert", [n]) => HostCommand::Fertilizer(card_index(n)?),
        ("weather", _) => HostCommand::Weather(rest.to_string()),
        ("feedback", _) => {
            let fields: Vec<&str> = rest.splitn(3, '|').map(str::trim).collect();
            let [name, email, message] = fields.as_slice() else {
                return None;
            };
            HostCommand::Feedback(FeedbackForm {
                name: name.to_string(),
                email: email.to_string(),
                message: message.to_string(),
            })
        }
        ("login", [username, password, role]) => HostCommand::Login(LoginForm {
            username: username.to_string(),
            password: password.to_string(),
            role: role.to_string(),
        }),
        ("signup", [first, last, email, username, password, confirm, role, accept @ ..])
            if accept.len() <= 1 =>
        {
            HostCommand::Signup(SignupForm {
                first_name: first.to_string(),
                last_name: last.to_string(),
                email: email.to_string(),
                username: username.to_string(),
                password: password.to_string(),
                confirm_password: confirm.to_string(),
                role: role.to_string(),
                terms_accepted: accept == ["accept"],
            })
        }
        ("logout", []) => HostCommand::Logout,
        ("help", []) => HostCommand::Help,
        ("quit" | "exit", []) => HostCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// One-based card number to a zero-based index.
fn card_index(n: &str) -> Option<usize> {
    n.parse::<usize>().ok()?.checked_sub(1)
}
