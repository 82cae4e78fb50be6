/// Keys the input controller reacts to. Everything else arrives as text edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Submit,
    InsertNewline,
    Ignored,
}

/// Holds the draft text of one chat input box.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InputController {
    text: String,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn raw_text(&self) -> &str {
        &self.text
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Enter submits; Enter with the newline modifier held inserts a line break.
    pub fn handle_key(&mut self, key: Key, newline_modifier: bool) -> KeyOutcome {
        match (key, newline_modifier) {
            (Key::Enter, false) => KeyOutcome::Submit,
            (Key::Enter, true) => {
                self.text.push('\n');
                KeyOutcome::InsertNewline
            }
            (Key::Other, _) => KeyOutcome::Ignored,
        }
    }

    /// Takes the trimmed draft for submission and clears the field.
    ///
    /// Returns `None` and leaves the draft untouched when it is blank.
    pub fn take_submission(&mut self) -> Option<String> {
        let trimmed = self.trimmed();
        if trimmed.is_empty() {
            return None;
        }
        let submitted = trimmed.to_owned();
        self.text.clear();
        Some(submitted)
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
