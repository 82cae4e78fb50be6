/// Follow-up prompts offered after the latest bot answer.
///
/// The set is replaced wholesale on every answer and never merged. Items are
/// kept exactly as the backend sent them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SuggestionSet {
    items: Vec<String>,
}

impl SuggestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, items: Vec<String>) {
        self.items = items;
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_keeps_items_verbatim() {
        let mut set = SuggestionSet::new();
        set.replace(vec!["old".into()]);
        set.replace(vec!["  Soil Tips ".into(), String::new(), "Rain".into()]);
        assert_eq!(set.items(), ["  Soil Tips ", "", "Rain"]);
        assert_eq!(set.get(0), Some("  Soil Tips "));
    }
}
