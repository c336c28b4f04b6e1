use crate::task::Task;

/// Case-insensitive substring matcher for task fields.
#[derive(Debug, Clone)]
pub struct TextMatcher {
    needle: String,
}

impl TextMatcher {
    /// Lowercase a query string into a matcher. Returns `None` for an empty query.
    ///
    /// Whitespace is part of the query.
    #[must_use]
    pub fn new(query: &str) -> Option<Self> {
        if query.is_empty() {
            return None;
        }
        Some(Self {
            needle: query.to_lowercase(),
        })
    }

    /// Determine whether the title, description or any tag contains the query.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_field(&task.text)
            || task
                .description
                .as_deref()
                .is_some_and(|description| self.matches_field(description))
            || task.tags.iter().any(|tag| self.matches_field(tag))
    }

    fn matches_field(&self, value: &str) -> bool {
        value.to_lowercase().contains(&self.needle)
    }
}
