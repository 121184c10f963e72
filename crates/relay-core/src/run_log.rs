//! Append-only text buffer for a single run.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Accumulated log text mirrored into the chat message.
pub struct RunLog {
    text: String,
    entries: usize,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `line` followed by a newline.
    pub fn append(&mut self, line: &str) {
        self.text.push_str(line);
        self.text.push('\n');
        self.entries = self.entries.saturating_add(1);
    }

    pub fn current_text(&self) -> &str {
        &self.text
    }

    pub fn entry_count(&self) -> usize {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
