use serde::Serialize;

/// Ordered, append-only record of the edits applied to one document.
///
/// Entries are never deduplicated: two identical fixes on two nodes log twice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ChangeLog {
    entries: Vec<String>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }

    pub fn joined(&self, separator: &str) -> String {
        self.entries.join(separator)
    }
}

impl From<ChangeLog> for Vec<String> {
    fn from(log: ChangeLog) -> Self {
        log.entries
    }
}
