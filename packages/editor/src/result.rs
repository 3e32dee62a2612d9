use mentor_common::ChangeLog;
use serde::{Deserialize, Serialize};

/// Outcome of processing one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformResult {
    /// `None` when no processor exists for the language
    pub enhanced_code: Option<String>,

    /// One entry per applied change, in application order
    pub changes_log: Vec<String>,
}

/// What the host should do with a document after processing it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveAction {
    Unsupported,
    Unchanged,
    /// Replace the whole document; `summary` lists the changes
    Replace { text: String, summary: String },
}

impl TransformResult {
    pub fn new(text: String, log: ChangeLog) -> Self {
        Self {
            enhanced_code: Some(text),
            changes_log: log.into_entries(),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            enhanced_code: None,
            changes_log: Vec::new(),
        }
    }

    pub fn is_supported(&self) -> bool {
        self.enhanced_code.is_some()
    }

    pub fn action(&self, original: &str) -> SaveAction {
        match &self.enhanced_code {
            None => SaveAction::Unsupported,
            Some(text) if text == original => SaveAction::Unchanged,
            Some(text) => SaveAction::Replace {
                text: text.clone(),
                summary: self.changes_log.join(", "),
            },
        }
    }
}
