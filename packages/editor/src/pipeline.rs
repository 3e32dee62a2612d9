//! # Transformation Pipeline
//!
//! Coordinates one document pass: Parse → Rules → Print → Document rules
//!
//! One tree is built per call and dropped when the call returns.

use crate::errors::EditorError;
use crate::language::Language;
use crate::sink::LogSink;
use mentor_common::ChangeLog;
use mentor_linter::{RuleEngine, RuleRegistry};
use tracing::debug;

/// The rules of one language, ready to run over documents of that language
pub struct Pipeline<'r> {
    language: Language,
    engine: RuleEngine<'r>,
}

impl<'r> Pipeline<'r> {
    pub fn new(registry: &'r RuleRegistry, language: Language) -> Self {
        Self {
            language,
            engine: RuleEngine::new(registry, language.scopes()),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Run the pass over `text`, appending applied changes to `log`.
    ///
    /// Rule failures go to `sink` and do not stop the pass. When no tree
    /// rule fired the original text, not a re-print, reaches the document
    /// rules, so a clean file comes back byte-identical.
    pub fn run(
        &self,
        text: &str,
        log: &mut ChangeLog,
        sink: &dyn LogSink,
    ) -> Result<String, EditorError> {
        let syntax = self.language.syntax();
        let mut tree = syntax.parse(text)?;

        let applied_before = log.len();
        for failure in self.engine.apply(&mut tree, text, log) {
            sink.warn(&failure.to_string());
        }

        let printed = if log.len() == applied_before {
            debug!(language = %self.language, "no tree rule fired, keeping original text");
            text.to_string()
        } else {
            syntax.print(&tree)?
        };

        Ok(self.engine.apply_document_rules(printed, log))
    }
}
