use crate::language::Language;
use crate::pipeline::Pipeline;
use crate::result::TransformResult;
use crate::sink::{LogSink, TracingSink};
use mentor_common::ChangeLog;
use mentor_linter::{RuleOptions, RuleRegistry};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Entry point for hosts: maps a language id to its pipeline and contains
/// every failure, so callers always get either no result or usable text.
pub struct Dispatcher {
    registry: RuleRegistry,
    sink: Arc<dyn LogSink>,
}

impl Dispatcher {
    pub fn new(options: &RuleOptions, sink: Arc<dyn LogSink>) -> Self {
        Self::with_registry(RuleRegistry::with_options(options), sink)
    }

    pub fn with_registry(registry: RuleRegistry, sink: Arc<dyn LogSink>) -> Self {
        Self { registry, sink }
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Process `text` as `language_id`.
    ///
    /// Unknown ids give `enhanced_code: None` without parsing. A parse or
    /// print failure gives the original text with whatever was logged
    /// before the failure.
    #[instrument(skip(self, text), fields(bytes = text.len()))]
    pub fn process(&self, text: &str, language_id: &str) -> TransformResult {
        let Some(language) = Language::from_id(language_id) else {
            self.sink
                .info(&format!("No processor for language '{}'", language_id));
            return TransformResult::unsupported();
        };

        self.sink.info(&format!("Processing {} document", language));
        let pipeline = Pipeline::new(&self.registry, language);
        let mut log = ChangeLog::new();

        match pipeline.run(text, &mut log, self.sink.as_ref()) {
            Ok(enhanced) => {
                info!(%language, changes = log.len(), "processed document");
                if log.is_empty() {
                    self.sink.info("No changes applied.");
                } else {
                    self.sink.info(&format!("Changes: {}", log.joined(", ")));
                }
                TransformResult::new(enhanced, log)
            }
            Err(failure) => {
                error!(%language, error = %failure, "keeping original text");
                self.sink.error(&format!(
                    "Could not process {} document: {}",
                    language, failure
                ));
                TransformResult::new(text.to_string(), log)
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(&RuleOptions::default(), Arc::new(TracingSink))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{MemorySink, Severity};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_dispatcher_is_shareable() {
        assert_send_sync::<Dispatcher>();
    }

    #[test]
    fn test_sink_receives_progress() {
        let sink = Arc::new(MemorySink::new());
        let dispatcher = Dispatcher::new(&RuleOptions::default(), sink.clone());

        dispatcher.process("var x = 1;", "javascript");
        dispatcher.process("x", "cobol");

        assert_eq!(
            sink.messages(Severity::Info),
            vec![
                "Processing javascript document".to_string(),
                "Changes: Replaced 'var' with 'let' for x.".to_string(),
                "No processor for language 'cobol'".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_failure_is_reported_as_error() {
        let sink = Arc::new(MemorySink::new());
        let dispatcher = Dispatcher::new(&RuleOptions::default(), sink.clone());

        let result = dispatcher.process("if (a) {", "javascript");

        assert_eq!(result.enhanced_code.as_deref(), Some("if (a) {"));
        assert_eq!(sink.messages(Severity::Error).len(), 1);
    }
}
