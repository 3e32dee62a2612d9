use serde::Serialize;
use std::sync::Mutex;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Where the dispatcher reports what it did and what went wrong.
///
/// Nothing the pipeline computes depends on what a sink does with a message.
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) {
        self.log(Severity::Info, message);
    }

    fn warn(&self, message: &str) {
        self.log(Severity::Warning, message);
    }

    fn error(&self, message: &str) {
        self.log(Severity::Error, message);
    }
}

/// Forwards messages to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info => info!(target: "mentor", "{}", message),
            Severity::Warning => warn!(target: "mentor", "{}", message),
            Severity::Error => error!(target: "mentor", "{}", message),
        }
    }
}

/// Keeps messages in memory, for tests and for hosts that show them later
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<(Severity, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(Severity, String)> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter(|(level, _)| *level == severity)
            .map(|(_, message)| message)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn log(&self, severity: Severity, message: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.push((severity, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_keeps_order_and_severity() {
        let sink = MemorySink::new();
        sink.info("Processing javascript document");
        sink.error("Parse error");
        sink.info("Done");

        assert_eq!(sink.entries().len(), 3);
        assert_eq!(
            sink.messages(Severity::Info),
            vec!["Processing javascript document".to_string(), "Done".to_string()]
        );
        assert_eq!(sink.messages(Severity::Error), vec!["Parse error".to_string()]);
    }
}
