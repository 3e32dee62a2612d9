//! # Mentor Editor
//!
//! Turns a document and its language id into improved text plus a change log.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ dispatcher: language id → pipeline          │
//! │  - unknown ids produce no result            │
//! │  - failures fall back to the original text  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ pipeline: parse → rules → print → document  │
//! │           rules                             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ sink: diagnostics for the host              │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mentor_editor::{Dispatcher, SaveAction};
//!
//! let dispatcher = Dispatcher::default();
//! let result = dispatcher.process("var x = 1;", "javascript");
//!
//! match result.action("var x = 1;") {
//!     SaveAction::Replace { text, summary } => apply(text, summary),
//!     SaveAction::Unchanged | SaveAction::Unsupported => {}
//! }
//! ```

mod dispatcher;
mod errors;
mod language;
mod pipeline;
mod result;
mod sink;

pub use dispatcher::Dispatcher;
pub use errors::EditorError;
pub use language::Language;
pub use pipeline::Pipeline;
pub use result::{SaveAction, TransformResult};
pub use sink::{LogSink, MemorySink, Severity, TracingSink};

// Re-export common types for convenience
pub use mentor_common::ChangeLog;
pub use mentor_linter::RuleOptions;
