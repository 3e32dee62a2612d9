use mentor_common::Frame;
use mentor_parser::ast::{Node, NodeKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a rule is about; decides which configuration switch registers it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleCategory {
    Quality,
    Accessibility,
    Security,
}

/// Fixes rewrite code, advisories only attach a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleClass {
    Fix,
    Advisory,
}

/// Rule sets that a language profile composes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleScope {
    Script,
    Node,
    Markup,
    Style,
    Vue,
    Angular,
}

/// The change a matching rule makes to the node it was evaluated on
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The node was changed in place
    Mutated,
    /// Put this node in the slot instead
    Replace(Node),
    /// Put this template in the slot, with the original node in its `Hole`
    Wrap(Node),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuleError {
    #[error("{kind:?} node has no `{field}` field")]
    MissingField { kind: NodeKind, field: &'static str },

    #[error("wrap template has no hole for the {kind:?} node")]
    MissingHole { kind: NodeKind },

    #[error("{0}")]
    Custom(String),
}

/// What a rule can see besides the node: the full text of the document
/// being processed and the path from the root to the node's slot.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub source: &'a str,
    pub ancestors: &'a [Frame],
}

impl<'a> RuleContext<'a> {
    pub fn new(source: &'a str, ancestors: &'a [Frame]) -> Self {
        Self { source, ancestors }
    }

    /// The frame of the slot holding the node
    pub fn parent(&self) -> Option<&Frame> {
        self.ancestors.last()
    }

    /// True when the node sits inside the `try` block of a try statement
    /// in the same function. Handlers and finalizers do not count.
    pub fn enclosed_by_try(&self) -> bool {
        for frame in self.ancestors.iter().rev() {
            if frame.kind.is_function() {
                return false;
            }
            if frame.kind == NodeKind::TryStatement && frame.field == "block" {
                return true;
            }
        }
        false
    }

    pub fn inside(&self, kind: NodeKind) -> bool {
        self.ancestors.iter().any(|frame| frame.kind == kind)
    }
}
