use crate::effect::{RuleCategory, RuleClass};
use serde::{Deserialize, Serialize};

/// Switches deciding which rules get registered at all
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleOptions {
    /// Register rules that rewrite code
    pub enable_auto_fix: bool,

    /// Register rules that only attach a note
    pub enable_comment_generation: bool,

    pub enable_accessibility_checks: bool,

    pub enable_security_checks: bool,

    /// More `.then(` occurrences than this in one file earn a restructuring note
    pub promise_chain_limit: usize,
}

impl Default for RuleOptions {
    fn default() -> Self {
        Self {
            enable_auto_fix: true,
            enable_comment_generation: true,
            enable_accessibility_checks: true,
            enable_security_checks: true,
            promise_chain_limit: 3,
        }
    }
}

impl RuleOptions {
    /// Whether a rule of this category and class should be registered
    pub fn enables(&self, category: RuleCategory, class: RuleClass) -> bool {
        let category_enabled = match category {
            RuleCategory::Quality => true,
            RuleCategory::Accessibility => self.enable_accessibility_checks,
            RuleCategory::Security => self.enable_security_checks,
        };
        let class_enabled = match class {
            RuleClass::Fix => self.enable_auto_fix,
            RuleClass::Advisory => self.enable_comment_generation,
        };
        category_enabled && class_enabled
    }
}
