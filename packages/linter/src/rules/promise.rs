use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::{find_in_statement, is_simple_statement, Rule};
use mentor_parser::ast::{Node, NodeKind};

const MISSING_CATCH_NOTE: &str = "Promise chain has no rejection handler";
const LONG_CHAIN_NOTE: &str = "Consider restructuring promise chains with async/await";

/// Notes `.then(..)` chains when nothing in the file handles rejections
pub struct PromiseCatchRule;

impl Rule for PromiseCatchRule {
    fn name(&self) -> &'static str {
        "promise-catch"
    }

    fn description(&self) -> &'static str {
        "Promise continuations should have a rejection handler"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Quality
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Script
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    /// The check for a handler is textual over the whole file
    fn matches(&self, node: &Node, context: &RuleContext) -> bool {
        is_simple_statement(node)
            && !node.has_annotation(MISSING_CATCH_NOTE)
            && !context.source.contains(".catch")
            && find_in_statement(node, &is_then_call).is_some()
    }

    fn describe(&self, _node: &Node) -> String {
        "Flagged promise chain without a rejection handler.".to_string()
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.annotate(MISSING_CATCH_NOTE);
        Ok(Effect::Mutated)
    }
}

/// Notes the whole program when it chains many `.then(` continuations
pub struct PromiseChainRule {
    limit: usize,
}

impl PromiseChainRule {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl Rule for PromiseChainRule {
    fn name(&self) -> &'static str {
        "promise-chain"
    }

    fn description(&self) -> &'static str {
        "Long promise chains read better as async/await"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Quality
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Script
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    fn matches(&self, node: &Node, context: &RuleContext) -> bool {
        node.is(NodeKind::Program)
            && !node.has_annotation(LONG_CHAIN_NOTE)
            && context.source.matches(".then(").count() > self.limit
    }

    fn describe(&self, _node: &Node) -> String {
        format!(
            "Suggested restructuring promise chains longer than {} continuations.",
            self.limit
        )
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.annotate(LONG_CHAIN_NOTE);
        Ok(Effect::Mutated)
    }
}

fn is_then_call(node: &Node) -> bool {
    node.is(NodeKind::CallExpression)
        && node.child("callee").map_or(false, |callee| {
            callee.is(NodeKind::MemberExpression)
                && !callee.flag("computed")
                && callee
                    .child("property")
                    .and_then(|property| property.text("name"))
                    == Some("then")
        })
}
