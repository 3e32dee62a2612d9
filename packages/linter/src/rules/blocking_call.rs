use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::{find_in_statement, is_simple_statement, Rule};
use mentor_parser::ast::{Node, NodeKind};
use mentor_parser::builders::callee_name;

const NOTE: &str = "Blocking call: prefer the asynchronous API";

/// Notes synchronous Node.js APIs such as `fs.readFileSync`
pub struct BlockingCallRule;

impl Rule for BlockingCallRule {
    fn name(&self) -> &'static str {
        "blocking-call"
    }

    fn description(&self) -> &'static str {
        "Avoid blocking the event loop with *Sync calls"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Quality
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Node
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
        is_simple_statement(node)
            && !node.has_annotation(NOTE)
            && find_in_statement(node, &|n| sync_call(n).is_some()).is_some()
    }

    fn describe(&self, node: &Node) -> String {
        match find_in_statement(node, &|n| sync_call(n).is_some()).and_then(sync_call) {
            Some(name) => format!("Flagged blocking call to {}().", name),
            None => "Flagged blocking call.".to_string(),
        }
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.annotate(NOTE);
        Ok(Effect::Mutated)
    }
}

fn sync_call(node: &Node) -> Option<&str> {
    if !node.is(NodeKind::CallExpression) {
        return None;
    }
    callee_name(node).filter(|name| name.len() > "Sync".len() && name.ends_with("Sync"))
}
