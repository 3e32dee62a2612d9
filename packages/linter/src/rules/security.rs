use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::{find_in_statement, is_simple_statement, Rule};
use mentor_parser::ast::{Node, NodeKind};

const HTML_SINK_NOTE: &str =
    "Potential security risk: assigning HTML markup can lead to cross-site scripting (XSS)";
const DYNAMIC_CODE_NOTE: &str = "Potential security risk: dynamically evaluated code";

const HTML_SINKS: &[&str] = &["innerHTML", "outerHTML"];

/// Notes assignments to `innerHTML`/`outerHTML`
pub struct NoInnerHtmlRule;

impl Rule for NoInnerHtmlRule {
    fn name(&self) -> &'static str {
        "no-inner-html"
    }

    fn description(&self) -> &'static str {
        "Disallow writing raw HTML into the DOM"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Security
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Script
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
        is_simple_statement(node)
            && !node.has_annotation(HTML_SINK_NOTE)
            && find_in_statement(node, &|n| html_sink(n).is_some()).is_some()
    }

    fn describe(&self, node: &Node) -> String {
        let sink = find_in_statement(node, &|n| html_sink(n).is_some()).and_then(html_sink);
        format!("Flagged {} assignment.", sink.unwrap_or("innerHTML"))
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.annotate(HTML_SINK_NOTE);
        Ok(Effect::Mutated)
    }
}

/// Notes `eval(..)`, `new Function(..)` and `document.write(..)`
pub struct NoEvalRule;

impl Rule for NoEvalRule {
    fn name(&self) -> &'static str {
        "no-eval"
    }

    fn description(&self) -> &'static str {
        "Disallow evaluating strings as code"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Security
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Script
    }

    fn class(&self) -> RuleClass {
        RuleClass::Advisory
    }

    fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
        is_simple_statement(node)
            && !node.has_annotation(DYNAMIC_CODE_NOTE)
            && find_in_statement(node, &|n| dynamic_code(n).is_some()).is_some()
    }

    fn describe(&self, node: &Node) -> String {
        let construct =
            find_in_statement(node, &|n| dynamic_code(n).is_some()).and_then(dynamic_code);
        format!("Flagged use of {}.", construct.unwrap_or("eval()"))
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.annotate(DYNAMIC_CODE_NOTE);
        Ok(Effect::Mutated)
    }
}

/// The property name when `node` assigns to an HTML sink
fn html_sink(node: &Node) -> Option<&'static str> {
    if !node.is(NodeKind::AssignmentExpression) {
        return None;
    }
    let target = node.child("left")?;
    if !target.is(NodeKind::MemberExpression) || target.flag("computed") {
        return None;
    }
    let property = target.child("property")?.text("name")?;
    HTML_SINKS.iter().copied().find(|sink| *sink == property)
}

fn dynamic_code(node: &Node) -> Option<&'static str> {
    let callee = node.child("callee")?;
    match node.kind {
        NodeKind::CallExpression if is_identifier(callee, "eval") => Some("eval()"),
        NodeKind::NewExpression if is_identifier(callee, "Function") => Some("new Function()"),
        NodeKind::CallExpression
            if callee.is(NodeKind::MemberExpression)
                && !callee.flag("computed")
                && callee
                    .child("object")
                    .map_or(false, |object| is_identifier(object, "document"))
                && matches!(
                    callee.child("property").and_then(|property| property.text("name")),
                    Some("write") | Some("writeln")
                ) =>
        {
            Some("document.write()")
        }
        _ => None,
    }
}

fn is_identifier(node: &Node, name: &str) -> bool {
    node.is(NodeKind::Identifier) && node.text("name") == Some(name)
}
