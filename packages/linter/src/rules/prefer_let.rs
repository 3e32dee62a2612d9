use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::{annotate_once, Rule};
use mentor_parser::ast::{Node, NodeKind};

const NOTE: &str = "Changed 'var' to 'let'";

/// Rewrites `var` declarations to block-scoped `let`
pub struct PreferLetRule;

impl Rule for PreferLetRule {
    fn name(&self) -> &'static str {
        "prefer-let"
    }

    fn description(&self) -> &'static str {
        "Use block-scoped 'let' instead of 'var'"
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Quality
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Script
    }

    fn class(&self) -> RuleClass {
        RuleClass::Fix
    }

    fn matches(&self, node: &Node, context: &RuleContext) -> bool {
        node.is(NodeKind::VariableDeclaration)
            && node.text("kind") == Some("var")
            && !in_loop_head(context)
    }

    fn describe(&self, node: &Node) -> String {
        let names = declared_names(node);
        if names.is_empty() {
            "Replaced 'var' with 'let'.".to_string()
        } else {
            format!("Replaced 'var' with 'let' for {}.", names.join(", "))
        }
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.set("kind", "let");
        annotate_once(node, NOTE);
        Ok(Effect::Mutated)
    }
}

/// `for (var i = 0; ..)` and `for (var key in ..)` keep their binding
fn in_loop_head(context: &RuleContext) -> bool {
    context.parent().map_or(false, |frame| {
        matches!(
            (frame.kind, frame.field),
            (NodeKind::ForStatement, "init")
                | (NodeKind::ForInStatement, "left")
                | (NodeKind::ForOfStatement, "left")
        )
    })
}

fn declared_names(declaration: &Node) -> Vec<&str> {
    declaration
        .children("declarations")
        .iter()
        .filter_map(|declarator| declarator.child("id"))
        .filter_map(|id| id.text("name"))
        .collect()
}
