use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::rules::Rule;
use mentor_parser::ast::{Node, NodeKind};

const NOTE: &str = "This is an arrow function";

pub struct ArrowFunctionNoteRule;

impl Rule for ArrowFunctionNoteRule {
    fn name(&self) -> &'static str {
        "arrow-function-note"
    }

    fn description(&self) -> &'static str {
        "Explain variables bound to arrow functions"
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

    fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
        node.is(NodeKind::VariableDeclaration)
            && !node.has_annotation(NOTE)
            && arrow_binding(node).is_some()
    }

    fn describe(&self, node: &Node) -> String {
        match arrow_binding(node) {
            Some(name) => format!("Added a note to arrow function {}.", name),
            None => "Added a note to arrow function.".to_string(),
        }
    }

    fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
        node.annotate(NOTE);
        Ok(Effect::Mutated)
    }
}

/// Name of the first declarator initialized with an arrow function
fn arrow_binding(declaration: &Node) -> Option<&str> {
    declaration
        .children("declarations")
        .iter()
        .find(|declarator| {
            let mut init = declarator.child("init");
            while let Some(expression) = init {
                if !expression.is(NodeKind::ParenthesizedExpression) {
                    break;
                }
                init = expression.child("expression");
            }
            init.map_or(false, |expression| {
                expression.is(NodeKind::ArrowFunctionExpression)
            })
        })
        .map(|declarator| {
            declarator
                .child("id")
                .and_then(|id| id.text("name"))
                .unwrap_or("(pattern)")
        })
}
