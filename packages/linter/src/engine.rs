use crate::effect::{Effect, RuleContext, RuleError, RuleScope};
use crate::rules::{DocumentRule, Rule, RuleRegistry};
use mentor_common::{walk_mut, ChangeLog, Frame, VisitorMut};
use mentor_parser::ast::{Node, NodeKind};
use std::fmt;
use tracing::{debug, warn};

/// A rule whose effect could not be applied. The traversal carried on
/// without it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub rule: &'static str,
    pub kind: NodeKind,
    pub error: RuleError,
}

impl fmt::Display for RuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rule {} failed on {:?}: {}", self.rule, self.kind, self.error)
    }
}

/// The rules of a registry that apply to one combination of scopes
pub struct RuleEngine<'r> {
    rules: Vec<&'r dyn Rule>,
    document_rules: Vec<&'r dyn DocumentRule>,
}

impl<'r> RuleEngine<'r> {
    pub fn new(registry: &'r RuleRegistry, scopes: &[RuleScope]) -> Self {
        let rules = registry
            .rules()
            .iter()
            .filter(|rule| scopes.contains(&rule.scope()))
            .map(|rule| rule.as_ref())
            .collect();
        let document_rules = registry
            .document_rules()
            .iter()
            .filter(|rule| scopes.contains(&rule.scope()))
            .map(|rule| rule.as_ref())
            .collect();
        Self {
            rules,
            document_rules,
        }
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Walk `tree` once, applying every matching rule and logging each
    /// applied effect. `source` is the full text the tree was parsed from.
    pub fn apply(&self, tree: &mut Node, source: &str, log: &mut ChangeLog) -> Vec<RuleFailure> {
        let mut pass = Pass {
            rules: &self.rules,
            source,
            log,
            failures: Vec::new(),
        };
        walk_mut(tree, &mut pass);
        pass.failures
    }

    /// Run the file-level rules over printed text, in registration order
    pub fn apply_document_rules(&self, mut text: String, log: &mut ChangeLog) -> String {
        for rule in &self.document_rules {
            if rule.matches(&text) {
                log.push(rule.describe());
                text = rule.apply(text);
                debug!(rule = rule.name(), "applied document rule");
            }
        }
        text
    }
}

struct Pass<'p, 'r> {
    rules: &'p [&'r dyn Rule],
    source: &'p str,
    log: &'p mut ChangeLog,
    failures: Vec<RuleFailure>,
}

impl Pass<'_, '_> {
    fn record(&mut self, rule: &dyn Rule, description: String) {
        debug!(rule = rule.name(), %description, "applied rule");
        self.log.push(description);
    }

    fn fail(&mut self, rule: &dyn Rule, kind: NodeKind, error: RuleError) {
        warn!(rule = rule.name(), ?kind, %error, "rule failed, skipping");
        self.failures.push(RuleFailure {
            rule: rule.name(),
            kind,
            error,
        });
    }
}

impl VisitorMut for Pass<'_, '_> {
    fn visit_node(&mut self, node: &mut Node, ancestors: &[Frame]) -> Option<Node> {
        let rules = self.rules;
        let context = RuleContext::new(self.source, ancestors);

        for &rule in rules {
            if !rule.matches(node, &context) {
                continue;
            }
            let description = rule.describe(node);
            match rule.apply(node, &context) {
                Ok(Effect::Mutated) => self.record(rule, description),
                Ok(Effect::Replace(mut replacement)) => {
                    replacement.inherit_layout(node);
                    self.record(rule, description);
                    return Some(replacement);
                }
                Ok(Effect::Wrap(template)) => match wrap(node, template) {
                    Ok(wrapper) => {
                        self.record(rule, description);
                        return Some(wrapper);
                    }
                    Err(error) => self.fail(rule, node.kind, error),
                },
                Err(error) => self.fail(rule, node.kind, error),
            }
        }
        None
    }
}

/// Move the node out of its slot into the template's hole.
///
/// On failure the slot is left exactly as it was.
fn wrap(slot: &mut Node, mut template: Node) -> Result<Node, RuleError> {
    let kind = slot.kind;
    if !template.contains_hole() {
        return Err(RuleError::MissingHole { kind });
    }
    template.inherit_layout(slot);

    let mut original = std::mem::replace(slot, Node::hole());
    let blank_line = std::mem::replace(&mut original.blank_line, false);
    match template.fill_hole(original) {
        Ok(()) => Ok(template),
        Err(mut original) => {
            original.blank_line = blank_line;
            *slot = original;
            Err(RuleError::MissingHole { kind })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::{RuleCategory, RuleClass};
    use mentor_parser::builders::{block, expression_statement, identifier};
    use mentor_parser::{parse, serialize, Dialect};

    /// Flags every expression statement with a fixed note
    struct NoteStatements;

    impl Rule for NoteStatements {
        fn name(&self) -> &'static str {
            "note-statements"
        }

        fn description(&self) -> &'static str {
            "Annotate expression statements"
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
            node.is(NodeKind::ExpressionStatement) && !node.has_annotation("seen")
        }

        fn describe(&self, _node: &Node) -> String {
            "Noted statement".to_string()
        }

        fn apply(&self, node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
            node.annotate("seen");
            Ok(Effect::Mutated)
        }
    }

    /// Wraps top-level statements in a block; without a hole the template is unusable
    struct WrapOrFail {
        hole: bool,
    }

    impl Rule for WrapOrFail {
        fn name(&self) -> &'static str {
            "wrap-or-fail"
        }

        fn description(&self) -> &'static str {
            "Wrap statements in blocks"
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
            node.is(NodeKind::ExpressionStatement) && !context.inside(NodeKind::BlockStatement)
        }

        fn describe(&self, _node: &Node) -> String {
            "Wrapped statement".to_string()
        }

        fn apply(&self, _node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
            let body = if self.hole {
                vec![Node::hole()]
            } else {
                vec![expression_statement(identifier("other"))]
            };
            Ok(Effect::Wrap(block(body)))
        }
    }

    struct AlwaysErr;

    impl Rule for AlwaysErr {
        fn name(&self) -> &'static str {
            "always-err"
        }

        fn description(&self) -> &'static str {
            "Fails on every statement"
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

        fn matches(&self, node: &Node, _context: &RuleContext) -> bool {
            node.is(NodeKind::ExpressionStatement)
        }

        fn describe(&self, _node: &Node) -> String {
            "Never logged".to_string()
        }

        fn apply(&self, _node: &mut Node, _context: &RuleContext) -> Result<Effect, RuleError> {
            Err(RuleError::Custom("broken rule".to_string()))
        }
    }

    fn registry(rules: Vec<Box<dyn Rule>>) -> RuleRegistry {
        let mut registry = RuleRegistry::empty();
        for rule in rules {
            registry.add_rule(rule);
        }
        registry
    }

    #[test]
    fn test_one_entry_per_applied_effect() {
        let registry = registry(vec![Box::new(NoteStatements)]);
        let engine = RuleEngine::new(&registry, &[RuleScope::Script]);
        let mut tree = parse("a();\nb();\nlet c = 1;", Dialect::JavaScript).unwrap();
        let mut log = ChangeLog::new();

        engine.apply(&mut tree, "", &mut log);

        assert_eq!(log.entries(), &["Noted statement", "Noted statement"]);
        assert_eq!(
            serialize(&tree).unwrap(),
            "// seen\na();\n// seen\nb();\nlet c = 1;\n"
        );
    }

    #[test]
    fn test_scopes_filter_rules() {
        let registry = registry(vec![Box::new(NoteStatements)]);
        let engine = RuleEngine::new(&registry, &[RuleScope::Markup]);
        let mut tree = parse("a();", Dialect::JavaScript).unwrap();
        let mut log = ChangeLog::new();

        engine.apply(&mut tree, "", &mut log);

        assert!(engine.rule_names().is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_wrap_places_node_in_hole_and_stops_evaluation() {
        let registry = registry(vec![
            Box::new(WrapOrFail { hole: true }),
            Box::new(NoteStatements),
        ]);
        let engine = RuleEngine::new(&registry, &[RuleScope::Script]);
        let mut tree = parse("a();", Dialect::JavaScript).unwrap();
        let mut log = ChangeLog::new();

        let failures = engine.apply(&mut tree, "", &mut log);

        assert!(failures.is_empty());
        assert_eq!(log.entries(), &["Wrapped statement"]);
        assert_eq!(serialize(&tree).unwrap(), "{\n  a();\n}\n");
    }

    #[test]
    fn test_wrap_without_hole_restores_node() {
        let registry = registry(vec![
            Box::new(WrapOrFail { hole: false }),
            Box::new(NoteStatements),
        ]);
        let engine = RuleEngine::new(&registry, &[RuleScope::Script]);
        let mut tree = parse("a();", Dialect::JavaScript).unwrap();
        let mut log = ChangeLog::new();

        let failures = engine.apply(&mut tree, "", &mut log);

        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule, "wrap-or-fail");
        assert_eq!(
            failures[0].error,
            RuleError::MissingHole {
                kind: NodeKind::ExpressionStatement
            }
        );
        // the next rule still ran on the restored node
        assert_eq!(log.entries(), &["Noted statement"]);
        assert_eq!(serialize(&tree).unwrap(), "// seen\na();\n");
    }

    #[test]
    fn test_failing_rule_is_isolated() {
        let registry = registry(vec![Box::new(AlwaysErr), Box::new(NoteStatements)]);
        let engine = RuleEngine::new(&registry, &[RuleScope::Script]);
        let mut tree = parse("a();\nb();", Dialect::JavaScript).unwrap();
        let mut log = ChangeLog::new();

        let failures = engine.apply(&mut tree, "", &mut log);

        assert_eq!(failures.len(), 2);
        assert_eq!(
            failures[0].to_string(),
            "rule always-err failed on ExpressionStatement: broken rule"
        );
        assert_eq!(log.len(), 2);
    }
}
