mod a11y;
mod arrow_function_note;
mod blocking_call;
mod contrast;
mod document;
mod fetch_error_handling;
mod prefer_let;
mod promise;
mod security;

pub use a11y::{ImgAltRule, InteractiveRoleRule, ValidAriaRoleRule};
pub use arrow_function_note::ArrowFunctionNoteRule;
pub use blocking_call::BlockingCallRule;
pub use contrast::{contrast_ratio, ColorContrastRule};
pub use document::{AngularNgModuleRule, NodeModuleExportsRule, VueDefaultExportRule};
pub use fetch_error_handling::FetchErrorHandlingRule;
pub use prefer_let::PreferLetRule;
pub use promise::{PromiseCatchRule, PromiseChainRule};
pub use security::{NoEvalRule, NoInnerHtmlRule};

use crate::effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
use crate::options::RuleOptions;
use mentor_parser::ast::{Field, Node, NodeKind};

/// A node-level rule: a predicate over one node plus the effect it applies
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    fn category(&self) -> RuleCategory;

    fn scope(&self) -> RuleScope;

    fn class(&self) -> RuleClass;

    fn matches(&self, node: &Node, context: &RuleContext) -> bool;

    /// Change log entry for applying this rule to `node`, computed before the effect
    fn describe(&self, node: &Node) -> String;

    fn apply(&self, node: &mut Node, context: &RuleContext) -> Result<Effect, RuleError>;
}

/// A file-level existence check that runs over printed text
pub trait DocumentRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn scope(&self) -> RuleScope;

    fn matches(&self, text: &str) -> bool;

    fn describe(&self) -> String;

    fn apply(&self, text: String) -> String;
}

/// Registry of all available rules, in evaluation order
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
    document_rules: Vec<Box<dyn DocumentRule>>,
}

impl RuleRegistry {
    /// Create a new registry with all built-in rules
    pub fn new() -> Self {
        Self::with_options(&RuleOptions::default())
    }

    /// Built-in rules whose category and class the options enable
    pub fn with_options(options: &RuleOptions) -> Self {
        let builtin: Vec<Box<dyn Rule>> = vec![
            Box::new(PreferLetRule),
            Box::new(FetchErrorHandlingRule),
            Box::new(PromiseCatchRule),
            Box::new(PromiseChainRule::new(options.promise_chain_limit)),
            Box::new(ArrowFunctionNoteRule),
            Box::new(NoInnerHtmlRule),
            Box::new(NoEvalRule),
            Box::new(BlockingCallRule),
            Box::new(ImgAltRule),
            Box::new(InteractiveRoleRule),
            Box::new(ValidAriaRoleRule),
            Box::new(ColorContrastRule),
        ];

        let mut registry = Self::empty();
        for rule in builtin {
            if options.enables(rule.category(), rule.class()) {
                registry.add_rule(rule);
            }
        }
        if options.enables(RuleCategory::Quality, RuleClass::Fix) {
            registry.add_document_rule(Box::new(VueDefaultExportRule));
            registry.add_document_rule(Box::new(AngularNgModuleRule));
            registry.add_document_rule(Box::new(NodeModuleExportsRule));
        }
        registry
    }

    /// Get all registered rules
    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    pub fn document_rules(&self) -> &[Box<dyn DocumentRule>] {
        &self.document_rules
    }

    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            document_rules: Vec::new(),
        }
    }

    /// Add a custom rule to the registry
    pub fn add_rule(&mut self, rule: Box<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn add_document_rule(&mut self, rule: Box<dyn DocumentRule>) {
        self.document_rules.push(rule);
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &format!("{} rules", self.rules.len()))
            .field(
                "document_rules",
                &format!("{} rules", self.document_rules.len()),
            )
            .finish()
    }
}

/// Statements whose own expressions the statement-level advisories inspect
pub(crate) fn is_simple_statement(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::ExpressionStatement
            | NodeKind::VariableDeclaration
            | NodeKind::ReturnStatement
            | NodeKind::ThrowStatement
    )
}

/// First node in a statement's expressions matching `predicate`.
///
/// Nested functions and statements are not entered; they are visited
/// on their own.
pub(crate) fn find_in_statement<'a>(
    statement: &'a Node,
    predicate: &dyn Fn(&Node) -> bool,
) -> Option<&'a Node> {
    statement
        .fields
        .iter()
        .find_map(|(_, field)| find_in_field(field, predicate))
}

fn find_in_field<'a>(field: &'a Field, predicate: &dyn Fn(&Node) -> bool) -> Option<&'a Node> {
    match field {
        Field::Node(child) => find_in_expression(child, predicate),
        Field::List(children) => children
            .iter()
            .find_map(|child| find_in_expression(child, predicate)),
        _ => None,
    }
}

fn find_in_expression<'a>(
    node: &'a Node,
    predicate: &dyn Fn(&Node) -> bool,
) -> Option<&'a Node> {
    if predicate(node) {
        return Some(node);
    }
    if node.kind.is_function() || node.kind.is_statement() {
        return None;
    }
    node.fields
        .iter()
        .find_map(|(_, field)| find_in_field(field, predicate))
}

pub(crate) fn is_element(node: &Node, name: &str) -> bool {
    node.is(NodeKind::Element)
        && node
            .text("name")
            .map_or(false, |tag| tag.eq_ignore_ascii_case(name))
}

/// Annotate unless the note is already present
pub(crate) fn annotate_once(node: &mut Node, note: &str) {
    if !node.has_annotation(note) {
        node.annotate(note);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::RuleRegistry;
    use crate::effect::RuleScope;
    use crate::engine::RuleEngine;
    use mentor_common::ChangeLog;
    use mentor_parser::{Dialect, Syntax};

    pub const SCRIPT: &[RuleScope] = &[RuleScope::Script];
    pub const MARKUP: &[RuleScope] = &[
        RuleScope::Markup,
        RuleScope::Style,
        RuleScope::Script,
    ];

    /// Run the default registry over `source` and print the result
    pub fn run(source: &str, syntax: Syntax, scopes: &[RuleScope]) -> (String, Vec<String>) {
        let registry = RuleRegistry::new();
        let engine = RuleEngine::new(&registry, scopes);
        let mut tree = syntax.parse(source).expect("test source parses");
        let mut log = ChangeLog::new();

        let failures = engine.apply(&mut tree, source, &mut log);
        assert!(failures.is_empty(), "unexpected failures: {:?}", failures);

        let printed = syntax.print(&tree).expect("test tree prints");
        let text = engine.apply_document_rules(printed, &mut log);
        (text, log.into_entries())
    }

    pub fn run_js(source: &str) -> (String, Vec<String>) {
        run(source, Syntax::Script(Dialect::JavaScript), SCRIPT)
    }

    pub fn run_markup(source: &str) -> (String, Vec<String>) {
        run(source, Syntax::Markup, MARKUP)
    }
}
