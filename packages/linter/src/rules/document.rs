//! File-level existence checks. Each one adds a missing top-level construct
//! to the printed text at most once.
use crate::effect::RuleScope;
use crate::rules::DocumentRule;

/// Vue components need a default export
pub struct VueDefaultExportRule;

impl DocumentRule for VueDefaultExportRule {
    fn name(&self) -> &'static str {
        "vue-default-export"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Vue
    }

    fn matches(&self, text: &str) -> bool {
        !text.contains("export default")
    }

    fn describe(&self) -> String {
        "Added default export to Vue file.".to_string()
    }

    fn apply(&self, mut text: String) -> String {
        text.push_str("\nexport default {};\n");
        text
    }
}

/// Angular modules need `@NgModule` metadata
pub struct AngularNgModuleRule;

impl DocumentRule for AngularNgModuleRule {
    fn name(&self) -> &'static str {
        "angular-ng-module"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Angular
    }

    fn matches(&self, text: &str) -> bool {
        !text.contains("@NgModule")
    }

    fn describe(&self) -> String {
        "Added @NgModule metadata to Angular file.".to_string()
    }

    fn apply(&self, text: String) -> String {
        format!("@NgModule({{}})\n{}", text)
    }
}

/// Node modules need a `module.exports` assignment
pub struct NodeModuleExportsRule;

impl DocumentRule for NodeModuleExportsRule {
    fn name(&self) -> &'static str {
        "node-module-exports"
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Node
    }

    fn matches(&self, text: &str) -> bool {
        !text.contains("module.exports")
    }

    fn describe(&self) -> String {
        "Added module.exports to Node.js file.".to_string()
    }

    fn apply(&self, mut text: String) -> String {
        text.push_str("\nmodule.exports = {};\n");
        text
    }
}
