mod effect;
mod engine;
mod options;
mod rules;

pub use effect::{Effect, RuleCategory, RuleClass, RuleContext, RuleError, RuleScope};
pub use engine::{RuleEngine, RuleFailure};
pub use options::RuleOptions;
pub use rules::{
    contrast_ratio, AngularNgModuleRule, ArrowFunctionNoteRule, BlockingCallRule,
    ColorContrastRule, DocumentRule, FetchErrorHandlingRule, ImgAltRule, InteractiveRoleRule,
    NoEvalRule, NoInnerHtmlRule, NodeModuleExportsRule, PreferLetRule, PromiseCatchRule,
    PromiseChainRule, Rule, RuleRegistry, ValidAriaRoleRule, VueDefaultExportRule,
};
