use mentor_linter::RuleScope;
use mentor_parser::{Dialect, Syntax};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The closed set of languages a document can be processed as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    JavaScript,
    TypeScript,
    Node,
    Angular,
    Vue,
    Html,
}

impl Language {
    pub const ALL: [Language; 6] = [
        Language::JavaScript,
        Language::TypeScript,
        Language::Node,
        Language::Angular,
        Language::Vue,
        Language::Html,
    ];

    /// Look up a host language id; `None` for anything unrecognized
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|language| language.id() == id)
    }

    pub fn id(self) -> &'static str {
        match self {
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Node => "node",
            Language::Angular => "angular",
            Language::Vue => "vue",
            Language::Html => "html",
        }
    }

    /// Infer the language from a file name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".module.ts") {
            return Some(Language::Angular);
        }
        let extension = name.rsplit_once('.')?.1;
        match extension {
            "js" | "jsx" => Some(Language::JavaScript),
            "mjs" | "cjs" => Some(Language::Node),
            "ts" | "tsx" => Some(Language::TypeScript),
            "vue" => Some(Language::Vue),
            "html" | "htm" => Some(Language::Html),
            _ => None,
        }
    }

    pub fn syntax(self) -> Syntax {
        match self {
            Language::JavaScript | Language::Node => Syntax::Script(Dialect::JavaScript),
            Language::TypeScript | Language::Angular => Syntax::Script(Dialect::TypeScript),
            Language::Vue | Language::Html => Syntax::Markup,
        }
    }

    /// Rule sets composed for this language, in evaluation order
    pub fn scopes(self) -> &'static [RuleScope] {
        match self {
            Language::JavaScript | Language::TypeScript => &[RuleScope::Script],
            Language::Node => &[RuleScope::Script, RuleScope::Node],
            Language::Angular => &[RuleScope::Script, RuleScope::Angular],
            Language::Vue => &[
                RuleScope::Markup,
                RuleScope::Style,
                RuleScope::Script,
                RuleScope::Vue,
            ],
            Language::Html => &[RuleScope::Markup, RuleScope::Style, RuleScope::Script],
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}
