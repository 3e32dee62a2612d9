use crate::ast::Node;
use crate::error::{ParseResult, PrintResult};
use crate::markup::{parse_markup, print_markup};
use crate::parser::{parse, Dialect};
use crate::serializer::serialize;

/// Parser and printer pair for one surface syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Script(Dialect),
    Markup,
}

impl Syntax {
    pub fn parse(self, text: &str) -> ParseResult<Node> {
        match self {
            Syntax::Script(dialect) => parse(text, dialect),
            Syntax::Markup => parse_markup(text),
        }
    }

    pub fn print(self, tree: &Node) -> PrintResult<String> {
        match self {
            Syntax::Script(_) => serialize(tree),
            Syntax::Markup => print_markup(tree),
        }
    }
}
