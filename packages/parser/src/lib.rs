pub mod ast;
pub mod builders;
pub mod error;
pub mod lexer;
pub mod markup;
pub mod parser;
pub mod serializer;
pub mod style;
pub mod syntax;

#[cfg(test)]
mod tests_markup;
#[cfg(test)]
mod tests_script;
#[cfg(test)]
mod tests_serializer;

pub use ast::{Field, Node, NodeKind, Span};
pub use error::{format_error, ParseError, ParseResult, PrintError, PrintResult};
pub use lexer::{tokenize, Token};
pub use markup::{parse_markup, print_markup};
pub use parser::{parse, Dialect, Parser};
pub use serializer::{serialize, Serializer};
pub use style::{parse_style, print_style};
pub use syntax::Syntax;
