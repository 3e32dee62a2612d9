use crate::ast::{NodeKind, Span};
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;
pub type PrintResult<T> = Result<T, PrintError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token at {}..{}: expected {expected}, found {found}", .span.start, .span.end)]
    UnexpectedToken {
        span: Span,
        expected: String,
        found: String,
    },

    #[error("Unexpected end of input: expected {expected}")]
    UnexpectedEof { expected: String },

    #[error("Unterminated {construct} starting at {}", .span.start)]
    Unterminated { span: Span, construct: &'static str },

    #[error("Unbalanced delimiter '{delimiter}' at {}", .span.start)]
    UnbalancedDelimiter { span: Span, delimiter: String },

    #[error("Lexer error at {}..{}: {message}", .span.start, .span.end)]
    LexerError { span: Span, message: String },
}

impl ParseError {
    pub fn unexpected_token(
        span: Span,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::UnexpectedToken {
            span,
            expected: expected.into(),
            found: found.into(),
        }
    }

    pub fn unexpected_eof(expected: impl Into<String>) -> Self {
        Self::UnexpectedEof {
            expected: expected.into(),
        }
    }

    pub fn unterminated(span: Span, construct: &'static str) -> Self {
        Self::Unterminated { span, construct }
    }

    pub fn unbalanced(span: Span, delimiter: impl Into<String>) -> Self {
        Self::UnbalancedDelimiter {
            span,
            delimiter: delimiter.into(),
        }
    }

    pub fn lexer_error(span: Span, message: impl Into<String>) -> Self {
        Self::LexerError {
            span,
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnexpectedToken { span, .. }
            | Self::Unterminated { span, .. }
            | Self::UnbalancedDelimiter { span, .. }
            | Self::LexerError { span, .. } => Some(*span),
            Self::UnexpectedEof { .. } => None,
        }
    }

    /// Same error with its span moved by `offset`, for embedded sources
    pub fn shifted(self, offset: usize) -> Self {
        let shift = |span: Span| Span::new(span.start + offset, span.end + offset);
        match self {
            Self::UnexpectedToken {
                span,
                expected,
                found,
            } => Self::UnexpectedToken {
                span: shift(span),
                expected,
                found,
            },
            Self::Unterminated { span, construct } => Self::Unterminated {
                span: shift(span),
                construct,
            },
            Self::UnbalancedDelimiter { span, delimiter } => Self::UnbalancedDelimiter {
                span: shift(span),
                delimiter,
            },
            Self::LexerError { span, message } => Self::LexerError {
                span: shift(span),
                message,
            },
            eof @ Self::UnexpectedEof { .. } => eof,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PrintError {
    #[error("Tree still contains an unfilled placeholder")]
    UnfilledHole,

    #[error("Unexpected {kind:?} node in {context} position")]
    UnexpectedNode {
        kind: NodeKind,
        context: &'static str,
    },

    #[error("{kind:?} node is missing required field '{field}'")]
    MissingField {
        kind: NodeKind,
        field: &'static str,
    },
}

impl PrintError {
    pub fn unexpected(kind: NodeKind, context: &'static str) -> Self {
        if kind == NodeKind::Hole {
            return Self::UnfilledHole;
        }
        Self::UnexpectedNode { kind, context }
    }
}

/// Render a parse error as a source-annotated report
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let span = error
        .span()
        .unwrap_or_else(|| Span::new(source.len(), source.len()));
    let mut output = Vec::new();

    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, span.range()))
                .with_message(label_for(error))
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut output);

    match written {
        Ok(()) => String::from_utf8_lossy(&output).into_owned(),
        Err(_) => error.to_string(),
    }
}

#[cfg(not(feature = "pretty-errors"))]
pub fn format_error(_source: &str, filename: &str, error: &ParseError) -> String {
    format!("{}: {}", filename, error)
}

#[cfg(feature = "pretty-errors")]
fn label_for(error: &ParseError) -> String {
    match error {
        ParseError::UnexpectedToken { expected, .. } => format!("expected {}", expected),
        ParseError::UnexpectedEof { expected } => format!("input ends before {}", expected),
        ParseError::Unterminated { construct, .. } => format!("this {} is never closed", construct),
        ParseError::UnbalancedDelimiter { delimiter, .. } => {
            format!("'{}' has no matching partner", delimiter)
        }
        ParseError::LexerError { message, .. } => message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hole_is_reported_as_unfilled() {
        assert_eq!(
            PrintError::unexpected(NodeKind::Hole, "statement"),
            PrintError::UnfilledHole
        );
    }

    #[test]
    fn test_shifted_moves_span() {
        let error = ParseError::unbalanced(Span::new(2, 3), ")").shifted(10);
        assert_eq!(error.span(), Some(Span::new(12, 13)));
    }

    #[cfg(feature = "pretty-errors")]
    #[test]
    fn test_format_error_mentions_message() {
        let source = "let x = (1;\n";
        let error = ParseError::unbalanced(Span::new(8, 9), "(");
        let report = format_error(source, "input.js", &error);

        assert!(report.contains("Unbalanced delimiter"));
    }
}
