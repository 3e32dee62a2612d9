use crate::ast::Span;
use crate::error::{ParseError, ParseResult};
use logos::Logos;

/// Token types for JavaScript and TypeScript source.
///
/// Keywords are lexed as `Ident` and recognized by the parser, since most of
/// them are also valid property names.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f\x{FEFF}]+")]
pub enum Token<'src> {
    #[regex(r"//[^\n]*", |lex| lex.slice())]
    LineComment(&'src str),

    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/", |lex| lex.slice())]
    BlockComment(&'src str),

    // U+FEFF is a byte-order mark, skipped as whitespace
    #[regex(
        r"[A-Za-z_$\x{80}-\x{FEFE}\x{FF00}-\x{10FFFF}][A-Za-z0-9_$\x{80}-\x{FEFE}\x{FF00}-\x{10FFFF}]*",
        |lex| lex.slice()
    )]
    Ident(&'src str),

    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9]+)?n?", |lex| lex.slice())]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?", |lex| lex.slice())]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+n?", |lex| lex.slice())]
    Number(&'src str),

    #[regex(r#""([^"\\\n]|\\.|\\\n)*""#, |lex| lex.slice())]
    #[regex(r"'([^'\\\n]|\\.|\\\n)*'", |lex| lex.slice())]
    String(&'src str),

    #[regex(r"`([^`\\]|\\.|\\\n)*`", |lex| lex.slice())]
    Template(&'src str),

    #[regex(
        r">>>=|\.\.\.|===|!==|\*\*=|<<=|>>=|>>>|&&=|\|\|=|\?\?=|=>|==|!=|<=|>=|&&|\|\||\?\?|\?\.|\+\+|--|\+=|-=|\*=|/=|%=|&=|\|=|\^=|\*\*|<<|>>|[{}()\[\];,<>+\-*/%&|^!~?:=.@#]",
        |lex| lex.slice()
    )]
    Punct(&'src str),
}

impl<'src> Token<'src> {
    pub fn text(&self) -> &'src str {
        match self {
            Token::LineComment(text)
            | Token::BlockComment(text)
            | Token::Ident(text)
            | Token::Number(text)
            | Token::String(text)
            | Token::Template(text)
            | Token::Punct(text) => text,
        }
    }
}

/// A comment that precedes a token
#[derive(Debug, Clone, PartialEq)]
pub struct CommentTrivia {
    pub text: String,
    /// A blank line separates this comment from whatever follows it
    pub detached: bool,
}

/// A significant token with the trivia in front of it
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<'src> {
    pub token: Token<'src>,
    pub span: Span,
    pub newline_before: bool,
    pub blank_line_before: bool,
    pub comments: Vec<CommentTrivia>,
}

#[derive(Debug, Clone, Default)]
pub struct TokenStream<'src> {
    pub lexemes: Vec<Lexeme<'src>>,
    /// Leading file comments up to the last one followed by a blank line
    pub header: Vec<CommentTrivia>,
    /// Comments after the last token
    pub trailing: Vec<CommentTrivia>,
}

/// Split source into significant tokens, attaching comments as trivia
pub fn tokenize(source: &str) -> ParseResult<TokenStream<'_>> {
    let mut lexer = Token::lexer(source);
    let mut stream = TokenStream::default();
    let mut pending: Vec<(String, Span)> = Vec::new();
    let mut last_end = 0;

    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let span = Span::new(range.start, range.end);
        let token = match result {
            Ok(token) => token,
            Err(()) => return Err(lexer_error(source, span)),
        };

        match token {
            Token::LineComment(raw) | Token::BlockComment(raw) => {
                pending.push((comment_text(raw), span));
            }
            _ => {
                let gap_end = pending.first().map(|(_, s)| s.start).unwrap_or(span.start);
                let lexeme = Lexeme {
                    token,
                    span,
                    newline_before: source[last_end..span.start].contains('\n'),
                    blank_line_before: !stream.lexemes.is_empty()
                        && blank_line(&source[last_end..gap_end]),
                    comments: attach(source, &mut pending, span.start),
                };
                stream.lexemes.push(lexeme);
                last_end = span.end;
            }
        }
    }

    stream.trailing = attach(source, &mut pending, source.len());

    if let Some(first) = stream.lexemes.first_mut() {
        if let Some(split) = first.comments.iter().rposition(|c| c.detached) {
            stream.header = first.comments.drain(..=split).collect();
        }
    }

    Ok(stream)
}

/// Normalized text of a comment token, without its delimiters
pub fn comment_text(raw: &str) -> String {
    if let Some(body) = raw.strip_prefix("//") {
        return body.trim().to_string();
    }
    let body = raw
        .strip_prefix("/*")
        .and_then(|body| body.strip_suffix("*/"))
        .unwrap_or(raw);
    if body.contains('\n') || body.starts_with('*') {
        body.to_string()
    } else {
        body.trim().to_string()
    }
}

fn attach(source: &str, pending: &mut Vec<(String, Span)>, next_start: usize) -> Vec<CommentTrivia> {
    let comments: Vec<(String, Span)> = pending.drain(..).collect();
    let mut trivia = Vec::with_capacity(comments.len());
    for (index, (text, span)) in comments.iter().enumerate() {
        let following = comments
            .get(index + 1)
            .map(|(_, next)| next.start)
            .unwrap_or(next_start);
        trivia.push(CommentTrivia {
            text: text.clone(),
            detached: blank_line(&source[span.end..following]),
        });
    }
    trivia
}

fn blank_line(gap: &str) -> bool {
    gap.matches('\n').count() >= 2
}

fn lexer_error(source: &str, span: Span) -> ParseError {
    let rest = &source[span.start..];
    let construct = match rest.chars().next() {
        Some('"') | Some('\'') => Some("string literal"),
        Some('`') => Some("template literal"),
        _ => None,
    };
    match construct {
        Some(construct) => ParseError::unterminated(span, construct),
        None => {
            let found = rest.chars().next().map(String::from).unwrap_or_default();
            ParseError::lexer_error(span, format!("unexpected character '{}'", found))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token<'_>> {
        tokenize(source)
            .unwrap()
            .lexemes
            .into_iter()
            .map(|lexeme| lexeme.token)
            .collect()
    }

    #[test]
    fn test_identifiers_and_punctuation() {
        assert_eq!(
            tokens("let x = a?.b ?? 1;"),
            vec![
                Token::Ident("let"),
                Token::Ident("x"),
                Token::Punct("="),
                Token::Ident("a"),
                Token::Punct("?."),
                Token::Ident("b"),
                Token::Punct("??"),
                Token::Number("1"),
                Token::Punct(";"),
            ]
        );
    }

    #[test]
    fn test_strings_and_templates() {
        assert_eq!(
            tokens(r#"f("a\"b", 'c', `d ${e}`)"#),
            vec![
                Token::Ident("f"),
                Token::Punct("("),
                Token::String(r#""a\"b""#),
                Token::Punct(","),
                Token::String("'c'"),
                Token::Punct(","),
                Token::Template("`d ${e}`"),
                Token::Punct(")"),
            ]
        );
    }

    #[test]
    fn test_comments_become_trivia() {
        let stream = tokenize("// first\n\n// second\nfoo(); /* tail */").unwrap();

        assert_eq!(stream.header.len(), 1);
        assert_eq!(stream.header[0].text, "first");
        assert_eq!(stream.lexemes[0].comments[0].text, "second");
        assert_eq!(stream.trailing[0].text, "tail");
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(
            tokens("/** doc **/ a /* x * y */ b /**/"),
            vec![
                Token::BlockComment("/** doc **/"),
                Token::Ident("a"),
                Token::BlockComment("/* x * y */"),
                Token::Ident("b"),
                Token::BlockComment("/**/"),
            ]
        );
    }

    #[test]
    fn test_byte_order_mark_is_whitespace() {
        assert_eq!(
            tokens("\u{FEFF}var café = 1;"),
            vec![
                Token::Ident("var"),
                Token::Ident("café"),
                Token::Punct("="),
                Token::Number("1"),
                Token::Punct(";"),
            ]
        );
    }

    #[test]
    fn test_newline_tracking() {
        let stream = tokenize("a\nb\n\nc").unwrap();

        assert!(!stream.lexemes[0].newline_before);
        assert!(stream.lexemes[1].newline_before);
        assert!(!stream.lexemes[1].blank_line_before);
        assert!(stream.lexemes[2].blank_line_before);
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let error = tokenize("let s = 'oops\n").unwrap_err();
        assert!(matches!(error, ParseError::Unterminated { .. }));
    }

    #[test]
    fn test_comment_text_normalization() {
        assert_eq!(comment_text("//   note  "), "note");
        assert_eq!(comment_text("/* note */"), "note");
        assert_eq!(comment_text("/** doc */"), "* doc ");
        assert_eq!(comment_text("/*\n a\n*/"), "\n a\n");
    }
}
