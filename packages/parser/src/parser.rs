use crate::ast::{Node, NodeKind, Span};
use crate::builders::{block, identifier, literal};
use crate::error::{ParseError, ParseResult};
use crate::lexer::{tokenize, CommentTrivia, Lexeme, Token};
use tracing::debug;

/// Script dialect accepted by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    JavaScript,
    TypeScript,
}

const ASSIGNMENT_OPERATORS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

/// Words that can never start an expression
const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "do", "else",
    "enum", "export", "extends", "finally", "for", "if", "in", "instanceof", "return", "switch",
    "throw", "try", "var", "while", "with",
];

/// Tolerant recursive-descent parser for JavaScript and TypeScript.
///
/// Statements outside the supported grammar are kept verbatim as
/// `RawStatement` nodes as long as their brackets balance.
pub struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Lexeme<'src>>,
    header: Vec<CommentTrivia>,
    trailing: Vec<CommentTrivia>,
    pos: usize,
    /// Lexemes below this index have had their comments attached
    claimed: usize,
    dialect: Dialect,
    allow_in: bool,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, dialect: Dialect) -> ParseResult<Self> {
        let stream = tokenize(source)?;
        Ok(Self {
            source,
            tokens: stream.lexemes,
            header: stream.header,
            trailing: stream.trailing,
            pos: 0,
            claimed: 0,
            dialect,
            allow_in: true,
        })
    }

    /// Parse a complete program
    pub fn parse_program(&mut self) -> ParseResult<Node> {
        let header = std::mem::take(&mut self.header)
            .into_iter()
            .map(|comment| comment.text)
            .collect();

        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement_tolerant()?);
        }

        let trailing = self.take_trailing_comments();
        if !trailing.is_empty() {
            body.push(Node::new(NodeKind::Trivia).with_comments(trailing));
        }

        Ok(Node::new(NodeKind::Program)
            .with("body", body)
            .with_comments(header)
            .with_span(Span::new(0, self.source.len())))
    }

    // ---------------------------------------------------------------
    // Token helpers
    // ---------------------------------------------------------------

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek_token(&self) -> Option<Token<'src>> {
        self.tokens.get(self.pos).map(|lexeme| lexeme.token)
    }

    fn token_at(&self, index: usize) -> Option<Token<'src>> {
        self.tokens.get(index).map(|lexeme| lexeme.token)
    }

    fn punct_at(&self, index: usize, punct: &str) -> bool {
        matches!(self.token_at(index), Some(Token::Punct(p)) if p == punct)
    }

    fn ident_at(&self, index: usize, word: &str) -> bool {
        matches!(self.token_at(index), Some(Token::Ident(w)) if w == word)
    }

    fn newline_at(&self, index: usize) -> bool {
        self.tokens
            .get(index)
            .map(|lexeme| lexeme.newline_before)
            .unwrap_or(true)
    }

    fn check_punct(&self, punct: &str) -> bool {
        self.punct_at(self.pos, punct)
    }

    fn check_ident(&self, word: &str) -> bool {
        self.ident_at(self.pos, word)
    }

    fn current_start(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|lexeme| lexeme.span.start)
            .unwrap_or(self.source.len())
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|index| self.tokens.get(index))
            .map(|lexeme| lexeme.span.end)
            .unwrap_or(0)
    }

    fn advance(&mut self) -> ParseResult<Token<'src>> {
        let token = self
            .peek_token()
            .ok_or_else(|| ParseError::unexpected_eof("more input"))?;
        self.pos += 1;
        Ok(token)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.check_punct(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.check_ident(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, punct: &str) -> ParseResult<()> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", punct)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<&'src str> {
        match self.peek_token() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(lexeme) => {
                ParseError::unexpected_token(lexeme.span, expected, lexeme.token.text())
            }
            None => ParseError::unexpected_eof(expected),
        }
    }

    fn text_between(&self, first: usize, last: usize) -> &'src str {
        let start = self.tokens[first].span.start;
        let end = self.tokens[last].span.end;
        &self.source[start..end]
    }

    /// Automatic semicolon insertion: `;`, a line break, `}` or end of input
    fn consume_semicolon(&mut self) -> ParseResult<()> {
        if self.eat_punct(";") {
            return Ok(());
        }
        match self.tokens.get(self.pos) {
            None => Ok(()),
            Some(lexeme) if lexeme.newline_before => Ok(()),
            Some(lexeme) if lexeme.token == Token::Punct("}") => Ok(()),
            Some(_) => Err(self.unexpected("';'")),
        }
    }

    /// Comments not yet attached, up to and including those of the current token
    fn take_comments(&mut self) -> Vec<String> {
        let end = (self.pos + 1).min(self.tokens.len());
        let mut comments = Vec::new();
        if self.claimed < end {
            for lexeme in &self.tokens[self.claimed..end] {
                comments.extend(lexeme.comments.iter().map(|c| c.text.clone()));
            }
            self.claimed = end;
        }
        comments
    }

    fn take_trailing_comments(&mut self) -> Vec<String> {
        let mut comments = self.take_comments();
        comments.extend(self.trailing.drain(..).map(|c| c.text));
        comments
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn parse_statement_tolerant(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let allow_in = self.allow_in;
        let blank_line = self
            .tokens
            .get(start)
            .map(|lexeme| lexeme.blank_line_before)
            .unwrap_or(false);
        let comments = self.take_comments();

        let mut statement = match self.parse_statement() {
            Ok(statement) => statement,
            Err(error) => {
                debug!(%error, "keeping statement verbatim");
                self.pos = start;
                self.allow_in = allow_in;
                self.claimed = start + 1;
                self.capture_raw_statement()?
            }
        };

        // Comments above `export const ..` belong to the exported declaration
        let exported = statement
            .child("declaration")
            .map_or(false, |declaration| declaration.kind.is_statement());
        if exported {
            if let Some(declaration) = statement.child_mut("declaration") {
                declaration.comments.splice(0..0, comments);
            }
        } else {
            statement.comments.splice(0..0, comments);
        }
        statement.blank_line = blank_line;
        Ok(statement)
    }

    /// Capture a bracket-balanced statement verbatim
    fn capture_raw_statement(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let mut open: Vec<(&'src str, Span)> = Vec::new();

        while let Some(lexeme) = self.tokens.get(self.pos) {
            let token = lexeme.token;
            let span = lexeme.span;
            if let Token::Punct(punct) = token {
                match punct {
                    "(" | "[" | "{" => open.push((punct, span)),
                    ")" | "]" | "}" => {
                        let expected = open.last().map(|(opener, _)| closer_for(opener));
                        match expected {
                            None if punct == "}" && self.pos > start => break,
                            Some(closer) if closer == punct => {
                                open.pop();
                            }
                            _ => return Err(ParseError::unbalanced(span, punct)),
                        }
                    }
                    _ => {}
                }
            }
            self.pos += 1;

            if open.is_empty() && self.raw_statement_ends_after(token) {
                break;
            }
        }

        if let Some((opener, span)) = open.last() {
            return Err(ParseError::unbalanced(*span, *opener));
        }
        if self.pos == start {
            return Err(self.unexpected("statement"));
        }

        self.claimed = self.claimed.max(self.pos);
        let text = self.text_between(start, self.pos - 1);
        let span = Span::new(self.tokens[start].span.start, self.previous_end());
        Ok(Node::new(NodeKind::RawStatement)
            .with("text", text)
            .with_span(span))
    }

    /// Whether a verbatim statement ends after `token` (the next token is at `self.pos`)
    fn raw_statement_ends_after(&self, token: Token<'src>) -> bool {
        if token == Token::Punct(";") {
            return true;
        }
        if !self.newline_at(self.pos) {
            return false;
        }
        match token {
            Token::Punct("}") => true,
            Token::String(_) | Token::Number(_) | Token::Template(_) | Token::Punct(")" | "]") => {
                matches!(self.token_at(self.pos), Some(Token::Ident(_)))
            }
            _ => false,
        }
    }

    fn parse_statement(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        let token = self
            .peek_token()
            .ok_or_else(|| ParseError::unexpected_eof("statement"))?;

        let statement = match token {
            Token::Punct("{") => self.parse_block()?,
            Token::Punct(";") => {
                self.advance()?;
                Node::new(NodeKind::EmptyStatement)
            }
            Token::Ident("var") | Token::Ident("const") => self.parse_variable_statement()?,
            Token::Ident("let") if self.let_starts_declaration() => {
                self.parse_variable_statement()?
            }
            Token::Ident("function") => self.parse_function(NodeKind::FunctionDeclaration)?,
            Token::Ident("async") if self.async_function_at(self.pos) => {
                self.parse_function(NodeKind::FunctionDeclaration)?
            }
            Token::Ident("if") => self.parse_if()?,
            Token::Ident("for") => self.parse_for()?,
            Token::Ident("while") => self.parse_while()?,
            Token::Ident("do") => self.parse_do_while()?,
            Token::Ident("return") => self.parse_return_or_throw(NodeKind::ReturnStatement)?,
            Token::Ident("throw") => self.parse_return_or_throw(NodeKind::ThrowStatement)?,
            Token::Ident("break") => self.parse_jump(NodeKind::BreakStatement)?,
            Token::Ident("continue") => self.parse_jump(NodeKind::ContinueStatement)?,
            Token::Ident("try") => self.parse_try()?,
            Token::Ident("export") => self.parse_export()?,
            _ => self.parse_expression_statement()?,
        };

        Ok(statement.with_span(Span::new(start, self.previous_end())))
    }

    fn parse_block(&mut self) -> ParseResult<Node> {
        self.expect_punct("{")?;
        let allow_in = std::mem::replace(&mut self.allow_in, true);

        let mut body = Vec::new();
        loop {
            match self.peek_token() {
                Some(Token::Punct("}")) => break,
                None => return Err(ParseError::unexpected_eof("'}'")),
                Some(_) => body.push(self.parse_statement_tolerant()?),
            }
        }

        let trailing = self.take_comments();
        if !trailing.is_empty() {
            body.push(Node::new(NodeKind::Trivia).with_comments(trailing));
        }
        self.expect_punct("}")?;
        self.allow_in = allow_in;
        Ok(block(body))
    }

    fn let_starts_declaration(&self) -> bool {
        match self.token_at(self.pos + 1) {
            Some(Token::Ident(word)) => word != "in" && word != "instanceof",
            Some(Token::Punct("[")) | Some(Token::Punct("{")) => true,
            _ => false,
        }
    }

    fn starts_declaration(&self) -> bool {
        self.check_ident("var")
            || self.check_ident("const")
            || (self.check_ident("let") && self.let_starts_declaration())
    }

    fn async_function_at(&self, index: usize) -> bool {
        self.ident_at(index, "async")
            && self.ident_at(index + 1, "function")
            && !self.newline_at(index + 1)
    }

    fn parse_variable_statement(&mut self) -> ParseResult<Node> {
        let declaration = self.parse_variable_declaration()?;
        self.consume_semicolon()?;
        Ok(declaration)
    }

    /// `var|let|const` declarators, without the terminating semicolon
    fn parse_variable_declaration(&mut self) -> ParseResult<Node> {
        let kind = self.expect_ident()?;
        let mut declarations = Vec::new();

        loop {
            let start = self.current_start();
            let id = self.parse_binding_target()?;
            let type_annotation = if self.dialect == Dialect::TypeScript && self.eat_punct(":") {
                Some(self.capture_type(&["=", ",", ";", ")"])?)
            } else {
                None
            };
            let init = if self.eat_punct("=") {
                Some(self.parse_assignment()?)
            } else {
                None
            };
            declarations.push(
                Node::new(NodeKind::VariableDeclarator)
                    .with("id", id)
                    .with("typeAnnotation", type_annotation)
                    .with("init", init)
                    .with_span(Span::new(start, self.previous_end())),
            );
            if !self.eat_punct(",") {
                break;
            }
        }

        Ok(Node::new(NodeKind::VariableDeclaration)
            .with("kind", kind)
            .with("declarations", declarations))
    }

    fn parse_binding_target(&mut self) -> ParseResult<Node> {
        match self.peek_token() {
            Some(Token::Punct("[")) => self.parse_array_literal(),
            Some(Token::Punct("{")) => self.parse_object_literal(),
            Some(Token::Ident(name)) if !RESERVED_WORDS.contains(&name) => {
                self.advance()?;
                Ok(identifier(name))
            }
            _ => Err(self.unexpected("binding name")),
        }
    }

    /// Capture a TypeScript type annotation verbatim
    fn capture_type(&mut self, terminators: &[&str]) -> ParseResult<String> {
        let start = self.pos;
        let mut depth: usize = 0;

        while let Some(lexeme) = self.tokens.get(self.pos) {
            if depth == 0 && self.pos > start && lexeme.newline_before {
                let continues = matches!(lexeme.token, Token::Punct("|") | Token::Punct("&"))
                    || matches!(
                        self.token_at(self.pos - 1),
                        Some(Token::Punct("|" | "&" | "=>" | ":" | ","))
                    );
                if !continues {
                    break;
                }
            }
            if let Token::Punct(punct) = lexeme.token {
                if depth == 0 && terminators.contains(&punct) {
                    break;
                }
                match punct {
                    "(" | "[" | "{" | "<" => depth += 1,
                    ")" | "]" | "}" => {
                        if depth == 0 {
                            break;
                        }
                        depth -= 1;
                    }
                    ">" => depth = depth.saturating_sub(1),
                    ">>" => depth = depth.saturating_sub(2),
                    ">>>" => depth = depth.saturating_sub(3),
                    _ => {}
                }
            }
            self.pos += 1;
        }

        if self.pos == start {
            return Err(self.unexpected("type"));
        }
        Ok(self.text_between(start, self.pos - 1).to_string())
    }

    /// `<T, U extends X>` after a function name
    fn parse_type_parameters(&mut self) -> ParseResult<Option<String>> {
        if self.dialect != Dialect::TypeScript || !self.check_punct("<") {
            return Ok(None);
        }
        let start = self.pos;
        let mut depth: usize = 0;
        loop {
            match self.advance()? {
                Token::Punct("<") => depth += 1,
                Token::Punct(">") => depth = depth.saturating_sub(1),
                Token::Punct(">>") => depth = depth.saturating_sub(2),
                _ => {}
            }
            if depth == 0 {
                break;
            }
        }
        Ok(Some(self.text_between(start, self.pos - 1).to_string()))
    }

    fn parse_return_type(&mut self) -> ParseResult<Option<String>> {
        if self.dialect == Dialect::TypeScript && self.eat_punct(":") {
            Ok(Some(self.capture_type(&["{", "=>", ";"])?))
        } else {
            Ok(None)
        }
    }

    fn parse_function(&mut self, kind: NodeKind) -> ParseResult<Node> {
        let is_async = self.eat_ident("async");
        if !self.eat_ident("function") {
            return Err(self.unexpected("'function'"));
        }
        let generator = self.eat_punct("*");
        let id = match self.peek_token() {
            Some(Token::Ident(name)) if !RESERVED_WORDS.contains(&name) => {
                self.advance()?;
                Some(identifier(name))
            }
            _ if kind == NodeKind::FunctionDeclaration => {
                return Err(self.unexpected("function name"));
            }
            _ => None,
        };
        let function = Node::new(kind)
            .with("async", is_async)
            .with("generator", generator)
            .with("id", id);
        self.parse_function_rest(function)
    }

    /// Type parameters, parameter list, return type and body
    fn parse_function_rest(&mut self, function: Node) -> ParseResult<Node> {
        let type_parameters = self.parse_type_parameters()?;
        let params = self.parse_params()?;
        let return_type = self.parse_return_type()?;
        let body = self.parse_block()?;
        Ok(function
            .with("typeParameters", type_parameters)
            .with("params", params)
            .with("returnType", return_type)
            .with("body", body))
    }

    fn parse_params(&mut self) -> ParseResult<Vec<Node>> {
        self.expect_punct("(")?;
        let allow_in = std::mem::replace(&mut self.allow_in, true);
        let mut params = Vec::new();
        while !self.check_punct(")") {
            params.push(self.parse_param()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        self.allow_in = allow_in;
        Ok(params)
    }

    fn parse_param(&mut self) -> ParseResult<Node> {
        if self.eat_punct("...") {
            let argument = self.parse_binding_target()?;
            let type_annotation = if self.dialect == Dialect::TypeScript && self.eat_punct(":") {
                Some(self.capture_type(&[",", ")"])?)
            } else {
                None
            };
            return Ok(Node::new(NodeKind::RestElement)
                .with("argument", argument)
                .with("typeAnnotation", type_annotation));
        }

        let mut target = self.parse_binding_target()?;
        if self.dialect == Dialect::TypeScript {
            if self.eat_punct("?") {
                target.set("optional", true);
            }
            if self.eat_punct(":") {
                let annotation = self.capture_type(&[",", ")", "="])?;
                target.set("typeAnnotation", annotation);
            }
        }
        if self.eat_punct("=") {
            let right = self.parse_assignment()?;
            return Ok(Node::new(NodeKind::AssignmentPattern)
                .with("left", target)
                .with("right", right));
        }
        Ok(target)
    }

    fn parse_if(&mut self) -> ParseResult<Node> {
        self.advance()?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        let consequent = self.parse_statement_tolerant()?;
        let alternate = if self.eat_ident("else") {
            Some(self.parse_statement_tolerant()?)
        } else {
            None
        };
        Ok(Node::new(NodeKind::IfStatement)
            .with("test", test)
            .with("consequent", consequent)
            .with("alternate", alternate))
    }

    fn parse_for(&mut self) -> ParseResult<Node> {
        self.advance()?;
        self.expect_punct("(")?;

        let allow_in = std::mem::replace(&mut self.allow_in, false);
        let init = if self.check_punct(";") {
            None
        } else if self.starts_declaration() {
            Some(self.parse_variable_declaration()?)
        } else {
            Some(self.parse_expression()?)
        };
        self.allow_in = allow_in;

        if let Some(left) = init.clone() {
            let kind = if self.eat_ident("of") {
                Some(NodeKind::ForOfStatement)
            } else if self.eat_ident("in") {
                Some(NodeKind::ForInStatement)
            } else {
                None
            };
            if let Some(kind) = kind {
                let right = if kind == NodeKind::ForOfStatement {
                    self.parse_assignment()?
                } else {
                    self.parse_expression()?
                };
                self.expect_punct(")")?;
                let body = self.parse_statement_tolerant()?;
                return Ok(Node::new(kind)
                    .with("left", left)
                    .with("right", right)
                    .with("body", body));
            }
        }

        self.expect_punct(";")?;
        let test = if self.check_punct(";") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(";")?;
        let update = if self.check_punct(")") {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_punct(")")?;
        let body = self.parse_statement_tolerant()?;

        Ok(Node::new(NodeKind::ForStatement)
            .with("init", init)
            .with("test", test)
            .with("update", update)
            .with("body", body))
    }

    fn parse_while(&mut self) -> ParseResult<Node> {
        self.advance()?;
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        let body = self.parse_statement_tolerant()?;
        Ok(Node::new(NodeKind::WhileStatement)
            .with("test", test)
            .with("body", body))
    }

    fn parse_do_while(&mut self) -> ParseResult<Node> {
        self.advance()?;
        let body = self.parse_statement_tolerant()?;
        if !self.eat_ident("while") {
            return Err(self.unexpected("'while'"));
        }
        self.expect_punct("(")?;
        let test = self.parse_expression()?;
        self.expect_punct(")")?;
        self.eat_punct(";");
        Ok(Node::new(NodeKind::DoWhileStatement)
            .with("body", body)
            .with("test", test))
    }

    fn parse_return_or_throw(&mut self, kind: NodeKind) -> ParseResult<Node> {
        self.advance()?;
        let ends_here = self.is_at_end()
            || self.newline_at(self.pos)
            || self.check_punct(";")
            || self.check_punct("}");
        let argument = if ends_here {
            if kind == NodeKind::ThrowStatement {
                return Err(self.unexpected("expression"));
            }
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume_semicolon()?;
        Ok(Node::new(kind).with("argument", argument))
    }

    fn parse_jump(&mut self, kind: NodeKind) -> ParseResult<Node> {
        self.advance()?;
        let label = match self.peek_token() {
            Some(Token::Ident(name)) if !self.newline_at(self.pos) => {
                self.advance()?;
                Some(name.to_string())
            }
            _ => None,
        };
        self.consume_semicolon()?;
        Ok(Node::new(kind).with("label", label))
    }

    fn parse_try(&mut self) -> ParseResult<Node> {
        self.advance()?;
        let body = self.parse_block()?;

        let handler = if self.eat_ident("catch") {
            let param = if self.eat_punct("(") {
                let mut param = self.parse_binding_target()?;
                if self.dialect == Dialect::TypeScript && self.eat_punct(":") {
                    let annotation = self.capture_type(&[")"])?;
                    param.set("typeAnnotation", annotation);
                }
                self.expect_punct(")")?;
                Some(param)
            } else {
                None
            };
            let catch_body = self.parse_block()?;
            Some(
                Node::new(NodeKind::CatchClause)
                    .with("param", param)
                    .with("body", catch_body),
            )
        } else {
            None
        };

        let finalizer = if self.eat_ident("finally") {
            Some(self.parse_block()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.unexpected("'catch' or 'finally'"));
        }

        Ok(Node::new(NodeKind::TryStatement)
            .with("block", body)
            .with("handler", handler)
            .with("finalizer", finalizer))
    }

    fn parse_export(&mut self) -> ParseResult<Node> {
        self.advance()?;

        if self.eat_ident("default") {
            let declaration = if self.check_ident("function") || self.async_function_at(self.pos) {
                self.parse_function(NodeKind::FunctionExpression)?
            } else {
                let expression = self.parse_assignment()?;
                self.consume_semicolon()?;
                expression
            };
            return Ok(Node::new(NodeKind::ExportDefaultDeclaration).with("declaration", declaration));
        }

        let declaration = if self.starts_declaration() {
            self.parse_variable_statement()?
        } else if self.check_ident("function") || self.async_function_at(self.pos) {
            self.parse_function(NodeKind::FunctionDeclaration)?
        } else {
            return Err(self.unexpected("declaration"));
        };
        Ok(Node::new(NodeKind::ExportNamedDeclaration).with("declaration", declaration))
    }

    fn parse_expression_statement(&mut self) -> ParseResult<Node> {
        let expression = self.parse_expression()?;
        self.consume_semicolon()?;
        Ok(Node::new(NodeKind::ExpressionStatement).with("expression", expression))
    }

    // ---------------------------------------------------------------
    // Expressions
    // ---------------------------------------------------------------

    fn parse_expression(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        let first = self.parse_assignment()?;
        if !self.check_punct(",") {
            return Ok(first);
        }
        let mut expressions = vec![first];
        while self.eat_punct(",") {
            expressions.push(self.parse_assignment()?);
        }
        Ok(Node::new(NodeKind::SequenceExpression)
            .with("expressions", expressions)
            .with_span(Span::new(start, self.previous_end())))
    }

    fn parse_assignment(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow.with_span(Span::new(start, self.previous_end())));
        }

        let left = self.parse_conditional()?;
        if let Some(Token::Punct(operator)) = self.peek_token() {
            if ASSIGNMENT_OPERATORS.contains(&operator) {
                self.advance()?;
                let right = self.parse_assignment()?;
                return Ok(Node::new(NodeKind::AssignmentExpression)
                    .with("operator", operator)
                    .with("left", left)
                    .with("right", right)
                    .with_span(Span::new(start, self.previous_end())));
            }
        }
        Ok(left)
    }

    fn try_parse_arrow(&mut self) -> ParseResult<Option<Node>> {
        let is_async = self.check_ident("async")
            && !self.newline_at(self.pos + 1)
            && self.arrow_starts_at(self.pos + 1);
        if !is_async && !self.arrow_starts_at(self.pos) {
            return Ok(None);
        }
        if is_async {
            self.advance()?;
        }

        let params = match self.peek_token() {
            Some(Token::Ident(name)) => {
                self.advance()?;
                vec![identifier(name)]
            }
            _ => self.parse_params()?,
        };
        let return_type = self.parse_return_type()?;
        self.expect_punct("=>")?;

        let body = if self.check_punct("{") {
            self.parse_block()?
        } else {
            self.parse_assignment()?
        };

        Ok(Some(
            Node::new(NodeKind::ArrowFunctionExpression)
                .with("async", is_async)
                .with("params", params)
                .with("returnType", return_type)
                .with("body", body),
        ))
    }

    /// `x =>` or a parenthesized list followed by `=>` (or a return type)
    fn arrow_starts_at(&self, index: usize) -> bool {
        match self.token_at(index) {
            Some(Token::Ident(name)) if !RESERVED_WORDS.contains(&name) => {
                self.punct_at(index + 1, "=>") && !self.newline_at(index + 1)
            }
            Some(Token::Punct("(")) => {
                let mut depth = 0usize;
                for (offset, lexeme) in self.tokens[index..].iter().enumerate() {
                    match lexeme.token {
                        Token::Punct("(" | "[" | "{") => depth += 1,
                        Token::Punct(")" | "]" | "}") => {
                            depth = depth.saturating_sub(1);
                            if depth == 0 {
                                let next = index + offset + 1;
                                return self.punct_at(next, "=>")
                                    || (self.dialect == Dialect::TypeScript
                                        && self.punct_at(next, ":")
                                        && self.return_type_then_arrow(next + 1));
                            }
                        }
                        _ => {}
                    }
                }
                false
            }
            _ => false,
        }
    }

    fn return_type_then_arrow(&self, index: usize) -> bool {
        let mut depth = 0usize;
        for lexeme in &self.tokens[index.min(self.tokens.len())..] {
            match lexeme.token {
                Token::Punct("(" | "[" | "{" | "<") => depth += 1,
                Token::Punct(")" | "]" | "}" | ">") => {
                    if depth == 0 {
                        return false;
                    }
                    depth -= 1;
                }
                Token::Punct("=>") if depth == 0 => return true,
                Token::Punct(";" | "," | "=") if depth == 0 => return false,
                _ => {}
            }
        }
        false
    }

    fn parse_conditional(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        let test = self.parse_binary(0)?;
        if !self.eat_punct("?") {
            return Ok(test);
        }
        let allow_in = std::mem::replace(&mut self.allow_in, true);
        let consequent = self.parse_assignment();
        self.allow_in = allow_in;
        let consequent = consequent?;
        self.expect_punct(":")?;
        let alternate = self.parse_assignment()?;
        Ok(Node::new(NodeKind::ConditionalExpression)
            .with("test", test)
            .with("consequent", consequent)
            .with("alternate", alternate)
            .with_span(Span::new(start, self.previous_end())))
    }

    fn binary_operator(&self) -> Option<(u8, &'src str)> {
        let precedence = match self.peek_token()? {
            Token::Punct(op) => match op {
                "??" => (1, op),
                "||" => (2, op),
                "&&" => (3, op),
                "|" => (4, op),
                "^" => (5, op),
                "&" => (6, op),
                "==" | "!=" | "===" | "!==" => (7, op),
                "<" | ">" | "<=" | ">=" => (8, op),
                "<<" | ">>" | ">>>" => (9, op),
                "+" | "-" => (10, op),
                "*" | "/" | "%" => (11, op),
                "**" => (12, op),
                _ => return None,
            },
            Token::Ident(word @ "instanceof") => (8, word),
            Token::Ident(word @ "in") if self.allow_in => (8, word),
            _ => return None,
        };
        Some(precedence)
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult<Node> {
        let start = self.current_start();
        let mut left = self.parse_unary()?;

        loop {
            if self.dialect == Dialect::TypeScript && min_precedence <= 8 {
                if let Some(Token::Ident(operator @ ("as" | "satisfies"))) = self.peek_token() {
                    if !self.newline_at(self.pos) {
                        self.advance()?;
                        let annotation =
                            self.capture_type(&[")", "]", "}", ",", ";", "=", "?", ":"])?;
                        left = Node::new(NodeKind::TsAsExpression)
                            .with("expression", left)
                            .with("operator", operator)
                            .with("typeAnnotation", annotation)
                            .with_span(Span::new(start, self.previous_end()));
                        continue;
                    }
                }
            }

            let Some((precedence, operator)) = self.binary_operator() else {
                break;
            };
            if precedence < min_precedence {
                break;
            }
            self.advance()?;
            let next_min = if operator == "**" {
                precedence
            } else {
                precedence + 1
            };
            let right = self.parse_binary(next_min)?;
            left = Node::new(NodeKind::BinaryExpression)
                .with("operator", operator)
                .with("left", left)
                .with("right", right)
                .with_span(Span::new(start, self.previous_end()));
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        let node = match self.peek_token() {
            Some(Token::Punct(operator @ ("!" | "-" | "+" | "~")))
            | Some(Token::Ident(operator @ ("typeof" | "void" | "delete"))) => {
                self.advance()?;
                let argument = self.parse_unary()?;
                Node::new(NodeKind::UnaryExpression)
                    .with("operator", operator)
                    .with("argument", argument)
            }
            Some(Token::Punct(operator @ ("++" | "--"))) => {
                self.advance()?;
                let argument = self.parse_unary()?;
                Node::new(NodeKind::UpdateExpression)
                    .with("operator", operator)
                    .with("prefix", true)
                    .with("argument", argument)
            }
            Some(Token::Ident("await")) if self.await_has_operand() => {
                self.advance()?;
                let argument = self.parse_unary()?;
                Node::new(NodeKind::AwaitExpression).with("argument", argument)
            }
            _ => return self.parse_postfix(),
        };
        Ok(node.with_span(Span::new(start, self.previous_end())))
    }

    fn await_has_operand(&self) -> bool {
        let next = self.pos + 1;
        if self.newline_at(next) {
            return false;
        }
        !matches!(
            self.token_at(next),
            None | Some(Token::Punct(")" | "]" | "}" | ";" | "," | ":" | "=" | "." | "?."))
        )
    }

    fn parse_postfix(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        let expression = self.parse_call_member()?;
        if !self.newline_at(self.pos) {
            if let Some(Token::Punct(operator @ ("++" | "--"))) = self.peek_token() {
                self.advance()?;
                return Ok(Node::new(NodeKind::UpdateExpression)
                    .with("operator", operator)
                    .with("prefix", false)
                    .with("argument", expression)
                    .with_span(Span::new(start, self.previous_end())));
            }
        }
        Ok(expression)
    }

    fn parse_call_member(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        let mut expression = if self.check_ident("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };

        loop {
            match self.peek_token() {
                Some(Token::Punct(".")) => {
                    self.advance()?;
                    let property = self.parse_property_name()?;
                    expression = member_expression(expression, property, false, false);
                }
                Some(Token::Punct("?.")) => {
                    self.advance()?;
                    if self.check_punct("(") {
                        let arguments = self.parse_arguments()?;
                        expression = call_expression(expression, arguments, true);
                    } else if self.eat_punct("[") {
                        let property = self.parse_computed_property()?;
                        expression = member_expression(expression, property, true, true);
                    } else {
                        let property = self.parse_property_name()?;
                        expression = member_expression(expression, property, false, true);
                    }
                }
                Some(Token::Punct("[")) => {
                    self.advance()?;
                    let property = self.parse_computed_property()?;
                    expression = member_expression(expression, property, true, false);
                }
                Some(Token::Punct("(")) => {
                    let arguments = self.parse_arguments()?;
                    expression = call_expression(expression, arguments, false);
                }
                Some(Token::Punct("!"))
                    if self.dialect == Dialect::TypeScript && self.non_null_assertion() =>
                {
                    self.advance()?;
                    expression =
                        Node::new(NodeKind::TsNonNullExpression).with("expression", expression);
                }
                Some(Token::Template(_)) if !self.newline_at(self.pos) => {
                    return Err(self.unexpected("tagged template support"));
                }
                _ => break,
            }
            expression.span = Some(Span::new(start, self.previous_end()));
        }

        Ok(expression)
    }

    fn non_null_assertion(&self) -> bool {
        if self.newline_at(self.pos) {
            return false;
        }
        matches!(
            self.token_at(self.pos + 1),
            None | Some(Token::Punct(
                "." | "?." | ")" | "]" | "}" | ";" | "," | "[" | "(" | "=" | ":"
            ))
        )
    }

    fn parse_property_name(&mut self) -> ParseResult<Node> {
        if self.eat_punct("#") {
            let name = self.expect_ident()?;
            return Ok(identifier(&format!("#{}", name)));
        }
        let name = self.expect_ident()?;
        Ok(identifier(name))
    }

    fn parse_computed_property(&mut self) -> ParseResult<Node> {
        let allow_in = std::mem::replace(&mut self.allow_in, true);
        let property = self.parse_expression();
        self.allow_in = allow_in;
        let property = property?;
        self.expect_punct("]")?;
        Ok(property)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Node>> {
        self.expect_punct("(")?;
        let allow_in = std::mem::replace(&mut self.allow_in, true);
        let mut arguments = Vec::new();
        while !self.check_punct(")") {
            let argument = if self.eat_punct("...") {
                Node::new(NodeKind::SpreadElement).with("argument", self.parse_assignment()?)
            } else {
                self.parse_assignment()?
            };
            arguments.push(argument);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        self.allow_in = allow_in;
        Ok(arguments)
    }

    fn parse_new(&mut self) -> ParseResult<Node> {
        self.advance()?;
        let mut callee = if self.check_ident("new") {
            self.parse_new()?
        } else {
            self.parse_primary()?
        };
        loop {
            if self.eat_punct(".") {
                let property = self.parse_property_name()?;
                callee = member_expression(callee, property, false, false);
            } else if self.eat_punct("[") {
                let property = self.parse_computed_property()?;
                callee = member_expression(callee, property, true, false);
            } else {
                break;
            }
        }
        let arguments = if self.check_punct("(") {
            Some(self.parse_arguments()?)
        } else {
            None
        };
        let node = Node::new(NodeKind::NewExpression).with("callee", callee);
        Ok(match arguments {
            Some(arguments) => node.with("arguments", arguments),
            None => node.with("arguments", None::<Node>),
        })
    }

    fn parse_primary(&mut self) -> ParseResult<Node> {
        let start = self.current_start();
        let token = self
            .peek_token()
            .ok_or_else(|| ParseError::unexpected_eof("expression"))?;

        let node = match token {
            Token::Ident("function") => self.parse_function(NodeKind::FunctionExpression)?,
            Token::Ident("async") if self.async_function_at(self.pos) => {
                self.parse_function(NodeKind::FunctionExpression)?
            }
            Token::Ident("this") => {
                self.advance()?;
                Node::new(NodeKind::ThisExpression)
            }
            Token::Ident(word @ ("null" | "true" | "false")) => {
                self.advance()?;
                literal(word)
            }
            Token::Ident("import")
                if !self.punct_at(self.pos + 1, "(") && !self.punct_at(self.pos + 1, ".") =>
            {
                return Err(self.unexpected("expression"));
            }
            Token::Ident(word) if RESERVED_WORDS.contains(&word) => {
                return Err(self.unexpected("expression"));
            }
            Token::Ident(name) => {
                self.advance()?;
                identifier(name)
            }
            Token::Number(raw) | Token::String(raw) => {
                self.advance()?;
                literal(raw)
            }
            Token::Template(raw) => {
                self.advance()?;
                Node::new(NodeKind::TemplateLiteral).with("raw", raw)
            }
            Token::Punct("(") => {
                self.advance()?;
                let allow_in = std::mem::replace(&mut self.allow_in, true);
                let expression = self.parse_expression();
                self.allow_in = allow_in;
                let expression = expression?;
                self.expect_punct(")")?;
                Node::new(NodeKind::ParenthesizedExpression).with("expression", expression)
            }
            Token::Punct("[") => self.parse_array_literal()?,
            Token::Punct("{") => self.parse_object_literal()?,
            _ => return Err(self.unexpected("expression")),
        };

        Ok(node.with_span(Span::new(start, self.previous_end())))
    }

    fn parse_array_literal(&mut self) -> ParseResult<Node> {
        self.expect_punct("[")?;
        let allow_in = std::mem::replace(&mut self.allow_in, true);
        let mut elements = Vec::new();
        loop {
            if self.check_punct("]") {
                break;
            }
            if self.eat_punct(",") {
                elements.push(Node::new(NodeKind::Elision));
                continue;
            }
            let element = if self.eat_punct("...") {
                Node::new(NodeKind::SpreadElement).with("argument", self.parse_assignment()?)
            } else {
                self.parse_assignment()?
            };
            elements.push(element);
            if !self.check_punct("]") {
                self.expect_punct(",")?;
            }
        }
        self.expect_punct("]")?;
        self.allow_in = allow_in;
        Ok(Node::new(NodeKind::ArrayExpression).with("elements", elements))
    }

    fn parse_object_literal(&mut self) -> ParseResult<Node> {
        self.expect_punct("{")?;
        let allow_in = std::mem::replace(&mut self.allow_in, true);
        let mut properties = Vec::new();
        while !self.check_punct("}") {
            properties.push(self.parse_property()?);
            if !self.check_punct("}") {
                self.expect_punct(",")?;
            }
        }
        self.expect_punct("}")?;
        self.allow_in = allow_in;
        Ok(Node::new(NodeKind::ObjectExpression).with("properties", properties))
    }

    fn parse_property(&mut self) -> ParseResult<Node> {
        if self.eat_punct("...") {
            return Ok(Node::new(NodeKind::SpreadElement).with("argument", self.parse_assignment()?));
        }

        let is_async = self.check_ident("async")
            && !self.newline_at(self.pos + 1)
            && !matches!(
                self.token_at(self.pos + 1),
                Some(Token::Punct("(" | ":" | "," | "}" | "="))
            );
        if is_async {
            self.advance()?;
        }
        let generator = self.eat_punct("*");

        let (key, computed) = match self.peek_token() {
            Some(Token::Punct("[")) => {
                self.advance()?;
                (self.parse_computed_property()?, true)
            }
            Some(Token::Ident(name)) => {
                self.advance()?;
                (identifier(name), false)
            }
            Some(Token::String(raw)) | Some(Token::Number(raw)) => {
                self.advance()?;
                (literal(raw), false)
            }
            _ => return Err(self.unexpected("property key")),
        };

        let property = Node::new(NodeKind::Property)
            .with("key", key.clone())
            .with("computed", computed);

        if self.check_punct("(") || self.check_punct("<") {
            let method = Node::new(NodeKind::FunctionExpression)
                .with("async", is_async)
                .with("generator", generator)
                .with("id", None::<Node>);
            let method = self.parse_function_rest(method)?;
            return Ok(property
                .with("value", method)
                .with("shorthand", false)
                .with("method", true));
        }
        if is_async || generator {
            return Err(self.unexpected("'('"));
        }

        if self.eat_punct(":") {
            let value = self.parse_assignment()?;
            return Ok(property
                .with("value", value)
                .with("shorthand", false)
                .with("method", false));
        }

        if computed || !key.is(NodeKind::Identifier) {
            return Err(self.unexpected("':'"));
        }

        let value = if self.eat_punct("=") {
            Node::new(NodeKind::AssignmentPattern)
                .with("left", key)
                .with("right", self.parse_assignment()?)
        } else {
            key
        };
        Ok(property
            .with("value", value)
            .with("shorthand", true)
            .with("method", false))
    }
}

fn closer_for(opener: &str) -> &'static str {
    match opener {
        "(" => ")",
        "[" => "]",
        _ => "}",
    }
}

fn member_expression(object: Node, property: Node, computed: bool, optional: bool) -> Node {
    Node::new(NodeKind::MemberExpression)
        .with("object", object)
        .with("property", property)
        .with("computed", computed)
        .with("optional", optional)
}

fn call_expression(callee: Node, arguments: Vec<Node>, optional: bool) -> Node {
    Node::new(NodeKind::CallExpression)
        .with("callee", callee)
        .with("arguments", arguments)
        .with("optional", optional)
}

/// Parse a JavaScript or TypeScript program
pub fn parse(source: &str, dialect: Dialect) -> ParseResult<Node> {
    let mut parser = Parser::new(source, dialect)?;
    parser.parse_program()
}
