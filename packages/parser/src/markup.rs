//! Tolerant HTML scanner and printer, also used for Vue single-file components
use crate::ast::{Field, Node, NodeKind, Span};
use crate::error::{ParseError, ParseResult, PrintError, PrintResult};
use crate::parser::{parse, Dialect};
use crate::serializer::serialize;
use crate::style::{parse_style, print_style};
use tracing::debug;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

const SCRIPT_TYPES: &[&str] = &[
    "",
    "module",
    "text/javascript",
    "application/javascript",
    "text/typescript",
    "application/typescript",
];

/// Parse HTML or a Vue single-file component into a `Document`
pub fn parse_markup(source: &str) -> ParseResult<Node> {
    let mut scanner = Scanner {
        source,
        pos: 0,
        open: Vec::new(),
    };
    let children = scanner.parse_children()?;
    Ok(Node::new(NodeKind::Document)
        .with("children", children)
        .with_span(Span::new(0, source.len())))
}

struct Scanner<'src> {
    source: &'src str,
    pos: usize,
    /// Lowercased names of the elements currently open
    open: Vec<String>,
}

impl<'src> Scanner<'src> {
    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn starts_element(&self) -> bool {
        let mut chars = self.rest().chars();
        chars.next() == Some('<') && chars.next().map_or(false, |c| c.is_ascii_alphabetic())
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> &'src str {
        let rest = self.rest();
        let length = rest.find(|c: char| !predicate(c)).unwrap_or(rest.len());
        self.pos += length;
        &rest[..length]
    }

    /// Children up to end of input or an end tag that closes an open element
    fn parse_children(&mut self) -> ParseResult<Vec<Node>> {
        let mut children = Vec::new();
        let mut pending_comments: Vec<Node> = Vec::new();

        while self.pos < self.source.len() {
            let rest = self.rest();

            if rest.starts_with("<!--") {
                let comment = self.parse_comment()?;
                pending_comments.push(comment);
                if !(self.rest().starts_with("<!--") || self.starts_element()) {
                    children.append(&mut pending_comments);
                }
                continue;
            }

            if rest.starts_with("</") {
                let name = end_tag_name(rest);
                if self.open.iter().any(|open| *open == name) {
                    break;
                }
                children.append(&mut pending_comments);
                children.push(self.parse_stray_end_tag()?);
                continue;
            }

            if rest.starts_with("<!") || rest.starts_with("<?") {
                children.append(&mut pending_comments);
                children.push(self.parse_doctype()?);
                continue;
            }

            if self.starts_element() {
                let mut element = self.parse_element()?;
                element.comments = pending_comments
                    .drain(..)
                    .filter_map(|comment| comment.text("text").map(str::to_string))
                    .collect();
                children.push(element);
                continue;
            }

            children.append(&mut pending_comments);
            children.push(self.parse_text());
        }

        children.append(&mut pending_comments);
        Ok(children)
    }

    fn parse_text(&mut self) -> Node {
        let start = self.pos;
        self.pos += self.rest().chars().next().map_or(1, char::len_utf8);
        while self.pos < self.source.len() {
            let rest = self.rest();
            if rest.starts_with('<')
                && (self.starts_element()
                    || rest.starts_with("</")
                    || rest.starts_with("<!")
                    || rest.starts_with("<?"))
            {
                break;
            }
            self.pos += rest.chars().next().map_or(1, char::len_utf8);
        }
        text_node(&self.source[start..self.pos], Span::new(start, self.pos))
    }

    fn parse_comment(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let body_start = start + 4;
        let close = self.source[body_start..]
            .find("-->")
            .ok_or_else(|| ParseError::unterminated(Span::new(start, body_start), "comment"))?;
        let body = &self.source[body_start..body_start + close];
        self.pos = body_start + close + 3;

        let text = if body.contains('\n') {
            body.to_string()
        } else {
            body.trim().to_string()
        };
        Ok(Node::new(NodeKind::Comment)
            .with("text", text)
            .with_span(Span::new(start, self.pos)))
    }

    fn parse_doctype(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let close = self
            .rest()
            .find('>')
            .ok_or_else(|| ParseError::unterminated(Span::new(start, start + 2), "declaration"))?;
        self.pos += close + 1;
        Ok(Node::new(NodeKind::Doctype)
            .with("text", &self.source[start..self.pos])
            .with_span(Span::new(start, self.pos)))
    }

    fn parse_stray_end_tag(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let close = self
            .rest()
            .find('>')
            .ok_or_else(|| ParseError::unterminated(Span::new(start, start + 2), "end tag"))?;
        self.pos += close + 1;
        debug!(tag = &self.source[start..self.pos], "keeping stray end tag as text");
        Ok(text_node(&self.source[start..self.pos], Span::new(start, self.pos)))
    }

    fn parse_element(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        self.pos += 1;
        let name = self.take_while(|c| !c.is_whitespace() && c != '>' && c != '/');
        let lowered = name.to_ascii_lowercase();

        let mut attributes = Vec::new();
        let mut self_closing = false;
        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(ParseError::unterminated(Span::new(start, self.pos), "tag"));
            }
            if rest.starts_with("/>") {
                self.pos += 2;
                self_closing = true;
                break;
            }
            if rest.starts_with('>') {
                self.pos += 1;
                break;
            }
            if rest.starts_with('/') {
                self.pos += 1;
                continue;
            }
            attributes.push(self.parse_attribute()?);
        }

        let element = Node::new(NodeKind::Element)
            .with("name", name)
            .with("attributes", attributes)
            .with("selfClosing", self_closing);

        if self_closing || VOID_ELEMENTS.contains(&lowered.as_str()) {
            return Ok(element
                .with("children", Vec::new())
                .with("closed", false)
                .with_span(Span::new(start, self.pos)));
        }

        if RAW_TEXT_ELEMENTS.contains(&lowered.as_str()) {
            let content_start = self.pos;
            let (content, closed) = self.take_raw_text(&lowered)?;
            let children = match content {
                "" => Vec::new(),
                _ => vec![embedded_content(&lowered, &element, content, content_start)],
            };
            return Ok(element
                .with("children", children)
                .with("closed", closed)
                .with_span(Span::new(start, self.pos)));
        }

        self.open.push(lowered.clone());
        let children = self.parse_children();
        self.open.pop();
        let children = children?;
        let closed = self.eat_end_tag(&lowered)?;

        Ok(element
            .with("children", children)
            .with("closed", closed)
            .with_span(Span::new(start, self.pos)))
    }

    fn parse_attribute(&mut self) -> ParseResult<Node> {
        let start = self.pos;
        let mut name = self.take_while(|c| !c.is_whitespace() && !matches!(c, '=' | '>' | '/'));
        if name.is_empty() {
            let length = self.rest().chars().next().map_or(1, char::len_utf8);
            name = &self.source[self.pos..self.pos + length];
            self.pos += length;
        }

        let before_value = self.pos;
        self.skip_whitespace();
        if !self.rest().starts_with('=') {
            self.pos = before_value;
            return Ok(attribute(name, Field::Empty, "", Span::new(start, self.pos)));
        }
        self.pos += 1;
        self.skip_whitespace();

        let (value, quote) = match self.rest().chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let value_start = self.pos + 1;
                let close = self.source[value_start..].find(quote).ok_or_else(|| {
                    ParseError::unterminated(Span::new(self.pos, value_start), "attribute value")
                })?;
                self.pos = value_start + close + 1;
                (&self.source[value_start..value_start + close], quote.to_string())
            }
            Some(_) => (
                self.take_while(|c| !c.is_whitespace() && c != '>'),
                String::new(),
            ),
            None => return Err(ParseError::unterminated(Span::new(start, self.pos), "tag")),
        };

        let value = if name.eq_ignore_ascii_case("style") {
            Field::from(parse_style(value))
        } else {
            Field::from(value)
        };
        Ok(attribute(name, value, &quote, Span::new(start, self.pos)))
    }

    /// Content of a raw text element up to its end tag, consuming the end tag
    fn take_raw_text(&mut self, name: &str) -> ParseResult<(&'src str, bool)> {
        let rest = self.rest();
        let needle = format!("</{}", name);
        match rest.to_ascii_lowercase().find(&needle) {
            Some(offset) => {
                let content = &rest[..offset];
                self.pos += offset;
                self.consume_end_tag()?;
                Ok((content, true))
            }
            None => {
                self.pos = self.source.len();
                Ok((rest, false))
            }
        }
    }

    fn eat_end_tag(&mut self, name: &str) -> ParseResult<bool> {
        let rest = self.rest();
        if rest.starts_with("</") && end_tag_name(rest) == name {
            self.consume_end_tag()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn consume_end_tag(&mut self) -> ParseResult<()> {
        let start = self.pos;
        let close = self
            .rest()
            .find('>')
            .ok_or_else(|| ParseError::unterminated(Span::new(start, start + 2), "end tag"))?;
        self.pos += close + 1;
        Ok(())
    }
}

fn end_tag_name(rest: &str) -> String {
    rest[2..]
        .split(|c: char| c.is_whitespace() || c == '>')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

fn text_node(text: &str, span: Span) -> Node {
    Node::new(NodeKind::Text).with("text", text).with_span(span)
}

fn attribute(name: &str, value: Field, quote: &str, span: Span) -> Node {
    Node::new(NodeKind::Attribute)
        .with("name", name)
        .with("value", value)
        .with("quote", quote)
        .with_span(span)
}

/// A double-quoted `name="value"` attribute
pub fn text_attribute(name: &str, value: &str) -> Node {
    Node::new(NodeKind::Attribute)
        .with("name", name)
        .with("value", value)
        .with("quote", "\"")
}

/// Attribute value of an element, if present with a textual value
pub fn attribute_value<'a>(element: &'a Node, name: &str) -> Option<&'a str> {
    element
        .children("attributes")
        .iter()
        .find(|attribute| {
            attribute
                .text("name")
                .map_or(false, |n| n.eq_ignore_ascii_case(name))
        })
        .and_then(|attribute| attribute.text("value"))
}

pub fn has_attribute(element: &Node, name: &str) -> bool {
    element.children("attributes").iter().any(|attribute| {
        attribute
            .text("name")
            .map_or(false, |n| n.eq_ignore_ascii_case(name))
    })
}

fn embedded_content(name: &str, element: &Node, content: &str, offset: usize) -> Node {
    let span = Span::new(offset, offset + content.len());
    match name {
        "style" => parse_style(content).with_span(span),
        "script" => {
            let script_type = attribute_value(element, "type")
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase();
            if !SCRIPT_TYPES.contains(&script_type.as_str()) || content.trim().is_empty() {
                return text_node(content, span);
            }
            let dialect = match attribute_value(element, "lang").map(str::to_ascii_lowercase) {
                Some(lang) if lang == "ts" || lang == "typescript" || lang == "tsx" => {
                    Dialect::TypeScript
                }
                _ if script_type.contains("typescript") => Dialect::TypeScript,
                _ => Dialect::JavaScript,
            };
            match parse(content, dialect) {
                Ok(program) => program.with_span(span),
                Err(error) => {
                    debug!(error = %error.shifted(offset), "keeping embedded script as text");
                    text_node(content, span)
                }
            }
        }
        _ => text_node(content, span),
    }
}

/// Print a `Document` back to markup
pub fn print_markup(document: &Node) -> PrintResult<String> {
    if !document.is(NodeKind::Document) {
        return Err(PrintError::unexpected(document.kind, "document"));
    }
    let mut output = String::new();
    for child in document.children("children") {
        write_node(child, &mut output)?;
    }
    Ok(output)
}

fn write_node(node: &Node, output: &mut String) -> PrintResult<()> {
    match node.kind {
        NodeKind::Text | NodeKind::Doctype => output.push_str(required_text(node, "text")?),
        NodeKind::Comment => {
            output.push_str(&format_markup_comment(required_text(node, "text")?));
        }
        NodeKind::Element => write_element(node, output)?,
        NodeKind::Program => {
            output.push('\n');
            output.push_str(&serialize(node)?);
        }
        NodeKind::StyleSheet => output.push_str(&print_style(node)?),
        kind => return Err(PrintError::unexpected(kind, "markup")),
    }
    Ok(())
}

fn write_element(element: &Node, output: &mut String) -> PrintResult<()> {
    for comment in &element.comments {
        output.push_str(&format_markup_comment(comment));
    }

    let name = required_text(element, "name")?;
    output.push('<');
    output.push_str(name);

    for attribute in element.children("attributes") {
        if !attribute.is(NodeKind::Attribute) {
            return Err(PrintError::unexpected(attribute.kind, "attribute"));
        }
        output.push(' ');
        output.push_str(required_text(attribute, "name")?);
        let quote = attribute.text("quote").unwrap_or("\"");
        let value = match attribute.get("value") {
            Some(Field::Text(value)) => Some(value.clone()),
            Some(Field::Node(sheet)) => Some(print_style(sheet)?),
            _ => None,
        };
        if let Some(value) = value {
            output.push('=');
            output.push_str(quote);
            output.push_str(&value);
            output.push_str(quote);
        }
    }

    if element.flag("selfClosing") {
        output.push_str(" />");
        return Ok(());
    }
    output.push('>');

    for child in element.children("children") {
        write_node(child, output)?;
    }

    if element.flag("closed") {
        output.push_str("</");
        output.push_str(name);
        output.push('>');
    }
    Ok(())
}

fn format_markup_comment(text: &str) -> String {
    if text.contains('\n') {
        format!("<!--{}-->", text)
    } else {
        format!("<!-- {} -->", text)
    }
}

fn required_text<'a>(node: &'a Node, field: &'static str) -> PrintResult<&'a str> {
    node.text(field).ok_or(PrintError::MissingField {
        kind: node.kind,
        field,
    })
}
