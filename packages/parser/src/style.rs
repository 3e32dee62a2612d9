use crate::ast::{Node, NodeKind, Span};
use crate::error::{PrintError, PrintResult};
use crate::serializer::format_comment;
use regex::Regex;
use std::sync::OnceLock;

fn declaration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?P<property>-{0,2}[A-Za-z][A-Za-z0-9_-]*)(?P<separator>\s*:\s*)(?P<value>[^;{}]*)")
            .unwrap()
    })
}

/// Segment a style sheet (or an inline `style` attribute value) into
/// `Declaration` and verbatim `StyleText` items.
///
/// Concatenating the items reproduces the input exactly. Text inside
/// comments is never treated as a declaration.
pub fn parse_style(source: &str) -> Node {
    let mut items = Vec::new();
    let mut cursor = 0;

    for (start, end) in code_regions(source) {
        let region = &source[start..end];
        for captures in declaration_pattern().captures_iter(region) {
            let (Some(whole), Some(property), Some(separator), Some(value)) = (
                captures.get(0),
                captures.name("property"),
                captures.name("separator"),
                captures.name("value"),
            ) else {
                continue;
            };

            if region[whole.end()..].starts_with('{') || starts_mid_word(region, whole.start()) {
                continue;
            }
            let value_text = value.as_str().trim_end();
            if value_text.is_empty() {
                continue;
            }

            let declaration_start = start + whole.start();
            let declaration_end = start + value.start() + value_text.len();
            if cursor < declaration_start {
                items.push(style_text(&source[cursor..declaration_start]));
            }
            items.push(
                Node::new(NodeKind::Declaration)
                    .with("property", property.as_str())
                    .with("separator", separator.as_str())
                    .with("value", value_text)
                    .with_span(Span::new(declaration_start, declaration_end)),
            );
            cursor = declaration_end;
        }
    }

    if cursor < source.len() {
        items.push(style_text(&source[cursor..]));
    }

    Node::new(NodeKind::StyleSheet)
        .with("items", items)
        .with_span(Span::new(0, source.len()))
}

fn style_text(text: &str) -> Node {
    Node::new(NodeKind::StyleText).with("text", text)
}

fn starts_mid_word(region: &str, index: usize) -> bool {
    region[..index]
        .chars()
        .next_back()
        .map_or(false, |c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Byte ranges outside `/* ... */` comments
fn code_regions(source: &str) -> Vec<(usize, usize)> {
    let mut regions = Vec::new();
    let mut position = 0;
    while let Some(offset) = source[position..].find("/*") {
        let comment_start = position + offset;
        if comment_start > position {
            regions.push((position, comment_start));
        }
        match source[comment_start + 2..].find("*/") {
            Some(close) => position = comment_start + 2 + close + 2,
            None => return regions,
        }
    }
    if position < source.len() {
        regions.push((position, source.len()));
    }
    regions
}

/// Print a `StyleSheet`, rendering declaration annotations as `/* note */`
pub fn print_style(sheet: &Node) -> PrintResult<String> {
    if !sheet.is(NodeKind::StyleSheet) {
        return Err(PrintError::unexpected(sheet.kind, "style sheet"));
    }
    let mut output = String::new();
    for item in sheet.children("items") {
        match item.kind {
            NodeKind::StyleText => output.push_str(item.text("text").unwrap_or_default()),
            NodeKind::Declaration => {
                for comment in &item.comments {
                    output.push_str(&format_comment(comment, false));
                    output.push(' ');
                }
                for field in ["property", "separator", "value"] {
                    let text = item.text(field).ok_or(PrintError::MissingField {
                        kind: item.kind,
                        field,
                    })?;
                    output.push_str(text);
                }
            }
            kind => return Err(PrintError::unexpected(kind, "style sheet")),
        }
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declarations(sheet: &Node) -> Vec<(&str, &str)> {
        sheet
            .children("items")
            .iter()
            .filter(|item| item.is(NodeKind::Declaration))
            .map(|item| (item.text("property").unwrap(), item.text("value").unwrap()))
            .collect()
    }

    #[test]
    fn test_segments_rules() {
        let source = ".a { color: #777; margin : 0 auto }\n";
        let sheet = parse_style(source);

        assert_eq!(declarations(&sheet), vec![("color", "#777"), ("margin", "0 auto")]);
        assert_eq!(print_style(&sheet).unwrap(), source);
    }

    #[test]
    fn test_selectors_with_colons_are_not_declarations() {
        let source = "a:hover { color: red }";
        let sheet = parse_style(source);

        assert_eq!(declarations(&sheet), vec![("color", "red")]);
        assert_eq!(print_style(&sheet).unwrap(), source);
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "/* color: #fff */ p { color: blue; }";
        let sheet = parse_style(source);

        assert_eq!(declarations(&sheet), vec![("color", "blue")]);
        assert_eq!(print_style(&sheet).unwrap(), source);
    }

    #[test]
    fn test_inline_attribute_value() {
        let sheet = parse_style("color: #aaa; font-size: 12px");
        assert_eq!(
            declarations(&sheet),
            vec![("color", "#aaa"), ("font-size", "12px")]
        );
    }

    #[test]
    fn test_annotation_printed_before_declaration() {
        let mut sheet = parse_style("color: red;");
        sheet.children_mut("items").unwrap()[0].annotate("note");

        assert_eq!(print_style(&sheet).unwrap(), "/* note */ color: red;");
    }
}
