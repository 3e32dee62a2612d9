/// Markup scanner coverage: tolerance, embedded content and printing
use crate::markup::has_attribute;
use crate::*;

fn roundtrip(source: &str) -> String {
    let document = parse_markup(source).expect(&format!("Failed to parse: {}", source));
    print_markup(&document).expect(&format!("Failed to print: {}", source))
}

fn first_element(document: &Node) -> &Node {
    document
        .children("children")
        .iter()
        .find(|node| node.is(NodeKind::Element))
        .expect("document has an element")
}

#[test]
fn test_document_roundtrip() {
    let sources = vec![
        "<!DOCTYPE html>\n<html>\n<body>\n<img src=\"a.png\">\n</body>\n</html>\n",
        "<div class='card' hidden data-x=1>text &amp; more</div>",
        "<ul><li>one<li>two</ul>",
        "<p>Unclosed paragraph",
        "<!-- note -->\n<br/>",
    ];

    for source in sources {
        let printed = roundtrip(source);
        let reprinted = roundtrip(&printed);
        assert_eq!(printed, reprinted, "print was not stable: {}", source);
    }

    assert_eq!(
        roundtrip("<!DOCTYPE html>\n<html>\n<body>\n<img src=\"a.png\">\n</body>\n</html>\n"),
        "<!DOCTYPE html>\n<html>\n<body>\n<img src=\"a.png\">\n</body>\n</html>\n"
    );
}

#[test]
fn test_void_and_self_closing_elements() {
    let document = parse_markup("<img src=\"a.png\"><input />").unwrap();
    let children = document.children("children");

    assert_eq!(children.len(), 2);
    assert!(children[0].children("children").is_empty());
    assert!(children[1].flag("selfClosing"));
}

#[test]
fn test_attributes() {
    let document = parse_markup("<button type=\"button\" disabled role=tab>Go</button>").unwrap();
    let button = first_element(&document);

    assert!(has_attribute(button, "disabled"));
    assert_eq!(markup::attribute_value(button, "type"), Some("button"));
    assert_eq!(markup::attribute_value(button, "role"), Some("tab"));
}

#[test]
fn test_adjacent_comments_annotate_elements() {
    let document = parse_markup("<!-- Added alt attribute --><img src=\"a.png\">").unwrap();
    let image = first_element(&document);

    assert_eq!(image.comments, vec!["Added alt attribute".to_string()]);
    assert_eq!(document.children("children").len(), 1);
}

#[test]
fn test_separated_comments_stay_standalone() {
    let document = parse_markup("<!-- heading -->\n<h1>Title</h1>").unwrap();
    let children = document.children("children");

    assert!(children[0].is(NodeKind::Comment));
    assert!(first_element(&document).comments.is_empty());
}

#[test]
fn test_stray_and_missing_end_tags() {
    let document = parse_markup("</div>text<div><span>a</div>").unwrap();
    let children = document.children("children");

    assert!(children[0].is(NodeKind::Text));
    assert_eq!(children[0].text("text"), Some("</div>"));

    let div = &children[2];
    assert!(div.flag("closed"));
    let span = &div.children("children")[0];
    assert!(!span.flag("closed"));
    assert_eq!(print_markup(&document).unwrap(), "</div>text<div><span>a</div>");
}

#[test]
fn test_style_attribute_and_element() {
    let document = parse_markup("<p style=\"color: #777\">x</p><style>p { margin: 0 }</style>").unwrap();
    let children = document.children("children");

    let attribute = &children[0].children("attributes")[0];
    assert!(attribute.child("value").unwrap().is(NodeKind::StyleSheet));

    let sheet = &children[1].children("children")[0];
    assert!(sheet.is(NodeKind::StyleSheet));
}

#[test]
fn test_script_elements() {
    let document = parse_markup(
        "<script>\nvar a = 1;\n</script><script lang=\"ts\">\nlet b: number = 2;\n</script><script type=\"application/json\">{\"a\": 1}</script>",
    )
    .unwrap();
    let scripts: Vec<&Node> = document.children("children").iter().collect();

    assert!(scripts[0].children("children")[0].is(NodeKind::Program));
    assert!(scripts[1].children("children")[0].is(NodeKind::Program));
    assert!(scripts[2].children("children")[0].is(NodeKind::Text));
}

#[test]
fn test_unparseable_script_stays_text() {
    let source = "<script>\nfoo(;\n</script>";
    let document = parse_markup(source).unwrap();
    let script = first_element(&document);

    assert!(script.children("children")[0].is(NodeKind::Text));
    assert_eq!(print_markup(&document).unwrap(), source);
}

#[test]
fn test_vue_component_roundtrip() {
    let source = "<template>\n  <div :class=\"{ active }\" @click=\"go\">{{ msg }}</div>\n</template>\n\n<script>\nexport default {};\n</script>\n\n<style scoped>\n.a { color: red; }\n</style>\n";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn test_markup_errors() {
    assert!(matches!(
        parse_markup("<div class=\"a>"),
        Err(ParseError::Unterminated {
            construct: "attribute value",
            ..
        })
    ));
    assert!(matches!(
        parse_markup("<!-- never closed"),
        Err(ParseError::Unterminated {
            construct: "comment",
            ..
        })
    ));
    assert!(matches!(
        parse_markup("<div"),
        Err(ParseError::Unterminated { construct: "tag", .. })
    ));
}

#[test]
fn test_print_rejects_script_nodes_at_top_level() {
    let document = Node::new(NodeKind::Document).with("children", vec![Node::new(NodeKind::ReturnStatement)]);
    assert!(print_markup(&document).is_err());
}
