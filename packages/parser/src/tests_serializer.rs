/// Serializer coverage: normalized output, annotations and print failures
use crate::builders::{call, catch_clause, expression_statement, identifier, literal, member, try_statement};
use crate::*;

fn roundtrip(source: &str) -> String {
    let program = parse(source, Dialect::JavaScript).expect(&format!("Failed to parse: {}", source));
    serialize(&program).expect(&format!("Failed to serialize: {}", source))
}

#[test]
fn test_roundtrip_is_stable_for_normalized_source() {
    let sources = vec![
        "var x = 1;\n",
        "let a = 1, b;\n",
        "const o = { a: 1, b };\n",
        "foo(a, ...rest);\n",
        "a?.b?.[c]?.(d);\n",
        "x = cond ? -y : typeof z;\n",
        "const f = async (a) => await a;\n",
        "for (let i = 0; i < 10; i++) {\n  total += i;\n}\n",
        "if (a) {\n  b();\n} else if (c) {\n  d();\n} else {\n  e();\n}\n",
        "try {\n  a();\n} catch (e) {\n  b(e);\n} finally {\n  c();\n}\n",
        "export default {\n  data() {\n    return {};\n  }\n};\n",
        "const list = [1, , 3];\n",
        "new Date();\nnew Foo;\n",
    ];

    for source in sources {
        assert_eq!(roundtrip(source), source, "source was not stable: {}", source);
    }
}

#[test]
fn test_formatting_is_normalized() {
    assert_eq!(roundtrip("var   x=1"), "var x = 1;\n");
    assert_eq!(roundtrip("if (a) b(); else c();"), "if (a)\n  b();\nelse\n  c();\n");
    assert_eq!(roundtrip("const g = x => x * 2"), "const g = (x) => x * 2;\n");
}

#[test]
fn test_second_print_is_a_fixed_point() {
    let source = "function load(){fetch('/a').then(r=>r.json())\n}\nclass A {}\n";
    let once = roundtrip(source);
    let twice = roundtrip(&once);

    assert_eq!(once, twice);
}

#[test]
fn test_multiline_objects() {
    let source = "const o = {\n  m() {\n    return 1;\n  },\n  x: 2\n};\n";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn test_raw_statements_print_verbatim() {
    let source = "class  A  { }\nfoo();\n";
    assert_eq!(roundtrip(source), "class  A  { }\nfoo();\n");
}

#[test]
fn test_blank_lines_are_preserved() {
    assert_eq!(roundtrip("a();\n\n\nb();"), "a();\n\nb();\n");
}

#[test]
fn test_comments_survive() {
    let source = "// Header\n\n// lead\nfoo();\nfunction f() {\n  a();\n  // done\n}\n// tail\n";
    assert_eq!(roundtrip(source), source);
}

#[test]
fn test_annotations_print_as_comments() {
    let mut program = parse("foo(x);", Dialect::JavaScript).unwrap();
    program.annotate("Header note");
    let statement = &mut program.children_mut("body").unwrap()[0];
    statement.annotate("Statement note");
    statement
        .child_mut("expression")
        .unwrap()
        .annotate("Inline note");

    assert_eq!(
        serialize(&program).unwrap(),
        "// Header note\n\n// Statement note\n/* Inline note */ foo(x);\n"
    );
}

#[test]
fn test_serialize_try_catch_template() {
    let fetch = expression_statement(call(identifier("fetch"), vec![literal("'/a'")]));
    let handler = catch_clause(
        Some(identifier("error")),
        vec![expression_statement(call(
            member(identifier("console"), "error"),
            vec![identifier("error")],
        ))],
    );
    let program = Node::new(NodeKind::Program).with("body", vec![try_statement(vec![fetch], Some(handler), None)]);

    assert_eq!(
        serialize(&program).unwrap(),
        "try {\n  fetch('/a');\n} catch (error) {\n  console.error(error);\n}\n"
    );
}

#[test]
fn test_unfilled_hole_is_an_error() {
    let program = Node::new(NodeKind::Program).with(
        "body",
        vec![Node::new(NodeKind::ExpressionStatement).with("expression", Node::hole())],
    );
    assert_eq!(serialize(&program), Err(PrintError::UnfilledHole));

    let program = Node::new(NodeKind::Program).with("body", vec![Node::hole()]);
    assert_eq!(serialize(&program), Err(PrintError::UnfilledHole));
}

#[test]
fn test_wrong_family_is_an_error() {
    let program = Node::new(NodeKind::Program).with("body", vec![Node::new(NodeKind::Element)]);
    assert!(matches!(
        serialize(&program),
        Err(PrintError::UnexpectedNode {
            kind: NodeKind::Element,
            ..
        })
    ));
}

#[test]
fn test_missing_field_is_an_error() {
    let program = Node::new(NodeKind::Program)
        .with("body", vec![Node::new(NodeKind::ExpressionStatement)]);
    assert_eq!(
        serialize(&program),
        Err(PrintError::MissingField {
            kind: NodeKind::ExpressionStatement,
            field: "expression",
        })
    );
}

#[test]
fn test_typescript_roundtrip() {
    let source = "function f(a?: string, b: number = 1): void {}\nconst x: Map<string, number> = y as Foo;\nz!.w();\n";
    let program = parse(source, Dialect::TypeScript).unwrap();
    assert_eq!(serialize(&program).unwrap(), source);
}
