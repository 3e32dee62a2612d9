/// Script parser coverage: grammar subset, tolerance and comment attachment
use crate::*;

fn js(source: &str) -> Node {
    parse(source, Dialect::JavaScript).expect(&format!("Failed to parse: {}", source))
}

fn ts(source: &str) -> Node {
    parse(source, Dialect::TypeScript).expect(&format!("Failed to parse: {}", source))
}

#[test]
fn test_parse_variable_declaration() {
    let program = js("var x = 1;");
    let statement = &program.children("body")[0];

    assert!(statement.is(NodeKind::VariableDeclaration));
    assert_eq!(statement.text("kind"), Some("var"));

    let declarator = &statement.children("declarations")[0];
    assert_eq!(declarator.child("id").unwrap().text("name"), Some("x"));
    assert_eq!(declarator.child("init").unwrap().text("raw"), Some("1"));
}

#[test]
fn test_automatic_semicolons() {
    let program = js("let a = 1\nlet b = 2\nfoo()");
    let body = program.children("body");

    assert_eq!(body.len(), 3);
    assert!(body[2].is(NodeKind::ExpressionStatement));
}

#[test]
fn test_unsupported_statement_is_kept_verbatim() {
    let program = js("class A {\n  m() {}\n}\nfoo();\n");
    let body = program.children("body");

    assert_eq!(body.len(), 2);
    assert!(body[0].is(NodeKind::RawStatement));
    assert_eq!(body[0].text("text"), Some("class A {\n  m() {}\n}"));
    assert!(body[1].is(NodeKind::ExpressionStatement));
}

#[test]
fn test_raw_statement_ends_at_semicolon() {
    let program = js("const r = /ab+c/;\nr.test(x);");
    let body = program.children("body");

    assert!(body[0].is(NodeKind::RawStatement));
    assert_eq!(body[0].text("text"), Some("const r = /ab+c/;"));
    assert!(body[1].is(NodeKind::ExpressionStatement));
}

#[test]
fn test_raw_statement_inside_block_stops_at_closing_brace() {
    let program = js("function f() {\n  switch (x) { default: y(); }\n}");
    let function = &program.children("body")[0];
    let body = function.child("body").unwrap().children("body");

    assert_eq!(body.len(), 1);
    assert!(body[0].is(NodeKind::RawStatement));
}

#[test]
fn test_unbalanced_brackets_fail() {
    assert!(matches!(
        parse("foo(;\n", Dialect::JavaScript),
        Err(ParseError::UnbalancedDelimiter { .. })
    ));
    assert!(parse("}\n", Dialect::JavaScript).is_err());
    assert!(parse("if (a) { b();\n", Dialect::JavaScript).is_err());
    assert!(parse("let s = \"open;\n", Dialect::JavaScript).is_err());
}

#[test]
fn test_comment_attachment() {
    let program = js("// Header\n\n// lead\nfoo();\n// tail\n");
    let body = program.children("body");

    assert_eq!(program.comments, vec!["Header".to_string()]);
    assert_eq!(body[0].comments, vec!["lead".to_string()]);
    assert!(body[1].is(NodeKind::Trivia));
    assert_eq!(body[1].comments, vec!["tail".to_string()]);
}

#[test]
fn test_export_comments_attach_to_declaration() {
    let program = js("// helper\nexport const double = (x) => x * 2;\n");
    let export = &program.children("body")[0];

    assert!(export.comments.is_empty());
    assert_eq!(
        export.child("declaration").unwrap().comments,
        vec!["helper".to_string()]
    );
}

#[test]
fn test_expression_comments_move_to_next_statement() {
    let program = js("foo(/* x */ 1);\nbar();");
    let body = program.children("body");

    assert!(body[0].comments.is_empty());
    assert_eq!(body[1].comments, vec!["x".to_string()]);
}

#[test]
fn test_awaited_fetch_inside_function() {
    let program = js("async function load() {\n  await fetch('/api');\n}\n");
    let function = &program.children("body")[0];

    assert!(function.is(NodeKind::FunctionDeclaration));
    assert!(function.flag("async"));

    let statement = &function.child("body").unwrap().children("body")[0];
    let awaited = statement.child("expression").unwrap();
    assert!(awaited.is(NodeKind::AwaitExpression));
    assert!(awaited.child("argument").unwrap().is(NodeKind::CallExpression));
}

#[test]
fn test_arrow_functions() {
    let program = js("const add = (a, b) => a + b;\nconst one = x => { return x; };");
    let body = program.children("body");

    let arrow = body[0].children("declarations")[0].child("init").unwrap();
    assert!(arrow.is(NodeKind::ArrowFunctionExpression));
    assert_eq!(arrow.children("params").len(), 2);
    assert!(arrow.child("body").unwrap().is(NodeKind::BinaryExpression));

    let arrow = body[1].children("declarations")[0].child("init").unwrap();
    assert!(arrow.child("body").unwrap().is(NodeKind::BlockStatement));
}

#[test]
fn test_binary_precedence() {
    let program = js("x = a + b * c;");
    let assignment = program.children("body")[0].child("expression").unwrap();
    let sum = assignment.child("right").unwrap();

    assert_eq!(sum.text("operator"), Some("+"));
    assert_eq!(sum.child("right").unwrap().text("operator"), Some("*"));
}

#[test]
fn test_loops_and_conditionals() {
    let program = js(
        "for (var i = 0; i < n; i++) {}\nfor (const k in obj) {}\nfor (const v of list) {}\nif (a) b(); else c();\nwhile (x) x--;\ndo { y(); } while (z);",
    );
    let kinds: Vec<NodeKind> = program.children("body").iter().map(|s| s.kind).collect();

    assert_eq!(
        kinds,
        vec![
            NodeKind::ForStatement,
            NodeKind::ForInStatement,
            NodeKind::ForOfStatement,
            NodeKind::IfStatement,
            NodeKind::WhileStatement,
            NodeKind::DoWhileStatement,
        ]
    );
}

#[test]
fn test_try_catch_finally() {
    let program = js("try { a(); } catch (e) { b(e); } finally { c(); }");
    let statement = &program.children("body")[0];

    assert!(statement.is(NodeKind::TryStatement));
    assert!(statement.child("handler").unwrap().is(NodeKind::CatchClause));
    assert!(statement.child("finalizer").is_some());
}

#[test]
fn test_exports() {
    let program = js("export default { name: 'x' };\nexport const a = 1;\nexport function f() {}");
    let body = program.children("body");

    assert!(body[0].is(NodeKind::ExportDefaultDeclaration));
    assert!(body[1].is(NodeKind::ExportNamedDeclaration));
    assert!(body[2]
        .child("declaration")
        .unwrap()
        .is(NodeKind::FunctionDeclaration));
}

#[test]
fn test_typescript_annotations() {
    let program = ts("function f(a?: string, b: number = 1): void {}\nconst x: Map<string, number> = y as Foo;\nz!.w();");
    let body = program.children("body");

    let params = body[0].children("params");
    assert!(params[0].flag("optional"));
    assert_eq!(params[0].text("typeAnnotation"), Some("string"));
    assert!(params[1].is(NodeKind::AssignmentPattern));
    assert_eq!(body[0].text("returnType"), Some("void"));

    let declarator = &body[1].children("declarations")[0];
    assert_eq!(declarator.text("typeAnnotation"), Some("Map<string, number>"));
    assert!(declarator.child("init").unwrap().is(NodeKind::TsAsExpression));

    let call = body[2].child("expression").unwrap();
    let callee = call.child("callee").unwrap();
    assert!(callee.child("object").unwrap().is(NodeKind::TsNonNullExpression));
}

#[test]
fn test_typescript_declarations_are_raw() {
    let program = ts("interface User {\n  name: string;\n}\ntype Id = string;\nlet u: User;");
    let body = program.children("body");

    assert!(body[0].is(NodeKind::RawStatement));
    assert!(body[1].is(NodeKind::RawStatement));
    assert!(body[2].is(NodeKind::VariableDeclaration));
}

#[test]
fn test_decorators_are_raw() {
    let program = ts("@Component({ selector: 'app' })\nexport class AppComponent {}\n");
    let body = program.children("body");

    assert!(body.iter().all(|statement| statement.is(NodeKind::RawStatement)));
}

#[test]
fn test_spans_cover_statements() {
    let source = "foo();\nbar();";
    let program = js(source);
    let span = program.children("body")[1].span.unwrap();

    assert_eq!(&source[span.range()], "bar();");
}
