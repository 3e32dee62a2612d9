use mentor_parser::{format_error, Dialect, NodeKind, Syntax};

#[test]
fn test_script_module_survives_roundtrip() {
    let source = r#"
import { api } from './api';

// Load the user profile
export async function loadProfile(id) {
  const response = await fetch(`/users/${id}`);
  if (!response.ok) {
    throw new Error('failed');
  }
  return response.json();
}

class Cache {
  get(key) { return this.map[key]; }
}
"#;

    let syntax = Syntax::Script(Dialect::JavaScript);
    let tree = syntax.parse(source).expect("module parses");
    let printed = syntax.print(&tree).expect("module prints");
    let reprinted = syntax.print(&syntax.parse(&printed).unwrap()).unwrap();

    assert_eq!(printed, reprinted);
    assert!(printed.contains("// Load the user profile\nexport async function loadProfile(id) {"));
    assert!(printed.contains("import { api } from './api';"));
    assert!(printed.contains("class Cache {\n  get(key) { return this.map[key]; }\n}"));
}

#[test]
fn test_angular_component_roundtrip() {
    let source = "import { Component } from '@angular/core';\n\n@Component({\n  selector: 'app-root',\n})\nexport class AppComponent {\n  title = 'app';\n}\n";

    let syntax = Syntax::Script(Dialect::TypeScript);
    let tree = syntax.parse(source).unwrap();
    let body = tree.children("body");

    assert!(body.iter().all(|statement| statement.is(NodeKind::RawStatement)));
    assert_eq!(syntax.print(&tree).unwrap(), source);
}

#[test]
fn test_markup_with_embedded_languages() {
    let source = "<html>\n<head>\n<style>\nh1 { color: #999999; }\n</style>\n</head>\n<body>\n<h1 style=\"color: #777\">Hi</h1>\n<script>\nvar a = 1;\n</script>\n</body>\n</html>\n";

    let tree = Syntax::Markup.parse(source).unwrap();
    assert_eq!(Syntax::Markup.print(&tree).unwrap(), source);
}

#[test]
fn test_parse_error_report_names_file() {
    let source = "let x = (1;\n";
    let error = Syntax::Script(Dialect::JavaScript)
        .parse(source)
        .unwrap_err();
    let report = format_error(source, "broken.js", &error);

    assert!(report.contains("broken.js"));
}
