use crate::ast::{Field, Node, NodeKind};
use crate::error::{PrintError, PrintResult};

/// Serializer turns a script tree back into source text.
///
/// Output is normalized: two-space indentation, explicit semicolons and
/// annotations rendered as comments. Raw statements are emitted verbatim.
pub struct Serializer {
    indent_level: usize,
    indent_string: String,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            indent_string: "  ".to_string(),
        }
    }

    pub fn with_indent(indent: &str) -> Self {
        Self {
            indent_level: 0,
            indent_string: indent.to_string(),
        }
    }

    /// Serialize a `Program` to source code
    pub fn serialize(&mut self, program: &Node) -> PrintResult<String> {
        if !program.is(NodeKind::Program) {
            return Err(PrintError::unexpected(program.kind, "program"));
        }
        let mut output = String::new();

        for comment in &program.comments {
            output.push_str(&format_comment(comment, true));
            output.push('\n');
        }
        if !program.comments.is_empty() {
            output.push('\n');
        }

        self.write_statements(program.children("body"), &mut output)?;
        Ok(output)
    }

    fn indent(&self) -> String {
        self.indent_string.repeat(self.indent_level)
    }

    fn write_statements(&mut self, statements: &[Node], output: &mut String) -> PrintResult<()> {
        for (index, statement) in statements.iter().enumerate() {
            if index > 0 && statement.blank_line {
                output.push('\n');
            }
            self.write_statement(statement, output)?;
        }
        Ok(())
    }

    fn write_annotations(&self, comments: &[String], output: &mut String) {
        let indent = self.indent();
        for comment in comments {
            output.push_str(&indent);
            output.push_str(&format_comment(comment, true));
            output.push('\n');
        }
    }

    /// Annotations, indentation, the statement itself and a newline
    fn write_statement(&mut self, statement: &Node, output: &mut String) -> PrintResult<()> {
        if !statement.kind.is_statement() {
            return Err(PrintError::unexpected(statement.kind, "statement"));
        }

        match statement.kind {
            NodeKind::Trivia => {
                self.write_annotations(&statement.comments, output);
                return Ok(());
            }
            NodeKind::ExportNamedDeclaration | NodeKind::ExportDefaultDeclaration => {
                let inner = required(statement, "declaration")?;
                self.write_annotations(&statement.comments, output);
                self.write_annotations(&inner.comments, output);
            }
            _ => self.write_annotations(&statement.comments, output),
        }

        output.push_str(&self.indent());
        self.write_statement_body(statement, output)?;
        if !output.ends_with('\n') {
            output.push('\n');
        }
        Ok(())
    }

    /// The statement text, starting at the current column
    fn write_statement_body(&mut self, statement: &Node, output: &mut String) -> PrintResult<()> {
        match statement.kind {
            NodeKind::VariableDeclaration => {
                output.push_str(&self.declaration(statement)?);
                output.push(';');
            }
            NodeKind::FunctionDeclaration => {
                output.push_str(&self.function(statement)?);
            }
            NodeKind::ReturnStatement | NodeKind::ThrowStatement => {
                output.push_str(if statement.is(NodeKind::ReturnStatement) {
                    "return"
                } else {
                    "throw"
                });
                if let Some(argument) = statement.child("argument") {
                    output.push(' ');
                    output.push_str(&self.expression(argument)?);
                }
                output.push(';');
            }
            NodeKind::BreakStatement | NodeKind::ContinueStatement => {
                output.push_str(if statement.is(NodeKind::BreakStatement) {
                    "break"
                } else {
                    "continue"
                });
                if let Some(label) = statement.text("label") {
                    output.push(' ');
                    output.push_str(label);
                }
                output.push(';');
            }
            NodeKind::IfStatement => self.write_if(statement, output)?,
            NodeKind::ForStatement => {
                output.push_str("for (");
                match statement.child("init") {
                    Some(init) if init.is(NodeKind::VariableDeclaration) => {
                        output.push_str(&self.inline_annotations(init));
                        output.push_str(&self.declaration(init)?);
                    }
                    Some(init) => output.push_str(&self.expression(init)?),
                    None => {}
                }
                output.push(';');
                if let Some(test) = statement.child("test") {
                    output.push(' ');
                    output.push_str(&self.expression(test)?);
                }
                output.push(';');
                if let Some(update) = statement.child("update") {
                    output.push(' ');
                    output.push_str(&self.expression(update)?);
                }
                output.push(')');
                self.write_clause(required(statement, "body")?, output)?;
            }
            NodeKind::ForInStatement | NodeKind::ForOfStatement => {
                let left = required(statement, "left")?;
                output.push_str("for (");
                if left.is(NodeKind::VariableDeclaration) {
                    output.push_str(&self.inline_annotations(left));
                    output.push_str(&self.declaration(left)?);
                } else {
                    output.push_str(&self.expression(left)?);
                }
                output.push_str(if statement.is(NodeKind::ForInStatement) {
                    " in "
                } else {
                    " of "
                });
                output.push_str(&self.expression(required(statement, "right")?)?);
                output.push(')');
                self.write_clause(required(statement, "body")?, output)?;
            }
            NodeKind::WhileStatement => {
                output.push_str("while (");
                output.push_str(&self.expression(required(statement, "test")?)?);
                output.push(')');
                self.write_clause(required(statement, "body")?, output)?;
            }
            NodeKind::DoWhileStatement => {
                let body = required(statement, "body")?;
                output.push_str("do");
                self.write_clause(body, output)?;
                if output.ends_with('\n') {
                    output.push_str(&self.indent());
                    output.push_str("while (");
                } else {
                    output.push_str(" while (");
                }
                output.push_str(&self.expression(required(statement, "test")?)?);
                output.push_str(");");
            }
            NodeKind::BlockStatement => self.write_block(statement, output)?,
            NodeKind::ExpressionStatement => {
                let expression = required(statement, "expression")?;
                let text = self.expression(expression)?;
                if needs_statement_parens(expression) {
                    output.push('(');
                    output.push_str(&text);
                    output.push(')');
                } else {
                    output.push_str(&text);
                }
                output.push(';');
            }
            NodeKind::TryStatement => {
                output.push_str("try ");
                self.write_block(required(statement, "block")?, output)?;
                if let Some(handler) = statement.child("handler") {
                    if !handler.is(NodeKind::CatchClause) {
                        return Err(PrintError::unexpected(handler.kind, "catch clause"));
                    }
                    output.push_str(" catch ");
                    if let Some(param) = handler.child("param") {
                        output.push('(');
                        output.push_str(&self.expression(param)?);
                        output.push_str(") ");
                    }
                    self.write_block(required(handler, "body")?, output)?;
                }
                if let Some(finalizer) = statement.child("finalizer") {
                    output.push_str(" finally ");
                    self.write_block(finalizer, output)?;
                }
            }
            NodeKind::EmptyStatement => output.push(';'),
            NodeKind::ExportDefaultDeclaration => {
                let declaration = required(statement, "declaration")?;
                output.push_str("export default ");
                if declaration.kind.is_function() && !declaration.is(NodeKind::ArrowFunctionExpression)
                {
                    output.push_str(&self.function(declaration)?);
                } else {
                    output.push_str(&self.expression(declaration)?);
                    output.push(';');
                }
            }
            NodeKind::ExportNamedDeclaration => {
                let declaration = required(statement, "declaration")?;
                output.push_str("export ");
                self.write_statement_body(declaration, output)?;
            }
            NodeKind::RawStatement => output.push_str(required_text(statement, "text")?),
            kind => return Err(PrintError::unexpected(kind, "statement")),
        }
        Ok(())
    }

    fn write_if(&mut self, statement: &Node, output: &mut String) -> PrintResult<()> {
        output.push_str("if (");
        output.push_str(&self.expression(required(statement, "test")?)?);
        output.push(')');
        self.write_clause(required(statement, "consequent")?, output)?;

        if let Some(alternate) = statement.child("alternate") {
            if output.ends_with('\n') {
                output.push_str(&self.indent());
                output.push_str("else");
            } else {
                output.push_str(" else");
            }
            if alternate.is(NodeKind::IfStatement) && alternate.comments.is_empty() {
                output.push(' ');
                self.write_if(alternate, output)?;
            } else {
                self.write_clause(alternate, output)?;
            }
        }
        Ok(())
    }

    /// Body of a compound statement: ` { ... }` or an indented statement on the next line
    fn write_clause(&mut self, body: &Node, output: &mut String) -> PrintResult<()> {
        if body.is(NodeKind::BlockStatement) && body.comments.is_empty() {
            output.push(' ');
            return self.write_block(body, output);
        }
        output.push('\n');
        self.indent_level += 1;
        let result = self.write_statement(body, output);
        self.indent_level -= 1;
        result
    }

    fn write_block(&mut self, block: &Node, output: &mut String) -> PrintResult<()> {
        if !block.is(NodeKind::BlockStatement) {
            return Err(PrintError::unexpected(block.kind, "block"));
        }
        let body = block.children("body");
        if body.is_empty() {
            output.push_str("{}");
            return Ok(());
        }

        output.push_str("{\n");
        self.indent_level += 1;
        let result = self.write_statements(body, output);
        self.indent_level -= 1;
        result?;
        output.push_str(&self.indent());
        output.push('}');
        Ok(())
    }

    fn block_text(&mut self, block: &Node) -> PrintResult<String> {
        let mut output = String::new();
        self.write_block(block, &mut output)?;
        Ok(output)
    }

    fn inline_annotations(&self, node: &Node) -> String {
        node.comments
            .iter()
            .map(|comment| format!("{} ", format_comment(comment, false)))
            .collect()
    }

    /// `let a = 1, b` without the semicolon
    fn declaration(&mut self, declaration: &Node) -> PrintResult<String> {
        let kind = required_text(declaration, "kind")?;
        let mut declarators = Vec::new();
        for declarator in declaration.children("declarations") {
            if !declarator.is(NodeKind::VariableDeclarator) {
                return Err(PrintError::unexpected(declarator.kind, "declarator"));
            }
            let mut text = self.expression(required(declarator, "id")?)?;
            if let Some(annotation) = declarator.text("typeAnnotation") {
                text.push_str(": ");
                text.push_str(annotation);
            }
            if let Some(init) = declarator.child("init") {
                text.push_str(" = ");
                text.push_str(&self.expression(init)?);
            }
            declarators.push(text);
        }
        if declarators.is_empty() {
            return Err(PrintError::MissingField {
                kind: declaration.kind,
                field: "declarations",
            });
        }
        Ok(format!("{} {}", kind, declarators.join(", ")))
    }

    fn function(&mut self, function: &Node) -> PrintResult<String> {
        let mut text = String::new();
        if function.flag("async") {
            text.push_str("async ");
        }
        text.push_str("function");
        if function.flag("generator") {
            text.push('*');
        }
        if let Some(id) = function.child("id") {
            text.push(' ');
            text.push_str(&self.expression(id)?);
        }
        text.push_str(&self.function_tail(function)?);
        Ok(text)
    }

    /// Type parameters, parameters, return type and body
    fn function_tail(&mut self, function: &Node) -> PrintResult<String> {
        let mut text = String::new();
        if let Some(type_parameters) = function.text("typeParameters") {
            text.push_str(type_parameters);
        }
        text.push('(');
        text.push_str(&self.list(function.children("params"))?);
        text.push(')');
        if let Some(return_type) = function.text("returnType") {
            text.push_str(": ");
            text.push_str(return_type);
        }
        text.push(' ');
        text.push_str(&self.block_text(required(function, "body")?)?);
        Ok(text)
    }

    fn list(&mut self, nodes: &[Node]) -> PrintResult<String> {
        let mut parts = Vec::with_capacity(nodes.len());
        for node in nodes {
            parts.push(self.expression(node)?);
        }
        Ok(parts.join(", "))
    }

    /// Serialize an expression, with its annotations inline
    pub fn expression(&mut self, expression: &Node) -> PrintResult<String> {
        let text = self.expression_body(expression)?;
        if expression.comments.is_empty() {
            Ok(text)
        } else {
            Ok(format!("{}{}", self.inline_annotations(expression), text))
        }
    }

    fn expression_body(&mut self, expression: &Node) -> PrintResult<String> {
        let text = match expression.kind {
            NodeKind::Identifier => {
                let mut text = required_text(expression, "name")?.to_string();
                if expression.flag("optional") {
                    text.push('?');
                }
                if let Some(annotation) = expression.text("typeAnnotation") {
                    text.push_str(": ");
                    text.push_str(annotation);
                }
                text
            }
            NodeKind::Literal | NodeKind::TemplateLiteral => {
                required_text(expression, "raw")?.to_string()
            }
            NodeKind::ThisExpression => "this".to_string(),
            NodeKind::Elision => String::new(),
            NodeKind::ArrayExpression => {
                let elements = expression.children("elements");
                let mut text = format!("[{}", self.list(elements)?);
                if elements.last().map_or(false, |last| last.is(NodeKind::Elision)) {
                    text.push(',');
                }
                text.push(']');
                text
            }
            NodeKind::ObjectExpression => self.object(expression)?,
            NodeKind::FunctionExpression => self.function(expression)?,
            NodeKind::ArrowFunctionExpression => {
                let mut text = String::new();
                if expression.flag("async") {
                    text.push_str("async ");
                }
                text.push('(');
                text.push_str(&self.list(expression.children("params"))?);
                text.push(')');
                if let Some(return_type) = expression.text("returnType") {
                    text.push_str(": ");
                    text.push_str(return_type);
                }
                text.push_str(" => ");
                let body = required(expression, "body")?;
                if body.is(NodeKind::BlockStatement) {
                    text.push_str(&self.block_text(body)?);
                } else if body.is(NodeKind::ObjectExpression) {
                    text.push_str(&format!("({})", self.expression(body)?));
                } else {
                    text.push_str(&self.expression(body)?);
                }
                text
            }
            NodeKind::CallExpression => {
                let mut text = self.expression(required(expression, "callee")?)?;
                if expression.flag("optional") {
                    text.push_str("?.");
                }
                text.push('(');
                text.push_str(&self.list(expression.children("arguments"))?);
                text.push(')');
                text
            }
            NodeKind::NewExpression => {
                let mut text = format!("new {}", self.expression(required(expression, "callee")?)?);
                if let Some(Field::List(arguments)) = expression.get("arguments") {
                    text.push('(');
                    text.push_str(&self.list(arguments)?);
                    text.push(')');
                }
                text
            }
            NodeKind::MemberExpression => {
                let object = self.expression(required(expression, "object")?)?;
                let property = self.expression(required(expression, "property")?)?;
                let optional = expression.flag("optional");
                match (expression.flag("computed"), optional) {
                    (true, true) => format!("{}?.[{}]", object, property),
                    (true, false) => format!("{}[{}]", object, property),
                    (false, true) => format!("{}?.{}", object, property),
                    (false, false) => format!("{}.{}", object, property),
                }
            }
            NodeKind::BinaryExpression | NodeKind::AssignmentExpression => format!(
                "{} {} {}",
                self.expression(required(expression, "left")?)?,
                required_text(expression, "operator")?,
                self.expression(required(expression, "right")?)?
            ),
            NodeKind::UnaryExpression => {
                let operator = required_text(expression, "operator")?;
                let argument = self.expression(required(expression, "argument")?)?;
                let spaced = operator.chars().all(|c| c.is_ascii_alphabetic())
                    || ((operator == "-" || operator == "+") && argument.starts_with(operator));
                if spaced {
                    format!("{} {}", operator, argument)
                } else {
                    format!("{}{}", operator, argument)
                }
            }
            NodeKind::UpdateExpression => {
                let operator = required_text(expression, "operator")?;
                let argument = self.expression(required(expression, "argument")?)?;
                if expression.flag("prefix") {
                    format!("{}{}", operator, argument)
                } else {
                    format!("{}{}", argument, operator)
                }
            }
            NodeKind::ConditionalExpression => format!(
                "{} ? {} : {}",
                self.expression(required(expression, "test")?)?,
                self.expression(required(expression, "consequent")?)?,
                self.expression(required(expression, "alternate")?)?
            ),
            NodeKind::AwaitExpression => {
                format!("await {}", self.expression(required(expression, "argument")?)?)
            }
            NodeKind::SpreadElement => {
                format!("...{}", self.expression(required(expression, "argument")?)?)
            }
            NodeKind::RestElement => {
                let mut text = format!("...{}", self.expression(required(expression, "argument")?)?);
                if let Some(annotation) = expression.text("typeAnnotation") {
                    text.push_str(": ");
                    text.push_str(annotation);
                }
                text
            }
            NodeKind::SequenceExpression => self.list(expression.children("expressions"))?,
            NodeKind::ParenthesizedExpression => {
                format!("({})", self.expression(required(expression, "expression")?)?)
            }
            NodeKind::AssignmentPattern => format!(
                "{} = {}",
                self.expression(required(expression, "left")?)?,
                self.expression(required(expression, "right")?)?
            ),
            NodeKind::TsAsExpression => format!(
                "{} {} {}",
                self.expression(required(expression, "expression")?)?,
                required_text(expression, "operator")?,
                required_text(expression, "typeAnnotation")?
            ),
            NodeKind::TsNonNullExpression => {
                format!("{}!", self.expression(required(expression, "expression")?)?)
            }
            kind => return Err(PrintError::unexpected(kind, "expression")),
        };
        Ok(text)
    }

    fn object(&mut self, object: &Node) -> PrintResult<String> {
        let properties = object.children("properties");
        if properties.is_empty() {
            return Ok("{}".to_string());
        }

        if !properties.iter().any(is_complex_property) {
            let mut parts = Vec::with_capacity(properties.len());
            for property in properties {
                parts.push(self.property(property)?);
            }
            return Ok(format!("{{ {} }}", parts.join(", ")));
        }

        self.indent_level += 1;
        let inner = self.indent();
        let mut lines = Vec::with_capacity(properties.len());
        let mut result = Ok(());
        for property in properties {
            match self.property(property) {
                Ok(text) => lines.push(format!("{}{}", inner, text)),
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
        self.indent_level -= 1;
        result?;

        Ok(format!("{{\n{}\n{}}}", lines.join(",\n"), self.indent()))
    }

    fn property(&mut self, property: &Node) -> PrintResult<String> {
        match property.kind {
            NodeKind::SpreadElement => self.expression(property),
            NodeKind::Property => {
                let key = self.expression(required(property, "key")?)?;
                let key = if property.flag("computed") {
                    format!("[{}]", key)
                } else {
                    key
                };
                let value = required(property, "value")?;
                let text = if property.flag("method") {
                    let mut text = String::new();
                    if value.flag("async") {
                        text.push_str("async ");
                    }
                    if value.flag("generator") {
                        text.push('*');
                    }
                    text.push_str(&key);
                    text.push_str(&self.function_tail(value)?);
                    text
                } else if property.flag("shorthand") {
                    if value.is(NodeKind::AssignmentPattern) {
                        self.expression(value)?
                    } else {
                        key
                    }
                } else {
                    format!("{}: {}", key, self.expression(value)?)
                };
                Ok(format!("{}{}", self.inline_annotations(property), text))
            }
            kind => Err(PrintError::unexpected(kind, "property")),
        }
    }
}

/// Render an annotation as a comment: `// note` on its own line, `/* note */` inline
pub fn format_comment(text: &str, own_line: bool) -> String {
    if text.contains('\n') || text.starts_with('*') {
        format!("/*{}*/", text)
    } else if own_line {
        if text.is_empty() {
            "//".to_string()
        } else {
            format!("// {}", text)
        }
    } else {
        format!("/* {} */", text)
    }
}

fn required<'a>(node: &'a Node, field: &'static str) -> PrintResult<&'a Node> {
    match node.get(field) {
        Some(Field::Node(child)) => Ok(child),
        _ => Err(PrintError::MissingField {
            kind: node.kind,
            field,
        }),
    }
}

fn required_text<'a>(node: &'a Node, field: &'static str) -> PrintResult<&'a str> {
    node.text(field).ok_or(PrintError::MissingField {
        kind: node.kind,
        field,
    })
}

fn is_complex_property(property: &Node) -> bool {
    if property.flag("method") {
        return true;
    }
    match property.child("value") {
        Some(value) => match value.kind {
            NodeKind::FunctionExpression => true,
            NodeKind::ArrowFunctionExpression => value
                .child("body")
                .map_or(false, |body| body.is(NodeKind::BlockStatement)),
            NodeKind::ObjectExpression => !value.children("properties").is_empty(),
            _ => false,
        },
        None => false,
    }
}

/// Expression statements that would otherwise read as a declaration or block
fn needs_statement_parens(expression: &Node) -> bool {
    let mut leftmost = expression;
    loop {
        match leftmost.kind {
            NodeKind::ObjectExpression | NodeKind::FunctionExpression => return true,
            NodeKind::CallExpression => match leftmost.child("callee") {
                Some(callee) => leftmost = callee,
                None => return false,
            },
            NodeKind::MemberExpression => match leftmost.child("object") {
                Some(object) => leftmost = object,
                None => return false,
            },
            NodeKind::BinaryExpression | NodeKind::AssignmentExpression => {
                match leftmost.child("left") {
                    Some(left) => leftmost = left,
                    None => return false,
                }
            }
            _ => return false,
        }
    }
}

/// Serialize a script program
pub fn serialize(program: &Node) -> PrintResult<String> {
    let mut serializer = Serializer::new();
    serializer.serialize(program)
}
