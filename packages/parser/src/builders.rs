//! Shorthand constructors for script nodes, shared by the parser and the rules
use crate::ast::{Node, NodeKind};

pub fn identifier(name: &str) -> Node {
    Node::new(NodeKind::Identifier)
        .with("name", name)
        .with("optional", false)
        .with("typeAnnotation", None::<String>)
}

pub fn literal(raw: &str) -> Node {
    Node::new(NodeKind::Literal).with("raw", raw)
}

pub fn member(object: Node, property: &str) -> Node {
    Node::new(NodeKind::MemberExpression)
        .with("object", object)
        .with("property", identifier(property))
        .with("computed", false)
        .with("optional", false)
}

pub fn call(callee: Node, arguments: Vec<Node>) -> Node {
    Node::new(NodeKind::CallExpression)
        .with("callee", callee)
        .with("arguments", arguments)
        .with("optional", false)
}

pub fn expression_statement(expression: Node) -> Node {
    Node::new(NodeKind::ExpressionStatement).with("expression", expression)
}

pub fn block(body: Vec<Node>) -> Node {
    Node::new(NodeKind::BlockStatement).with("body", body)
}

pub fn catch_clause(param: Option<Node>, body: Vec<Node>) -> Node {
    Node::new(NodeKind::CatchClause)
        .with("param", param)
        .with("body", block(body))
}

pub fn try_statement(body: Vec<Node>, handler: Option<Node>, finalizer: Option<Node>) -> Node {
    Node::new(NodeKind::TryStatement)
        .with("block", block(body))
        .with("handler", handler)
        .with("finalizer", finalizer)
}

/// The callee name of a call such as `fetch(..)` or `api.fetch(..)`
pub fn callee_name(call: &Node) -> Option<&str> {
    let callee = call.child("callee")?;
    match callee.kind {
        NodeKind::Identifier => callee.text("name"),
        NodeKind::MemberExpression if !callee.flag("computed") => {
            callee.child("property").and_then(|property| property.text("name"))
        }
        _ => None,
    }
}

/// Strip `await` and parentheses around an expression
pub fn unwrap_expression(mut expression: &Node) -> &Node {
    loop {
        match expression.kind {
            NodeKind::AwaitExpression => match expression.child("argument") {
                Some(argument) => expression = argument,
                None => return expression,
            },
            NodeKind::ParenthesizedExpression => match expression.child("expression") {
                Some(inner) => expression = inner,
                None => return expression,
            },
            _ => return expression,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callee_name() {
        let direct = call(identifier("fetch"), vec![literal("'/a'")]);
        let method = call(member(identifier("api"), "fetch"), Vec::new());

        assert_eq!(callee_name(&direct), Some("fetch"));
        assert_eq!(callee_name(&method), Some("fetch"));
    }

    #[test]
    fn test_unwrap_expression() {
        let inner = call(identifier("fetch"), Vec::new());
        let awaited = Node::new(NodeKind::AwaitExpression).with("argument", inner.clone());

        assert_eq!(unwrap_expression(&awaited), &inner);
    }
}
