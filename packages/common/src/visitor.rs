use mentor_parser::ast::{Field, Node, NodeKind};

/// One step on the path from the root to a slot: the parent's kind, the
/// field holding the slot and, for list fields, the position in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub kind: NodeKind,
    pub field: &'static str,
    pub index: Option<usize>,
}

/// Visitor for read-only traversal
///
/// `enter` runs before a node's children and can prune the subtree;
/// `visit_node` runs after them.
pub trait Visitor {
    fn enter(&mut self, _node: &Node, _ancestors: &[Frame]) -> bool {
        true
    }

    fn visit_node(&mut self, _node: &Node, _ancestors: &[Frame]) {}
}

/// Mutable visitor for transforming trees
///
/// `visit_node` receives each slot in post-order. Returning `Some(node)`
/// replaces the slot's content; the replacement is not walked again.
pub trait VisitorMut {
    fn visit_node(&mut self, node: &mut Node, ancestors: &[Frame]) -> Option<Node>;
}

pub fn walk<V: Visitor + ?Sized>(root: &Node, visitor: &mut V) {
    let mut ancestors = Vec::new();
    walk_node(root, visitor, &mut ancestors);
}

fn walk_node<V: Visitor + ?Sized>(node: &Node, visitor: &mut V, ancestors: &mut Vec<Frame>) {
    if !visitor.enter(node, ancestors) {
        return;
    }
    for (field, value) in &node.fields {
        match value {
            Field::Node(child) => {
                ancestors.push(Frame {
                    kind: node.kind,
                    field: *field,
                    index: None,
                });
                walk_node(child, visitor, ancestors);
                ancestors.pop();
            }
            Field::List(children) => {
                for (index, child) in children.iter().enumerate() {
                    ancestors.push(Frame {
                        kind: node.kind,
                        field: *field,
                        index: Some(index),
                    });
                    walk_node(child, visitor, ancestors);
                    ancestors.pop();
                }
            }
            _ => {}
        }
    }
    visitor.visit_node(node, ancestors);
}

/// Post-order walk over every slot of `root`, substituting replacements.
///
/// Recursion depth follows tree depth; there is no explicit bound.
pub fn walk_mut<V: VisitorMut + ?Sized>(root: &mut Node, visitor: &mut V) {
    let mut ancestors = Vec::new();
    walk_node_mut(root, visitor, &mut ancestors);
}

fn walk_node_mut<V: VisitorMut + ?Sized>(
    node: &mut Node,
    visitor: &mut V,
    ancestors: &mut Vec<Frame>,
) {
    let kind = node.kind;
    for (field, value) in node.fields.iter_mut() {
        match value {
            Field::Node(child) => {
                ancestors.push(Frame {
                    kind,
                    field: *field,
                    index: None,
                });
                walk_node_mut(child, visitor, ancestors);
                ancestors.pop();
            }
            Field::List(children) => {
                for (index, child) in children.iter_mut().enumerate() {
                    ancestors.push(Frame {
                        kind,
                        field: *field,
                        index: Some(index),
                    });
                    walk_node_mut(child, visitor, ancestors);
                    ancestors.pop();
                }
            }
            _ => {}
        }
    }
    if let Some(replacement) = visitor.visit_node(node, ancestors) {
        *node = replacement;
    }
}

/// Collect references to every node matching `predicate`, in pre-order
pub fn find_all<'a>(root: &'a Node, predicate: &dyn Fn(&Node) -> bool) -> Vec<&'a Node> {
    let mut found = Vec::new();
    collect(root, predicate, &mut found);
    found
}

fn collect<'a>(node: &'a Node, predicate: &dyn Fn(&Node) -> bool, found: &mut Vec<&'a Node>) {
    if predicate(node) {
        found.push(node);
    }
    for (_, value) in &node.fields {
        match value {
            Field::Node(child) => collect(child, predicate, found),
            Field::List(children) => {
                for child in children {
                    collect(child, predicate, found);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mentor_parser::{parse, Dialect};

    struct KindRecorder {
        kinds: Vec<NodeKind>,
    }

    impl VisitorMut for KindRecorder {
        fn visit_node(&mut self, node: &mut Node, _ancestors: &[Frame]) -> Option<Node> {
            self.kinds.push(node.kind);
            None
        }
    }

    #[test]
    fn test_walk_mut_is_post_order() {
        let mut program = parse("foo(1);", Dialect::JavaScript).unwrap();
        let mut recorder = KindRecorder { kinds: Vec::new() };
        walk_mut(&mut program, &mut recorder);

        assert_eq!(
            recorder.kinds,
            vec![
                NodeKind::Identifier,
                NodeKind::Literal,
                NodeKind::CallExpression,
                NodeKind::ExpressionStatement,
                NodeKind::Program,
            ]
        );
    }

    struct ReplaceLiterals;

    impl VisitorMut for ReplaceLiterals {
        fn visit_node(&mut self, node: &mut Node, _ancestors: &[Frame]) -> Option<Node> {
            if node.is(NodeKind::Literal) {
                Some(Node::new(NodeKind::Literal).with("raw", "42"))
            } else {
                None
            }
        }
    }

    #[test]
    fn test_replacement_lands_in_slot() {
        let mut program = parse("f(1, 2);", Dialect::JavaScript).unwrap();
        walk_mut(&mut program, &mut ReplaceLiterals);

        let call = program.children("body")[0].child("expression").unwrap();
        let raws: Vec<_> = call
            .children("arguments")
            .iter()
            .map(|argument| argument.text("raw").unwrap())
            .collect();
        assert_eq!(raws, vec!["42", "42"]);
    }

    struct AncestorProbe {
        frames: Vec<Frame>,
    }

    impl VisitorMut for AncestorProbe {
        fn visit_node(&mut self, node: &mut Node, ancestors: &[Frame]) -> Option<Node> {
            if node.is(NodeKind::Literal) {
                self.frames = ancestors.to_vec();
            }
            None
        }
    }

    #[test]
    fn test_ancestor_frames() {
        let mut program = parse("try { f(1); } catch (e) {}", Dialect::JavaScript).unwrap();
        let mut probe = AncestorProbe { frames: Vec::new() };
        walk_mut(&mut program, &mut probe);

        let kinds: Vec<NodeKind> = probe.frames.iter().map(|frame| frame.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Program,
                NodeKind::TryStatement,
                NodeKind::BlockStatement,
                NodeKind::ExpressionStatement,
                NodeKind::CallExpression,
            ]
        );
        assert_eq!(probe.frames[1].field, "block");
        assert_eq!(probe.frames[4].index, Some(0));
    }

    struct CountStatements {
        count: usize,
    }

    impl Visitor for CountStatements {
        fn enter(&mut self, node: &Node, _ancestors: &[Frame]) -> bool {
            !node.kind.is_function()
        }

        fn visit_node(&mut self, node: &Node, _ancestors: &[Frame]) {
            if node.kind.is_statement() {
                self.count += 1;
            }
        }
    }

    #[test]
    fn test_enter_prunes_subtrees() {
        let program = parse("a();\nfunction f() { b(); c(); }", Dialect::JavaScript).unwrap();
        let mut counter = CountStatements { count: 0 };
        walk(&program, &mut counter);

        assert_eq!(counter.count, 1);
    }

    #[test]
    fn test_find_all() {
        let program = parse("a(); b(c());", Dialect::JavaScript).unwrap();
        let calls = find_all(&program, &|node| node.is(NodeKind::CallExpression));

        assert_eq!(calls.len(), 3);
    }
}
