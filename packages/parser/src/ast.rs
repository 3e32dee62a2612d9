use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Byte range of a node in the text it was parsed from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Which printer a node kind belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Script,
    Markup,
    Style,
    Engine,
}

/// Closed set of node kinds shared by the script, markup and style trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    // Script statements
    Program,
    VariableDeclaration,
    VariableDeclarator,
    FunctionDeclaration,
    ReturnStatement,
    ThrowStatement,
    BreakStatement,
    ContinueStatement,
    IfStatement,
    ForStatement,
    ForInStatement,
    ForOfStatement,
    WhileStatement,
    DoWhileStatement,
    BlockStatement,
    ExpressionStatement,
    TryStatement,
    CatchClause,
    EmptyStatement,
    ExportDefaultDeclaration,
    ExportNamedDeclaration,
    RawStatement,
    Trivia,

    // Script expressions
    Identifier,
    Literal,
    TemplateLiteral,
    ArrayExpression,
    Elision,
    ObjectExpression,
    Property,
    FunctionExpression,
    ArrowFunctionExpression,
    CallExpression,
    NewExpression,
    MemberExpression,
    BinaryExpression,
    AssignmentExpression,
    UnaryExpression,
    UpdateExpression,
    ConditionalExpression,
    AwaitExpression,
    SpreadElement,
    SequenceExpression,
    ParenthesizedExpression,
    ThisExpression,
    AssignmentPattern,
    RestElement,
    TsAsExpression,
    TsNonNullExpression,

    // Markup
    Document,
    Element,
    Attribute,
    Text,
    Comment,
    Doctype,

    // Style
    StyleSheet,
    Declaration,
    StyleText,

    /// Placeholder inside a wrap template, filled with the wrapped node
    Hole,
}

impl NodeKind {
    pub fn family(self) -> Family {
        use NodeKind::*;
        match self {
            Document | Element | Attribute | Text | Comment | Doctype => Family::Markup,
            StyleSheet | Declaration | StyleText => Family::Style,
            Hole => Family::Engine,
            _ => Family::Script,
        }
    }

    pub fn is_statement(self) -> bool {
        use NodeKind::*;
        matches!(
            self,
            VariableDeclaration
                | FunctionDeclaration
                | ReturnStatement
                | ThrowStatement
                | BreakStatement
                | ContinueStatement
                | IfStatement
                | ForStatement
                | ForInStatement
                | ForOfStatement
                | WhileStatement
                | DoWhileStatement
                | BlockStatement
                | ExpressionStatement
                | TryStatement
                | EmptyStatement
                | ExportDefaultDeclaration
                | ExportNamedDeclaration
                | RawStatement
                | Trivia
        )
    }

    /// Kinds that open a new function scope
    pub fn is_function(self) -> bool {
        matches!(
            self,
            NodeKind::FunctionDeclaration
                | NodeKind::FunctionExpression
                | NodeKind::ArrowFunctionExpression
        )
    }
}

/// Value of a named node field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Field {
    Node(Box<Node>),
    List(Vec<Node>),
    Text(String),
    Flag(bool),
    Empty,
}

impl From<Node> for Field {
    fn from(node: Node) -> Self {
        Field::Node(Box::new(node))
    }
}

impl From<Option<Node>> for Field {
    fn from(node: Option<Node>) -> Self {
        node.map(Field::from).unwrap_or(Field::Empty)
    }
}

impl From<Vec<Node>> for Field {
    fn from(nodes: Vec<Node>) -> Self {
        Field::List(nodes)
    }
}

impl From<String> for Field {
    fn from(text: String) -> Self {
        Field::Text(text)
    }
}

impl From<&str> for Field {
    fn from(text: &str) -> Self {
        Field::Text(text.to_string())
    }
}

impl From<Option<String>> for Field {
    fn from(text: Option<String>) -> Self {
        text.map(Field::Text).unwrap_or(Field::Empty)
    }
}

impl From<bool> for Field {
    fn from(flag: bool) -> Self {
        Field::Flag(flag)
    }
}

/// A syntax tree node: a kind tag plus ordered named fields.
///
/// Children are owned, so a node can only ever appear in one slot.
/// `comments` holds leading annotations that the printers render as
/// comments in the target language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(serialize_with = "serialize_fields")]
    pub fields: Vec<(&'static str, Field)>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blank_line: bool,
}

fn serialize_fields<S: Serializer>(
    fields: &[(&'static str, Field)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(fields.len()))?;
    for (name, value) in fields {
        map.serialize_entry(name, value)?;
    }
    map.end()
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            comments: Vec::new(),
            span: None,
            blank_line: false,
        }
    }

    pub fn hole() -> Self {
        Self::new(NodeKind::Hole)
    }

    pub fn with(mut self, name: &'static str, value: impl Into<Field>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_comments(mut self, comments: Vec<String>) -> Self {
        self.comments = comments;
        self
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Set a field, keeping its position if it already exists
    pub fn set(&mut self, name: &'static str, value: impl Into<Field>) {
        let value = value.into();
        match self.get_mut(name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn child(&self, name: &str) -> Option<&Node> {
        match self.get(name) {
            Some(Field::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Node> {
        match self.get_mut(name) {
            Some(Field::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn children(&self, name: &str) -> &[Node] {
        match self.get(name) {
            Some(Field::List(nodes)) => nodes,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self, name: &str) -> Option<&mut Vec<Node>> {
        match self.get_mut(name) {
            Some(Field::List(nodes)) => Some(nodes),
            _ => None,
        }
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(Field::Text(text)) => Some(text),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> bool {
        matches!(self.get(name), Some(Field::Flag(true)))
    }

    /// Attach a provenance note, rendered as a leading comment when printed
    pub fn annotate(&mut self, note: impl Into<String>) {
        self.comments.push(note.into());
    }

    pub fn has_annotation(&self, note: &str) -> bool {
        self.comments.iter().any(|comment| comment.trim() == note.trim())
    }

    /// Take over the layout hints of the node this one stands in for
    pub fn inherit_layout(&mut self, original: &Node) {
        if self.span.is_none() {
            self.span = original.span;
        }
        self.blank_line = original.blank_line;
    }

    /// True when this node or any descendant satisfies `predicate`
    pub fn contains(&self, predicate: &dyn Fn(&Node) -> bool) -> bool {
        if predicate(self) {
            return true;
        }
        self.fields.iter().any(|(_, field)| match field {
            Field::Node(child) => child.contains(predicate),
            Field::List(children) => children.iter().any(|child| child.contains(predicate)),
            _ => false,
        })
    }

    pub fn contains_hole(&self) -> bool {
        self.contains(&|node| node.is(NodeKind::Hole))
    }

    /// Replace the first `Hole` in this subtree with `node`.
    ///
    /// Hands `node` back when the subtree has no hole.
    pub fn fill_hole(&mut self, node: Node) -> Result<(), Node> {
        match self.find_hole_mut() {
            Some(slot) => {
                *slot = node;
                Ok(())
            }
            None => Err(node),
        }
    }

    fn find_hole_mut(&mut self) -> Option<&mut Node> {
        if self.kind == NodeKind::Hole {
            return Some(self);
        }
        for (_, field) in self.fields.iter_mut() {
            match field {
                Field::Node(child) => {
                    if let Some(hole) = child.find_hole_mut() {
                        return Some(hole);
                    }
                }
                Field::List(children) => {
                    for child in children.iter_mut() {
                        if let Some(hole) = child.find_hole_mut() {
                            return Some(hole);
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }
}
