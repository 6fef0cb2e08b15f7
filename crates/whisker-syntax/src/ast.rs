//! Template abstract syntax tree.
//!
//! A compiled template is a [`Fragment`]: a shared, immutable list of [`Node`]s.
//! Fragments are reference counted, so cloning one is cheap and the same tree
//! can be rendered by many callers at once.
//!
//! Every node can be turned back into template source with `text()`, which
//! uses the default `{{`/`}}` delimiters, or `text_with(start, end)`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::SyntaxError;

/// Default opening delimiter.
pub const DEFAULT_START_DELIMITER: &str = "{{";

/// Default closing delimiter.
pub const DEFAULT_END_DELIMITER: &str = "}}";

/// Named arguments of a tag, keyed by argument name.
pub type Hash = BTreeMap<String, Param>;

/// An argument expression in a tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A path resolved against the current scope at render time.
    Path(String),
    /// A quoted string literal.
    Str(String),
    /// An integer literal.
    Int(i64),
    /// A floating point literal.
    Float(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Path(path) => f.write_str(path),
            Param::Str(s) => write!(f, "\"{}\"", s),
            Param::Int(n) => write!(f, "{}", n),
            Param::Float(n) => write!(f, "{:?}", n),
            Param::Bool(b) => write!(f, "{}", b),
            Param::Null => f.write_str("null"),
        }
    }
}

/// An immutable, shareable list of nodes.
#[derive(Debug, Clone)]
pub struct Fragment {
    nodes: Arc<[Node]>,
}

impl Fragment {
    /// Creates a fragment from parsed nodes.
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes: nodes.into(),
        }
    }

    /// A fragment with no nodes.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A fragment holding a single literal.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(vec![Node::Literal(text.into())])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true if both fragments share the same underlying nodes.
    pub fn ptr_eq(&self, other: &Fragment) -> bool {
        Arc::ptr_eq(&self.nodes, &other.nodes)
    }

    /// Re-serializes the fragment to template source.
    pub fn text(&self) -> String {
        self.text_with(DEFAULT_START_DELIMITER, DEFAULT_END_DELIMITER)
    }

    /// Re-serializes the fragment with every tag written between `start`
    /// and `end`.
    pub fn text_with(&self, start: &str, end: &str) -> String {
        self.nodes
            .iter()
            .map(|node| node.text_with(start, end))
            .collect()
    }
}

impl Default for Fragment {
    fn default() -> Self {
        Self::empty()
    }
}

/// A template node.
#[derive(Debug, Clone)]
pub enum Node {
    /// Text copied to the output as-is.
    Literal(String),
    /// `{{path}}`, `{{{path}}}`, `{{&path}}` or an inline helper call.
    Variable(Variable),
    /// `{{> path}}`
    Partial(Partial),
    /// `{{! text}}`
    Comment(String),
    /// `{{#name}}...{{/name}}` or `{{^name}}...{{/name}}`
    Block(Block),
}

impl Node {
    /// Re-serializes the node to template source.
    pub fn text(&self) -> String {
        self.text_with(DEFAULT_START_DELIMITER, DEFAULT_END_DELIMITER)
    }

    pub fn text_with(&self, start: &str, end: &str) -> String {
        match self {
            Node::Literal(text) => text.clone(),
            Node::Variable(variable) => variable.text_with(start, end),
            Node::Partial(partial) => partial.text_with(start, end),
            Node::Comment(text) => format!("{}!{}{}", start, text, end),
            Node::Block(block) => block.text_with(start, end),
        }
    }
}

/// How a variable's output is escaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escape {
    /// `{{name}}`: HTML-escaped.
    Html,
    /// `{{{name}}}`: raw.
    Triple,
    /// `{{&name}}`: raw.
    Ampersand,
}

impl Escape {
    pub fn escapes(self) -> bool {
        matches!(self, Escape::Html)
    }
}

/// A variable reference or inline helper invocation.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub params: Vec<Param>,
    pub hash: Hash,
    pub escape: Escape,
}

impl Variable {
    pub fn new(name: impl Into<String>, escape: Escape) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            hash: Hash::new(),
            escape,
        }
    }

    pub fn text(&self) -> String {
        self.text_with(DEFAULT_START_DELIMITER, DEFAULT_END_DELIMITER)
    }

    /// Triple mustache only exists with the default start delimiter;
    /// elsewhere raw output is written as `&name`.
    pub fn text_with(&self, start: &str, end: &str) -> String {
        let header = header(&self.name, &self.params, &self.hash);
        match self.escape {
            Escape::Html => format!("{}{}{}", start, header, end),
            Escape::Triple if start == DEFAULT_START_DELIMITER => {
                format!("{}{{{}}}{}", start, header, end)
            }
            Escape::Triple | Escape::Ampersand => format!("{}&{}{}", start, header, end),
        }
    }
}

/// A reference to a separately compiled template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partial {
    pub path: String,
}

impl Partial {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn text(&self) -> String {
        self.text_with(DEFAULT_START_DELIMITER, DEFAULT_END_DELIMITER)
    }

    pub fn text_with(&self, start: &str, end: &str) -> String {
        format!("{}>{}{}", start, self.path, end)
    }
}

/// A section.
///
/// The body is attached after construction, once the parser has seen the
/// closing tag, and can only be attached once.
#[derive(Debug, Clone)]
pub struct Block {
    name: String,
    inverted: bool,
    params: Vec<Param>,
    hash: Hash,
    body: Option<Fragment>,
    inverse: Option<Fragment>,
    start_delimiter: String,
    end_delimiter: String,
}

impl Block {
    /// Creates a section without a body, parsed with the default delimiters.
    pub fn new(
        name: impl Into<String>,
        inverted: bool,
        params: Vec<Param>,
        hash: Hash,
    ) -> Result<Self, SyntaxError> {
        let name = name.into();
        if name.is_empty() {
            return Err(SyntaxError::EmptyName);
        }
        Ok(Self {
            name,
            inverted,
            params,
            hash,
            body: None,
            inverse: None,
            start_delimiter: DEFAULT_START_DELIMITER.to_string(),
            end_delimiter: DEFAULT_END_DELIMITER.to_string(),
        })
    }

    /// Records the delimiters that were active where the section was parsed.
    pub fn with_delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start_delimiter = start.into();
        self.end_delimiter = end.into();
        self
    }

    /// Attaches the body. Fails if a body is already attached.
    pub fn set_body(&mut self, body: Fragment) -> Result<(), SyntaxError> {
        if self.body.is_some() {
            return Err(SyntaxError::BodyAlreadySet(self.name.clone()));
        }
        self.body = Some(body);
        Ok(())
    }

    pub fn with_body(mut self, body: Fragment) -> Result<Self, SyntaxError> {
        self.set_body(body)?;
        Ok(self)
    }

    /// Attaches the else-branch.
    pub fn set_inverse(&mut self, inverse: Fragment) {
        self.inverse = Some(inverse);
    }

    pub fn with_inverse(mut self, inverse: Fragment) -> Self {
        self.set_inverse(inverse);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// The section marker: `^` for inverted sections, `#` otherwise.
    pub fn marker(&self) -> char {
        if self.inverted {
            '^'
        } else {
            '#'
        }
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn body(&self) -> Option<&Fragment> {
        self.body.as_ref()
    }

    pub fn inverse(&self) -> Option<&Fragment> {
        self.inverse.as_ref()
    }

    pub fn start_delimiter(&self) -> &str {
        &self.start_delimiter
    }

    pub fn end_delimiter(&self) -> &str {
        &self.end_delimiter
    }

    /// Re-serializes the section, including its body.
    pub fn text(&self) -> String {
        self.text_with(DEFAULT_START_DELIMITER, DEFAULT_END_DELIMITER)
    }

    /// Re-serializes the section and its body with the given delimiters.
    pub fn text_with(&self, start: &str, end: &str) -> String {
        let body = self
            .body
            .as_ref()
            .map(|body| body.text_with(start, end))
            .unwrap_or_default();
        self.wrap(&body, start, end)
    }

    fn wrap(&self, inner: &str, start: &str, end: &str) -> String {
        format!(
            "{start}{}{}{end}{inner}{start}/{}{end}",
            self.marker(),
            header(&self.name, &self.params, &self.hash),
            self.name,
        )
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wrap(" ... ", DEFAULT_START_DELIMITER, DEFAULT_END_DELIMITER))
    }
}

/// `name params hash`, with separators only where something follows.
fn header(name: &str, params: &[Param], hash: &Hash) -> String {
    let mut buffer = name.to_string();
    if !params.is_empty() {
        buffer.push(' ');
        let params: Vec<String> = params.iter().map(Param::to_string).collect();
        buffer.push_str(&params.join(" "));
    }
    if !hash.is_empty() {
        buffer.push(' ');
        let pairs: Vec<String> = hash.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        buffer.push_str(&pairs.join(" "));
    }
    buffer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(name: &str, inverted: bool) -> Block {
        Block::new(name, inverted, Vec::new(), Hash::new()).unwrap()
    }

    #[test]
    fn test_block_requires_name() {
        let result = Block::new("", false, Vec::new(), Hash::new());
        assert_eq!(result.unwrap_err(), SyntaxError::EmptyName);
    }

    #[test]
    fn test_block_text_uses_marker() {
        let body = Fragment::literal("hello");
        let normal = section("user", false).with_body(body.clone()).unwrap();
        let inverted = section("user", true).with_body(body).unwrap();

        assert_eq!(normal.text(), "{{#user}}hello{{/user}}");
        assert_eq!(inverted.text(), "{{^user}}hello{{/user}}");
    }

    #[test]
    fn test_block_text_with_params_and_hash() {
        let mut hash = Hash::new();
        hash.insert("id".to_string(), Param::Str("main".to_string()));
        let block = Block::new(
            "block",
            false,
            vec![Param::Str("layout".to_string()), Param::Path("user.name".to_string())],
            hash,
        )
        .unwrap()
        .with_body(Fragment::literal("x"))
        .unwrap();

        assert_eq!(
            block.text(),
            "{{#block \"layout\" user.name id=\"main\"}}x{{/block}}"
        );
    }

    #[test]
    fn test_block_text_without_body() {
        assert_eq!(section("empty", false).text(), "{{#empty}}{{/empty}}");
    }

    #[test]
    fn test_block_display_elides_body() {
        let block = section("items", false)
            .with_body(Fragment::literal("long body"))
            .unwrap();
        assert_eq!(block.to_string(), "{{#items}} ... {{/items}}");
    }

    #[test]
    fn test_text_with_custom_delimiters() {
        let body = Fragment::new(vec![
            Node::Literal("Hi ".to_string()),
            Node::Variable(Variable::new("name", Escape::Html)),
            Node::Variable(Variable::new("raw", Escape::Triple)),
            Node::Partial(Partial::new("footer")),
            Node::Comment(" note ".to_string()),
        ]);
        let block = section("wrap", false).with_body(body).unwrap();

        assert_eq!(
            block.text_with("<%", "%>"),
            "<%#wrap%>Hi <%name%><%&raw%><%>footer%><%! note %><%/wrap%>"
        );
        assert_eq!(
            block.text(),
            "{{#wrap}}Hi {{name}}{{{raw}}}{{>footer}}{{! note }}{{/wrap}}"
        );
    }

    #[test]
    fn test_body_can_only_be_set_once() {
        let mut block = section("user", false);
        block.set_body(Fragment::empty()).unwrap();
        let err = block.set_body(Fragment::empty()).unwrap_err();
        assert_eq!(err, SyntaxError::BodyAlreadySet("user".to_string()));
    }

    #[test]
    fn test_block_keeps_delimiters() {
        let block = section("user", false).with_delimiters("<%", "%>");
        assert_eq!(block.start_delimiter(), "<%");
        assert_eq!(block.end_delimiter(), "%>");
    }

    #[test]
    fn test_variable_text() {
        let mut variable = Variable::new("name", Escape::Html);
        assert_eq!(variable.text(), "{{name}}");
        variable.escape = Escape::Triple;
        assert_eq!(variable.text(), "{{{name}}}");
        variable.escape = Escape::Ampersand;
        assert_eq!(variable.text(), "{{&name}}");
    }

    #[test]
    fn test_fragment_text_concatenates_nodes() {
        let fragment = Fragment::new(vec![
            Node::Literal("Hi ".to_string()),
            Node::Variable(Variable::new("name", Escape::Html)),
            Node::Comment(" note ".to_string()),
            Node::Partial(Partial::new("footer")),
        ]);
        assert_eq!(fragment.text(), "Hi {{name}}{{! note }}{{>footer}}");
    }

    #[test]
    fn test_fragment_clone_shares_nodes() {
        let fragment = Fragment::literal("x");
        let copy = fragment.clone();
        assert!(fragment.ptr_eq(&copy));
        assert!(!fragment.ptr_eq(&Fragment::literal("x")));
    }
}
