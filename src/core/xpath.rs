//! XPath queries
//!
//! A compact XPath 1.0 subset, enough for selecting elements in the
//! documents this crate builds:
//!
//! - absolute (`/feed/entry`) and relative (`feed/entry`) location paths
//! - descendant steps (`//item`), `.`, `..`, `*` and `node()`
//! - predicates: `[2]`, `[last()]`, `[@rel]`, `[@rel='self']`, `[loc]`,
//!   `[loc='http://example.com/']`, `[text()='Hello']`
//! - unions (`//title | //link`)
//!
//! Name tests compare the qualified tag name as written in the document
//! (`video:video`), without prefix-to-URI binding. Queries are evaluated with
//! the document node as context and select elements only.

use crate::core::error::{XmlError, XmlResult};
use crate::core::node::NodeId;
use crate::core::tree::Tree;
use std::collections::HashSet;

/// A parsed query: one or more location paths joined by `|`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expr {
    /// Alternatives of the union
    pub paths: Vec<LocationPath>,
}

/// A location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationPath {
    /// Whether the path starts at the document node
    pub absolute: bool,
    /// Steps, applied left to right
    pub steps: Vec<Step>,
}

/// One step of a location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Direction of the step
    pub axis: Axis,
    /// Which nodes the step keeps
    pub test: NodeTest,
    /// Filters applied to the step result for each context node
    pub predicates: Vec<Predicate>,
}

/// Supported axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// `child::`
    Child,
    /// `descendant-or-self::`, produced by `//`
    DescendantOrSelf,
    /// `.`
    SelfNode,
    /// `..`
    Parent,
}

/// Supported node tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// An element with this qualified name
    Name(String),
    /// `*`: any element
    AnyElement,
    /// `node()`: any element or the document node
    Node,
}

/// Supported predicates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[n]`, 1-based
    Position(usize),
    /// `[last()]`
    Last,
    /// `[@name]`, `[@*]`
    HasAttribute(String),
    /// `[@name='value']`
    AttributeEquals(String, String),
    /// `[name]`
    HasChild(String),
    /// `[name='value']`
    ChildEquals(String, String),
    /// `[text()='value']`
    TextEquals(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Slash,
    DoubleSlash,
    Dot,
    DotDot,
    Star,
    At,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Eq,
    Pipe,
    Name(String),
    Literal(String),
    Number(usize),
}

fn is_name_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_name_char(ch: char) -> bool {
    ch.is_alphanumeric() || matches!(ch, '_' | '-' | '.' | ':')
}

fn tokenize(query: &str) -> XmlResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = query.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '/' => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    tokens.push(Token::DoubleSlash);
                } else {
                    tokens.push(Token::Slash);
                }
            }
            '.' => {
                chars.next();
                if chars.peek() == Some(&'.') {
                    chars.next();
                    tokens.push(Token::DotDot);
                } else {
                    tokens.push(Token::Dot);
                }
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '@' => {
                chars.next();
                tokens.push(Token::At);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            '|' => {
                chars.next();
                tokens.push(Token::Pipe);
            }
            '"' | '\'' => {
                let quote = ch;
                chars.next();
                let mut literal = String::new();
                loop {
                    match chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => literal.push(c),
                        None => {
                            return Err(XmlError::BadXPath("Unterminated string literal".to_string()))
                        }
                    }
                }
                tokens.push(Token::Literal(literal));
            }
            c if c.is_ascii_digit() => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if !d.is_ascii_digit() {
                        break;
                    }
                    digits.push(d);
                    chars.next();
                }
                let number = digits
                    .parse::<usize>()
                    .map_err(|_| XmlError::BadXPath(format!("Invalid number: {}", digits)))?;
                tokens.push(Token::Number(number));
            }
            c if is_name_start(c) => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !is_name_char(n) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                if name.contains("::") {
                    return Err(XmlError::BadXPath(format!(
                        "Explicit axes are not supported: {}",
                        name
                    )));
                }
                tokens.push(Token::Name(name));
            }
            other => {
                return Err(XmlError::BadXPath(format!(
                    "Unexpected character '{}'",
                    other
                )))
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> XmlResult<()> {
        match self.next() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(XmlError::BadXPath(format!(
                "Expected {:?}, found {:?}",
                expected, token
            ))),
            None => Err(XmlError::BadXPath(format!(
                "Expected {:?}, found end of query",
                expected
            ))),
        }
    }

    fn parse_expr(&mut self) -> XmlResult<Expr> {
        let mut paths = vec![self.parse_path()?];
        while self.peek() == Some(&Token::Pipe) {
            self.next();
            paths.push(self.parse_path()?);
        }
        if let Some(token) = self.peek() {
            return Err(XmlError::BadXPath(format!("Unexpected token {:?}", token)));
        }
        Ok(Expr { paths })
    }

    fn parse_path(&mut self) -> XmlResult<LocationPath> {
        let mut steps = Vec::new();
        let absolute = match self.peek() {
            Some(Token::Slash) => {
                self.next();
                // A lone "/" selects the document node
                if matches!(self.peek(), None | Some(Token::Pipe)) {
                    return Ok(LocationPath {
                        absolute: true,
                        steps,
                    });
                }
                true
            }
            Some(Token::DoubleSlash) => {
                self.next();
                steps.push(Self::descendant_or_self());
                true
            }
            _ => false,
        };

        steps.push(self.parse_step()?);
        loop {
            match self.peek() {
                Some(Token::Slash) => {
                    self.next();
                }
                Some(Token::DoubleSlash) => {
                    self.next();
                    steps.push(Self::descendant_or_self());
                }
                _ => break,
            }
            steps.push(self.parse_step()?);
        }

        Ok(LocationPath { absolute, steps })
    }

    fn descendant_or_self() -> Step {
        Step {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }

    fn parse_step(&mut self) -> XmlResult<Step> {
        let (axis, test) = match self.next() {
            Some(Token::Dot) => (Axis::SelfNode, NodeTest::Node),
            Some(Token::DotDot) => (Axis::Parent, NodeTest::Node),
            Some(Token::Star) => (Axis::Child, NodeTest::AnyElement),
            Some(Token::Name(name)) => {
                if self.peek() == Some(&Token::LParen) {
                    self.next();
                    self.expect(Token::RParen)?;
                    match name.as_str() {
                        "node" => (Axis::Child, NodeTest::Node),
                        _ => {
                            return Err(XmlError::BadXPath(format!(
                                "Unsupported node test {}()",
                                name
                            )))
                        }
                    }
                } else {
                    (Axis::Child, NodeTest::Name(name))
                }
            }
            Some(Token::At) => {
                return Err(XmlError::BadXPath(
                    "Attribute steps are not supported, use a predicate".to_string(),
                ))
            }
            Some(token) => {
                return Err(XmlError::BadXPath(format!("Unexpected token {:?}", token)))
            }
            None => return Err(XmlError::BadXPath("Empty path step".to_string())),
        };

        let mut predicates = Vec::new();
        while self.peek() == Some(&Token::LBracket) {
            self.next();
            predicates.push(self.parse_predicate()?);
            self.expect(Token::RBracket)?;
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn parse_literal(&mut self) -> XmlResult<String> {
        match self.next() {
            Some(Token::Literal(value)) => Ok(value),
            Some(Token::Number(value)) => Ok(value.to_string()),
            _ => Err(XmlError::BadXPath("Expected a literal".to_string())),
        }
    }

    fn parse_predicate(&mut self) -> XmlResult<Predicate> {
        match self.next() {
            Some(Token::Number(0)) => Err(XmlError::BadXPath(
                "Positions are 1-based".to_string(),
            )),
            Some(Token::Number(n)) => Ok(Predicate::Position(n)),
            Some(Token::At) => {
                let name = match self.next() {
                    Some(Token::Name(name)) => name,
                    Some(Token::Star) => "*".to_string(),
                    _ => return Err(XmlError::BadXPath("Expected attribute name".to_string())),
                };
                if self.peek() == Some(&Token::Eq) {
                    self.next();
                    Ok(Predicate::AttributeEquals(name, self.parse_literal()?))
                } else {
                    Ok(Predicate::HasAttribute(name))
                }
            }
            Some(Token::Name(name)) if self.peek() == Some(&Token::LParen) => {
                self.next();
                self.expect(Token::RParen)?;
                match name.as_str() {
                    "last" => Ok(Predicate::Last),
                    "text" => {
                        self.expect(Token::Eq)?;
                        Ok(Predicate::TextEquals(self.parse_literal()?))
                    }
                    _ => Err(XmlError::BadXPath(format!("Unsupported function {}()", name))),
                }
            }
            Some(Token::Name(name)) => {
                if self.peek() == Some(&Token::Eq) {
                    self.next();
                    Ok(Predicate::ChildEquals(name, self.parse_literal()?))
                } else {
                    Ok(Predicate::HasChild(name))
                }
            }
            Some(token) => Err(XmlError::BadXPath(format!(
                "Unsupported predicate starting with {:?}",
                token
            ))),
            None => Err(XmlError::BadXPath("Empty predicate".to_string())),
        }
    }
}

/// Parse a query
pub fn parse(query: &str) -> XmlResult<Expr> {
    let tokens = tokenize(query)?;
    if tokens.is_empty() {
        return Err(XmlError::BadXPath("Empty query".to_string()));
    }
    Parser { tokens, pos: 0 }.parse_expr()
}

/// Evaluate a parsed query against a tree
///
/// Returns matching elements in document order, without duplicates.
pub fn evaluate(tree: &Tree, expr: &Expr) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    for path in &expr.paths {
        for id in evaluate_path(tree, path) {
            seen.insert(id);
        }
    }

    let document = tree.document();
    tree.descendants(document)
        .into_iter()
        .filter(|id| seen.contains(id) && tree.kind(*id).is_element())
        .collect()
}

/// Parse and evaluate a query
pub fn select(tree: &Tree, query: &str) -> XmlResult<Vec<NodeId>> {
    let expr = parse(query)?;
    Ok(evaluate(tree, &expr))
}

fn evaluate_path(tree: &Tree, path: &LocationPath) -> Vec<NodeId> {
    // Relative paths are evaluated from the document node as well
    let _ = path.absolute;
    let mut context = vec![tree.document()];

    for step in &path.steps {
        let mut next = Vec::new();
        let mut seen = HashSet::new();
        for &node in &context {
            let candidates: Vec<NodeId> = axis_nodes(tree, node, step.axis)
                .into_iter()
                .filter(|&candidate| matches_test(tree, candidate, &step.test))
                .collect();
            for id in apply_predicates(tree, candidates, &step.predicates) {
                if seen.insert(id) {
                    next.push(id);
                }
            }
        }
        context = next;
    }

    context
}

fn axis_nodes(tree: &Tree, node: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::Child => tree.children(node).collect(),
        Axis::SelfNode => vec![node],
        Axis::Parent => tree.parent(node).into_iter().collect(),
        Axis::DescendantOrSelf => {
            let mut nodes = vec![node];
            nodes.extend(tree.descendants(node));
            nodes
        }
    }
}

fn matches_test(tree: &Tree, node: NodeId, test: &NodeTest) -> bool {
    match test {
        NodeTest::Name(name) => tree.element(node).is_some_and(|e| &e.name == name),
        NodeTest::AnyElement => tree.kind(node).is_element(),
        NodeTest::Node => node == tree.document() || tree.kind(node).is_element(),
    }
}

fn apply_predicates(tree: &Tree, mut nodes: Vec<NodeId>, predicates: &[Predicate]) -> Vec<NodeId> {
    for predicate in predicates {
        let len = nodes.len();
        nodes = nodes
            .into_iter()
            .enumerate()
            .filter(|&(index, node)| matches_predicate(tree, node, index + 1, len, predicate))
            .map(|(_, node)| node)
            .collect();
    }
    nodes
}

fn matches_predicate(
    tree: &Tree,
    node: NodeId,
    position: usize,
    size: usize,
    predicate: &Predicate,
) -> bool {
    let Some(element) = tree.element(node) else {
        return matches!(predicate, Predicate::Position(_) | Predicate::Last)
            && position_matches(position, size, predicate);
    };

    match predicate {
        Predicate::Position(_) | Predicate::Last => position_matches(position, size, predicate),
        Predicate::HasAttribute(name) => {
            if name == "*" {
                !element.attributes.is_empty()
            } else {
                element.get_attribute(name).is_some()
            }
        }
        Predicate::AttributeEquals(name, value) => element
            .attributes
            .iter()
            .any(|a| (name == "*" || &a.name == name) && &a.value == value),
        Predicate::HasChild(name) => tree
            .child_elements(node)
            .any(|child| tree.element(child).is_some_and(|e| &e.name == name)),
        Predicate::ChildEquals(name, value) => tree.child_elements(node).any(|child| {
            tree.element(child).is_some_and(|e| &e.name == name)
                && tree.text_content(child) == *value
        }),
        Predicate::TextEquals(value) => tree.text_content(node) == *value,
    }
}

fn position_matches(position: usize, size: usize, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Position(n) => position == *n,
        Predicate::Last => position == size,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::parser::XmlParser;

    fn sample() -> Tree {
        XmlParser::new()
            .parse(
                r#"<rss version="2.0"><channel>
                    <title>News</title>
                    <item><title>a</title><guid isPermaLink="true">1</guid></item>
                    <item><title>b</title><guid>2</guid></item>
                    <item><title>c</title></item>
                </channel></rss>"#,
            )
            .unwrap()
    }

    fn names(tree: &Tree, ids: &[NodeId]) -> Vec<String> {
        ids.iter().map(|&id| tree.text_content(id)).collect()
    }

    #[test]
    fn test_parse_paths() {
        let expr = parse("/rss/channel/item[2]").unwrap();
        assert_eq!(expr.paths.len(), 1);
        let path = &expr.paths[0];
        assert!(path.absolute);
        assert_eq!(path.steps.len(), 3);
        assert_eq!(path.steps[2].predicates, vec![Predicate::Position(2)]);

        let expr = parse("//item | //title").unwrap();
        assert_eq!(expr.paths.len(), 2);
        assert_eq!(expr.paths[0].steps[0].axis, Axis::DescendantOrSelf);
    }

    #[test]
    fn test_parse_errors() {
        for query in ["", "/rss/", "item[", "item[0]", "@version", "child::item", "item['x"] {
            assert!(
                matches!(parse(query), Err(XmlError::BadXPath(_))),
                "expected error for {:?}",
                query
            );
        }
    }

    #[test]
    fn test_select_descendants() {
        let tree = sample();
        let items = select(&tree, "//item/title").unwrap();
        assert_eq!(names(&tree, &items), vec!["a", "b", "c"]);

        let all_titles = select(&tree, "//title").unwrap();
        assert_eq!(all_titles.len(), 4);
    }

    #[test]
    fn test_select_relative_from_document() {
        let tree = sample();
        assert_eq!(select(&tree, "rss/channel/title").unwrap().len(), 1);
        assert_eq!(select(&tree, "channel").unwrap().len(), 0);
    }

    #[test]
    fn test_select_predicates() {
        let tree = sample();
        let second = select(&tree, "//item[2]/title").unwrap();
        assert_eq!(names(&tree, &second), vec!["b"]);

        let last = select(&tree, "//item[last()]/title").unwrap();
        assert_eq!(names(&tree, &last), vec!["c"]);

        let with_guid = select(&tree, "//item[guid]").unwrap();
        assert_eq!(with_guid.len(), 2);

        let permalink = select(&tree, "//guid[@isPermaLink='true']").unwrap();
        assert_eq!(names(&tree, &permalink), vec!["1"]);

        let by_child = select(&tree, "//item[title='c']").unwrap();
        assert_eq!(by_child.len(), 1);

        let by_text = select(&tree, "//title[text()='News']").unwrap();
        assert_eq!(by_text.len(), 1);
    }

    #[test]
    fn test_select_parent_and_union() {
        let tree = sample();
        let parents = select(&tree, "//guid/..").unwrap();
        assert_eq!(parents.len(), 2);

        let union = select(&tree, "//guid | /rss").unwrap();
        assert_eq!(union.len(), 3);
        // Document order: rss first
        assert_eq!(tree.element(union[0]).unwrap().name, "rss");
    }
}
