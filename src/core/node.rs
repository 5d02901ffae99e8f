//! Tree node types
//!
//! This module defines the node types stored in a document tree:
//! - Element: a tag with attributes and namespace declarations
//! - Text / CData: character content
//! - Comment / ProcessingInstruction: preserved when loading a document

use crate::core::namespace::split_qname;

/// A typed index into a tree's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

/// An attribute on an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written (e.g. `xml:lang`)
    pub name: String,
    /// Attribute value, unescaped
    pub value: String,
    /// Namespace URI, if the attribute was set in a namespace
    pub namespace: Option<String>,
}

impl Attribute {
    /// Create a plain attribute
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            namespace: None,
        }
    }

    /// Create an attribute in a namespace
    pub fn with_namespace(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            namespace: Some(namespace.into()),
        }
    }
}

/// A namespace declaration (`xmlns` or `xmlns:prefix`) carried by an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDecl {
    /// Declared prefix, `None` for the default namespace
    pub prefix: Option<String>,
    /// Namespace URI
    pub uri: String,
}

impl NamespaceDecl {
    /// The attribute name this declaration serializes to
    pub fn attribute_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        }
    }
}

/// An element node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name (e.g. `video:video`)
    pub name: String,
    /// Namespace URI the element lives in
    pub namespace: Option<String>,
    /// Attributes in insertion order; namespace declarations are not included
    pub attributes: Vec<Attribute>,
    /// Namespace declarations made on this element
    pub namespaces: Vec<NamespaceDecl>,
}

impl Element {
    /// Create a plain element
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Create an element in a namespace
    pub fn with_namespace(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Self::new(name)
        }
    }

    /// Prefix part of the tag name
    pub fn prefix(&self) -> Option<&str> {
        split_qname(&self.name).0
    }

    /// Local part of the tag name
    pub fn local_name(&self) -> &str {
        split_qname(&self.name).1
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, replacing any attribute with the same name
    pub fn set_attribute(&mut self, attribute: Attribute) {
        match self.attributes.iter_mut().find(|a| a.name == attribute.name) {
            Some(existing) => *existing = attribute,
            None => self.attributes.push(attribute),
        }
    }

    /// Check if this element declares the given prefix
    pub fn declares(&self, prefix: Option<&str>) -> bool {
        self.namespaces
            .iter()
            .any(|decl| decl.prefix.as_deref() == prefix)
    }

    /// Declare a namespace on this element, replacing an existing declaration
    /// of the same prefix
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: impl Into<String>) {
        let uri = uri.into();
        match self
            .namespaces
            .iter_mut()
            .find(|decl| decl.prefix.as_deref() == prefix)
        {
            Some(existing) => existing.uri = uri,
            None => self.namespaces.push(NamespaceDecl {
                prefix: prefix.map(str::to_string),
                uri,
            }),
        }
    }
}

/// Kind and payload of a tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node, parent of the root element
    Document,
    /// An element
    Element(Element),
    /// A text node
    Text(String),
    /// A CDATA section
    CData(String),
    /// A comment
    Comment(String),
    /// A processing instruction
    ProcessingInstruction {
        /// PI target
        target: String,
        /// PI content after the target
        data: String,
    },
}

impl NodeKind {
    /// Check if this is an element
    pub fn is_element(&self) -> bool {
        matches!(self, NodeKind::Element(_))
    }

    /// Check if this is character content (text or CDATA)
    pub fn is_text(&self) -> bool {
        matches!(self, NodeKind::Text(_) | NodeKind::CData(_))
    }

    /// Get the element, if this is an element
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Get a mutable reference to the element, if this is an element
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Get the character content, if this is text or CDATA
    pub fn as_text(&self) -> Option<&str> {
        match self {
            NodeKind::Text(text) | NodeKind::CData(text) => Some(text),
            _ => None,
        }
    }
}

/// Storage for a single node in the arena, with its navigation links
#[derive(Debug, Clone)]
pub struct NodeData {
    /// Kind and payload
    pub kind: NodeKind,
    /// Parent node, `None` for the document node and detached nodes
    pub parent: Option<NodeId>,
    /// First child
    pub first_child: Option<NodeId>,
    /// Last child (for O(1) append)
    pub last_child: Option<NodeId>,
    /// Next sibling
    pub next_sibling: Option<NodeId>,
    /// Previous sibling
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_attributes() {
        let mut element = Element::new("link");
        element.set_attribute(Attribute::new("rel", "self"));
        element.set_attribute(Attribute::new("rel", "alternate"));
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.get_attribute("rel"), Some("alternate"));
        assert_eq!(element.get_attribute("href"), None);
    }

    #[test]
    fn test_element_names() {
        let element = Element::with_namespace("http://www.google.com/schemas/sitemap-video/1.1", "video:video");
        assert_eq!(element.prefix(), Some("video"));
        assert_eq!(element.local_name(), "video");
        assert!(Element::new("url").prefix().is_none());
    }

    #[test]
    fn test_namespace_declarations() {
        let mut element = Element::new("feed");
        element.declare_namespace(None, "http://www.w3.org/2005/Atom");
        element.declare_namespace(Some("video"), "urn:a");
        element.declare_namespace(Some("video"), "urn:b");
        assert!(element.declares(None));
        assert_eq!(element.namespaces.len(), 2);
        assert_eq!(element.namespaces[1].uri, "urn:b");
        assert_eq!(element.namespaces[1].attribute_name(), "xmlns:video");
    }
}
