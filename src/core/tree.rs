//! Arena-backed document tree
//!
//! All nodes of a document live in one `Vec<NodeData>` owned by the `Tree`
//! and are referenced by `NodeId`. Navigation links (parent, first/last
//! child, siblings) are arena indices, so a node id stays valid for the
//! lifetime of its tree. Detached nodes simply stay in the arena.

use crate::core::error::{XmlError, XmlResult};
use crate::core::node::{Attribute, Element, NodeData, NodeId, NodeKind};

/// A deep copy of a subtree, detached from any arena
///
/// Used to move nodes between trees (and within one tree) without holding
/// two borrows of the same arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Kind and payload of the copied node
    pub kind: NodeKind,
    /// Copied children, in document order
    pub children: Vec<Fragment>,
}

/// An XML document tree
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<NodeData>,
    version: String,
    encoding: String,
}

impl Tree {
    /// Create a tree holding only the document node
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
            version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
        }
    }

    /// XML version written in the declaration
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Encoding written in the declaration
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Set the declaration's version and encoding
    pub fn set_declaration(&mut self, version: impl Into<String>, encoding: impl Into<String>) {
        self.version = version.into();
        self.encoding = encoding.into();
    }

    /// The document node
    pub fn document(&self) -> NodeId {
        NodeId(0)
    }

    /// Node storage for an id
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    /// Kind of a node
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    /// The element behind an id, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.kind(id).as_element()
    }

    /// Mutable access to the element behind an id
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.nodes[id.0].kind.as_element_mut()
    }

    /// The document's root element
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.document())
            .find(|&id| self.kind(id).is_element())
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// First child of a node
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    /// Check if a node has children
    pub fn has_children(&self, id: NodeId) -> bool {
        self.node(id).first_child.is_some()
    }

    /// Iterate over the children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.node(id).first_child,
        }
    }

    /// Iterate over the element children of a node
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(|&child| self.kind(child).is_element())
    }

    /// All descendants of a node in document order (pre-order), excluding
    /// the node itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        while let Some(current) = stack.pop() {
            result.push(current);
            let mut children: Vec<NodeId> = self.children(current).collect();
            children.reverse();
            stack.extend(children);
        }
        result
    }

    /// Descendant elements whose qualified tag name equals `name`
    ///
    /// `*` matches every element.
    pub fn elements_by_tag_name(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&node| {
                self.element(node)
                    .is_some_and(|element| name == "*" || element.name == name)
            })
            .collect()
    }

    /// Concatenated character content of a node and its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.kind(id).as_text() {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|node| self.kind(node).as_text())
            .collect()
    }

    /// Get an attribute value
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.get_attribute(name))
    }

    /// Allocate a detached node
    pub fn create(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(NodeData::new(kind));
        NodeId(self.nodes.len() - 1)
    }

    /// Allocate a detached plain element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.create(NodeKind::Element(Element::new(name)))
    }

    /// Allocate a detached element in a namespace
    pub fn create_element_ns(&mut self, namespace: &str, name: &str) -> NodeId {
        self.create(NodeKind::Element(Element::with_namespace(namespace, name)))
    }

    /// Allocate a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.create(NodeKind::Text(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> XmlResult<NodeId> {
        self.check_hierarchy(parent, child)?;
        self.detach(child);

        let last = self.nodes[parent.0].last_child;
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = last;
            node.next_sibling = None;
        }
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
        Ok(child)
    }

    /// Append character content, merging with a trailing text node
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> XmlResult<()> {
        if let Some(last) = self.nodes[parent.0].last_child {
            if let NodeKind::Text(existing) = &mut self.nodes[last.0].kind {
                existing.push_str(text);
                return Ok(());
            }
        }
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(())
    }

    fn check_hierarchy(&self, parent: NodeId, child: NodeId) -> XmlResult<()> {
        match (self.kind(parent), self.kind(child)) {
            (_, NodeKind::Document) => {
                return Err(XmlError::BadParam(
                    "The document node cannot be appended".to_string(),
                ))
            }
            (NodeKind::Document, NodeKind::Element(_)) => {
                if self.root_element().is_some_and(|root| root != child) {
                    return Err(XmlError::BadParam(
                        "The document already has a root element".to_string(),
                    ));
                }
            }
            (NodeKind::Document, NodeKind::Text(_) | NodeKind::CData(_)) => {
                return Err(XmlError::BadParam(
                    "Character content cannot be a child of the document node".to_string(),
                ))
            }
            (NodeKind::Document | NodeKind::Element(_), _) => {}
            _ => {
                return Err(XmlError::BadParam(
                    "Only elements and the document node can have children".to_string(),
                ))
            }
        }

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(XmlError::BadParam(
                    "A node cannot be appended to its own descendant".to_string(),
                ));
            }
            ancestor = self.parent(current);
        }
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let node = &self.nodes[id.0];
        let (prev_sibling, next_sibling) = (node.prev_sibling, node.next_sibling);
        let Some(parent) = node.parent else {
            return;
        };

        match prev_sibling {
            Some(prev) => self.nodes[prev.0].next_sibling = next_sibling,
            None => self.nodes[parent.0].first_child = next_sibling,
        }
        match next_sibling {
            Some(next) => self.nodes[next.0].prev_sibling = prev_sibling,
            None => self.nodes[parent.0].last_child = prev_sibling,
        }

        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Set a plain attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> XmlResult<()> {
        self.element_mut(id)
            .ok_or_else(|| XmlError::BadParam("Attributes can only be set on elements".to_string()))?
            .set_attribute(Attribute::new(name, value));
        Ok(())
    }

    /// Set an attribute in a namespace on an element
    pub fn set_attribute_ns(
        &mut self,
        id: NodeId,
        namespace: &str,
        name: &str,
        value: &str,
    ) -> XmlResult<()> {
        self.element_mut(id)
            .ok_or_else(|| XmlError::BadParam("Attributes can only be set on elements".to_string()))?
            .set_attribute(Attribute::with_namespace(namespace, name, value));
        Ok(())
    }

    /// Declare a namespace on an element
    pub fn declare_namespace(
        &mut self,
        id: NodeId,
        prefix: Option<&str>,
        uri: &str,
    ) -> XmlResult<()> {
        self.element_mut(id)
            .ok_or_else(|| {
                XmlError::BadParam("Namespaces can only be declared on elements".to_string())
            })?
            .declare_namespace(prefix, uri);
        Ok(())
    }

    /// Deep copy of a subtree
    pub fn snapshot(&self, id: NodeId) -> Fragment {
        Fragment {
            kind: self.kind(id).clone(),
            children: self
                .children(id)
                .map(|child| self.snapshot(child))
                .collect(),
        }
    }

    /// Allocate a detached copy of a fragment in this tree
    pub fn insert_fragment(&mut self, fragment: Fragment) -> XmlResult<NodeId> {
        if matches!(fragment.kind, NodeKind::Document) {
            return Err(XmlError::BadParam(
                "A document node cannot be inserted as a fragment".to_string(),
            ));
        }
        let id = self.create(fragment.kind);
        for child in fragment.children {
            let child = self.insert_fragment(child)?;
            self.append_child(id, child)?;
        }
        Ok(id)
    }

    /// Deep-clone a node of another tree into this one (detached)
    pub fn import_node(&mut self, other: &Tree, id: NodeId) -> XmlResult<NodeId> {
        self.insert_fragment(other.snapshot(id))
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.node(current).next_sibling;
        Some(current)
    }
}
