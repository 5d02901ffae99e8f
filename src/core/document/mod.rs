//! Documents and nodes
//!
//! A `DocumentNode` is a view of one element of a document tree together with
//! the driver metadata the document was built with. Creating nodes through it
//! resolves aliases, namespaces, default attributes and value filters from
//! that metadata. A `Document` is the node wrapping the root element.
//!
//! ```rust
//! use xmlkit::{DriverKind, RegistryStore, XmlOptions};
//!
//! let mut store = RegistryStore::new(XmlOptions::default());
//! let feed = store.create(DriverKind::Atom).unwrap();
//! feed.add_node("title", Some("Hello"), &[]).unwrap();
//!
//! assert_eq!(
//!     feed.render(false).unwrap(),
//!     "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
//!      <feed xmlns=\"http://www.w3.org/2005/Atom\"><title type=\"text\">Hello</title></feed>\n"
//! );
//! ```

#[macro_use]
mod macros;
pub(crate) mod handle;
mod projection;

use crate::core::error::{XmlError, XmlResult};
use crate::core::filter::FilterTarget;
use crate::core::meta::Meta;
use crate::core::namespace::{declared_prefix, ns, split_qname};
use crate::core::node::{NodeId, NodeKind};
use crate::core::options::XmlOptions;
use crate::core::parser::XmlParser;
use crate::core::serializer::XmlSerializer;
use crate::core::tree::Tree;
use crate::core::xpath;
use crate::drivers::{Driver, DriverKind};
use crate::types::Value;
use handle::{new_handle, same_tree, tree_read_with, TreeHandle};
use std::fmt;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};

/// Driver context shared by all nodes of a document
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) kind: DriverKind,
    pub(crate) meta: Arc<Meta>,
    pub(crate) options: XmlOptions,
}

/// Where a document is loaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// XML text
    Xml(String),
    /// A file on disk
    File(PathBuf),
    /// An http(s) location
    Url(String),
}

impl Source {
    /// Guess the kind of source from a string
    ///
    /// Existing files win, then `http://` / `https://` URLs; anything else is
    /// treated as XML text.
    pub fn detect(input: &str) -> Source {
        let trimmed = input.trim_start();
        if !trimmed.starts_with('<') {
            let path = Path::new(input);
            if path.is_file() {
                return Source::File(path.to_path_buf());
            }
            if (trimmed.starts_with("http://") || trimmed.starts_with("https://"))
                && url::Url::parse(trimmed.trim_end()).is_ok()
            {
                return Source::Url(trimmed.trim_end().to_string());
            }
        }
        Source::Xml(input.to_string())
    }

    /// Load and parse the source
    pub fn load(&self) -> XmlResult<Tree> {
        match self {
            Source::Xml(xml) => XmlParser::new().parse(xml),
            Source::File(path) => {
                debug!(path = %path.display(), "loading document from file");
                let xml = std::fs::read(path)?;
                XmlParser::new().parse_bytes(&xml)
            }
            Source::Url(url) => Self::fetch(url),
        }
    }

    #[cfg(feature = "remote")]
    fn fetch(url: &str) -> XmlResult<Tree> {
        debug!(url, "loading document from URL");
        let xml = reqwest::blocking::get(url)
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .map_err(std::io::Error::other)?;
        XmlParser::new().parse_bytes(&xml)
    }

    #[cfg(not(feature = "remote"))]
    fn fetch(url: &str) -> XmlResult<Tree> {
        Err(XmlError::NotSupported(format!(
            "Loading '{}' requires the `remote` feature",
            url
        )))
    }
}

impl From<&str> for Source {
    fn from(input: &str) -> Self {
        Source::detect(input)
    }
}

/// What `DocumentNode::import` accepts
#[derive(Debug, Clone)]
pub enum Importable {
    /// A node of this or another document
    Node(DocumentNode),
    /// A source to load first
    Source(Source),
}

impl From<DocumentNode> for Importable {
    fn from(node: DocumentNode) -> Self {
        Importable::Node(node)
    }
}

impl From<&DocumentNode> for Importable {
    fn from(node: &DocumentNode) -> Self {
        Importable::Node(node.clone())
    }
}

impl From<&Document> for Importable {
    fn from(document: &Document) -> Self {
        Importable::Node(document.root.clone())
    }
}

impl From<Source> for Importable {
    fn from(source: Source) -> Self {
        Importable::Source(source)
    }
}

impl From<&str> for Importable {
    fn from(input: &str) -> Self {
        Importable::Source(Source::detect(input))
    }
}

impl From<String> for Importable {
    fn from(input: String) -> Self {
        Importable::Source(Source::detect(&input))
    }
}

/// An element of a document
///
/// Cloning is cheap and yields another view of the same element.
#[derive(Clone)]
pub struct DocumentNode {
    tree: TreeHandle,
    ctx: Arc<Context>,
    id: NodeId,
}

impl DocumentNode {
    fn wrap(&self, id: NodeId) -> DocumentNode {
        DocumentNode {
            tree: self.tree.clone(),
            ctx: self.ctx.clone(),
            id,
        }
    }

    /// Id of the wrapped element in its tree
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Registry of the driver this document was built with
    pub fn meta(&self) -> &Meta {
        &self.ctx.meta
    }

    /// Options this document was built with
    pub fn options(&self) -> &XmlOptions {
        &self.ctx.options
    }

    /// Driver this document was built with
    pub fn driver(&self) -> DriverKind {
        self.ctx.kind
    }

    /// Content type of the driver
    pub fn content_type(&self) -> Option<&str> {
        self.ctx.meta.content_type()
    }

    /// Tag name of the element
    pub fn name(&self) -> String {
        tree_read_with(&self.tree, |tree| {
            tree.element(self.id)
                .map(|e| e.name.clone())
                .unwrap_or_default()
        })
    }

    /// Check if two nodes view the same element
    pub fn same_node(&self, other: &DocumentNode) -> bool {
        self.id == other.id && same_tree(&self.tree, &other.tree)
    }

    /// Add a child element
    ///
    /// `name` is trimmed and resolved through the registry. Registry default
    /// attributes are applied under `attributes`. A value is filtered by the
    /// node name and added as text. Returns the new node.
    pub fn add_node(
        &self,
        name: &str,
        value: Option<&str>,
        attributes: &[(&str, &str)],
    ) -> XmlResult<DocumentNode> {
        let name = name.trim();
        let attributes = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let mut tree = tree_write!(self.tree);
        let node = self.create_element(&mut tree, name)?;
        self.add_attributes(&mut tree, node, attributes)?;
        if let Some(value) = value {
            let value = self.filter(&mut tree, name, value, node)?;
            tree.append_text(node, &value)?;
        }
        tree.append_child(self.id, node)?;
        Ok(self.wrap(node))
    }

    /// Add a child element holding text
    pub fn add_text(&self, name: &str, value: &str) -> XmlResult<DocumentNode> {
        self.add_node(name, Some(value), &[])
    }

    /// All descendant elements with the given (aliased) name, in document order
    ///
    /// `*` matches every element.
    pub fn get(&self, name: &str) -> XmlResult<Vec<DocumentNode>> {
        let name = self.ctx.meta.alias(name);
        let tree = tree_read!(self.tree);
        Ok(tree
            .elements_by_tag_name(self.id, &name)
            .into_iter()
            .map(|id| self.wrap(id))
            .collect())
    }

    /// The first descendant element with the given name
    pub fn get_single(&self, name: &str) -> XmlResult<Option<DocumentNode>> {
        let name = self.ctx.meta.alias(name);
        let tree = tree_read!(self.tree);
        Ok(tree
            .elements_by_tag_name(self.id, &name)
            .into_iter()
            .next()
            .map(|id| self.wrap(id)))
    }

    /// Like `get`, with every match projected
    pub fn get_as_array(&self, name: &str) -> XmlResult<Vec<Value>> {
        let name = self.ctx.meta.alias(name);
        let tree = tree_read!(self.tree);
        Ok(tree
            .elements_by_tag_name(self.id, &name)
            .into_iter()
            .map(|id| projection::project(&tree, &self.ctx.meta, id).1)
            .collect())
    }

    /// Elements selected by an XPath query over the whole document
    pub fn xpath(&self, query: &str) -> XmlResult<Vec<DocumentNode>> {
        let tree = tree_read!(self.tree);
        Ok(xpath::select(&tree, query)?
            .into_iter()
            .map(|id| self.wrap(id))
            .collect())
    }

    /// Like `xpath`, with every match projected
    pub fn xpath_as_array(&self, query: &str) -> XmlResult<Vec<Value>> {
        let tree = tree_read!(self.tree);
        Ok(xpath::select(&tree, query)?
            .into_iter()
            .map(|id| projection::project(&tree, &self.ctx.meta, id).1)
            .collect())
    }

    /// Deep-copy a node, document or source into this document as a child
    ///
    /// The copy keeps its own tag names, namespaces and attributes.
    pub fn import(&self, other: impl Into<Importable>) -> XmlResult<&Self> {
        let fragment = match other.into() {
            Importable::Node(node) => {
                let tree = tree_read!(node.tree);
                tree.snapshot(node.id)
            }
            Importable::Source(source) => {
                let tree = source
                    .load()
                    .map_err(|e| XmlError::Import(format!("Cannot import source: {}", e)))?;
                let root = tree
                    .root_element()
                    .ok_or_else(|| XmlError::Import("Source has no root element".to_string()))?;
                tree.snapshot(root)
            }
        };

        let mut tree = tree_write!(self.tree);
        let copy = tree.insert_fragment(fragment)?;
        tree.append_child(self.id, copy)?;
        debug!(parent = ?self.id, node = ?copy, "imported node");
        Ok(self)
    }

    /// Text of the element if its first child is a text node
    pub fn value(&self) -> Option<String> {
        let tree = tree_read_opt!(self.tree);
        let first = tree.first_child(self.id)?;
        match tree.kind(first) {
            NodeKind::Text(_) => Some(tree.text_content(self.id)),
            _ => None,
        }
    }

    /// All attributes of the element, as written
    pub fn attributes(&self) -> Vec<(String, String)> {
        tree_read_with(&self.tree, |tree| {
            tree.element(self.id)
                .map(|e| {
                    e.attributes
                        .iter()
                        .map(|a| (a.name.clone(), a.value.clone()))
                        .collect()
                })
                .unwrap_or_default()
        })
    }

    /// One attribute value, empty if the attribute is not set
    pub fn attribute(&self, name: &str) -> String {
        tree_read_with(&self.tree, |tree| {
            tree.get_attribute(self.id, name)
                .map(str::to_string)
                .unwrap_or_default()
        })
    }

    /// Serialize the whole document
    pub fn render(&self, formatted: bool) -> XmlResult<String> {
        let serializer = if formatted {
            XmlSerializer::formatted(self.ctx.options.indent)
        } else {
            XmlSerializer::new()
        };
        let tree = tree_read!(self.tree);
        serializer.serialize(&tree)
    }

    /// Write the whole document to a file
    pub fn export(&self, path: impl AsRef<Path>) -> XmlResult<()> {
        let path = path.as_ref();
        let xml = self.render(false)?;
        std::fs::write(path, xml)?;
        debug!(path = %path.display(), "exported document");
        Ok(())
    }

    /// Create a detached element, resolving namespaces from the registry
    pub(crate) fn create_element(&self, tree: &mut Tree, name: &str) -> XmlResult<NodeId> {
        let meta = &self.ctx.meta;
        let name = meta.alias(name);
        let (prefix, _) = split_qname(&name);

        let node = match (meta.namespace(&name), prefix) {
            (Some(uri), Some(prefix)) => {
                Self::declare_on_root(tree, prefix, uri)?;
                tree.create_element_ns(uri, &name)
            }
            (Some(uri), None) => {
                let node = tree.create_element_ns(uri, &name);
                tree.declare_namespace(node, None, uri)?;
                node
            }
            (None, Some(prefix)) => match Self::root_namespace(tree, prefix) {
                Some(uri) => tree.create_element_ns(&uri, &name),
                None => tree.create_element(&name),
            },
            (None, None) => tree.create_element(&name),
        };
        Ok(node)
    }

    /// Namespace bound to `prefix` on the root element
    fn root_namespace(tree: &Tree, prefix: &str) -> Option<String> {
        let root = tree.element(tree.root_element()?)?;
        root.namespaces
            .iter()
            .find(|decl| decl.prefix.as_deref() == Some(prefix))
            .map(|decl| decl.uri.clone())
    }

    /// Declare `xmlns:prefix` on the root element unless already declared
    fn declare_on_root(tree: &mut Tree, prefix: &str, uri: &str) -> XmlResult<()> {
        if let Some(root) = tree.root_element() {
            let declared = tree
                .element(root)
                .is_some_and(|e| e.declares(Some(prefix)));
            if !declared {
                tree.declare_namespace(root, Some(prefix), uri)?;
            }
        }
        Ok(())
    }

    /// Apply registry defaults and caller attributes to an element
    pub(crate) fn add_attributes(
        &self,
        tree: &mut Tree,
        node: NodeId,
        attributes: Vec<(String, String)>,
    ) -> XmlResult<()> {
        let meta = &self.ctx.meta;
        let tag = tree
            .element(node)
            .map(|e| e.name.clone())
            .ok_or_else(|| XmlError::BadParam("Attributes can only be set on elements".to_string()))?;

        let mut merged: Vec<(String, String)> = meta.attributes(&tag).to_vec();
        for (key, value) in attributes {
            match merged.iter_mut().find(|(k, _)| *k == key) {
                Some(existing) => existing.1 = value,
                None => merged.push((key, value)),
            }
        }

        for (key, value) in merged {
            let key = meta.alias(key.trim());
            let value = self.filter(tree, &key, value.trim(), node)?;

            if let Some(prefix) = declared_prefix(&key) {
                tree.declare_namespace(node, prefix, &value)?;
                continue;
            }
            match (split_qname(&key).0, meta.namespace(&key)) {
                (Some(ns::XML_PREFIX), _) => tree.set_attribute_ns(node, ns::XML, &key, &value)?,
                (Some(prefix), Some(uri)) => {
                    let uri = uri.to_string();
                    Self::declare_on_root(tree, prefix, &uri)?;
                    tree.set_attribute_ns(node, &uri, &key, &value)?;
                }
                _ => tree.set_attribute(node, &key, &value)?,
            }
        }
        Ok(())
    }

    /// Run the registry filter for `name` on a value
    pub(crate) fn filter(
        &self,
        tree: &mut Tree,
        name: &str,
        value: &str,
        node: NodeId,
    ) -> XmlResult<String> {
        match self.ctx.meta.filter(name) {
            Some(filter) => {
                trace!(filter = filter.name(), node = name, value, "applying filter");
                let mut target = FilterTarget::new(tree, node, &self.ctx.options);
                filter.apply(value, &mut target)
            }
            None => Ok(value.to_string()),
        }
    }
}

impl fmt::Debug for DocumentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentNode")
            .field("driver", &self.ctx.kind)
            .field("id", &self.id)
            .field("name", &self.name())
            .finish()
    }
}

impl fmt::Display for DocumentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = self.render(true).map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}

/// A document: the node of its root element
#[derive(Debug, Clone)]
pub struct Document {
    root: DocumentNode,
}

impl Document {
    /// Build a document for a driver
    ///
    /// With a source, the document is loaded from it and `root` is ignored.
    /// Without one, a root element named `root` (or the driver's root) is
    /// created with its registry namespace and default attributes.
    pub(crate) fn new(
        kind: DriverKind,
        meta: Arc<Meta>,
        options: XmlOptions,
        root: Option<&str>,
        source: Option<Source>,
    ) -> XmlResult<Document> {
        let root_name = root.map(str::to_string).or_else(|| kind.root_node().map(str::to_string));

        let mut tree = match &source {
            Some(source) => source.load()?,
            None => Tree::new(),
        };
        if source.is_none() {
            tree.set_declaration(options.xml_version.as_str(), options.encoding.as_str());
        }

        let ctx = Arc::new(Context {
            kind,
            meta,
            options,
        });

        let (tree, id) = match (tree.root_element(), root_name) {
            (Some(id), _) => (new_handle(tree), id),
            (None, Some(root_name)) => {
                let id = Self::create_root(&mut tree, &ctx.meta, &root_name)?;
                let handle = new_handle(tree);
                let node = DocumentNode {
                    tree: handle.clone(),
                    ctx: ctx.clone(),
                    id,
                };
                {
                    let mut tree = tree_write!(handle);
                    node.add_attributes(&mut tree, id, Vec::new())?;
                }
                (handle, id)
            }
            (None, None) => {
                return Err(XmlError::Configuration(
                    "A root node name is required when no driver or source provides one"
                        .to_string(),
                ))
            }
        };

        debug!(driver = %kind, "created document");
        Ok(Document {
            root: DocumentNode { tree, ctx, id },
        })
    }

    fn create_root(tree: &mut Tree, meta: &Meta, root_name: &str) -> XmlResult<NodeId> {
        let id = match meta.namespace(root_name) {
            Some(uri) => {
                let name = match meta.prefix(root_name) {
                    Some(prefix) => format!("{}:{}", prefix, root_name),
                    None => root_name.to_string(),
                };
                let id = tree.create_element_ns(uri, &name);
                tree.declare_namespace(id, split_qname(&name).0, uri)?;
                id
            }
            None => tree.create_element(root_name),
        };
        let document = tree.document();
        tree.append_child(document, id)?;
        Ok(id)
    }

    /// Wrap a node as a document sharing its tree
    pub fn wrap(node: DocumentNode) -> Document {
        Document { root: node }
    }

    /// The root node
    pub fn root(&self) -> &DocumentNode {
        &self.root
    }

    /// An independent copy of the document tree
    pub fn to_tree(&self) -> XmlResult<Tree> {
        let tree = tree_read!(self.root.tree);
        Ok(tree.clone())
    }
}

impl Deref for Document {
    type Target = DocumentNode;

    fn deref(&self) -> &DocumentNode {
        &self.root
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
