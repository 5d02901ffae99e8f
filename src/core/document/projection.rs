//! Array projection
//!
//! `as_array` turns the element children of a node into nested `Value`s:
//! every element becomes a record keyed by its canonical name, same-named
//! siblings are collected into lists, and attributes go under
//! `xml_attributes`. `from_array` builds elements back from such a structure
//! and accepts looser shapes than `as_array` produces.
//!
//! Record rules, in order, for an element `n` with key `k`:
//!
//! 1. attributes give `{"xml_attributes": {...}}`
//! 2. if the first child of `n` has no children of its own, the record is
//!    replaced by the trimmed text of that child
//! 3. every element child is projected and appended to the list under its
//!    key in the record
//!
//! Step 2 drops the attributes of elements that hold text. An element with no
//! attributes and no children projects as empty text.

use super::DocumentNode;
use crate::core::error::{XmlError, XmlResult};
use crate::core::meta::Meta;
use crate::core::namespace::split_qname;
use crate::core::node::{NodeId, NodeKind};
use crate::core::tree::Tree;
use crate::types::value::{Value, ATTRIBUTES_KEY};

/// Key under which text is kept when an element record also has children
const TEXT_INDEX: &str = "0";

/// Project one element to `(key, record)`
pub(super) fn project(tree: &Tree, meta: &Meta, id: NodeId) -> (String, Value) {
    let Some(element) = tree.element(id) else {
        return (String::new(), Value::Text(tree.text_content(id)));
    };
    let key = meta.key(&element.name);
    let mut record: Option<Value> = None;

    if !element.attributes.is_empty() {
        let attributes = element
            .attributes
            .iter()
            .map(|a| (meta.key(&a.name), Value::Text(a.value.clone())))
            .collect();
        record = Some(Value::map([(ATTRIBUTES_KEY, Value::Map(attributes))]));
    }

    if let Some(first) = tree.first_child(id) {
        if !tree.has_children(first) {
            record = Some(Value::Text(leaf_text(tree, first).trim().to_string()));
        }

        for child in tree.child_elements(id) {
            let (child_key, child_value) = project(tree, meta, child);
            let current = record.get_or_insert_with(Value::empty_map);
            if let Value::Text(text) = current {
                let text = std::mem::take(text);
                *current = Value::empty_map();
                if !text.trim().is_empty() {
                    current.insert(TEXT_INDEX, Value::Text(text));
                }
            }
            current.push_to(&child_key, child_value);
        }
    }

    (key, record.unwrap_or_else(|| Value::Text(String::new())))
}

/// Character content of a node that has no children
fn leaf_text(tree: &Tree, id: NodeId) -> String {
    match tree.kind(id) {
        NodeKind::Text(text) | NodeKind::CData(text) | NodeKind::Comment(text) => text.clone(),
        NodeKind::ProcessingInstruction { data, .. } => data.clone(),
        NodeKind::Element(_) | NodeKind::Document => String::new(),
    }
}

impl DocumentNode {
    /// Project the element children of this node
    ///
    /// The node itself is not part of the result.
    ///
    /// ```rust
    /// use xmlkit::{DriverKind, RegistryStore, Value, XmlOptions};
    ///
    /// let mut store = RegistryStore::new(XmlOptions::default());
    /// let doc = store.load(DriverKind::Generic, "<channel><item>a</item><item>b</item></channel>").unwrap();
    /// assert_eq!(doc.as_array().unwrap(), Value::map([("item", Value::list(["a", "b"]))]));
    /// ```
    pub fn as_array(&self) -> XmlResult<Value> {
        let tree = tree_read!(self.tree);
        let mut result = Value::empty_map();
        for child in tree.child_elements(self.id) {
            let (key, value) = project(&tree, &self.ctx.meta, child);
            result.push_to(&key, value);
        }
        Ok(result)
    }

    /// Build elements under this node from a projected structure
    ///
    /// - text is filtered by this node's name and appended
    /// - numeric keys and list positions are repeated siblings of this node;
    ///   position 0 is this node itself
    /// - `xml_attributes` holds attributes for this node
    /// - any other key creates a child element
    pub fn from_array(&self, value: &Value) -> XmlResult<&Self> {
        let mut tree = tree_write!(self.tree);
        self.build(&mut tree, self.id, value)?;
        Ok(self)
    }

    fn build(&self, tree: &mut Tree, target: NodeId, value: &Value) -> XmlResult<()> {
        match value {
            Value::Text(text) => {
                if !text.is_empty() {
                    let name = Self::tag_name(tree, target)?;
                    let text = self.filter(tree, &name, text, target)?;
                    tree.append_text(target, &text)?;
                }
            }
            Value::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.build_indexed(tree, target, index, item)?;
                }
            }
            Value::Map(entries) => {
                for (key, item) in entries {
                    if let Ok(index) = key.parse::<usize>() {
                        self.build_indexed(tree, target, index, item)?;
                    } else if key == ATTRIBUTES_KEY {
                        let attributes = item
                            .as_map()
                            .unwrap_or_default()
                            .iter()
                            .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                            .collect();
                        self.add_attributes(tree, target, attributes)?;
                    } else {
                        let name = self.element_name(tree, target, key);
                        let child = self.create_element(tree, &name)?;
                        self.add_attributes(tree, child, Vec::new())?;
                        tree.append_child(target, child)?;
                        self.build(tree, child, item)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn build_indexed(
        &self,
        tree: &mut Tree,
        target: NodeId,
        index: usize,
        value: &Value,
    ) -> XmlResult<()> {
        if index == 0 {
            return self.build(tree, target, value);
        }
        let name = Self::tag_name(tree, target)?;
        let parent = tree
            .parent(target)
            .ok_or_else(|| XmlError::BadParam(format!("'{}' has no parent to add siblings to", name)))?;
        let sibling = self.create_element(tree, &name)?;
        tree.append_child(parent, sibling)?;
        self.build(tree, sibling, value)
    }

    /// Tag name for a record key under `parent`
    ///
    /// Keys lose their prefix in `as_array`. Children of an element whose
    /// prefix differs from the root's take the parent's prefix when that
    /// prefix is configured or declared on the root. Other unconfigured keys
    /// take the prefixed registry name sharing their local part.
    fn element_name(&self, tree: &Tree, parent: NodeId, key: &str) -> String {
        if key.contains(':') {
            return key.to_string();
        }
        let meta = &self.ctx.meta;

        let root_prefix = tree
            .root_element()
            .and_then(|root| tree.element(root))
            .and_then(|root| split_qname(&root.name).0.map(str::to_string));
        let parent_prefix = tree.element(parent).and_then(|e| split_qname(&e.name).0);
        if let Some(prefix) = parent_prefix.filter(|p| Some(*p) != root_prefix.as_deref()) {
            let name = format!("{}:{}", prefix, key);
            if meta.get(&name).is_some() || Self::root_namespace(tree, prefix).is_some() {
                return name;
            }
        }

        if meta.get(key).is_none() && meta.alias(key) == key {
            if let Some(name) = meta.qualified(key) {
                return name.to_string();
            }
        }
        key.to_string()
    }

    fn tag_name(tree: &Tree, id: NodeId) -> XmlResult<String> {
        tree.element(id)
            .map(|e| e.name.clone())
            .ok_or_else(|| XmlError::BadParam("Target is not an element".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::error::XmlError;
    use crate::core::meta::{Meta, NodeConfig};
    use crate::core::options::XmlOptions;
    use crate::drivers::DriverKind;
    use crate::types::Value;
    use crate::Document;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn document(meta: Meta, source: &str) -> Document {
        Document::new(
            DriverKind::Generic,
            Arc::new(meta),
            XmlOptions::default(),
            None,
            Some(source.into()),
        )
        .unwrap()
    }

    #[test]
    fn test_siblings_merge() {
        let doc = document(Meta::default(), "<channel><item>a</item><item>b</item></channel>");
        assert_eq!(
            doc.as_array().unwrap(),
            Value::map([("item", Value::list(["a", "b"]))])
        );
    }

    #[test]
    fn test_nested_records_and_attributes() {
        let doc = document(
            Meta::default(),
            r#"<rss><channel><link href="x"/><item><title> t </title></item></channel></rss>"#,
        );
        let expected = Value::map([(
            "channel",
            Value::list([Value::map([
                (
                    "link",
                    Value::list([Value::map([(
                        "xml_attributes",
                        Value::map([("href", "x")]),
                    )])]),
                ),
                (
                    "item",
                    Value::list([Value::map([("title", Value::list(["t"]))])]),
                ),
            ])]),
        )]);
        assert_eq!(doc.as_array().unwrap(), expected);
    }

    #[test]
    fn test_leaf_text_replaces_attributes() {
        // Text content wins over attributes on the same element
        let doc = document(Meta::default(), r#"<feed><title type="text">Hello</title></feed>"#);
        assert_eq!(
            doc.as_array().unwrap(),
            Value::map([("title", Value::list(["Hello"]))])
        );
    }

    #[test]
    fn test_attributes_kept_when_first_child_has_children() {
        let doc = document(
            Meta::default(),
            r#"<feed><author id="1"><name>n</name></author></feed>"#,
        );
        let author = &doc.as_array().unwrap();
        let record = &author.get("author").unwrap().as_list().unwrap()[0];
        assert_eq!(record.get("xml_attributes"), Some(&Value::map([("id", "1")])));
        assert_eq!(record.get("name"), Some(&Value::list(["n"])));
    }

    #[test]
    fn test_mixed_text_kept_under_index() {
        let doc = document(Meta::default(), "<root><p>intro<b>x</b></p></root>");
        assert_eq!(
            doc.as_array().unwrap(),
            Value::map([(
                "p",
                Value::list([Value::map([
                    ("0", Value::from("intro")),
                    ("b", Value::list(["x"])),
                ])]),
            )])
        );
    }

    #[test]
    fn test_keys_use_registry_names() {
        let mut meta = Meta::default();
        meta.nodes([("author", NodeConfig::new().node("creator"))]).unwrap();
        let doc = document(meta, "<root><dc:creator xmlns:dc=\"urn:dc\">me</dc:creator></root>");
        assert_eq!(
            doc.as_array().unwrap(),
            Value::map([("author", Value::list(["me"]))])
        );
    }

    #[test]
    fn test_from_array_siblings_with_attributes() {
        let doc = document(Meta::default(), "<root/>");
        doc.from_array(&Value::map([(
            "item",
            Value::list([
                Value::map([("xml_attributes", Value::map([("id", "1")]))]),
                Value::map([("xml_attributes", Value::map([("id", "2")]))]),
            ]),
        )]))
        .unwrap();

        let items = doc.get("item").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attribute("id"), "1");
        assert_eq!(items[1].attribute("id"), "2");
        assert!(items.iter().all(|item| item.value().is_none()));
    }

    #[test]
    fn test_from_array_numeric_keys_and_text() {
        let doc = document(Meta::default(), "<root/>");
        doc.from_array(&Value::map([(
            "item",
            Value::map([("0", Value::from("a")), ("1", Value::from("b"))]),
        )]))
        .unwrap();
        assert_eq!(
            doc.render(false).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<root><item>a</item><item>b</item></root>\n"
        );
    }

    #[test]
    fn test_from_array_sibling_of_root_fails() {
        let doc = document(Meta::default(), "<root/>");
        let result = doc.from_array(&Value::list(["a", "b"]));
        assert!(matches!(result, Err(XmlError::BadParam(_))));
    }

    #[test]
    fn test_from_array_restores_extension_prefixes() {
        let mut meta = Meta::default();
        meta.nodes([
            ("urlset", NodeConfig::new().namespace("urn:sitemap")),
            ("video:video", NodeConfig::new().namespace("urn:video")),
        ])
        .unwrap();
        let doc = document(meta, r#"<urlset xmlns="urn:sitemap"/>"#);
        doc.from_array(&Value::map([(
            "url",
            Value::map([
                ("loc", Value::from("a")),
                ("video", Value::map([("title", Value::from("t"))])),
            ]),
        )]))
        .unwrap();

        assert_eq!(
            doc.render(false).unwrap(),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"urn:sitemap\" xmlns:video=\"urn:video\"><url><loc>a</loc><video:video><video:title>t</video:title></video:video></url></urlset>\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let source = document(
            Meta::default(),
            r#"<urlset><url><loc>a</loc><image><loc>i</loc></image></url><url><loc>b</loc><flag/></url></urlset>"#,
        );
        let projected = source.as_array().unwrap();

        let target = document(Meta::default(), "<urlset/>");
        target.from_array(&projected).unwrap();
        assert_eq!(target.as_array().unwrap(), projected);
        assert_eq!(target.render(false).unwrap(), source.render(false).unwrap());
    }
}
