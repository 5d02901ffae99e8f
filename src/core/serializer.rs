//! XML serializer
//!
//! This module writes a `Tree` back to XML text with quick-xml. Namespace
//! declarations are emitted where an element or attribute uses a namespace
//! that is not yet in scope.

use crate::core::error::{XmlError, XmlResult};
use crate::core::namespace::{split_qname, NamespaceMap, NamespaceStack};
use crate::core::node::{Element, NodeId, NodeKind};
use crate::core::tree::Tree;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

/// Serializer for document trees
pub struct XmlSerializer {
    indent: Option<usize>,
}

impl XmlSerializer {
    /// Create a serializer producing compact output
    pub fn new() -> Self {
        Self { indent: None }
    }

    /// Create a serializer producing indented output
    ///
    /// Whitespace-only text nodes are dropped so that existing formatting does
    /// not pile up with the writer's own indentation.
    pub fn formatted(indent: usize) -> Self {
        Self {
            indent: Some(indent),
        }
    }

    /// Serialize a whole document, including the XML declaration
    pub fn serialize(&self, tree: &Tree) -> XmlResult<String> {
        let mut parts = Vec::new();
        for child in tree.children(tree.document()) {
            parts.push(self.serialize_node(tree, child)?);
        }

        Ok(format!(
            "<?xml version=\"{}\" encoding=\"{}\"?>\n{}\n",
            tree.version(),
            tree.encoding(),
            parts.join("\n")
        ))
    }

    /// Serialize a single node and its subtree, without a declaration
    pub fn serialize_node(&self, tree: &Tree, id: NodeId) -> XmlResult<String> {
        let mut writer = match self.indent {
            Some(indent) => Writer::new_with_indent(Cursor::new(Vec::new()), b' ', indent),
            None => Writer::new(Cursor::new(Vec::new())),
        };
        let mut scopes = NamespaceStack::new();
        self.write_node(&mut writer, tree, id, &mut scopes)?;

        let result = writer.into_inner().into_inner();
        String::from_utf8(result)
            .map_err(|e| XmlError::Serialization(format!("UTF-8 encoding error: {}", e)))
    }

    fn write_node(
        &self,
        writer: &mut Writer<Cursor<Vec<u8>>>,
        tree: &Tree,
        id: NodeId,
        scopes: &mut NamespaceStack,
    ) -> XmlResult<()> {
        match tree.kind(id) {
            NodeKind::Document => {
                for child in tree.children(id) {
                    self.write_node(writer, tree, child, scopes)?;
                }
            }
            NodeKind::Element(element) => {
                self.write_element(writer, tree, id, element, scopes)?;
            }
            NodeKind::Text(text) => {
                if self.indent.is_some() && text.trim().is_empty() {
                    return Ok(());
                }
                writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))?;
            }
            NodeKind::CData(text) => {
                writer.write_event(Event::CData(BytesCData::new(text.as_str())))?;
            }
            NodeKind::Comment(text) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
            NodeKind::ProcessingInstruction { target, data } => {
                let content = if data.is_empty() {
                    target.clone()
                } else {
                    format!("{} {}", target, data)
                };
                writer.write_event(Event::PI(BytesPI::new(content)))?;
            }
        }
        Ok(())
    }

    fn write_element(
        &self,
        writer: &mut Writer<Cursor<Vec<u8>>>,
        tree: &Tree,
        id: NodeId,
        element: &Element,
        scopes: &mut NamespaceStack,
    ) -> XmlResult<()> {
        let mut start = BytesStart::new(element.name.as_str());
        let mut frame = NamespaceMap::new();

        // Explicit declarations first
        for decl in &element.namespaces {
            if frame.register(decl.prefix.as_deref(), &decl.uri).is_ok() {
                start.push_attribute((decl.attribute_name().as_str(), decl.uri.as_str()));
            }
        }

        // Then whatever the element and its attributes need but is not in scope
        let mut needed: Vec<(Option<&str>, &str)> = Vec::new();
        if let Some(uri) = &element.namespace {
            needed.push((element.prefix(), uri.as_str()));
        }
        for attribute in &element.attributes {
            if let (Some(uri), (Some(prefix), _)) =
                (&attribute.namespace, split_qname(&attribute.name))
            {
                if prefix != "xml" {
                    needed.push((Some(prefix), uri.as_str()));
                }
            }
        }
        for (prefix, uri) in needed {
            if frame.has_prefix(prefix) || scopes.lookup(prefix) == Some(uri) {
                continue;
            }
            if frame.register(prefix, uri).is_ok() {
                let name = match prefix {
                    Some(prefix) => format!("xmlns:{}", prefix),
                    None => "xmlns".to_string(),
                };
                start.push_attribute((name.as_str(), uri));
            }
        }

        for attribute in &element.attributes {
            start.push_attribute((attribute.name.as_str(), attribute.value.as_str()));
        }

        if !tree.has_children(id) {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        scopes.push(frame);
        writer.write_event(Event::Start(start))?;
        for child in tree.children(id) {
            self.write_node(writer, tree, child, scopes)?;
        }
        writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
        scopes.pop();
        Ok(())
    }
}

impl Default for XmlSerializer {
    fn default() -> Self {
        Self::new()
    }
}
