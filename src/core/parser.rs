//! XML loader
//!
//! This module builds a `Tree` from XML text using quick-xml events,
//! resolving element and attribute namespaces as it goes.

use crate::core::error::{XmlError, XmlResult};
use crate::core::namespace::{declared_prefix, split_qname, NamespaceMap, NamespaceStack};
use crate::core::node::{Attribute, Element, NodeId, NodeKind};
use crate::core::tree::Tree;
use quick_xml::encoding::Decoder;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

/// Parser for XML documents
pub struct XmlParser {
    namespaces: NamespaceStack,
}

impl XmlParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self {
            namespaces: NamespaceStack::new(),
        }
    }

    /// Parse a complete document
    ///
    /// Whitespace-only text nodes inside the root element are kept. Fails
    /// with `XmlError::Parse` on malformed input, on a missing root element,
    /// and on content outside the root element.
    pub fn parse(&mut self, xml: &str) -> XmlResult<Tree> {
        self.parse_bytes(xml.as_bytes())
    }

    /// Parse a complete document from raw bytes
    ///
    /// Input must be UTF-8. Invalid sequences fail with `XmlError::Parse`
    /// instead of being replaced.
    pub fn parse_bytes(&mut self, xml: &[u8]) -> XmlResult<Tree> {
        let xml = xml.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(xml);
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);
        let decoder = reader.decoder();

        let mut tree = Tree::new();
        let mut open: Vec<NodeId> = vec![tree.document()];

        loop {
            let parent = open.last().copied().unwrap_or_else(|| tree.document());
            match reader.read_event() {
                Ok(Event::Decl(e)) => {
                    let version = e
                        .version()
                        .map_err(|e| XmlError::Parse(format!("Invalid XML declaration: {}", e)))?;
                    let version = decode(decoder, version.as_ref())?.into_owned();
                    let encoding = tree.encoding().to_string();
                    tree.set_declaration(version, encoding);
                }
                Ok(Event::Start(e)) => {
                    let id = self.open_element(&mut tree, decoder, &e)?;
                    Self::append(&mut tree, parent, id)?;
                    open.push(id);
                }
                Ok(Event::Empty(e)) => {
                    let id = self.open_element(&mut tree, decoder, &e)?;
                    Self::append(&mut tree, parent, id)?;
                    self.namespaces.pop();
                }
                Ok(Event::End(_)) => {
                    if open.len() <= 1 {
                        return Err(XmlError::Parse("Unexpected closing tag".to_string()));
                    }
                    open.pop();
                    self.namespaces.pop();
                }
                Ok(Event::Text(e)) => {
                    let raw_text = decode(decoder, e.as_ref())?;
                    let text = unescape(&raw_text)
                        .map_err(|e| XmlError::Parse(format!("Invalid text content: {}", e)))?;
                    Self::append_text(&mut tree, parent, &text)?;
                }
                Ok(Event::GeneralRef(e)) => {
                    let entity = format!("&{};", decode(decoder, e.as_ref())?);
                    let text = unescape(&entity)
                        .map_err(|_| XmlError::Parse(format!("Unknown entity '{}'", entity)))?;
                    Self::append_text(&mut tree, parent, &text)?;
                }
                Ok(Event::CData(e)) => {
                    let text = decode(decoder, e.as_ref())?.into_owned();
                    let id = tree.create(NodeKind::CData(text));
                    Self::append(&mut tree, parent, id)?;
                }
                Ok(Event::Comment(e)) => {
                    let text = decode(decoder, e.as_ref())?.into_owned();
                    let id = tree.create(NodeKind::Comment(text));
                    Self::append(&mut tree, parent, id)?;
                }
                Ok(Event::PI(e)) => {
                    let target = decode(decoder, e.target())?.into_owned();
                    let data = decode(decoder, e.content())?.trim().to_string();
                    let id = tree.create(NodeKind::ProcessingInstruction { target, data });
                    Self::append(&mut tree, parent, id)?;
                }
                Ok(Event::DocType(_)) => {}
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(XmlError::Parse(format!(
                        "XML parsing error at position {}: {}",
                        reader.error_position(),
                        e
                    )));
                }
            }
        }

        if open.len() > 1 {
            return Err(XmlError::Parse(
                "Unexpected end of input, unclosed element".to_string(),
            ));
        }
        if tree.root_element().is_none() {
            return Err(XmlError::Parse("Document has no root element".to_string()));
        }
        Ok(tree)
    }

    /// Create a detached element for a start tag and enter its namespace scope
    fn open_element(
        &mut self,
        tree: &mut Tree,
        decoder: Decoder,
        e: &BytesStart<'_>,
    ) -> XmlResult<NodeId> {
        let name = decode(decoder, e.name().as_ref())?.into_owned();
        let attrs = Self::collect_attributes(decoder, e)?;

        let mut frame = NamespaceMap::new();
        let mut declarations = Vec::new();
        let mut plain = Vec::new();
        for (key, value) in attrs {
            if let Some(prefix) = declared_prefix(&key) {
                frame
                    .register(prefix, &value)
                    .map_err(|e| XmlError::Parse(e.to_string()))?;
                declarations.push((prefix.map(str::to_string), value));
            } else {
                plain.push((key, value));
            }
        }
        self.namespaces.push(frame);

        let (prefix, _) = split_qname(&name);
        let mut element = match self.namespaces.lookup(prefix) {
            Some(uri) => Element::with_namespace(uri, name.as_str()),
            None => Element::new(name.as_str()),
        };
        for (prefix, uri) in declarations {
            element.declare_namespace(prefix.as_deref(), uri);
        }
        for (key, value) in plain {
            // Unprefixed attributes are in no namespace
            let attribute = match split_qname(&key).0.and_then(|p| self.namespaces.lookup(Some(p))) {
                Some(uri) => Attribute::with_namespace(uri, key.as_str(), value),
                None => Attribute::new(key.as_str(), value),
            };
            element.set_attribute(attribute);
        }

        Ok(tree.create(NodeKind::Element(element)))
    }

    /// Collect attributes from a start tag, unescaping values
    fn collect_attributes(decoder: Decoder, e: &BytesStart<'_>) -> XmlResult<Vec<(String, String)>> {
        e.attributes()
            .map(|attr| {
                let attr = attr.map_err(|e| XmlError::Parse(format!("Invalid attribute: {}", e)))?;
                let key = decode(decoder, attr.key.as_ref())?.into_owned();
                let raw_value = decode(decoder, attr.value.as_ref())?;
                let value = unescape(&raw_value)
                    .map_err(|e| XmlError::Parse(format!("Invalid attribute value: {}", e)))?
                    .to_string();
                Ok((key, value))
            })
            .collect()
    }

    fn append(tree: &mut Tree, parent: NodeId, child: NodeId) -> XmlResult<()> {
        tree.append_child(parent, child)
            .map(|_| ())
            .map_err(|e| XmlError::Parse(e.to_string()))
    }

    /// Append text, allowing only whitespace outside the root element
    fn append_text(tree: &mut Tree, parent: NodeId, text: &str) -> XmlResult<()> {
        if parent == tree.document() {
            if text.trim().is_empty() {
                return Ok(());
            }
            return Err(XmlError::Parse(
                "Text content outside of the root element".to_string(),
            ));
        }
        tree.append_text(parent, text)
    }
}

/// Decode raw bytes, rejecting invalid UTF-8
fn decode<'b>(decoder: Decoder, bytes: &'b [u8]) -> XmlResult<Cow<'b, str>> {
    decoder
        .decode(bytes)
        .map_err(|e| XmlError::Parse(format!("Invalid UTF-8 in document: {}", e)))
}

impl Default for XmlParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::namespace::ns;

    #[test]
    fn test_parse_namespaces() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:video="http://www.google.com/schemas/sitemap-video/1.1">
  <url><loc>http://example.com/</loc><video:video/></url>
</urlset>"#;

        let tree = XmlParser::new().parse(xml).unwrap();
        let root = tree.root_element().unwrap();
        let element = tree.element(root).unwrap();
        assert_eq!(element.name, "urlset");
        assert_eq!(element.namespace.as_deref(), Some(ns::SITEMAP));
        assert!(element.attributes.is_empty());
        assert_eq!(element.namespaces.len(), 2);

        let loc = tree.elements_by_tag_name(root, "loc")[0];
        assert_eq!(tree.element(loc).unwrap().namespace.as_deref(), Some(ns::SITEMAP));
        assert_eq!(tree.text_content(loc), "http://example.com/");

        let video = tree.elements_by_tag_name(root, "video:video")[0];
        assert_eq!(
            tree.element(video).unwrap().namespace.as_deref(),
            Some(ns::SITEMAP_VIDEO)
        );
    }

    #[test]
    fn test_parse_entities() {
        let tree = XmlParser::new()
            .parse(r#"<a title="x &amp; y">1 &lt; 2 &#38; &#x41;</a>"#)
            .unwrap();
        let root = tree.root_element().unwrap();
        assert_eq!(tree.get_attribute(root, "title"), Some("x & y"));
        assert_eq!(tree.text_content(root), "1 < 2 & A");
        assert_eq!(tree.children(root).count(), 1);
    }

    #[test]
    fn test_parse_keeps_comments_and_cdata() {
        let tree = XmlParser::new()
            .parse("<!-- head --><a><![CDATA[<b>]]></a>")
            .unwrap();
        let document = tree.document();
        assert_eq!(tree.children(document).count(), 2);
        let root = tree.root_element().unwrap();
        assert_eq!(tree.text_content(root), "<b>");
    }

    #[test]
    fn test_parse_rejects_invalid_utf8() {
        for xml in [
            &b"<a>\xff</a>"[..],
            b"<a t=\"\xc3\x28\"/>",
            b"<a\xfe/>",
            b"<a><!--\xff--></a>",
        ] {
            let result = XmlParser::new().parse_bytes(xml);
            assert!(
                matches!(result, Err(XmlError::Parse(_))),
                "expected parse error for {:?}",
                xml
            );
        }

        let tree = XmlParser::new()
            .parse_bytes("\u{feff}<a>caf\u{e9}</a>".as_bytes())
            .unwrap();
        let root = tree.root_element().unwrap();
        assert_eq!(tree.text_content(root), "caf\u{e9}");
    }

    #[test]
    fn test_parse_errors() {
        for xml in [
            "",
            "just text",
            "<a><b></a>",
            "<a>",
            "<a/><b/>",
            "<a/>trailing",
            r#"<a x="1" x="2"/>"#,
            "<a>&unknown;</a>",
        ] {
            let result = XmlParser::new().parse(xml);
            assert!(
                matches!(result, Err(XmlError::Parse(_))),
                "expected parse error for {:?}",
                xml
            );
        }
    }
}
