//! Namespace management
//!
//! Well-known namespace URIs used by the drivers, qualified-name helpers, and
//! the in-scope prefix bookkeeping shared by the parser and the serializer.

use crate::core::error::{XmlError, XmlResult};
use std::collections::HashMap;

/// Well-known namespaces
pub mod ns {
    /// Reserved namespace of `xmlns` declarations
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
    /// XML namespace (for xml:lang, etc.)
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    /// Atom syndication format
    pub const ATOM: &str = "http://www.w3.org/2005/Atom";
    /// Sitemap protocol
    pub const SITEMAP: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";
    /// Sitemap video extension
    pub const SITEMAP_VIDEO: &str = "http://www.google.com/schemas/sitemap-video/1.1";
    /// Sitemap image extension
    pub const SITEMAP_IMAGE: &str = "http://www.google.com/schemas/sitemap-image/1.1";
    /// Sitemap news extension
    pub const SITEMAP_NEWS: &str = "http://www.google.com/schemas/sitemap-news/0.9";
    /// Sitemap mobile extension
    pub const SITEMAP_MOBILE: &str = "http://www.google.com/schemas/sitemap-mobile/1.0";
    /// Sitemap code search extension
    pub const SITEMAP_CODESEARCH: &str = "http://www.google.com/codesearch/schemas/sitemap/1.0";
    /// XRDS envelope
    pub const XRDS: &str = "xri://$xrds";
    /// XRD 2.0 descriptors
    pub const XRD: &str = "xri://$xrd*($v*2.0)";
    /// OpenID 1.x delegate
    pub const OPENID: &str = "http://openid.net/xmlns/1.0";
    /// XML prefix
    pub const XML_PREFIX: &str = "xml";
    /// XMLNS prefix
    pub const XMLNS_PREFIX: &str = "xmlns";
}

/// Split a qualified name into its optional prefix and local part
///
/// Only the first colon separates the prefix.
pub fn split_qname(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) if !prefix.is_empty() && !local.is_empty() => (Some(prefix), local),
        _ => (None, name),
    }
}

/// If `name` is a namespace declaration attribute, return the declared prefix
///
/// `xmlns` yields `Some(None)` (default namespace), `xmlns:p` yields
/// `Some(Some("p"))`, anything else yields `None`.
pub fn declared_prefix(name: &str) -> Option<Option<&str>> {
    if name == ns::XMLNS_PREFIX {
        return Some(None);
    }
    name.strip_prefix("xmlns:").map(Some)
}

/// Map of namespace prefix to URI for a single element scope
///
/// The default namespace is stored under the `None` prefix.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    prefix_to_uri: HashMap<Option<String>, String>,
}

impl NamespaceMap {
    /// Create an empty namespace map
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a namespace URI with a prefix
    ///
    /// # Returns
    ///
    /// Returns an error if the prefix is already registered to a different URI
    pub fn register(&mut self, prefix: Option<&str>, uri: &str) -> XmlResult<()> {
        let key = prefix.map(str::to_string);
        if let Some(existing_uri) = self.prefix_to_uri.get(&key) {
            if existing_uri != uri {
                return Err(XmlError::BadParam(format!(
                    "Prefix '{}' is already registered to '{}'",
                    prefix.unwrap_or(""),
                    existing_uri
                )));
            }
            return Ok(());
        }

        self.prefix_to_uri.insert(key, uri.to_string());
        Ok(())
    }

    /// Get the URI for a namespace prefix
    pub fn get_uri(&self, prefix: Option<&str>) -> Option<&str> {
        self.prefix_to_uri
            .get(&prefix.map(str::to_string))
            .map(|s| s.as_str())
    }

    /// Check if a namespace prefix is registered
    pub fn has_prefix(&self, prefix: Option<&str>) -> bool {
        self.get_uri(prefix).is_some()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.prefix_to_uri.is_empty()
    }
}

/// Stack of element scopes, innermost last
#[derive(Debug, Clone)]
pub struct NamespaceStack {
    frames: Vec<NamespaceMap>,
}

impl NamespaceStack {
    /// Create a stack whose base frame binds the reserved `xml` prefix
    pub fn new() -> Self {
        let mut base = NamespaceMap::new();
        // Fresh map, cannot conflict
        let _ = base.register(Some(ns::XML_PREFIX), ns::XML);
        Self { frames: vec![base] }
    }

    /// Enter an element scope
    pub fn push(&mut self, frame: NamespaceMap) {
        self.frames.push(frame);
    }

    /// Leave the innermost element scope
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Resolve a prefix against every open scope, innermost first
    ///
    /// An empty default namespace (`xmlns=""`) resolves to `None`.
    pub fn lookup(&self, prefix: Option<&str>) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get_uri(prefix))
            .filter(|uri| !uri.is_empty())
    }
}

impl Default for NamespaceStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_qname() {
        assert_eq!(split_qname("video:video"), (Some("video"), "video"));
        assert_eq!(split_qname("loc"), (None, "loc"));
        assert_eq!(split_qname(":odd"), (None, ":odd"));
    }

    #[test]
    fn test_declared_prefix() {
        assert_eq!(declared_prefix("xmlns"), Some(None));
        assert_eq!(declared_prefix("xmlns:video"), Some(Some("video")));
        assert_eq!(declared_prefix("version"), None);
    }

    #[test]
    fn test_namespace_map_duplicate_prefix() {
        let mut map = NamespaceMap::new();
        assert!(map.register(Some("ex"), "http://example.com/ns1").is_ok());
        assert!(map.register(Some("ex"), "http://example.com/ns1").is_ok());
        assert!(map.register(Some("ex"), "http://example.com/ns2").is_err());
    }

    #[test]
    fn test_stack_shadowing() {
        let mut stack = NamespaceStack::new();
        let mut outer = NamespaceMap::new();
        outer.register(None, ns::ATOM).unwrap();
        stack.push(outer);

        let mut inner = NamespaceMap::new();
        inner.register(None, "").unwrap();
        stack.push(inner);
        assert_eq!(stack.lookup(None), None);

        stack.pop();
        assert_eq!(stack.lookup(None), Some(ns::ATOM));
        assert_eq!(stack.lookup(Some("xml")), Some(ns::XML));
    }
}
