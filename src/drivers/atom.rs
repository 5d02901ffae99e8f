//! Atom driver
//!
//! Atom 1.0 feeds (RFC 4287). Text constructs are tagged `type="html"` or
//! `type="text"` by sniffing their content, dates are written as RFC 3339.

use super::Driver;
use crate::core::document::{Document, DocumentNode};
use crate::core::error::XmlResult;
use crate::core::filter::{FilterTable, FilterTarget};
use crate::core::meta::{Meta, NodeConfig};
use crate::core::namespace::ns;
use crate::utils::datetime::{reformat, DATE_FORMAT, RFC3339_FORMAT};

/// Root element of Atom documents
pub const ROOT_NODE: &str = "feed";

/// Content type of Atom documents
pub const CONTENT_TYPE: &str = "application/atom+xml";

/// The Atom driver
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomDriver;

impl Driver for AtomDriver {
    fn name(&self) -> &'static str {
        "atom"
    }

    fn root_node(&self) -> Option<&'static str> {
        Some(ROOT_NODE)
    }

    fn filters(&self) -> FilterTable {
        FilterTable::core()
            .with("normalize_text", normalize_text)
            .with("normalize_datetime", normalize_datetime)
            .with("normalize_date", normalize_date)
    }

    fn initialize(&self, meta: &mut Meta) -> XmlResult<()> {
        meta.set_content_type(CONTENT_TYPE);
        meta.nodes([
            ("feed", NodeConfig::new().namespace(ns::ATOM)),
            ("href", NodeConfig::new().filter("normalize_uri")),
            ("link", NodeConfig::new().filter("normalize_uri")),
            ("logo", NodeConfig::new().filter("normalize_uri")),
            ("icon", NodeConfig::new().filter("normalize_uri")),
            ("id", NodeConfig::new().filter("normalize_uri")),
            ("updated", NodeConfig::new().filter("normalize_datetime")),
            ("published", NodeConfig::new().filter("normalize_datetime")),
            ("startDate", NodeConfig::new().filter("normalize_date")),
            ("endDate", NodeConfig::new().filter("normalize_date")),
            ("summary", NodeConfig::new().filter("normalize_text")),
            ("subtitle", NodeConfig::new().filter("normalize_text")),
            ("title", NodeConfig::new().filter("normalize_text")),
            ("content", NodeConfig::new().filter("normalize_text")),
        ])?;
        Ok(())
    }
}

/// Tag a text construct as `html` when it contains markup, `text` otherwise
pub fn normalize_text(value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
    let is_html = value
        .find('<')
        .is_some_and(|open| value[open..].contains('>'));
    target.set_attribute("type", if is_html { "html" } else { "text" })?;
    Ok(value.to_string())
}

/// RFC 3339 datetime
pub fn normalize_datetime(value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
    reformat(value, target.options().utc_offset_seconds, RFC3339_FORMAT)
}

/// `YYYY-MM-DD` date
pub fn normalize_date(value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
    reformat(value, target.options().utc_offset_seconds, DATE_FORMAT)
}

/// Atom convenience builders
pub trait AtomBuilder {
    /// Add a person construct (`author`, `contributor`) with its `name` and
    /// optional `email` and `uri`
    fn add_person(
        &self,
        kind: &str,
        name: &str,
        email: Option<&str>,
        uri: Option<&str>,
    ) -> XmlResult<&Self>;

    /// Add a `content` element embedding another document, typed with that
    /// document's content type
    fn add_content(&self, document: &Document) -> XmlResult<&Self>;
}

impl AtomBuilder for DocumentNode {
    fn add_person(
        &self,
        kind: &str,
        name: &str,
        email: Option<&str>,
        uri: Option<&str>,
    ) -> XmlResult<&Self> {
        let person = self.add_node(kind, None, &[])?;
        person.add_node("name", Some(name), &[])?;
        if let Some(email) = email.filter(|e| !e.is_empty()) {
            person.add_node("email", Some(email), &[])?;
        }
        if let Some(uri) = uri.filter(|u| !u.is_empty()) {
            person.add_node("uri", Some(uri), &[])?;
        }
        Ok(self)
    }

    fn add_content(&self, document: &Document) -> XmlResult<&Self> {
        let content_type = document
            .content_type()
            .unwrap_or(super::DEFAULT_CONTENT_TYPE)
            .to_string();
        self.add_node("content", None, &[("type", content_type.as_str())])?
            .import(document)?;
        Ok(self)
    }
}
