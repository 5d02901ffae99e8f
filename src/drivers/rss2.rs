//! RSS 2.0 driver
//!
//! Titles and descriptions are stripped of markup, dates are written as
//! RFC 822 with a four digit year, and `atom:link` self references get their
//! usual attributes.

use super::Driver;
use crate::core::error::XmlResult;
use crate::core::filter::{FilterTable, FilterTarget};
use crate::core::meta::{Meta, NodeConfig};
use crate::core::namespace::ns;
use crate::utils::datetime::{reformat, RFC822_FORMAT};
use regex::Regex;
use std::sync::LazyLock;

/// Root element of RSS documents
pub const ROOT_NODE: &str = "rss";

/// Content type of RSS documents
pub const CONTENT_TYPE: &str = "application/rss+xml";

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// The RSS 2.0 driver
#[derive(Debug, Clone, Copy, Default)]
pub struct Rss2Driver;

impl Driver for Rss2Driver {
    fn name(&self) -> &'static str {
        "rss2"
    }

    fn root_node(&self) -> Option<&'static str> {
        Some(ROOT_NODE)
    }

    fn filters(&self) -> FilterTable {
        FilterTable::core()
            .with("normalize_text", normalize_text)
            .with("normalize_date", normalize_date)
    }

    fn initialize(&self, meta: &mut Meta) -> XmlResult<()> {
        meta.set_content_type(CONTENT_TYPE);
        meta.nodes([
            ("rss", NodeConfig::new().attribute("version", "2.0")),
            ("title", NodeConfig::new().filter("normalize_text")),
            ("description", NodeConfig::new().filter("normalize_text")),
            ("link", NodeConfig::new().filter("normalize_uri")),
            (
                "atom:link",
                NodeConfig::new()
                    .namespace(ns::ATOM)
                    .attribute("rel", "self")
                    .attribute("type", CONTENT_TYPE),
            ),
            ("href", NodeConfig::new().filter("normalize_uri")),
            ("docs", NodeConfig::new().filter("normalize_uri")),
            ("guid", NodeConfig::new().filter("normalize_uri")),
            ("pubDate", NodeConfig::new().filter("normalize_date")),
            ("lastBuildDate", NodeConfig::new().filter("normalize_date")),
        ])?;
        Ok(())
    }
}

/// Remove markup tags
pub fn normalize_text(value: &str, _target: &mut FilterTarget<'_>) -> XmlResult<String> {
    Ok(TAG_PATTERN.replace_all(value, "").into_owned())
}

/// RFC 822 date
pub fn normalize_date(value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
    reformat(value, target.options().utc_offset_seconds, RFC822_FORMAT)
}
