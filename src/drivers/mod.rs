//! Drivers
//!
//! A driver describes one XML dialect: the name of its root element, its
//! registry table (namespaces, default attributes, filters), its content
//! type, and the filters its table may reference. Convenience builders for
//! each dialect are extension traits on `DocumentNode`.

pub mod atom;
pub mod rss2;
pub mod sitemap;
pub mod xrds;

use crate::core::error::{XmlError, XmlResult};
use crate::core::filter::FilterTable;
use crate::core::meta::Meta;
use std::fmt;
use std::str::FromStr;

pub use atom::{AtomBuilder, AtomDriver};
pub use rss2::Rss2Driver;
pub use sitemap::{SitemapBuilder, SitemapDriver};
pub use xrds::{XrdsBuilder, XrdsDriver};

/// Content type used when a driver sets none
pub const DEFAULT_CONTENT_TYPE: &str = "text/xml";

/// Behavior of a driver
pub trait Driver {
    /// Driver name, as accepted by `DriverKind::from_str`
    fn name(&self) -> &'static str;

    /// Name of the root element of new documents
    fn root_node(&self) -> Option<&'static str>;

    /// Filters the driver's table may reference
    fn filters(&self) -> FilterTable {
        FilterTable::core()
    }

    /// Install the driver's table and content type
    fn initialize(&self, meta: &mut Meta) -> XmlResult<()>;
}

/// Driver without a table; the root element is chosen by the caller
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDriver;

impl Driver for GenericDriver {
    fn name(&self) -> &'static str {
        "xml"
    }

    fn root_node(&self) -> Option<&'static str> {
        None
    }

    fn initialize(&self, _meta: &mut Meta) -> XmlResult<()> {
        Ok(())
    }
}

/// Supported drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    /// Atom syndication
    Atom,
    /// RSS 2.0
    Rss2,
    /// Sitemap protocol
    Sitemap,
    /// XRDS service discovery
    Xrds,
    /// Plain XML
    Generic,
}

impl DriverKind {
    /// Every driver
    pub const ALL: [DriverKind; 5] = [
        DriverKind::Atom,
        DriverKind::Rss2,
        DriverKind::Sitemap,
        DriverKind::Xrds,
        DriverKind::Generic,
    ];
}

impl Driver for DriverKind {
    fn name(&self) -> &'static str {
        match self {
            DriverKind::Atom => AtomDriver.name(),
            DriverKind::Rss2 => Rss2Driver.name(),
            DriverKind::Sitemap => SitemapDriver.name(),
            DriverKind::Xrds => XrdsDriver.name(),
            DriverKind::Generic => GenericDriver.name(),
        }
    }

    fn root_node(&self) -> Option<&'static str> {
        match self {
            DriverKind::Atom => AtomDriver.root_node(),
            DriverKind::Rss2 => Rss2Driver.root_node(),
            DriverKind::Sitemap => SitemapDriver.root_node(),
            DriverKind::Xrds => XrdsDriver.root_node(),
            DriverKind::Generic => GenericDriver.root_node(),
        }
    }

    fn filters(&self) -> FilterTable {
        match self {
            DriverKind::Atom => AtomDriver.filters(),
            DriverKind::Rss2 => Rss2Driver.filters(),
            DriverKind::Sitemap => SitemapDriver.filters(),
            DriverKind::Xrds => XrdsDriver.filters(),
            DriverKind::Generic => GenericDriver.filters(),
        }
    }

    fn initialize(&self, meta: &mut Meta) -> XmlResult<()> {
        match self {
            DriverKind::Atom => AtomDriver.initialize(meta),
            DriverKind::Rss2 => Rss2Driver.initialize(meta),
            DriverKind::Sitemap => SitemapDriver.initialize(meta),
            DriverKind::Xrds => XrdsDriver.initialize(meta),
            DriverKind::Generic => GenericDriver.initialize(meta),
        }
    }
}

impl FromStr for DriverKind {
    type Err = XmlError;

    fn from_str(s: &str) -> XmlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "atom" => Ok(DriverKind::Atom),
            "rss2" | "rss" => Ok(DriverKind::Rss2),
            "sitemap" => Ok(DriverKind::Sitemap),
            "xrds" => Ok(DriverKind::Xrds),
            "xml" | "generic" => Ok(DriverKind::Generic),
            other => Err(XmlError::Configuration(format!("Unknown driver '{}'", other))),
        }
    }
}

impl fmt::Display for DriverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_names_round_trip() {
        for kind in DriverKind::ALL {
            assert_eq!(kind.name().parse::<DriverKind>().unwrap(), kind);
        }
        assert_eq!("RSS".parse::<DriverKind>().unwrap(), DriverKind::Rss2);
    }

    #[test]
    fn test_unknown_driver() {
        assert!(matches!(
            "opml".parse::<DriverKind>(),
            Err(XmlError::Configuration(_))
        ));
    }

    #[test]
    fn test_root_nodes() {
        assert_eq!(DriverKind::Atom.root_node(), Some("feed"));
        assert_eq!(DriverKind::Rss2.root_node(), Some("rss"));
        assert_eq!(DriverKind::Sitemap.root_node(), Some("urlset"));
        assert_eq!(DriverKind::Xrds.root_node(), Some("xrds:XRDS"));
        assert_eq!(DriverKind::Generic.root_node(), None);
    }
}
