//! XRDS driver
//!
//! XRDS documents for Yadis / OpenID service discovery.

use super::Driver;
use crate::core::document::DocumentNode;
use crate::core::error::XmlResult;
use crate::core::meta::{Meta, NodeConfig};
use crate::core::namespace::ns;

/// Root element of XRDS documents
pub const ROOT_NODE: &str = "xrds:XRDS";

/// Content type of XRDS documents
pub const CONTENT_TYPE: &str = "application/xrds+xml";

/// The XRDS driver
#[derive(Debug, Clone, Copy, Default)]
pub struct XrdsDriver;

impl Driver for XrdsDriver {
    fn name(&self) -> &'static str {
        "xrds"
    }

    fn root_node(&self) -> Option<&'static str> {
        Some(ROOT_NODE)
    }

    fn initialize(&self, meta: &mut Meta) -> XmlResult<()> {
        meta.set_content_type(CONTENT_TYPE);
        meta.nodes([
            (
                "xrds:XRDS",
                NodeConfig::new()
                    .namespace(ns::XRDS)
                    .attribute("xmlns", ns::XRD),
            ),
            ("LocalID", NodeConfig::new().filter("normalize_uri")),
            (
                "openid:Delegate",
                NodeConfig::new()
                    .filter("normalize_uri")
                    .namespace(ns::OPENID),
            ),
            ("URI", NodeConfig::new().filter("normalize_uri")),
        ])?;
        Ok(())
    }
}

/// XRDS convenience builders
pub trait XrdsBuilder {
    /// Add a `Service` with one `Type` per entry of `types` and a `URI`
    ///
    /// Returns the service node so more children (`LocalID`,
    /// `openid:Delegate`) can be added to it.
    fn add_service(
        &self,
        types: &[&str],
        uri: &str,
        priority: Option<u32>,
    ) -> XmlResult<DocumentNode>;
}

impl XrdsBuilder for DocumentNode {
    fn add_service(
        &self,
        types: &[&str],
        uri: &str,
        priority: Option<u32>,
    ) -> XmlResult<DocumentNode> {
        let priority = priority.map(|p| p.to_string());
        let attributes: Vec<(&str, &str)> = priority
            .as_deref()
            .map(|p| vec![("priority", p)])
            .unwrap_or_default();

        let service = self.add_node("Service", None, &attributes)?;
        for &service_type in types {
            service.add_node("Type", Some(service_type), &[])?;
        }
        service.add_node("URI", Some(uri), &[])?;
        Ok(service)
    }
}
