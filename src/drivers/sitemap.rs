//! Sitemap driver
//!
//! Sitemap protocol 0.9 plus the video, image, news, mobile and code search
//! extensions. Extension elements are written with their prefix
//! (`video:video`) and the prefix is declared on `urlset`.

use super::Driver;
use crate::core::document::DocumentNode;
use crate::core::error::XmlResult;
use crate::core::filter::{FilterTable, FilterTarget};
use crate::core::meta::{Meta, NodeConfig};
use crate::core::namespace::ns;
use crate::utils::datetime::{reformat, DATE_FORMAT, RFC3339_FORMAT};

/// Root element of sitemaps
pub const ROOT_NODE: &str = "urlset";

/// The Sitemap driver
#[derive(Debug, Clone, Copy, Default)]
pub struct SitemapDriver;

impl Driver for SitemapDriver {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn root_node(&self) -> Option<&'static str> {
        Some(ROOT_NODE)
    }

    fn filters(&self) -> FilterTable {
        FilterTable::core()
            .with("normalize_datetime", normalize_datetime)
            .with("normalize_date", normalize_date)
    }

    fn initialize(&self, meta: &mut Meta) -> XmlResult<()> {
        meta.nodes([
            ("urlset", NodeConfig::new().namespace(ns::SITEMAP)),
            ("loc", NodeConfig::new().filter("normalize_uri")),
            ("lastmod", NodeConfig::new().filter("normalize_date")),
            // Video
            ("video:video", NodeConfig::new().namespace(ns::SITEMAP_VIDEO)),
            ("video:thumbnail_loc", NodeConfig::new().filter("normalize_uri")),
            ("video:content_loc", NodeConfig::new().filter("normalize_uri")),
            ("video:player_loc", NodeConfig::new().filter("normalize_uri")),
            ("video:expiration_date", NodeConfig::new().filter("normalize_datetime")),
            // Image
            ("image:image", NodeConfig::new().namespace(ns::SITEMAP_IMAGE)),
            ("image:loc", NodeConfig::new().filter("normalize_uri")),
            // News
            ("news:news", NodeConfig::new().namespace(ns::SITEMAP_NEWS)),
            ("news:publication_date", NodeConfig::new().filter("normalize_date")),
            // Mobile
            ("mobile:mobile", NodeConfig::new().namespace(ns::SITEMAP_MOBILE)),
            // Code search
            ("codesearch:codesearch", NodeConfig::new().namespace(ns::SITEMAP_CODESEARCH)),
        ])?;
        Ok(())
    }
}

/// W3C datetime
pub fn normalize_datetime(value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
    reformat(value, target.options().utc_offset_seconds, RFC3339_FORMAT)
}

/// `YYYY-MM-DD` date
pub fn normalize_date(value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
    reformat(value, target.options().utc_offset_seconds, DATE_FORMAT)
}

/// Sitemap convenience builders
pub trait SitemapBuilder {
    /// Add a `url` entry
    ///
    /// `options` become children of `url` (`lastmod`, `changefreq`,
    /// `priority`, ...). Each extension adds an `ext:ext` element (for
    /// example `video:video`) holding its parameters as children.
    ///
    /// ```rust
    /// use xmlkit::{DriverKind, RegistryStore, SitemapBuilder, XmlOptions};
    ///
    /// let mut store = RegistryStore::new(XmlOptions::default());
    /// let sitemap = store.create(DriverKind::Sitemap).unwrap();
    /// sitemap
    ///     .add_url(
    ///         "http://example.com/",
    ///         &[("lastmod", "2020-01-02")],
    ///         &[("image", &[("image:loc", "http://example.com/a.png")])],
    ///     )
    ///     .unwrap();
    /// assert!(sitemap.render(false).unwrap().contains("<image:image><image:loc>"));
    /// ```
    fn add_url(
        &self,
        url: &str,
        options: &[(&str, &str)],
        extensions: &[(&str, &[(&str, &str)])],
    ) -> XmlResult<&Self>;
}

impl SitemapBuilder for DocumentNode {
    fn add_url(
        &self,
        url: &str,
        options: &[(&str, &str)],
        extensions: &[(&str, &[(&str, &str)])],
    ) -> XmlResult<&Self> {
        let url_node = self.add_node("url", None, &[])?;
        url_node.add_node("loc", Some(url), &[])?;
        for &(key, value) in options {
            url_node.add_node(key, Some(value), &[])?;
        }
        for (extension, params) in extensions {
            let extension_node =
                url_node.add_node(&format!("{}:{}", extension, extension), None, &[])?;
            for &(key, value) in params.iter() {
                extension_node.add_node(key, Some(value), &[])?;
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_installs() {
        let mut meta = Meta::new(SitemapDriver.filters());
        SitemapDriver.initialize(&mut meta).unwrap();
        assert_eq!(meta.content_type(), None);
        assert_eq!(meta.namespace("urlset"), Some(ns::SITEMAP));
        assert_eq!(meta.namespace("video:video"), Some(ns::SITEMAP_VIDEO));
        assert_eq!(meta.namespace("video:thumbnail_loc"), None);
        assert_eq!(
            meta.filter("video:expiration_date").map(|f| f.name()),
            Some("normalize_datetime")
        );
    }
}
