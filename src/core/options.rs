//! Document options
//!
//! Runtime configuration shared by every document created from one
//! `RegistryStore`.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options controlling document creation and filters
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct XmlOptions {
    /// Version written in the XML declaration of new documents
    pub xml_version: String,
    /// Encoding written in the XML declaration
    pub encoding: String,
    /// Indentation width used by formatted rendering
    pub indent: usize,
    /// Base URL used by `normalize_uri` to turn relative paths into links
    pub base_url: Option<String>,
    /// UTC offset applied when date filters format timestamps
    pub utc_offset_seconds: i32,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            xml_version: "1.0".to_string(),
            encoding: "UTF-8".to_string(),
            indent: 2,
            base_url: None,
            utc_offset_seconds: 0,
        }
    }
}

impl XmlOptions {
    /// Set the XML declaration version.
    pub fn xml_version(mut self, version: impl Into<String>) -> Self {
        self.xml_version = version.into();
        self
    }

    /// Set the declared encoding.
    ///
    /// Output is always UTF-8; this only changes the declaration.
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the indentation width for formatted output.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Set the base URL relative links are resolved against.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the UTC offset, in seconds, used for formatted dates.
    pub fn utc_offset_seconds(mut self, offset: i32) -> Self {
        self.utc_offset_seconds = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = XmlOptions::default()
            .base_url("http://example.com/")
            .indent(4)
            .utc_offset_seconds(3600);
        assert_eq!(options.base_url.as_deref(), Some("http://example.com/"));
        assert_eq!(options.indent, 4);
        assert_eq!(options.utc_offset_seconds, 3600);
        assert_eq!(options.xml_version, "1.0");
        assert_eq!(options.encoding, "UTF-8");
    }
}
