//! Driver metadata
//!
//! A `Meta` holds the node table of one driver: for each canonical node name,
//! either a configuration (effective node name, namespace, prefix, default
//! attributes, filter) or a bare alias to another canonical name.
//!
//! ```rust
//! use xmlkit::{Meta, NodeConfig, NodeSpec};
//!
//! let mut meta = Meta::default();
//! meta.nodes([
//!     ("feed", NodeSpec::from(NodeConfig::new().namespace("http://www.w3.org/2005/Atom"))),
//!     ("entry_title", NodeSpec::alias("title")),
//!     ("author", NodeConfig::new().node("creator").into()),
//! ])
//! .unwrap();
//!
//! assert_eq!(meta.alias("entry_title"), "title");
//! assert_eq!(meta.alias("author"), "creator");
//! assert_eq!(meta.key("dc:creator"), "author");
//! ```

use crate::core::error::{XmlError, XmlResult};
use crate::core::filter::{Filter, FilterTable};

/// Configuration of one node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeConfig {
    /// Effective tag name used in documents, if it differs from the key
    pub node: Option<String>,
    /// Namespace URI the node is created in
    pub namespace: Option<String>,
    /// Prefix for the namespace; used for root elements
    pub prefix: Option<String>,
    /// Default attributes, applied under caller attributes
    pub attributes: Vec<(String, String)>,
    /// Name of the filter applied to the node value
    pub filter: Option<String>,
}

impl NodeConfig {
    /// An empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the effective tag name
    pub fn node(mut self, node: impl Into<String>) -> Self {
        self.node = Some(node.into());
        self
    }

    /// Set the namespace URI
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set the namespace prefix
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Add a default attribute
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Set the filter name
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }
}

/// One entry of a table passed to `Meta::nodes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSpec {
    /// A node configuration
    Config(NodeConfig),
    /// A bare alias to a canonical name
    Alias(String),
}

impl NodeSpec {
    /// An alias entry
    pub fn alias(target: impl Into<String>) -> Self {
        NodeSpec::Alias(target.into())
    }
}

impl From<NodeConfig> for NodeSpec {
    fn from(config: NodeConfig) -> Self {
        NodeSpec::Config(config)
    }
}

/// A stored entry, with its filter resolved
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEntry {
    /// A node configuration
    Config {
        /// The configuration as installed
        config: NodeConfig,
        /// The resolved filter, if the configuration names one
        filter: Option<Filter>,
    },
    /// A bare alias to a canonical name
    Alias(String),
}

/// Node table of a driver
#[derive(Debug, Clone)]
pub struct Meta {
    /// Entries in installation order
    entries: Vec<(String, NodeEntry)>,
    /// Canonical name to effective name, for configs that set `node`
    node_map: Vec<(String, String)>,
    content_type: Option<String>,
    initialized: bool,
    filters: FilterTable,
}

impl Meta {
    /// Create an empty registry resolving filter names against `filters`
    pub fn new(filters: FilterTable) -> Self {
        Self {
            entries: Vec::new(),
            node_map: Vec::new(),
            content_type: None,
            initialized: false,
            filters,
        }
    }

    fn entry(&self, name: &str) -> Option<&NodeEntry> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, entry)| entry)
    }

    /// Resolve a name to the tag name used in documents
    ///
    /// A bare alias is replaced by its target first; the result is then
    /// mapped to its effective node name if its configuration sets one.
    pub fn alias(&self, name: &str) -> String {
        let name = match self.entry(name) {
            Some(NodeEntry::Alias(target)) => target.as_str(),
            _ => name,
        };
        self.node_map
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node.clone())
            .unwrap_or_else(|| name.to_string())
    }

    /// Entry holding the configuration for a name
    ///
    /// The name may be a canonical key, a bare alias, or an effective node
    /// name.
    fn config_entry(&self, name: &str) -> Option<(&NodeConfig, Option<Filter>)> {
        let canonical = match self.entry(name) {
            Some(NodeEntry::Alias(target)) => target.as_str(),
            Some(NodeEntry::Config { .. }) => name,
            None => self
                .node_map
                .iter()
                .find(|(_, node)| node == name)
                .map_or(name, |(key, _)| key.as_str()),
        };
        match self.entry(canonical) {
            Some(NodeEntry::Config { config, filter }) => Some((config, *filter)),
            _ => None,
        }
    }

    /// Configuration for a name
    pub fn get(&self, name: &str) -> Option<&NodeConfig> {
        self.config_entry(name).map(|(config, _)| config)
    }

    /// Namespace URI configured for a name
    pub fn namespace(&self, name: &str) -> Option<&str> {
        self.get(name)?.namespace.as_deref()
    }

    /// Namespace prefix configured for a name
    pub fn prefix(&self, name: &str) -> Option<&str> {
        self.get(name)?.prefix.as_deref()
    }

    /// Default attributes configured for a name
    pub fn attributes(&self, name: &str) -> &[(String, String)] {
        self.get(name).map(|c| c.attributes.as_slice()).unwrap_or(&[])
    }

    /// Effective node name configured for a name
    pub fn node(&self, name: &str) -> Option<&str> {
        self.get(name)?.node.as_deref()
    }

    /// Resolved filter for a name
    pub fn filter(&self, name: &str) -> Option<Filter> {
        self.config_entry(name)?.1
    }

    /// Merge a node table
    ///
    /// Before `set_initialized` entries of the new table replace existing
    /// ones; afterwards existing entries are kept and only new keys are
    /// added. Fails with `XmlError::Filter` if a configuration names an
    /// unknown filter and with `XmlError::Configuration` if an alias points
    /// at another alias. On error the registry is left unchanged.
    pub fn nodes<I, K, S>(&mut self, table: I) -> XmlResult<&mut Self>
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<NodeSpec>,
    {
        let mut entries = self.entries.clone();
        for (key, spec) in table {
            let key = key.into();
            let entry = match spec.into() {
                NodeSpec::Alias(target) => NodeEntry::Alias(target),
                NodeSpec::Config(config) => {
                    let filter = config
                        .filter
                        .as_deref()
                        .map(|name| self.filters.resolve(name))
                        .transpose()?;
                    NodeEntry::Config { config, filter }
                }
            };

            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, existing)) if !self.initialized => *existing = entry,
                Some(_) => {}
                None => entries.push((key, entry)),
            }
        }

        for (key, entry) in &entries {
            if let NodeEntry::Alias(target) = entry {
                let chained = entries
                    .iter()
                    .any(|(k, e)| k == target && matches!(e, NodeEntry::Alias(_)));
                if chained {
                    return Err(XmlError::Configuration(format!(
                        "Alias '{}' points at alias '{}'",
                        key, target
                    )));
                }
            }
        }

        self.entries = entries;
        self.generate_node_map();
        Ok(self)
    }

    fn generate_node_map(&mut self) {
        self.node_map = self
            .entries
            .iter()
            .filter_map(|(key, entry)| match entry {
                NodeEntry::Config {
                    config:
                        NodeConfig {
                            node: Some(node), ..
                        },
                    ..
                } => Some((key.clone(), node.clone())),
                _ => None,
            })
            .collect();
    }

    /// Map a tag name back to its canonical key
    ///
    /// The prefix is dropped, then the first canonical name whose effective
    /// node name matches is returned, else the bare name.
    pub fn key(&self, tag_name: &str) -> String {
        let bare = tag_name
            .rsplit_once(':')
            .map_or(tag_name, |(_, local)| local);
        self.node_map
            .iter()
            .find(|(_, node)| node == bare)
            .map(|(key, _)| key.clone())
            .unwrap_or_else(|| bare.to_string())
    }

    /// Prefixed registry name whose local part is `local`
    ///
    /// Only entries that configure a namespace qualify, so `video` finds
    /// `video:video` in the sitemap table.
    pub fn qualified(&self, local: &str) -> Option<&str> {
        self.entries.iter().find_map(|(key, entry)| match (key.split_once(':'), entry) {
            (Some((_, name)), NodeEntry::Config { config, .. })
                if name == local && config.namespace.is_some() =>
            {
                Some(key.as_str())
            }
            _ => None,
        })
    }

    /// Content type for HTTP responses
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Set the content type
    ///
    /// Same precedence as `nodes`: before `set_initialized` the new value
    /// wins, afterwards a value that is already set is kept.
    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        if !self.initialized || self.content_type.is_none() {
            self.content_type = Some(content_type.into());
        }
        self
    }

    /// Mark the registry as initialized, flipping the merge precedence
    pub fn set_initialized(&mut self) -> &mut Self {
        self.initialized = true;
        self
    }

    /// Whether `set_initialized` was called
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Filters available to this registry
    pub fn filters(&self) -> &FilterTable {
        &self.filters
    }

    /// Installed entries, in installation order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &NodeEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

impl Default for Meta {
    fn default() -> Self {
        Self::new(FilterTable::core())
    }
}
