//! Value filters
//!
//! A filter receives the raw value of a node or attribute together with the
//! element it is being added to, and returns the value to store. Filters may
//! set attributes on that element as a side effect.
//!
//! Registry tables reference filters by name. Names are resolved against a
//! `FilterTable` when the table is installed with `Meta::nodes`, so a bad name
//! fails early instead of at insertion time.

use crate::core::error::{XmlError, XmlResult};
use crate::core::node::NodeId;
use crate::core::options::XmlOptions;
use crate::core::tree::Tree;
use std::collections::HashMap;
use std::fmt;
use tracing::warn;
use url::Url;

/// Signature of a value filter
pub type FilterFn = fn(&str, &mut FilterTarget<'_>) -> XmlResult<String>;

/// The element a filtered value is being added to
pub struct FilterTarget<'a> {
    tree: &'a mut Tree,
    node: NodeId,
    options: &'a XmlOptions,
}

impl<'a> FilterTarget<'a> {
    /// Create a target for `node`
    pub fn new(tree: &'a mut Tree, node: NodeId, options: &'a XmlOptions) -> Self {
        Self {
            tree,
            node,
            options,
        }
    }

    /// The target element
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Options of the owning document
    pub fn options(&self) -> &XmlOptions {
        self.options
    }

    /// Tag name of the target element
    pub fn name(&self) -> Option<&str> {
        self.tree.element(self.node).map(|e| e.name.as_str())
    }

    /// Set a plain attribute on the target element
    pub fn set_attribute(&mut self, name: &str, value: &str) -> XmlResult<()> {
        self.tree.set_attribute(self.node, name, value)
    }
}

/// A resolved filter: its registered name plus the function
#[derive(Clone, Copy)]
pub struct Filter {
    name: &'static str,
    func: FilterFn,
}

impl Filter {
    /// Create a filter
    pub fn new(name: &'static str, func: FilterFn) -> Self {
        Self { name, func }
    }

    /// Registered name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the filter
    pub fn apply(&self, value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
        (self.func)(value, target)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.name).finish()
    }
}

impl PartialEq for Filter {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

/// Filters available to a registry, by name
#[derive(Clone, Default)]
pub struct FilterTable {
    filters: HashMap<&'static str, Filter>,
}

impl FilterTable {
    /// An empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The filters every driver gets: `normalize_uri` and `normalize_bool`
    pub fn core() -> Self {
        Self::new()
            .with("normalize_uri", normalize_uri)
            .with("normalize_bool", normalize_bool)
    }

    /// Register a filter, replacing one with the same name
    pub fn register(&mut self, name: &'static str, func: FilterFn) {
        self.filters.insert(name, Filter::new(name, func));
    }

    /// Builder form of `register`
    pub fn with(mut self, name: &'static str, func: FilterFn) -> Self {
        self.register(name, func);
        self
    }

    /// Resolve a filter name
    pub fn resolve(&self, name: &str) -> XmlResult<Filter> {
        self.filters
            .get(name)
            .copied()
            .ok_or_else(|| XmlError::Filter(format!("Unknown filter '{}'", name)))
    }

    /// Check if a filter is registered
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }
}

impl fmt::Debug for FilterTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&str> = self.filters.keys().collect();
        names.sort();
        f.debug_set().entries(names).finish()
    }
}

/// Turn a site-relative path into an absolute link
///
/// Values that already carry a scheme (`://`) are returned unchanged. Other
/// values have the base URL path removed, if present, and are joined onto the
/// configured base URL. Without a base URL the value is returned unchanged.
pub fn normalize_uri(value: &str, target: &mut FilterTarget<'_>) -> XmlResult<String> {
    if value.contains("://") {
        return Ok(value.to_string());
    }
    let Some(base_url) = target.options().base_url.as_deref() else {
        warn!(value, "no base URL configured, leaving relative link as is");
        return Ok(value.to_string());
    };

    let mut base = Url::parse(base_url)
        .map_err(|e| XmlError::BadValue(format!("Invalid base URL '{}': {}", base_url, e)))?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    let base_path = base.path().to_string();
    let mut path = value.to_string();
    if base_path.len() > 1 && path.contains(&base_path) {
        path = path.replacen(&base_path, "", 1);
    }

    let url = base
        .join(path.trim_start_matches('/'))
        .map_err(|e| XmlError::BadValue(format!("Invalid link '{}': {}", value, e)))?;
    Ok(url.to_string())
}

/// Normalize a flag to `true` or `false`
///
/// Empty, `0`, `false`, `no` and `off` are false; anything else is true.
pub fn normalize_bool(value: &str, _target: &mut FilterTarget<'_>) -> XmlResult<String> {
    let falsy = matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    );
    Ok(if falsy { "false" } else { "true" }.to_string())
}
