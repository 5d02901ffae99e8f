//! Registry store
//!
//! Owns one `Meta` per driver. A driver's registry is built the first time a
//! document of that driver is requested and then shared by every document
//! created from the store.

use crate::core::document::{Document, Source};
use crate::core::error::XmlResult;
use crate::core::meta::Meta;
use crate::core::options::XmlOptions;
use crate::drivers::{Driver, DriverKind, DEFAULT_CONTENT_TYPE};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Per-driver registries plus the options documents are built with
///
/// ```rust
/// use xmlkit::{DriverKind, NodeConfig, RegistryStore, XmlOptions};
///
/// let mut store = RegistryStore::new(XmlOptions::default());
/// store
///     .configure(DriverKind::Generic, |meta| {
///         meta.nodes([("flag", NodeConfig::new().filter("normalize_bool"))])?;
///         Ok(())
///     })
///     .unwrap();
///
/// let doc = store.create_with_root(DriverKind::Generic, "settings").unwrap();
/// doc.add_node("flag", Some("off"), &[]).unwrap();
/// assert!(doc.render(false).unwrap().contains("<flag>false</flag>"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegistryStore {
    options: XmlOptions,
    metas: HashMap<DriverKind, Arc<Meta>>,
}

impl RegistryStore {
    /// Create an empty store
    pub fn new(options: XmlOptions) -> Self {
        Self {
            options,
            metas: HashMap::new(),
        }
    }

    /// Options new documents are built with
    pub fn options(&self) -> &XmlOptions {
        &self.options
    }

    /// Registry of a driver, initializing it on first use
    pub fn meta(&mut self, kind: DriverKind) -> XmlResult<Arc<Meta>> {
        if let Some(meta) = self.metas.get(&kind) {
            return Ok(meta.clone());
        }

        let mut meta = Meta::new(kind.filters());
        kind.initialize(&mut meta)?;
        meta.set_initialized();
        meta.set_content_type(DEFAULT_CONTENT_TYPE);
        debug!(driver = %kind, entries = meta.entries().count(), "initialized driver registry");

        let meta = Arc::new(meta);
        self.metas.insert(kind, meta.clone());
        Ok(meta)
    }

    /// Modify a driver's registry
    ///
    /// The registry is initialized first, so `nodes` calls made here keep
    /// the driver's existing entries. Documents created before the change
    /// keep the registry they were built with.
    pub fn configure<F>(&mut self, kind: DriverKind, f: F) -> XmlResult<()>
    where
        F: FnOnce(&mut Meta) -> XmlResult<()>,
    {
        let mut meta = self.meta(kind)?;
        f(Arc::make_mut(&mut meta))?;
        self.metas.insert(kind, meta);
        Ok(())
    }

    /// Build a document from loosely typed arguments
    ///
    /// `driver` names a driver (`None` for plain XML), `root` overrides the
    /// driver's root element and `source` is XML text, a file path or a URL.
    pub fn factory(
        &mut self,
        driver: Option<&str>,
        root: Option<&str>,
        source: Option<&str>,
    ) -> XmlResult<Document> {
        let kind = match driver {
            Some(name) => name.parse()?,
            None => DriverKind::Generic,
        };
        let meta = self.meta(kind)?;
        Document::new(
            kind,
            meta,
            self.options.clone(),
            root,
            source.map(Source::detect),
        )
    }

    /// New empty document with the driver's root element
    pub fn create(&mut self, kind: DriverKind) -> XmlResult<Document> {
        let meta = self.meta(kind)?;
        Document::new(kind, meta, self.options.clone(), None, None)
    }

    /// New empty document with the given root element
    pub fn create_with_root(&mut self, kind: DriverKind, root: &str) -> XmlResult<Document> {
        let meta = self.meta(kind)?;
        Document::new(kind, meta, self.options.clone(), Some(root), None)
    }

    /// Document loaded from XML text, a file path or a URL
    pub fn load(&mut self, kind: DriverKind, source: &str) -> XmlResult<Document> {
        let meta = self.meta(kind)?;
        Document::new(
            kind,
            meta,
            self.options.clone(),
            None,
            Some(Source::detect(source)),
        )
    }
}
