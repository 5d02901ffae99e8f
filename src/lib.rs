//! # XMLKit
//!
//! Driver-based XML document construction.
//!
//! A driver describes one XML dialect (Atom, RSS 2.0, Sitemap, XRDS): its
//! root element, the namespaces and default attributes of its elements, and
//! the filters applied to their values. Documents are built node by node
//! through `DocumentNode`, or from nested maps with `from_array`, and can be
//! projected back into that form with `as_array`.
//!
//! ## Example
//!
//! ```rust
//! use xmlkit::{AtomBuilder, DriverKind, RegistryStore, XmlOptions};
//!
//! let mut store = RegistryStore::new(XmlOptions::default().base_url("http://example.com"));
//! let feed = store.create(DriverKind::Atom)?;
//! feed.add_node("title", Some("News"), &[])?;
//! feed.add_node("link", None, &[("href", "/feed")])?;
//! feed.add_person("author", "Ada", Some("ada@example.com"), None)?;
//!
//! let xml = feed.render(true)?;
//! assert!(xml.contains(r#"<link href="http://example.com/feed"/>"#));
//! # Ok::<(), xmlkit::XmlError>(())
//! ```
//!
//! ## Features
//!
//! - `multi-thread` (default): documents can be sent and shared across threads
//! - `remote`: load documents from http(s) URLs
//! - `serde`: serialize options and projected values

pub mod core;
pub mod drivers;
pub mod types;
pub mod utils;

pub use crate::core::{
    Document, DocumentNode, Filter, FilterFn, FilterTable, FilterTarget, Importable, Meta,
    NodeConfig, NodeEntry, NodeId, NodeSpec, RegistryStore, Source, Tree, XmlError, XmlOptions,
    XmlParser, XmlResult, XmlSerializer,
};
pub use drivers::{
    AtomBuilder, Driver, DriverKind, SitemapBuilder, XrdsBuilder, DEFAULT_CONTENT_TYPE,
};
pub use types::{Value, ATTRIBUTES_KEY};
