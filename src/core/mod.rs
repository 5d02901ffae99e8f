//! Core module
//!
//! The document engine: a small XML tree with its parser, serializer and
//! path queries, the per-driver node registry, value filters and the
//! document/node API built on top of them.

pub mod document;
pub mod error;
pub mod filter;
pub mod meta;
pub mod namespace;
pub mod node;
pub mod options;
pub mod parser;
pub mod serializer;
pub mod store;
pub mod tree;
pub mod xpath;

pub use document::{Document, DocumentNode, Importable, Source};
pub use error::{XmlError, XmlResult};
pub use filter::{Filter, FilterFn, FilterTable, FilterTarget};
pub use meta::{Meta, NodeConfig, NodeEntry, NodeSpec};
pub use namespace::{ns, NamespaceMap};
pub use node::NodeId;
pub use options::XmlOptions;
pub use parser::XmlParser;
pub use serializer::XmlSerializer;
pub use store::RegistryStore;
pub use tree::Tree;
