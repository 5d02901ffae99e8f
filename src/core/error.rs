//! Error types for XML document operations
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Error types for XML document operations
#[derive(Debug, Error)]
pub enum XmlError {
    /// Malformed source XML
    #[error("Parse error: {0}")]
    Parse(String),

    /// No root name resolvable, unknown driver, or an invalid registry table
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The import source could not be turned into a node
    #[error("Import error: {0}")]
    Import(String),

    /// A registry entry references a filter that does not exist
    #[error("Filter error: {0}")]
    Filter(String),

    /// Bad XPath expression
    #[error("Bad XPath: {0}")]
    BadXPath(String),

    /// A filter could not interpret its input
    #[error("Bad value: {0}")]
    BadValue(String),

    /// Invalid tree operation
    #[error("Bad parameter: {0}")]
    BadParam(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Operation not supported by this build
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error (should not occur in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for XML document operations
pub type XmlResult<T> = Result<T, XmlError>;
