//! Value types
//!
//! This module defines the values exchanged by the array projection.

pub mod value;

pub use value::{Value, ATTRIBUTES_KEY};
