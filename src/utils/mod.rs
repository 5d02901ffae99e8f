//! Utilities

pub mod datetime;
