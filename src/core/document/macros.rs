//! Macros for tree access
//!
//! These hide the difference between `RefCell` borrows and `RwLock` guards.
//! In multi-threaded builds a poisoned lock becomes `XmlError::Internal`
//! (`tree_read!`, `tree_write!`) or `None` (`tree_read_opt!`).

#[cfg(not(feature = "multi-thread"))]
#[doc(hidden)]
macro_rules! tree_read {
    ($handle:expr) => {
        $crate::core::document::handle::tree_read(&$handle)
    };
}

#[cfg(feature = "multi-thread")]
#[doc(hidden)]
macro_rules! tree_read {
    ($handle:expr) => {
        $crate::core::document::handle::tree_read(&$handle).map_err(|_| {
            $crate::core::error::XmlError::Internal("Document lock poisoned".to_string())
        })?
    };
}

#[cfg(not(feature = "multi-thread"))]
#[doc(hidden)]
macro_rules! tree_write {
    ($handle:expr) => {
        $crate::core::document::handle::tree_write(&$handle)
    };
}

#[cfg(feature = "multi-thread")]
#[doc(hidden)]
macro_rules! tree_write {
    ($handle:expr) => {
        $crate::core::document::handle::tree_write(&$handle).map_err(|_| {
            $crate::core::error::XmlError::Internal("Document lock poisoned".to_string())
        })?
    };
}

#[cfg(not(feature = "multi-thread"))]
#[doc(hidden)]
macro_rules! tree_read_opt {
    ($handle:expr) => {
        $crate::core::document::handle::tree_read(&$handle)
    };
}

#[cfg(feature = "multi-thread")]
#[doc(hidden)]
macro_rules! tree_read_opt {
    ($handle:expr) => {
        $crate::core::document::handle::tree_read(&$handle).ok()?
    };
}
