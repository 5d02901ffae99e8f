//! Shared tree handle
//!
//! Every `DocumentNode` of a document holds a handle to the same `Tree`.
//! Single-threaded builds use `Rc<RefCell<Tree>>`; the `multi-thread`
//! feature switches to `Arc<RwLock<Tree>>` so documents can cross threads.

use crate::core::tree::Tree;

#[cfg(not(feature = "multi-thread"))]
mod impl_ {
    use super::Tree;
    use std::cell::{Ref, RefCell, RefMut};
    use std::rc::Rc;

    /// Single-threaded tree handle
    pub type TreeHandle = Rc<RefCell<Tree>>;

    /// Wrap a tree in a new handle
    pub fn new_handle(tree: Tree) -> TreeHandle {
        Rc::new(RefCell::new(tree))
    }

    /// Read guard for the tree
    pub type TreeReadGuard<'a> = Ref<'a, Tree>;

    /// Write guard for the tree
    pub type TreeWriteGuard<'a> = RefMut<'a, Tree>;

    /// Shared borrow of the tree
    pub fn tree_read(handle: &TreeHandle) -> TreeReadGuard<'_> {
        handle.borrow()
    }

    /// Mutable borrow of the tree
    pub fn tree_write(handle: &TreeHandle) -> TreeWriteGuard<'_> {
        handle.borrow_mut()
    }

    /// Run a closure with read access to the tree
    pub fn tree_read_with<F, R>(handle: &TreeHandle, f: F) -> R
    where
        F: FnOnce(&Tree) -> R,
        R: Default,
    {
        let guard = tree_read(handle);
        f(&guard)
    }

    /// Check if two handles point at the same tree
    pub fn same_tree(a: &TreeHandle, b: &TreeHandle) -> bool {
        Rc::ptr_eq(a, b)
    }
}

#[cfg(feature = "multi-thread")]
mod impl_ {
    use super::Tree;
    use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

    /// Thread-safe tree handle
    pub type TreeHandle = Arc<RwLock<Tree>>;

    /// Wrap a tree in a new handle
    pub fn new_handle(tree: Tree) -> TreeHandle {
        Arc::new(RwLock::new(tree))
    }

    /// Read guard for the tree
    pub type TreeReadGuard<'a> = RwLockReadGuard<'a, Tree>;

    /// Write guard for the tree
    pub type TreeWriteGuard<'a> = RwLockWriteGuard<'a, Tree>;

    /// Shared lock on the tree
    pub fn tree_read(
        handle: &TreeHandle,
    ) -> Result<TreeReadGuard<'_>, PoisonError<TreeReadGuard<'_>>> {
        handle.read()
    }

    /// Exclusive lock on the tree
    pub fn tree_write(
        handle: &TreeHandle,
    ) -> Result<TreeWriteGuard<'_>, PoisonError<TreeWriteGuard<'_>>> {
        handle.write()
    }

    /// Run a closure with read access to the tree
    ///
    /// Returns the default value if the lock is poisoned.
    pub fn tree_read_with<F, R>(handle: &TreeHandle, f: F) -> R
    where
        F: FnOnce(&Tree) -> R,
        R: Default,
    {
        match tree_read(handle) {
            Ok(guard) => f(&guard),
            Err(_) => R::default(),
        }
    }

    /// Check if two handles point at the same tree
    pub fn same_tree(a: &TreeHandle, b: &TreeHandle) -> bool {
        Arc::ptr_eq(a, b)
    }
}

pub use impl_::{new_handle, same_tree, tree_read, tree_read_with, tree_write, TreeHandle};
