//! Shared storage for heap-backed values.
//!
//! `Heap<T>` wraps `Arc<T>` so that every heap value goes through the
//! factory methods on [`Value`](crate::Value). Values are shared by
//! reference count and copied only when mutated.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Reference-counted, thread-safe storage for value payloads.
#[repr(transparent)]
pub struct Heap<T>(Arc<T>);

impl<T> Heap<T> {
    /// Wrap a value. Only the value module constructs heaps.
    #[inline]
    pub(crate) fn new(value: T) -> Self {
        Heap(Arc::new(value))
    }
}

impl<T: Clone> Heap<T> {
    /// Mutable access, cloning the payload first if it is shared.
    #[inline]
    pub fn make_mut(&mut self) -> &mut T {
        Arc::make_mut(&mut self.0)
    }

    /// Take the payload, cloning it only if it is shared.
    #[inline]
    pub fn into_inner(self) -> T {
        Arc::unwrap_or_clone(self.0)
    }
}

impl<T> Clone for Heap<T> {
    #[inline]
    fn clone(&self) -> Self {
        Heap(Arc::clone(&self.0))
    }
}

impl<T> Deref for Heap<T> {
    type Target = T;

    #[inline]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T: PartialEq> PartialEq for Heap<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl<T: fmt::Debug> fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl<T: fmt::Display> fmt::Display for Heap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}
