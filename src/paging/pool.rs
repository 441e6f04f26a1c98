//! Keyed recycling pool for detached page views.
//!
//! Views are grouped by their [`PageView::Kind`]. Ownership moves into the
//! pool on [`ViewPool::release`] and back out on [`ViewPool::acquire`], so a
//! view can never sit in the pool and in the live map at the same time, and
//! releasing the same instance twice does not typecheck.
//!
//! The pool never touches a view it holds. Resetting a reused view's state
//! is the consumer's job.

use super::source::PageView;
use std::collections::HashMap;

/// Pool of reusable page views keyed by view kind.
///
/// Capacity is unbounded. The live window size bounds how many views are
/// ever outstanding, which bounds the pool in turn.
#[derive(Debug)]
pub struct ViewPool<V: PageView> {
    /// Detached views grouped by kind.
    available: HashMap<V::Kind, Vec<V>>,
    /// Largest number of pooled views seen per kind.
    peak: HashMap<V::Kind, usize>,
}

impl<V: PageView> Default for ViewPool<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: PageView> ViewPool<V> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self {
            available: HashMap::new(),
            peak: HashMap::new(),
        }
    }

    /// Take a pooled view of `kind`, if any.
    ///
    /// A miss is not an error: the caller constructs a fresh view.
    pub fn acquire(&mut self, kind: V::Kind) -> Option<V> {
        let view = self.available.get_mut(&kind).and_then(Vec::pop);
        tracing::trace!(?kind, hit = view.is_some(), "pool acquire");
        view
    }

    /// Return a detached view to the pool under its own kind.
    pub fn release(&mut self, view: V) {
        let kind = view.kind();
        let bucket = self.available.entry(kind).or_default();
        bucket.push(view);
        let count = bucket.len();
        let peak = self.peak.entry(kind).or_insert(0);
        *peak = (*peak).max(count);
        tracing::trace!(?kind, pooled = count, "pool release");
    }

    /// Number of pooled views of `kind`.
    pub fn available(&self, kind: V::Kind) -> usize {
        self.available.get(&kind).map_or(0, Vec::len)
    }

    /// Largest number of views of `kind` ever pooled at once.
    pub fn peak(&self, kind: V::Kind) -> usize {
        self.peak.get(&kind).copied().unwrap_or(0)
    }

    /// Total number of pooled views across all kinds.
    pub fn len(&self) -> usize {
        self.available.values().map(Vec::len).sum()
    }

    /// Check if the pool holds no views.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every pooled view.
    pub fn clear(&mut self) {
        self.available.clear();
    }
}
