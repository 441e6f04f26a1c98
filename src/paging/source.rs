//! Contract between the layout engine and the page source.

use super::pool::ViewPool;
use super::types::{PageIndex, Rect};
use serde::Serialize;
use std::fmt::Debug;
use std::hash::Hash;

/// A view instance that can render one page at a time.
///
/// Views of the same kind are interchangeable for recycling purposes.
pub trait PageView {
    /// Recycling key. Typically a small enum of view classes.
    type Kind: Copy + Eq + Hash + Debug;

    /// Kind this view recycles under.
    fn kind(&self) -> Self::Kind;
}

/// Supplier of pages and their views.
///
/// `view_for_page` may pull recycled views through the supplied
/// [`MaterializeContext`]. It runs while the engine is mutably borrowed, so a
/// source cannot reload or scroll the engine from inside the callback.
pub trait PageSource {
    /// View type produced for pages.
    type View: PageView;

    /// Number of pages. Queried on reload only.
    fn number_of_pages(&self) -> usize;

    /// Produce a view for `index`.
    ///
    /// Returning `None` leaves an empty placeholder slot; layout continues.
    fn view_for_page(
        &mut self,
        index: PageIndex,
        ctx: &mut MaterializeContext<'_, Self::View>,
    ) -> Option<Self::View>;

    /// Called once per change of the current page.
    fn page_changed(&mut self, _change: PageChange) {}
}

/// Handle passed to [`PageSource::view_for_page`].
///
/// Exposes the recycling pool for the duration of one materialization.
#[derive(Debug)]
pub struct MaterializeContext<'a, V: PageView> {
    pool: &'a mut ViewPool<V>,
    frame: Rect,
}

impl<'a, V: PageView> MaterializeContext<'a, V> {
    pub(crate) fn new(pool: &'a mut ViewPool<V>, frame: Rect) -> Self {
        Self { pool, frame }
    }

    /// Take a recycled view of `kind`, if one is pooled.
    ///
    /// On `None` the source constructs a fresh view itself.
    pub fn dequeue_reusable_view(&mut self, kind: V::Kind) -> Option<V> {
        self.pool.acquire(kind)
    }

    /// Frame the page will occupy.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Number of pooled views of `kind`.
    pub fn available(&self, kind: V::Kind) -> usize {
        self.pool.available(kind)
    }
}

/// Transition of the current (most visible) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageChange {
    /// New current page, `None` when the source has no pages.
    pub current: Option<PageIndex>,
    /// Previous current page, `None` before the first layout.
    pub previous: Option<PageIndex>,
}

impl PageChange {
    /// Create a page change.
    pub fn new(current: Option<PageIndex>, previous: Option<PageIndex>) -> Self {
        Self { current, previous }
    }
}

impl std::fmt::Display for PageChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let show = |page: Option<PageIndex>| page.map_or_else(|| "-".to_string(), |p| p.to_string());
        write!(f, "{} -> {}", show(self.previous), show(self.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_change_displays_arrow() {
        let change = PageChange::new(Some(PageIndex::new(3)), Some(PageIndex::new(0)));
        assert_eq!(change.to_string(), "0 -> 3");
    }

    #[test]
    fn page_change_displays_absent_pages_as_dash() {
        let change = PageChange::new(Some(PageIndex::new(0)), None);
        assert_eq!(change.to_string(), "- -> 0");
    }

    #[test]
    fn page_change_serializes_indices() {
        let change = PageChange::new(Some(PageIndex::new(2)), Some(PageIndex::new(1)));
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(json, r#"{"current":2,"previous":1}"#);
    }
}
