//! Visible range calculation
//!
//! The scroll axis is a 1-D tiling of `page_count` cells of `page_extent`
//! separated by `gap`. A page is visible when its cell and the viewport span
//! share a segment of positive length.

use super::types::PageIndex;

/// Range of pages visible in the current viewport.
///
/// # Invariants
/// - `first <= most_visible <= last`
/// - `last < page_count` for the page count it was computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    /// First partially visible page (inclusive).
    pub first: PageIndex,
    /// Last partially visible page (inclusive).
    pub last: PageIndex,
    /// Page with the largest overlap with the viewport.
    pub most_visible: PageIndex,
}

impl VisibleRange {
    /// Create new visible range.
    ///
    /// # Panics
    /// In debug builds, panics if `most_visible` is outside `first..=last`.
    pub fn new(first: PageIndex, last: PageIndex, most_visible: PageIndex) -> Self {
        debug_assert!(
            first <= most_visible && most_visible <= last,
            "most_visible {most_visible} outside {first}..={last}"
        );
        Self {
            first,
            last,
            most_visible,
        }
    }

    /// Number of visible pages.
    pub fn len(&self) -> usize {
        self.last.get() - self.first.get() + 1
    }

    /// A computed range always holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check if a specific page is visible.
    pub fn contains(&self, index: PageIndex) -> bool {
        self.first <= index && index <= self.last
    }

    /// Iterate over visible page indices.
    pub fn indices(&self) -> impl Iterator<Item = PageIndex> {
        (self.first.get()..=self.last.get()).map(PageIndex::new)
    }

    /// Widen the range by `margin` pages on each side, clipped to `page_count`.
    pub fn live_window(&self, margin: usize, page_count: usize) -> LiveWindow {
        let last_valid = page_count.saturating_sub(1);
        LiveWindow::new(
            PageIndex::new(self.first.get().saturating_sub(margin)),
            PageIndex::new(self.last.get().saturating_add(margin).min(last_valid)),
        )
    }
}

/// Contiguous range of materialized pages, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveWindow {
    /// First live page.
    pub first: PageIndex,
    /// Last live page.
    pub last: PageIndex,
}

impl LiveWindow {
    /// Create a live window.
    ///
    /// # Panics
    /// In debug builds, panics if `first > last`.
    pub fn new(first: PageIndex, last: PageIndex) -> Self {
        debug_assert!(first <= last, "live window {first}..={last} is inverted");
        Self { first, last }
    }

    /// Number of live pages.
    pub fn len(&self) -> usize {
        self.last.get() - self.first.get() + 1
    }

    /// A live window always holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Check whether `index` is live.
    pub fn contains(&self, index: PageIndex) -> bool {
        self.first <= index && index <= self.last
    }

    /// Iterate over live page indices.
    pub fn indices(&self) -> impl Iterator<Item = PageIndex> {
        (self.first.get()..=self.last.get()).map(PageIndex::new)
    }
}

/// Compute the visible range for a scroll position.
///
/// Returns `None` when there is nothing to show: no pages, or a
/// non-positive page or viewport extent.
///
/// Offsets outside `[0, content_extent - viewport_extent]` are clamped, since
/// overscroll is routine during bounces and rotations. Ties in overlap go to
/// the lower index. A viewport that falls entirely inside a gap yields the
/// single nearest page.
pub fn compute_range(
    scroll_offset: f64,
    viewport_extent: f64,
    page_extent: f64,
    gap: f64,
    page_count: usize,
) -> Option<VisibleRange> {
    if page_count == 0 || !(page_extent > 0.0) || !(viewport_extent > 0.0) {
        return None;
    }

    let gap = if gap.is_finite() { gap.max(0.0) } else { 0.0 };
    let stride = page_extent + gap;
    let last_valid = page_count - 1;

    let n = page_count as f64;
    let content_extent = n * page_extent + (n - 1.0) * gap;
    let max_offset = (content_extent - viewport_extent).max(0.0);
    let offset = if scroll_offset.is_nan() {
        0.0
    } else {
        scroll_offset.clamp(0.0, max_offset)
    };
    let viewport_end = offset + viewport_extent;

    let start = |i: usize| i as f64 * stride;
    let end = |i: usize| start(i) + page_extent;

    // Closed-form estimates, then nudged so the bounds agree exactly with the
    // edge comparisons used for overlap.
    let mut first = estimate_index(((offset - page_extent) / stride).floor() + 1.0, last_valid);
    while first > 0 && end(first - 1) > offset {
        first -= 1;
    }
    while first < last_valid && end(first) <= offset {
        first += 1;
    }

    let mut last = estimate_index((viewport_end / stride).ceil() - 1.0, last_valid);
    while last < last_valid && start(last + 1) < viewport_end {
        last += 1;
    }
    while last > 0 && start(last) >= viewport_end {
        last -= 1;
    }

    if first > last {
        // Viewport sits inside the gap between `last` and `first`.
        let before = offset - end(last);
        let after = start(first) - viewport_end;
        let nearest = PageIndex::new(if after < before { first } else { last });
        return Some(VisibleRange::new(nearest, nearest, nearest));
    }

    let overlap = |i: usize| end(i).min(viewport_end) - start(i).max(offset);
    let mut most_visible = first;
    let mut best = overlap(first);
    for i in (first + 1)..=last {
        let covered = overlap(i);
        if covered > best {
            best = covered;
            most_visible = i;
        }
    }

    Some(VisibleRange::new(
        PageIndex::new(first),
        PageIndex::new(last),
        PageIndex::new(most_visible),
    ))
}

fn estimate_index(raw: f64, last_valid: usize) -> usize {
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as usize).min(last_valid)
    }
}
