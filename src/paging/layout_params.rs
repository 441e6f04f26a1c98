//! Layout parameters: axis, gap and viewport geometry.

use super::types::{Axis, PageIndex, Rect, Size};

/// Default distance between adjacent pages.
pub const DEFAULT_GAP_BETWEEN_PAGES: f64 = 20.0;

/// Parameters that determine every page frame.
///
/// Pages are uniform: the page extent along the scroll axis equals the
/// viewport extent along that axis, and pages are separated by `gap`.
///
/// # Equality Semantics
/// Two LayoutParams are equal if they would produce identical frames for
/// every page index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Scroll axis.
    pub axis: Axis,
    /// Inter-page gap. Always even and non-negative (see [`normalize_gap`]).
    gap: f64,
    /// Viewport size in host points.
    pub viewport: Size,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::new(Axis::default(), DEFAULT_GAP_BETWEEN_PAGES, Size::ZERO)
    }
}

/// Clamp a gap to be non-negative and round it to the nearest even value.
///
/// Pages are centred on gap midpoints, so an odd gap would put page edges
/// on half points.
pub fn normalize_gap(gap: f64) -> f64 {
    if !gap.is_finite() || gap <= 0.0 {
        return 0.0;
    }
    (gap / 2.0).round() * 2.0
}

impl LayoutParams {
    /// Create new layout params. The gap is normalized.
    pub fn new(axis: Axis, gap: f64, viewport: Size) -> Self {
        Self {
            axis,
            gap: normalize_gap(gap),
            viewport,
        }
    }

    /// Inter-page gap.
    pub fn gap(&self) -> f64 {
        self.gap
    }

    /// Replace the gap, normalizing it.
    pub fn set_gap(&mut self, gap: f64) {
        self.gap = normalize_gap(gap);
    }

    /// Page extent along the scroll axis.
    pub fn page_extent(&self) -> f64 {
        self.axis.main(self.viewport).max(0.0)
    }

    /// Viewport extent along the scroll axis.
    pub fn viewport_extent(&self) -> f64 {
        self.page_extent()
    }

    /// Distance between the leading edges of adjacent pages.
    pub fn stride(&self) -> f64 {
        self.page_extent() + self.gap
    }

    /// Content extent along the scroll axis for `page_count` pages.
    ///
    /// `n × page + (n − 1) × gap`, or 0 when there are no pages.
    pub fn content_extent(&self, page_count: usize) -> f64 {
        if page_count == 0 {
            return 0.0;
        }
        let n = page_count as f64;
        n * self.page_extent() + (n - 1.0) * self.gap
    }

    /// Content size for `page_count` pages.
    pub fn content_size(&self, page_count: usize) -> Size {
        self.axis
            .pack_size(self.content_extent(page_count), self.axis.cross(self.viewport))
    }

    /// Largest meaningful scroll offset for `page_count` pages.
    pub fn max_offset(&self, page_count: usize) -> f64 {
        (self.content_extent(page_count) - self.viewport_extent()).max(0.0)
    }

    /// Leading-edge offset of page `index`.
    pub fn offset_for_page(&self, index: PageIndex) -> f64 {
        index.get() as f64 * self.stride()
    }

    /// Frame of page `index` in content coordinates.
    pub fn frame_for_page(&self, index: PageIndex) -> Rect {
        Rect::new(
            self.axis.point(self.offset_for_page(index)),
            self.axis
                .pack_size(self.page_extent(), self.axis.cross(self.viewport)),
        )
    }
}
