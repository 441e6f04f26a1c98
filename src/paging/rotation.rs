//! Two-phase rotation state machine.
//!
//! The host brackets a viewport geometry change with `begin_rotation` and
//! `end_rotation`. Between the two, the engine keeps the page that was
//! current at the start (the anchor) together with its alignment inside the
//! viewport, and restores both against the new geometry at the end.

use super::layout_params::LayoutParams;
use super::types::PageIndex;
use super::visible_range::compute_range;
use std::time::Duration;

/// Rotation phase of the engine.
///
/// `Idle -> Rotating -> Idle`. A stray `end_rotation` in `Idle` or a nested
/// `begin_rotation` in `Rotating` is a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RotationState {
    /// No geometry transition in progress.
    #[default]
    Idle,
    /// Between `begin_rotation` and `end_rotation`.
    Rotating(RotationAnchor),
}

impl RotationState {
    /// Check if a rotation is in progress.
    pub fn is_rotating(&self) -> bool {
        matches!(self, RotationState::Rotating(_))
    }

    /// Animation duration requested by the host, if rotating.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            RotationState::Rotating(anchor) => anchor.duration,
            RotationState::Idle => None,
        }
    }
}

/// Page position captured before a geometry change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAnchor {
    /// Current page when the anchor was taken.
    pub page: Option<PageIndex>,
    /// Scroll offset relative to the anchor page's leading edge, as a
    /// fraction of the page extent.
    pub fraction: f64,
    /// Raw offset, used when there is no anchor page.
    pub offset: f64,
    /// Duration of the host's transition animation.
    pub duration: Option<Duration>,
}

/// Scroll position that re-establishes an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestoredPosition {
    /// Page expected to be most visible at `offset`.
    pub page: Option<PageIndex>,
    /// Scroll offset to apply.
    pub offset: f64,
}

impl RotationAnchor {
    /// Capture the anchor for the current page under the pre-change geometry.
    pub fn capture(
        page: Option<PageIndex>,
        offset: f64,
        params: &LayoutParams,
        page_count: usize,
        duration: Option<Duration>,
    ) -> Self {
        let clamped = clamp_offset(offset, params, page_count);
        let extent = params.page_extent();
        let fraction = match page {
            Some(page) if extent > 0.0 => (clamped - params.offset_for_page(page)) / extent,
            _ => 0.0,
        };
        Self {
            page,
            fraction,
            offset: clamped,
            duration,
        }
    }

    /// Resolve the anchor against the post-change geometry.
    ///
    /// The anchor page keeps its fractional alignment. If the page is gone
    /// because the page count shrank, the nearest valid page is used. If the
    /// scaled alignment would hand "most visible" to a neighbour (the gap does
    /// not scale with the page), the page is leading-aligned instead.
    pub fn restore(&self, params: &LayoutParams, page_count: usize) -> RestoredPosition {
        if page_count == 0 {
            return RestoredPosition {
                page: None,
                offset: 0.0,
            };
        }

        let Some(anchor) = self.page else {
            return RestoredPosition {
                page: None,
                offset: clamp_offset(self.offset, params, page_count),
            };
        };

        let page = PageIndex::new(anchor.get().min(page_count - 1));
        let leading = clamp_offset(params.offset_for_page(page), params, page_count);
        let aligned = clamp_offset(
            params.offset_for_page(page) + self.fraction * params.page_extent(),
            params,
            page_count,
        );

        let most_visible = compute_range(
            aligned,
            params.viewport_extent(),
            params.page_extent(),
            params.gap(),
            page_count,
        )
        .map(|range| range.most_visible);

        let offset = if most_visible == Some(page) {
            aligned
        } else {
            leading
        };

        RestoredPosition {
            page: Some(page),
            offset,
        }
    }
}

fn clamp_offset(offset: f64, params: &LayoutParams, page_count: usize) -> f64 {
    if offset.is_nan() {
        return 0.0;
    }
    offset.clamp(0.0, params.max_offset(page_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::types::{Axis, Size};

    fn portrait() -> LayoutParams {
        LayoutParams::new(Axis::Horizontal, 20.0, Size::new(320.0, 480.0))
    }

    fn landscape() -> LayoutParams {
        LayoutParams::new(Axis::Horizontal, 20.0, Size::new(480.0, 320.0))
    }

    #[test]
    fn default_state_is_idle() {
        assert_eq!(RotationState::default(), RotationState::Idle);
        assert!(!RotationState::Idle.is_rotating());
        assert_eq!(RotationState::Idle.duration(), None);
    }

    #[test]
    fn rotating_state_reports_duration() {
        let anchor = RotationAnchor::capture(
            Some(PageIndex::new(0)),
            0.0,
            &portrait(),
            3,
            Some(Duration::from_millis(300)),
        );
        let state = RotationState::Rotating(anchor);
        assert!(state.is_rotating());
        assert_eq!(state.duration(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn leading_aligned_page_stays_leading_aligned() {
        // page 2 starts at 2 * 340 in portrait
        let anchor = RotationAnchor::capture(Some(PageIndex::new(2)), 680.0, &portrait(), 5, None);
        assert_eq!(anchor.fraction, 0.0);

        let restored = anchor.restore(&landscape(), 5);
        assert_eq!(restored.page, Some(PageIndex::new(2)));
        // 2 * (480 + 20)
        assert_eq!(restored.offset, 1000.0);
    }

    #[test]
    fn partial_alignment_scales_with_page_extent() {
        // a quarter page past the leading edge of page 1
        let anchor = RotationAnchor::capture(Some(PageIndex::new(1)), 420.0, &portrait(), 5, None);
        assert_eq!(anchor.fraction, 0.25);

        let restored = anchor.restore(&landscape(), 5);
        assert_eq!(restored.page, Some(PageIndex::new(1)));
        assert_eq!(restored.offset, 500.0 + 120.0);
    }

    #[test]
    fn alignment_falls_back_to_leading_edge_when_neighbour_would_win() {
        // With a large gap, a page that was most visible at fraction 0.6 can
        // lose to its neighbour once the page grows relative to the gap.
        let small = LayoutParams::new(Axis::Horizontal, 100.0, Size::new(200.0, 400.0));
        let large = LayoutParams::new(Axis::Horizontal, 100.0, Size::new(2000.0, 400.0));

        // page 0 [0, 200), page 1 [300, 500); viewport [120, 320): page 0 covers 80, page 1 covers 20
        let anchor = RotationAnchor::capture(Some(PageIndex::new(0)), 120.0, &small, 3, None);
        assert_eq!(anchor.fraction, 0.6);

        let restored = anchor.restore(&large, 3);
        assert_eq!(restored.page, Some(PageIndex::new(0)));
        assert_eq!(restored.offset, 0.0);
    }

    #[test]
    fn removed_anchor_falls_back_to_last_page() {
        let anchor = RotationAnchor::capture(Some(PageIndex::new(4)), 1360.0, &portrait(), 5, None);
        let restored = anchor.restore(&landscape(), 2);
        assert_eq!(restored.page, Some(PageIndex::new(1)));
        assert_eq!(restored.offset, 500.0);
    }

    #[test]
    fn no_pages_restores_to_origin() {
        let anchor = RotationAnchor::capture(Some(PageIndex::new(1)), 340.0, &portrait(), 5, None);
        let restored = anchor.restore(&landscape(), 0);
        assert_eq!(restored.page, None);
        assert_eq!(restored.offset, 0.0);
    }

    #[test]
    fn missing_anchor_page_keeps_clamped_offset() {
        let anchor = RotationAnchor::capture(None, 50.0, &portrait(), 3, None);
        let restored = anchor.restore(&landscape(), 3);
        assert_eq!(restored.page, None);
        assert_eq!(restored.offset, 50.0);
    }
}
