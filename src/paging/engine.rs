//! Page layout engine: live window, recycling and the current page.

use super::{
    error::PagingError,
    layout_params::LayoutParams,
    pool::ViewPool,
    rotation::{RotationAnchor, RotationState},
    source::{MaterializeContext, PageChange, PageSource, PageView},
    types::{Axis, PageIndex, Rect, Size},
    visible_range::{compute_range, LiveWindow, VisibleRange},
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A live page: its index, its view and where it sits.
///
/// `view` is `None` when the source declined to produce a view; the slot
/// still occupies its place in the live window.
#[derive(Debug)]
pub struct PageSlot<V> {
    index: PageIndex,
    view: Option<V>,
    frame: Rect,
}

impl<V> PageSlot<V> {
    /// Page index this slot shows.
    pub fn index(&self) -> PageIndex {
        self.index
    }

    /// Materialized view, if the source produced one.
    pub fn view(&self) -> Option<&V> {
        self.view.as_ref()
    }

    /// Mutable access to the view, for the host adapter.
    pub fn view_mut(&mut self) -> Option<&mut V> {
        self.view.as_mut()
    }

    /// Frame in content coordinates.
    pub fn frame(&self) -> Rect {
        self.frame
    }
}

/// Handle returned by [`PageLayoutEngine::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Callback invoked on current-page transitions.
pub type PageObserver = Box<dyn FnMut(&PageChange)>;

/// Result of [`PageLayoutEngine::end_rotation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationOutcome {
    /// Page that was current at `begin_rotation`.
    pub anchor: Option<PageIndex>,
    /// Current page after the relayout.
    pub page: Option<PageIndex>,
    /// Scroll offset the host must apply to its scroll surface.
    pub offset: f64,
    /// Duration passed to `begin_rotation`, for pacing the host's relayout animation.
    pub duration: Option<Duration>,
}

/// Orchestrates the page lifecycle for one paging surface.
///
/// Contains:
/// - The page source and a cached page count (refreshed by `reload` only)
/// - Layout parameters (axis, gap, viewport)
/// - The live map of materialized pages and the recycling pool
/// - The current (most visible) page and its observers
/// - The rotation state machine
///
/// # Live Window
/// The live window is the visible range widened by `preload_margin` pages on
/// each side, clipped to the page count. Every index in it has exactly one
/// [`PageSlot`]; no index outside it has one.
///
/// # Notifications
/// A change of the current page notifies the source and every observer once
/// per transition. Nothing is notified while rotating; `end_rotation` emits
/// at most one notification for the whole transition.
pub struct PageLayoutEngine<S: PageSource> {
    source: S,
    params: LayoutParams,
    preload_margin: usize,
    /// Page count cached at the last reload.
    page_count: usize,
    /// Scroll offset along the axis, as last reported by the host.
    offset: f64,
    live: HashMap<PageIndex, PageSlot<S::View>>,
    window: Option<LiveWindow>,
    visible: Option<VisibleRange>,
    current: Option<PageIndex>,
    pool: ViewPool<S::View>,
    rotation: RotationState,
    observers: Vec<(SubscriptionId, PageObserver)>,
    next_subscription: u64,
}

impl<S: PageSource> std::fmt::Debug for PageLayoutEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageLayoutEngine")
            .field("params", &self.params)
            .field("preload_margin", &self.preload_margin)
            .field("page_count", &self.page_count)
            .field("offset", &self.offset)
            .field("window", &self.window)
            .field("current", &self.current)
            .field("live", &self.live.len())
            .field("pooled", &self.pool.len())
            .field("rotation", &self.rotation)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl<S: PageSource> PageLayoutEngine<S> {
    /// Create an engine. Nothing is materialized until [`reload`](Self::reload).
    pub fn new(source: S, params: LayoutParams) -> Self {
        Self {
            source,
            params,
            preload_margin: 0,
            page_count: 0,
            offset: 0.0,
            live: HashMap::new(),
            window: None,
            visible: None,
            current: None,
            pool: ViewPool::new(),
            rotation: RotationState::Idle,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Builder-style preload margin.
    pub fn with_preload_margin(mut self, margin: usize) -> Self {
        self.preload_margin = margin;
        self
    }

    // === Source ===

    /// Page source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable page source. Call [`reload`](Self::reload) after changing its pages.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Page count cached at the last reload.
    pub fn number_of_pages(&self) -> usize {
        self.page_count
    }

    // === Layout parameters ===

    /// Current layout parameters.
    pub fn params(&self) -> &LayoutParams {
        &self.params
    }

    /// Scroll axis.
    pub fn axis(&self) -> Axis {
        self.params.axis
    }

    /// Check if pages scroll vertically.
    pub fn is_vertical(&self) -> bool {
        self.params.axis.is_vertical()
    }

    /// Inter-page gap.
    pub fn gap(&self) -> f64 {
        self.params.gap()
    }

    /// Viewport size.
    pub fn viewport(&self) -> Size {
        self.params.viewport
    }

    /// Extra pages materialized on each side of the visible range.
    pub fn preload_margin(&self) -> usize {
        self.preload_margin
    }

    /// Switch the scroll axis, keeping the current page in place.
    pub fn set_axis(&mut self, axis: Axis) {
        if self.params.axis != axis {
            debug!(?axis, "axis changed");
            self.relayout_with(|params| params.axis = axis);
        }
    }

    /// Change the gap (normalized to even, non-negative), keeping the current page in place.
    pub fn set_gap(&mut self, gap: f64) {
        let mut next = self.params;
        next.set_gap(gap);
        if next.gap() != self.params.gap() {
            debug!(gap = next.gap(), "gap changed");
            self.relayout_with(|params| params.set_gap(gap));
        }
    }

    /// Report a new viewport size.
    ///
    /// Inside a rotation the size is only recorded; `end_rotation` relayouts.
    /// Outside one, this acts as an immediate begin/end pair.
    pub fn set_viewport_size(&mut self, size: Size) {
        if self.params.viewport != size {
            debug!(width = size.width, height = size.height, "viewport resized");
            self.relayout_with(|params| params.viewport = size);
        }
    }

    /// Change the preload margin and rebuild the live window.
    pub fn set_preload_margin(&mut self, margin: usize) {
        if self.preload_margin == margin {
            return;
        }
        self.preload_margin = margin;
        if !self.rotation.is_rotating() {
            self.sync_window(false);
        }
    }

    // === Geometry ===

    /// Content extent along the scroll axis.
    pub fn content_extent(&self) -> f64 {
        self.params.content_extent(self.page_count)
    }

    /// Content size, cross axis equal to the viewport.
    pub fn content_size(&self) -> Size {
        self.params.content_size(self.page_count)
    }

    /// Frame of page `index` in content coordinates.
    pub fn frame_for_page(&self, index: PageIndex) -> Rect {
        self.params.frame_for_page(index)
    }

    /// Scroll offset that leading-aligns page `index`, clamped to the content.
    pub fn offset_for_page(&self, index: PageIndex) -> f64 {
        self.params
            .offset_for_page(index)
            .min(self.params.max_offset(self.page_count))
    }

    /// Last scroll offset, as reported by the host or forced by the engine.
    pub fn scroll_offset(&self) -> f64 {
        self.offset
    }

    // === Live pages ===

    /// Current live window, `None` when nothing is materialized.
    pub fn live_window(&self) -> Option<LiveWindow> {
        self.window
    }

    /// Current visible range, `None` when nothing is visible.
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible
    }

    /// Live slots in index order.
    pub fn slots(&self) -> impl Iterator<Item = &PageSlot<S::View>> + '_ {
        self.window
            .into_iter()
            .flat_map(|window| window.indices())
            .filter_map(move |index| self.live.get(&index))
    }

    /// Number of live slots.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Slot for `index`, if live.
    pub fn page_slot(&self, index: PageIndex) -> Option<&PageSlot<S::View>> {
        self.live.get(&index)
    }

    /// Materialized view for `index`, `Ok(None)` if the page is not live.
    ///
    /// Pure lookup: never materializes.
    ///
    /// # Errors
    /// [`PagingError::IndexOutOfRange`] if `index >= number_of_pages()`.
    pub fn page_view(&self, index: PageIndex) -> Result<Option<&S::View>, PagingError> {
        if index.get() >= self.page_count {
            let err = PagingError::IndexOutOfRange {
                index,
                page_count: self.page_count,
            };
            warn!(%err, "contract violation");
            return Err(err);
        }
        Ok(self.live.get(&index).and_then(PageSlot::view))
    }

    /// Recycling pool.
    pub fn pool(&self) -> &ViewPool<S::View> {
        &self.pool
    }

    // === Current page ===

    /// Most visible page, `None` when there are no pages.
    pub fn current_page_index(&self) -> Option<PageIndex> {
        self.current
    }

    /// View of the most visible page.
    pub fn current_page_view(&self) -> Option<&S::View> {
        self.current
            .and_then(|index| self.live.get(&index))
            .and_then(PageSlot::view)
    }

    /// Register a callback for current-page transitions.
    pub fn subscribe(&mut self, observer: impl FnMut(&PageChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    // === Lifecycle ===

    /// Re-read the page count and rebuild every live page.
    ///
    /// Live views go back to the pool first, so the source can recycle them
    /// while re-materializing. If the count shrank below the current page,
    /// the offset is clamped and a single notification fires.
    ///
    /// Inside a rotation only the count is refreshed and the live window is
    /// emptied; `end_rotation` rebuilds it.
    pub fn reload(&mut self) {
        self.teardown();
        self.page_count = self.source.number_of_pages();
        debug!(pages = self.page_count, "reload");

        if self.rotation.is_rotating() {
            return;
        }

        if !self.offset.is_nan() {
            self.offset = self
                .offset
                .clamp(0.0, self.params.max_offset(self.page_count));
        } else {
            self.offset = 0.0;
        }
        self.sync_window(false);
        self.update_current();
    }

    /// Handle a scroll position change.
    ///
    /// Evicts pages leaving the live window, materializes pages entering it
    /// and updates the current page. Work is proportional to the change in
    /// the window, not to the page count. Suppressed while rotating.
    pub fn on_scroll(&mut self, offset: f64) {
        self.offset = offset;
        if self.rotation.is_rotating() {
            trace!(offset, "scroll while rotating; visibility suppressed");
            return;
        }
        self.sync_window(false);
        self.update_current();
    }

    /// Leading-align page `index` and return the offset the host must apply.
    ///
    /// # Errors
    /// [`PagingError::IndexOutOfRange`] if `index >= number_of_pages()`.
    pub fn scroll_to_page(&mut self, index: PageIndex) -> Result<f64, PagingError> {
        if index.get() >= self.page_count {
            let err = PagingError::IndexOutOfRange {
                index,
                page_count: self.page_count,
            };
            warn!(%err, "contract violation");
            return Err(err);
        }
        let offset = self.offset_for_page(index);
        self.on_scroll(offset);
        Ok(offset)
    }

    // === Rotation ===

    /// Check if a rotation is in progress.
    pub fn is_rotating(&self) -> bool {
        self.rotation.is_rotating()
    }

    /// Rotation state machine.
    pub fn rotation_state(&self) -> &RotationState {
        &self.rotation
    }

    /// Start a geometry transition.
    ///
    /// Captures the current page and its alignment and suppresses
    /// notifications until [`end_rotation`](Self::end_rotation).
    ///
    /// # Errors
    /// [`PagingError::RotationAlreadyInProgress`] if already rotating.
    pub fn begin_rotation(&mut self, duration: Option<Duration>) -> Result<(), PagingError> {
        if self.rotation.is_rotating() {
            let err = PagingError::RotationAlreadyInProgress;
            warn!(%err, "contract violation");
            return Err(err);
        }
        let anchor = self.capture_anchor(duration);
        debug!(anchor = ?anchor.page, ?duration, "begin rotation");
        self.rotation = RotationState::Rotating(anchor);
        Ok(())
    }

    /// Finish a geometry transition.
    ///
    /// Recomputes every frame against the current viewport, restores the
    /// anchor page's alignment, rebuilds the live window and notifies once
    /// if the current page differs from the anchor.
    ///
    /// # Errors
    /// [`PagingError::RotationNotInProgress`] without a matching `begin_rotation`.
    pub fn end_rotation(&mut self) -> Result<RotationOutcome, PagingError> {
        let anchor = match std::mem::take(&mut self.rotation) {
            RotationState::Rotating(anchor) => anchor,
            RotationState::Idle => {
                let err = PagingError::RotationNotInProgress;
                warn!(%err, "contract violation");
                return Err(err);
            }
        };

        self.apply_anchor(&anchor);
        debug!(
            anchor = ?anchor.page,
            page = ?self.current,
            offset = self.offset,
            "end rotation"
        );

        Ok(RotationOutcome {
            anchor: anchor.page,
            page: self.current,
            offset: self.offset,
            duration: anchor.duration,
        })
    }

    // === Internals ===

    fn capture_anchor(&self, duration: Option<Duration>) -> RotationAnchor {
        RotationAnchor::capture(
            self.current,
            self.offset,
            &self.params,
            self.page_count,
            duration,
        )
    }

    fn apply_anchor(&mut self, anchor: &RotationAnchor) {
        let restored = anchor.restore(&self.params, self.page_count);
        self.offset = restored.offset;
        self.sync_window(true);
        self.update_current();
    }

    /// Change layout parameters, keeping the current page anchored.
    fn relayout_with(&mut self, change: impl FnOnce(&mut LayoutParams)) {
        if self.rotation.is_rotating() {
            change(&mut self.params);
            return;
        }
        let anchor = self.capture_anchor(None);
        change(&mut self.params);
        self.apply_anchor(&anchor);
    }

    /// Return every live view to the pool and forget the window.
    fn teardown(&mut self) {
        for (_, slot) in self.live.drain() {
            if let Some(view) = slot.view {
                self.pool.release(view);
            }
        }
        self.window = None;
        self.visible = None;
    }

    /// Bring the live map in line with the window for the current offset.
    fn sync_window(&mut self, refresh_frames: bool) {
        let visible = compute_range(
            self.offset,
            self.params.viewport_extent(),
            self.params.page_extent(),
            self.params.gap(),
            self.page_count,
        );
        let next = visible.map(|range| range.live_window(self.preload_margin, self.page_count));
        let previous = self.window;

        if let Some(previous) = previous {
            for index in previous.indices() {
                if next.is_some_and(|window| window.contains(index)) {
                    continue;
                }
                self.evict(index);
            }
        }

        if let Some(next) = next {
            for index in next.indices() {
                if previous.is_some_and(|window| window.contains(index)) {
                    if refresh_frames {
                        let frame = self.params.frame_for_page(index);
                        if let Some(slot) = self.live.get_mut(&index) {
                            slot.frame = frame;
                        }
                    }
                    continue;
                }
                self.materialize(index);
            }
        }

        if previous != next {
            trace!(?previous, ?next, "live window changed");
        }
        self.window = next;
        self.visible = visible;
    }

    fn evict(&mut self, index: PageIndex) {
        if let Some(slot) = self.live.remove(&index) {
            trace!(%index, "evict page");
            if let Some(view) = slot.view {
                self.pool.release(view);
            }
        }
    }

    fn materialize(&mut self, index: PageIndex) {
        let frame = self.params.frame_for_page(index);
        let mut ctx = MaterializeContext::new(&mut self.pool, frame);
        let view = self.source.view_for_page(index, &mut ctx);
        if view.is_none() {
            debug!(%index, "page source produced no view; keeping placeholder");
        } else {
            trace!(%index, kind = ?view.as_ref().map(PageView::kind), "materialize page");
        }
        self.live.insert(index, PageSlot { index, view, frame });
    }

    fn update_current(&mut self) {
        if self.rotation.is_rotating() {
            return;
        }
        let next = self.visible.map(|range| range.most_visible);
        if next == self.current {
            return;
        }
        let change = PageChange::new(next, self.current);
        self.current = next;
        debug!(%change, "current page changed");
        self.source.page_changed(change);
        for (_, observer) in &mut self.observers {
            observer(&change);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
