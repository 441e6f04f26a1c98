//! Synthetic page source with two view kinds.
//!
//! Pages are plain numbered cards. Every `image_every`-th page is an image
//! card, the rest are text cards, so recycling has to respect kinds. The
//! source records every materialization and page change it sees.

use crate::paging::{MaterializeContext, PageChange, PageIndex, PageSource, PageView, Rect};
use serde::Serialize;
use std::collections::BTreeSet;

/// Recycling kind of a card view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Text page.
    Text,
    /// Image page.
    Image,
}

impl CardKind {
    /// All kinds, in display order.
    pub const ALL: [CardKind; 2] = [CardKind::Text, CardKind::Image];
}

/// A card view. `page` is reset on every reuse.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    id: u64,
    kind: CardKind,
    page: PageIndex,
    frame: Rect,
    uses: u32,
}

impl CardView {
    /// Instance identifier, stable across reuse.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Page this view currently shows.
    pub fn page(&self) -> PageIndex {
        self.page
    }

    /// Frame the view was laid out at when last bound.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// How many pages this instance has been bound to.
    pub fn uses(&self) -> u32 {
        self.uses
    }

    fn bind(&mut self, page: PageIndex, frame: Rect) {
        self.page = page;
        self.frame = frame;
        self.uses += 1;
    }
}

impl PageView for CardView {
    type Kind = CardKind;

    fn kind(&self) -> CardKind {
        self.kind
    }
}

/// Counters kept by [`SyntheticSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceStats {
    /// Calls to `view_for_page`.
    pub requests: usize,
    /// Views constructed from scratch.
    pub fresh: usize,
    /// Views taken from the pool.
    pub reused: usize,
    /// Requests answered with no view.
    pub missing: usize,
}

/// Most entries kept in each of the request and change logs.
pub const LOG_CAPACITY: usize = 1024;

/// Append to a bounded log, dropping the oldest half once full.
fn record<T>(log: &mut Vec<T>, entry: T) {
    if log.len() >= LOG_CAPACITY {
        log.drain(..LOG_CAPACITY / 2);
    }
    log.push(entry);
}

/// Page source producing numbered cards.
///
/// Counters cover the whole lifetime; the request and change logs keep only
/// recent entries, at most [`LOG_CAPACITY`] each.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    pages: usize,
    image_every: usize,
    missing: BTreeSet<PageIndex>,
    next_id: u64,
    stats: SourceStats,
    requested: Vec<PageIndex>,
    changes: Vec<PageChange>,
}

impl SyntheticSource {
    /// Source with `pages` text-only pages.
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            image_every: 0,
            missing: BTreeSet::new(),
            next_id: 0,
            stats: SourceStats::default(),
            requested: Vec::new(),
            changes: Vec::new(),
        }
    }

    /// Make every `n`-th page (1-based) an image page. `0` means text only.
    pub fn with_image_every(mut self, n: usize) -> Self {
        self.image_every = n;
        self
    }

    /// Produce no view for `page`.
    pub fn with_missing_page(mut self, page: PageIndex) -> Self {
        self.missing.insert(page);
        self
    }

    /// Change the page count. The engine only sees it after a reload.
    pub fn set_pages(&mut self, pages: usize) {
        self.pages = pages;
    }

    /// Kind of view used for `page`.
    pub fn kind_for(&self, page: PageIndex) -> CardKind {
        if self.image_every > 0 && page.display() % self.image_every == 0 {
            CardKind::Image
        } else {
            CardKind::Text
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> SourceStats {
        self.stats
    }

    /// Recent pages requested, oldest first.
    pub fn requested(&self) -> &[PageIndex] {
        &self.requested
    }

    /// Recent page changes received, oldest first.
    pub fn changes(&self) -> &[PageChange] {
        &self.changes
    }

    /// Forget recorded requests and changes, keeping counters.
    pub fn clear_log(&mut self) {
        self.requested.clear();
        self.changes.clear();
    }
}

impl PageSource for SyntheticSource {
    type View = CardView;

    fn number_of_pages(&self) -> usize {
        self.pages
    }

    fn view_for_page(
        &mut self,
        index: PageIndex,
        ctx: &mut MaterializeContext<'_, CardView>,
    ) -> Option<CardView> {
        self.stats.requests += 1;
        record(&mut self.requested, index);

        if self.missing.contains(&index) {
            self.stats.missing += 1;
            return None;
        }

        let kind = self.kind_for(index);
        let mut view = match ctx.dequeue_reusable_view(kind) {
            Some(view) => {
                self.stats.reused += 1;
                view
            }
            None => {
                self.stats.fresh += 1;
                let id = self.next_id;
                self.next_id += 1;
                CardView {
                    id,
                    kind,
                    page: index,
                    frame: ctx.frame(),
                    uses: 0,
                }
            }
        };
        view.bind(index, ctx.frame());
        Some(view)
    }

    fn page_changed(&mut self, change: PageChange) {
        record(&mut self.changes, change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_only_by_default() {
        let source = SyntheticSource::new(10);
        assert!((0..10).all(|i| source.kind_for(PageIndex::new(i)) == CardKind::Text));
    }

    #[test]
    fn every_third_page_is_image() {
        let source = SyntheticSource::new(10).with_image_every(3);
        let kinds: Vec<_> = (0..6).map(|i| source.kind_for(PageIndex::new(i))).collect();
        assert_eq!(
            kinds,
            vec![
                CardKind::Text,
                CardKind::Text,
                CardKind::Image,
                CardKind::Text,
                CardKind::Text,
                CardKind::Image,
            ]
        );
    }

    #[test]
    fn change_log_is_bounded_and_keeps_latest() {
        let mut source = SyntheticSource::new(2);
        for i in 0..(LOG_CAPACITY * 3 + 7) {
            source.page_changed(PageChange::new(Some(PageIndex::new(i)), None));
        }

        assert!(source.changes().len() <= LOG_CAPACITY);
        assert_eq!(
            source.changes().last().and_then(|change| change.current),
            Some(PageIndex::new(LOG_CAPACITY * 3 + 6))
        );
    }

    #[test]
    fn request_log_is_bounded_through_a_long_sweep() {
        use crate::paging::{Axis, LayoutParams, PageLayoutEngine, Size};

        // GIVEN: more single-page steps than the log holds
        let pages = LOG_CAPACITY * 2 + 10;
        let params = LayoutParams::new(Axis::Horizontal, 0.0, Size::new(10.0, 10.0));
        let mut engine = PageLayoutEngine::new(SyntheticSource::new(pages), params);
        engine.reload();

        // WHEN: every page is visited
        for i in 1..pages {
            engine.on_scroll(i as f64 * 10.0);
        }

        // THEN: counters see everything, the log only the recent tail
        let source = engine.source();
        assert_eq!(source.stats().requests, pages);
        assert!(source.requested().len() <= LOG_CAPACITY);
        assert_eq!(source.requested().last(), Some(&PageIndex::new(pages - 1)));
        assert!(source.changes().len() <= LOG_CAPACITY);
    }

    #[test]
    fn set_pages_changes_reported_count() {
        let mut source = SyntheticSource::new(3);
        source.set_pages(7);
        assert_eq!(source.number_of_pages(), 7);
    }
}
