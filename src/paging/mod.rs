//! Paging layer - page lifecycle, recycling and layout
//!
//! Decides which pages are live, hands their views out and takes them back,
//! positions them along one scroll axis with a fixed gap, and tracks the most
//! visible page across scrolls, reloads and geometry changes.
//!
//! # Module Structure
//!
//! - `types`: Core newtypes and geometry (PageIndex, Axis, Size, Point, Rect)
//! - `layout_params`: LayoutParams - axis, gap, viewport; frames and content extent
//! - `visible_range`: VisibleRange, LiveWindow and `compute_range`
//! - `pool`: ViewPool - keyed recycling of detached views
//! - `source`: PageSource / PageView contract and the materialization context
//! - `rotation`: RotationState - two-phase geometry change anchoring
//! - `engine`: PageLayoutEngine - the orchestrator
//! - `error`: PagingError - contract violations

pub mod engine;
pub mod error;
pub mod layout_params;
pub mod pool;
pub mod rotation;
pub mod source;
pub mod types;
pub mod visible_range;

pub use engine::{PageLayoutEngine, PageObserver, PageSlot, RotationOutcome, SubscriptionId};
pub use error::PagingError;
pub use layout_params::{LayoutParams, DEFAULT_GAP_BETWEEN_PAGES};
pub use pool::ViewPool;
pub use rotation::{RotationAnchor, RotationState};
pub use source::{MaterializeContext, PageChange, PageSource, PageView};
pub use types::{Axis, PageIndex, Point, Rect, Size};
pub use visible_range::{compute_range, LiveWindow, VisibleRange};
