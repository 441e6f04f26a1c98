//! Contract violations reported by the layout engine.
//!
//! These are call-site bugs, not runtime conditions. The engine logs them at
//! `warn`, leaves its state untouched and hands the error back so the caller
//! can surface it. Pool misses and sources that produce no view are not
//! errors and never appear here.

use super::types::PageIndex;
use thiserror::Error;

/// Precondition failure on a layout engine call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PagingError {
    /// Page index outside `[0, number_of_pages)`.
    #[error("page index {index} out of range (number of pages: {page_count})")]
    IndexOutOfRange {
        /// Offending index.
        index: PageIndex,
        /// Page count cached at the last reload.
        page_count: usize,
    },

    /// `end_rotation` without a matching `begin_rotation`.
    #[error("end_rotation called without a matching begin_rotation")]
    RotationNotInProgress,

    /// `begin_rotation` while a rotation is already in progress.
    #[error("begin_rotation called while a rotation is already in progress")]
    RotationAlreadyInProgress,
}
