//! Page-based infinite scrolling (pagescroll)
//!
//! A layout engine for paged scroll surfaces: it keeps a small window of
//! pages materialized around the viewport, recycles views by kind through a
//! pool, tracks the most visible page and keeps it anchored across viewport
//! rotations.
//!
//! The `paging` layer is host-agnostic. `replay` drives it from a TOML
//! script for the `pagescroll` binary; `config` and `logging` are the shell.

pub mod config;
pub mod error;
pub mod logging;
pub mod paging;
pub mod replay;

#[cfg(test)]
mod tests;
