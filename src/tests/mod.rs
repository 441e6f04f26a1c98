//! Internal test modules - whitebox tests with crate access
//!
//! Property tests here drive the engine through the synthetic source and
//! inspect its live map, pool and notifications directly.
