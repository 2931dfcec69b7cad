//! Map layout data.
//!
//! Pure data structures describing the starting map, designed to be
//! deserialized from RON.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by the runtime and headless crates.

mod layout_data;

pub use layout_data::{Layout, LayoutEntry};
