//! Utility functions for string formatting and manipulation.

pub mod format;

pub use format::{pad_right, truncate};
