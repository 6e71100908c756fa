//! Utility functions and structures.

pub mod path;
pub mod walk;
