//! A static site asset prebuild pipeline.
//!
//! Prebuild walks a site directory and writes an optimized mirror of it into
//! a cache directory: HTML files are rendered as templates and minified,
//! JavaScript and CSS files are minified, images are re-encoded to WebP, and
//! everything else is copied verbatim.
//!
//! Prebuild can be used as both a CLI and a library.

#![warn(missing_docs)]

pub mod build;
pub mod cli;
pub mod config;
pub mod util;

pub use build::{build, BuildError, BuildSummary};
pub use config::Config;
