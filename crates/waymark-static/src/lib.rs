//! Build-time site map generation for waymark.
//!
//! Discovers the documents in a docs tree, validates the site description
//! against them and writes the resolved navigation for every page.

pub mod builder;
pub mod discover;
pub mod templates;

pub use builder::{BuildConfig, BuildError, BuildResult, SiteBuilder};
pub use discover::{discover_documents, DiscoverError};
