//! Navigation resolution server for waymark sites.
//!
//! Serves resolved page directives over HTTP and reloads the site
//! description when it or the docs tree changes.

pub mod server;
pub mod watcher;

pub use server::{NavServer, NavServerConfig, ServerError};
pub use watcher::{FileWatcher, WatchEvent};
