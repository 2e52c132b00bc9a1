//! Site description model and config file loading.
//!
//! This crate defines the declarative description of a documentation site
//! (metadata, top navigation, route-scoped sidebars, search and edit-link
//! settings) and loads it from `docs.toml` or `docs.yaml`.

pub mod loader;
pub mod site;

pub use loader::{find_config, load, parse, BuildSettings, ConfigFile, Format, LoadError, ServeSettings};
pub use site::{
    DeadLinkMode, DeadLinkPolicy, DiagramConfig, EditLink, ExternalIndex, Footer, NavEntry,
    NavLink, RouteSidebar, SearchConfig, SearchProvider, SidebarGroup, SidebarItem, SidebarLink,
    SiteConfig, SocialLink,
};
