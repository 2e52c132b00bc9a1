//! The site description.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declarative description of a documentation site.
///
/// Built once from the config file and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title
    #[serde(default = "default_title")]
    pub title: String,

    /// Site description for SEO
    #[serde(default)]
    pub description: String,

    /// BCP-47 language tag (e.g. `ko-KR`)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// URL path prefix the site is deployed under
    #[serde(default = "default_base_path")]
    pub base_path: String,

    /// Public origin used for sitemap generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Logo asset path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,

    /// Top navigation, left to right
    #[serde(default)]
    pub nav: Vec<NavEntry>,

    /// Sidebars keyed by route prefix
    #[serde(default)]
    pub sidebar: Vec<RouteSidebar>,

    #[serde(default)]
    pub social_links: Vec<SocialLink>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<Footer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_link: Option<EditLink>,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub dead_links: DeadLinkPolicy,

    /// Diagram extension settings, passed through to the renderer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagrams: Option<DiagramConfig>,
}

fn default_title() -> String {
    "Documentation".to_string()
}
fn default_locale() -> String {
    "en-US".to_string()
}
fn default_base_path() -> String {
    "/".to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: String::new(),
            locale: default_locale(),
            base_path: default_base_path(),
            hostname: None,
            logo: None,
            nav: Vec::new(),
            sidebar: Vec::new(),
            social_links: Vec::new(),
            footer: None,
            edit_link: None,
            search: SearchConfig::default(),
            dead_links: DeadLinkPolicy::default(),
            diagrams: None,
        }
    }
}

/// A top navigation entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum NavEntry {
    /// A labelled menu of links
    Dropdown {
        #[serde(alias = "text")]
        label: String,
        items: Vec<NavLink>,
    },

    /// A direct link
    Link(NavLink),
}

impl NavEntry {
    pub fn label(&self) -> &str {
        match self {
            NavEntry::Dropdown { label, .. } => label,
            NavEntry::Link(link) => &link.label,
        }
    }
}

/// A link in the top navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavLink {
    #[serde(alias = "text")]
    pub label: String,

    pub link: String,

    /// Regex over the request path that marks this link active
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_match: Option<String>,
}

/// Sidebar groups shown under a route prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSidebar {
    /// Route prefix, e.g. `/guide/`
    pub prefix: String,

    #[serde(default)]
    pub groups: Vec<SidebarGroup>,
}

/// A labelled group of sidebar items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarGroup {
    #[serde(alias = "text")]
    pub label: String,

    pub items: Vec<SidebarItem>,

    /// Whether the group renders collapsed; `None` means not collapsible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
}

/// An entry inside a sidebar group. Groups nest to any depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SidebarItem {
    Group(SidebarGroup),
    Link(SidebarLink),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SidebarLink {
    #[serde(alias = "text")]
    pub label: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialLink {
    /// Icon identifier (e.g. `github`)
    pub icon: String,
    pub link: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Footer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Per-page link back to the document source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditLink {
    /// URL template; `:path` is replaced with the source-relative document path
    pub pattern: String,

    #[serde(default = "default_edit_text")]
    pub text: String,
}

fn default_edit_text() -> String {
    "Edit this page".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    #[serde(default)]
    pub provider: SearchProvider,

    /// Settings for the `external-indexed` provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalIndex>,
}

/// Search provider selection.
///
/// Unknown names are kept so that validation can report them with the
/// offending value instead of failing at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SearchProvider {
    #[default]
    None,
    Local,
    ExternalIndexed,
    Unrecognized(String),
}

impl SearchProvider {
    pub fn as_str(&self) -> &str {
        match self {
            SearchProvider::None => "none",
            SearchProvider::Local => "local",
            SearchProvider::ExternalIndexed => "external-indexed",
            SearchProvider::Unrecognized(name) => name,
        }
    }
}

impl From<String> for SearchProvider {
    fn from(name: String) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "none" => SearchProvider::None,
            "local" => SearchProvider::Local,
            "external-indexed" | "external" => SearchProvider::ExternalIndexed,
            _ => SearchProvider::Unrecognized(name),
        }
    }
}

impl From<SearchProvider> for String {
    fn from(provider: SearchProvider) -> Self {
        provider.as_str().to_string()
    }
}

impl fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External search index settings.
///
/// Credentials are named, never stored: each entry is a key that must be
/// present in the secrets source at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExternalIndex {
    pub index_name: String,

    #[serde(default = "default_credentials")]
    pub credentials: Vec<String>,
}

fn default_credentials() -> Vec<String> {
    vec![
        "WAYMARK_SEARCH_APP_ID".to_string(),
        "WAYMARK_SEARCH_API_KEY".to_string(),
    ]
}

/// How dead links are treated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeadLinkPolicy {
    /// Host patterns (`*` wildcard) whose local links are tolerated
    #[serde(default)]
    pub allow_hosts: Vec<String>,

    #[serde(default)]
    pub mode: DeadLinkMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeadLinkMode {
    /// Abort on the first dead link
    #[default]
    Error,
    /// Record dead links as warnings and continue
    Warn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagramConfig {
    #[serde(default = "default_diagram_theme")]
    pub theme: String,
}

fn default_diagram_theme() -> String {
    "default".to_string()
}
