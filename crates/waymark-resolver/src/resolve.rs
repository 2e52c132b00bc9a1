//! Per-page resolution.

use serde::Serialize;
use waymark_config::{Footer, NavEntry, NavLink, SearchProvider, SidebarGroup, SidebarItem, SiteConfig};

use crate::capability::SecretSource;
use crate::error::{ConfigError, FieldPath};
use crate::link::{classify, normalize_path, LinkTarget};
use crate::validate::ValidSiteConfig;

/// Placeholder replaced by the document path in edit-link patterns.
pub const PATH_PLACEHOLDER: &str = ":path";

/// Everything the renderer needs around a page body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDirectives<'a> {
    /// Site-relative request path
    pub path: String,
    pub active_nav: Option<&'a NavEntry>,
    pub sidebar: &'a [SidebarGroup],
    pub edit_link: Option<EditLinkView<'a>>,
    pub footer: Option<&'a Footer>,
    pub prev: Option<PageLink<'a>>,
    pub next: Option<PageLink<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditLinkView<'a> {
    pub url: String,
    pub text: &'a str,
}

/// A sidebar link used for previous/next navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink<'a> {
    pub label: &'a str,
    pub link: &'a str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrevNext<'a> {
    pub prev: Option<PageLink<'a>>,
    pub next: Option<PageLink<'a>>,
}

/// Validated search settings handed to the search indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "provider", rename_all = "kebab-case")]
pub enum SearchDescriptor {
    None,
    Local,
    ExternalIndexed {
        index_name: String,
        /// Names of the secrets the indexer reads; never their values
        credential_keys: Vec<String>,
    },
}

/// Substitute every `:path` in an edit-link pattern.
pub fn expand_edit_link(pattern: &str, source_doc_path: &str) -> Result<String, ConfigError> {
    if !pattern.contains(PATH_PLACEHOLDER) {
        return Err(ConfigError::MissingTemplatePlaceholder {
            field: FieldPath::root("edit_link").field("pattern"),
            template: pattern.to_string(),
        });
    }
    let source = source_doc_path.trim_start_matches('/');
    Ok(pattern.replace(PATH_PLACEHOLDER, source))
}

/// Check the search provider selection and describe it.
///
/// Only the presence of external credentials is checked, never their values.
pub fn search_config(
    config: &SiteConfig,
    secrets: &dyn SecretSource,
) -> Result<SearchDescriptor, ConfigError> {
    let field = FieldPath::root("search");
    let search = &config.search;

    match &search.provider {
        SearchProvider::None => Ok(SearchDescriptor::None),
        SearchProvider::Local => Ok(SearchDescriptor::Local),
        SearchProvider::Unrecognized(name) => Err(ConfigError::InvalidSearchProvider {
            field: field.field("provider"),
            value: name.clone(),
            reason: "expected none, local or external-indexed".to_string(),
        }),
        SearchProvider::ExternalIndexed => {
            let Some(external) = &search.external else {
                return Err(ConfigError::InvalidSearchProvider {
                    field: field.field("external"),
                    value: search.provider.to_string(),
                    reason: "external-indexed search requires a [search.external] section"
                        .to_string(),
                });
            };
            let external_field = field.field("external");

            if external.index_name.trim().is_empty() {
                return Err(ConfigError::InvalidSearchProvider {
                    field: external_field.field("index_name"),
                    value: external.index_name.clone(),
                    reason: "index name is empty".to_string(),
                });
            }
            for (i, key) in external.credentials.iter().enumerate() {
                if !secrets.contains(key) {
                    return Err(ConfigError::InvalidSearchProvider {
                        field: external_field.field("credentials").index(i),
                        value: key.clone(),
                        reason: "credential is not available".to_string(),
                    });
                }
            }

            Ok(SearchDescriptor::ExternalIndexed {
                index_name: external.index_name.clone(),
                credential_keys: external.credentials.clone(),
            })
        }
    }
}

impl ValidSiteConfig {
    /// The top-nav entry to highlight for a request path.
    ///
    /// Declaration order is priority order.
    pub fn active_nav(&self, request_path: &str) -> Option<&NavEntry> {
        let path = normalize_path(request_path);
        self.config.nav.iter().find(|entry| match entry {
            NavEntry::Link(link) => self.nav_link_active(link, &path),
            NavEntry::Dropdown { items, .. } => {
                items.iter().any(|link| self.nav_link_active(link, &path))
            }
        })
    }

    fn nav_link_active(&self, link: &NavLink, path: &str) -> bool {
        if let Some(pattern) = &link.active_match {
            return self
                .matchers
                .get(pattern)
                .is_some_and(|regex| regex.is_match(path));
        }
        match classify(&link.link) {
            Ok(LinkTarget::Internal(target)) => {
                target == path || (target != "/" && target.ends_with('/') && path.starts_with(&target))
            }
            _ => false,
        }
    }

    /// Sidebar of the longest route prefix matching the request path.
    pub fn sidebar_for(&self, request_path: &str) -> &[SidebarGroup] {
        let path = if request_path.starts_with('/') {
            request_path.to_string()
        } else {
            format!("/{request_path}")
        };

        self.config
            .sidebar
            .iter()
            .filter(|route| path.starts_with(&route.prefix))
            .max_by_key(|route| route.prefix.len())
            .map(|route| route.groups.as_slice())
            .unwrap_or(&[])
    }

    /// Edit link for a source document, if the site has one configured.
    pub fn edit_link_for(&self, source_doc_path: &str) -> Result<Option<String>, ConfigError> {
        self.config
            .edit_link
            .as_ref()
            .map(|edit| expand_edit_link(&edit.pattern, source_doc_path))
            .transpose()
    }

    /// Neighbouring pages in the active sidebar, in reading order.
    pub fn prev_next(&self, request_path: &str) -> PrevNext<'_> {
        let mut links = Vec::new();
        for group in self.sidebar_for(request_path) {
            flatten_links(group, &mut links);
        }

        let current = normalize_path(request_path);
        let Some(index) = links.iter().position(|(path, _)| *path == current) else {
            return PrevNext::default();
        };

        PrevNext {
            prev: index.checked_sub(1).map(|i| links[i].1),
            next: links.get(index + 1).map(|(_, link)| *link),
        }
    }

    /// Resolve all page furniture for a request path.
    ///
    /// `source_doc` is the document path relative to the docs directory,
    /// used for the edit link.
    pub fn resolve_page(
        &self,
        request_path: &str,
        source_doc: Option<&str>,
    ) -> Result<PageDirectives<'_>, ConfigError> {
        let edit_link = match (source_doc, &self.config.edit_link) {
            (Some(source), Some(edit)) => Some(EditLinkView {
                url: expand_edit_link(&edit.pattern, source)?,
                text: &edit.text,
            }),
            _ => None,
        };
        let PrevNext { prev, next } = self.prev_next(request_path);

        Ok(PageDirectives {
            path: normalize_path(request_path),
            active_nav: self.active_nav(request_path),
            sidebar: self.sidebar_for(request_path),
            edit_link,
            footer: self.config.footer.as_ref(),
            prev,
            next,
        })
    }
}

/// Internal sidebar links in depth-first order with their normalized paths.
fn flatten_links<'a>(group: &'a SidebarGroup, out: &mut Vec<(String, PageLink<'a>)>) {
    for item in &group.items {
        match item {
            SidebarItem::Group(nested) => flatten_links(nested, out),
            SidebarItem::Link(link) => {
                if let Ok(LinkTarget::Internal(path)) = classify(&link.link) {
                    out.push((
                        path,
                        PageLink {
                            label: &link.label,
                            link: &link.link,
                        },
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{DocumentSet, NoSecrets};
    use crate::validate::validate;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use waymark_config::{parse, ExternalIndex, Format};

    const SITE: &str = r#"
title = "AdminCraft"
locale = "ko-KR"
base_path = "/admincraft/"

[[nav]]
label = "Guide"
link = "/guide/what-is-admincraft"

[[nav]]
label = "Reference"
active_match = "^/(api|components)/"
link = "/api/hooks"

[[nav]]
label = "Settings"

[[nav.items]]
label = "Authentication"
link = "/configuration/oauth"

[[nav.items]]
label = "AI Provider"
link = "/configuration/ai-provider"

[[nav]]
label = "Links"

[[nav.items]]
label = "GitHub"
link = "https://github.com/mkroo/admincraft"

[[sidebar]]
prefix = "/guide/"

[[sidebar.groups]]
label = "Introduction"

[[sidebar.groups.items]]
label = "What is AdminCraft?"
link = "/guide/what-is-admincraft"

[[sidebar.groups.items]]
label = "Getting started"
link = "/guide/getting-started"

[[sidebar.groups]]
label = "Installation"

[[sidebar.groups.items]]
label = "Docker"
link = "/guide/self-hosting-docker"

[[sidebar]]
prefix = "/guide/advanced/"

[[sidebar.groups]]
label = "Advanced"

[[sidebar.groups.items]]
label = "Topic"
link = "/guide/advanced/topic"

[[sidebar]]
prefix = "/configuration/"

[[sidebar.groups]]
label = "Settings"

[[sidebar.groups.items]]
label = "Authentication"
link = "/configuration/oauth"

[footer]
message = "Released under the MIT License."
copyright = "Copyright 2025-present AdminCraft Contributors"

[edit_link]
pattern = "https://github.com/mkroo/admincraft/edit/main/docs/:path"
text = "Suggest changes to this page"

[search]
provider = "local"
"#;

    fn docs() -> DocumentSet {
        DocumentSet::from_sources([
            "index.md",
            "guide/what-is-admincraft.md",
            "guide/getting-started.md",
            "guide/self-hosting-docker.md",
            "guide/advanced/topic.md",
            "configuration/oauth.md",
            "configuration/ai-provider.md",
            "api/hooks.md",
        ])
    }

    fn site() -> ValidSiteConfig {
        let config = parse(SITE, Format::Toml).unwrap().site;
        validate(config, &docs(), &NoSecrets).unwrap()
    }

    #[test]
    fn longest_prefix_wins() {
        let site = site();

        let groups = site.sidebar_for("/guide/advanced/topic");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Advanced");

        let groups = site.sidebar_for("/guide/getting-started");
        assert_eq!(groups[0].label, "Introduction");
    }

    #[test]
    fn no_matching_prefix_means_no_sidebar() {
        let site = site();

        assert!(site.sidebar_for("/api/hooks").is_empty());
        assert!(site.sidebar_for("/").is_empty());
        assert!(site.sidebar_for("/guide").is_empty());
    }

    #[test]
    fn dropdown_is_active_for_contained_link() {
        let site = site();

        let active = site.active_nav("/configuration/oauth").unwrap();

        assert_eq!(active.label(), "Settings");
        assert!(matches!(active, NavEntry::Dropdown { .. }));
    }

    #[test]
    fn link_is_active_on_exact_match() {
        let site = site();

        assert_eq!(site.active_nav("/guide/what-is-admincraft").unwrap().label(), "Guide");
        assert_eq!(site.active_nav("/guide/what-is-admincraft.html").unwrap().label(), "Guide");
        assert!(site.active_nav("/guide/getting-started").is_none());
    }

    #[test]
    fn active_match_overrides_target() {
        let site = site();

        assert_eq!(site.active_nav("/components/overview").unwrap().label(), "Reference");
        assert_eq!(site.active_nav("/api/hooks").unwrap().label(), "Reference");
    }

    #[test]
    fn section_links_match_by_prefix() {
        let config = SiteConfig {
            nav: vec![
                NavEntry::Link(NavLink {
                    label: "Home".to_string(),
                    link: "/".to_string(),
                    active_match: None,
                }),
                NavEntry::Link(NavLink {
                    label: "Guide".to_string(),
                    link: "/guide/".to_string(),
                    active_match: None,
                }),
            ],
            ..SiteConfig::default()
        };
        let docs = DocumentSet::from_sources(["index.md", "guide/index.md"]);
        let site = validate(config, &docs, &NoSecrets).unwrap();

        assert_eq!(site.active_nav("/guide/intro").unwrap().label(), "Guide");
        assert_eq!(site.active_nav("/").unwrap().label(), "Home");
        assert!(site.active_nav("/api/").is_none());
    }

    #[test]
    fn first_declared_match_wins() {
        let config = SiteConfig {
            nav: vec![
                NavEntry::Link(NavLink {
                    label: "First".to_string(),
                    link: "/guide/".to_string(),
                    active_match: None,
                }),
                NavEntry::Link(NavLink {
                    label: "Second".to_string(),
                    link: "/guide/intro".to_string(),
                    active_match: None,
                }),
            ],
            ..SiteConfig::default()
        };
        let docs = DocumentSet::from_sources(["guide/index.md", "guide/intro.md"]);
        let site = validate(config, &docs, &NoSecrets).unwrap();

        assert_eq!(site.active_nav("/guide/intro").unwrap().label(), "First");
    }

    #[test]
    fn active_nav_is_idempotent() {
        let site = site();

        for path in ["/configuration/oauth", "/guide/what-is-admincraft", "/nowhere"] {
            assert_eq!(site.active_nav(path), site.active_nav(path));
        }
    }

    #[test]
    fn edit_link_substitutes_path() {
        let site = site();

        assert_eq!(
            site.edit_link_for("guide/intro.md").unwrap(),
            Some("https://github.com/mkroo/admincraft/edit/main/docs/guide/intro.md".to_string())
        );
        assert_eq!(
            expand_edit_link("https://example.com/edit/main/docs/:path", "/guide/intro.md").unwrap(),
            "https://example.com/edit/main/docs/guide/intro.md"
        );
    }

    #[test]
    fn edit_link_requires_placeholder() {
        let err = expand_edit_link("https://example.com/edit/main/docs/", "guide/intro.md")
            .unwrap_err();

        assert!(matches!(err, ConfigError::MissingTemplatePlaceholder { .. }));
    }

    #[test]
    fn local_search_needs_no_settings() {
        let config = SiteConfig {
            search: waymark_config::SearchConfig {
                provider: SearchProvider::Local,
                external: None,
            },
            ..SiteConfig::default()
        };

        assert_eq!(search_config(&config, &NoSecrets), Ok(SearchDescriptor::Local));
    }

    #[test]
    fn external_search_requires_credentials() {
        let mut config = SiteConfig::default();
        config.search.provider = SearchProvider::ExternalIndexed;

        let err = search_config(&config, &NoSecrets).unwrap_err();
        assert_eq!(err.field().as_str(), "search.external");

        config.search.external = Some(ExternalIndex {
            index_name: "admincraft".to_string(),
            credentials: vec!["APP_ID".to_string(), "API_KEY".to_string()],
        });
        let err = search_config(&config, &NoSecrets).unwrap_err();
        assert_eq!(err.field().as_str(), "search.external.credentials[0]");

        let secrets: HashSet<String> = ["APP_ID", "API_KEY"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            search_config(&config, &secrets),
            Ok(SearchDescriptor::ExternalIndexed {
                index_name: "admincraft".to_string(),
                credential_keys: vec!["APP_ID".to_string(), "API_KEY".to_string()],
            })
        );
    }

    #[test]
    fn rejects_unrecognized_provider() {
        let mut config = SiteConfig::default();
        config.search.provider = SearchProvider::Unrecognized("algolia".to_string());

        let err = search_config(&config, &NoSecrets).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidSearchProvider { value, .. } if value == "algolia"));
    }

    #[test]
    fn finds_neighbouring_pages() {
        let site = site();

        let PrevNext { prev, next } = site.prev_next("/guide/getting-started");
        assert_eq!(prev.unwrap().label, "What is AdminCraft?");
        assert_eq!(next.unwrap().link, "/guide/self-hosting-docker");

        let first = site.prev_next("/guide/what-is-admincraft");
        assert!(first.prev.is_none());

        assert_eq!(site.prev_next("/api/hooks"), PrevNext::default());
    }

    #[test]
    fn resolves_page_directives() {
        let site = site();

        let page = site
            .resolve_page("/configuration/oauth", Some("configuration/oauth.md"))
            .unwrap();

        assert_eq!(page.path, "/configuration/oauth");
        assert_eq!(page.active_nav.unwrap().label(), "Settings");
        assert_eq!(page.sidebar[0].label, "Settings");
        assert_eq!(
            page.edit_link.unwrap().url,
            "https://github.com/mkroo/admincraft/edit/main/docs/configuration/oauth.md"
        );
        assert_eq!(
            page.footer.unwrap().message.as_deref(),
            Some("Released under the MIT License.")
        );
    }

    #[test]
    fn serializes_directives_for_renderer() {
        let site = site();
        let page = site.resolve_page("/guide/getting-started", None).unwrap();

        let json = serde_json::to_value(&page).unwrap();

        assert_eq!(json["path"], "/guide/getting-started");
        assert!(json["active_nav"].is_null());
        assert_eq!(json["sidebar"][0]["items"][1]["link"], "/guide/getting-started");
        assert_eq!(json["next"]["label"], "Docker");
        assert_eq!(
            serde_json::to_value(site.search()).unwrap(),
            serde_json::json!({ "provider": "local" })
        );
    }
}
