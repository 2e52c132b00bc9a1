//! Site description validation.

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use waymark_config::{DeadLinkMode, NavEntry, NavLink, SidebarGroup, SidebarItem, SiteConfig};

use crate::capability::{DocumentIndex, SecretSource};
use crate::error::{ConfigError, FieldPath};
use crate::link::{classify, is_local, HostAllowlist, LinkTarget};
use crate::resolve::{search_config, SearchDescriptor, PATH_PLACEHOLDER};

/// language[-script][-region][-variant]*
static LOCALE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z]{2,3}(-[A-Za-z]{4})?(-([A-Za-z]{2}|[0-9]{3}))?(-([A-Za-z0-9]{5,8}|[0-9][A-Za-z0-9]{3}))*$",
    )
    .expect("locale pattern is valid")
});

/// Validate a site description, failing on the first violation.
///
/// Dead links always fail here regardless of the configured mode; use
/// [`Validator`] to downgrade them to warnings.
pub fn validate(
    config: SiteConfig,
    documents: &dyn DocumentIndex,
    secrets: &dyn SecretSource,
) -> Result<ValidSiteConfig, ConfigError> {
    Validator::new(documents, secrets)
        .dead_link_mode(DeadLinkMode::Error)
        .validate(config)
}

/// Configurable validation pass.
pub struct Validator<'a> {
    documents: &'a dyn DocumentIndex,
    secrets: &'a dyn SecretSource,
    dead_links: Option<DeadLinkMode>,
}

impl<'a> Validator<'a> {
    pub fn new(documents: &'a dyn DocumentIndex, secrets: &'a dyn SecretSource) -> Self {
        Self {
            documents,
            secrets,
            dead_links: None,
        }
    }

    /// Override the dead-link mode from the site description.
    pub fn dead_link_mode(mut self, mode: DeadLinkMode) -> Self {
        self.dead_links = Some(mode);
        self
    }

    /// Validate the site description.
    ///
    /// Checks run in field order: base path, locale, title, dead-link
    /// policy, nav, sidebar, social links, logo, hostname, edit link,
    /// search. The first violation is returned.
    pub fn validate(&self, config: SiteConfig) -> Result<ValidSiteConfig, ConfigError> {
        check_base_path(&config.base_path)?;
        check_locale(&config.locale)?;
        check_label(&FieldPath::root("title"), &config.title)?;

        let allowlist = HostAllowlist::new(&config.dead_links.allow_hosts).map_err(|(i, e)| {
            ConfigError::InvalidPattern {
                field: FieldPath::root("dead_links").field("allow_hosts").index(i),
                value: config.dead_links.allow_hosts[i].clone(),
                message: e.to_string(),
            }
        })?;

        let mut walk = Walk {
            documents: self.documents,
            allowlist,
            mode: self.dead_links.unwrap_or(config.dead_links.mode),
            matchers: HashMap::new(),
            warnings: Vec::new(),
        };

        walk.nav(&config.nav)?;
        walk.sidebar(&config)?;
        walk.social_links(&config)?;

        if let Some(logo) = &config.logo {
            check_asset(&FieldPath::root("logo"), logo)?;
        }
        if let Some(hostname) = &config.hostname {
            check_hostname(hostname)?;
        }
        if let Some(edit) = &config.edit_link {
            let field = FieldPath::root("edit_link");
            if !edit.pattern.contains(PATH_PLACEHOLDER) {
                return Err(ConfigError::MissingTemplatePlaceholder {
                    field: field.field("pattern"),
                    template: edit.pattern.clone(),
                });
            }
            check_label(&field.field("text"), &edit.text)?;
        }

        let search = search_config(&config, self.secrets)?;

        for warning in &walk.warnings {
            tracing::warn!("{}", warning);
        }
        tracing::debug!(
            "Validated site {:?}: {} nav entries, {} sidebars",
            config.title,
            config.nav.len(),
            config.sidebar.len()
        );

        Ok(ValidSiteConfig {
            config,
            matchers: walk.matchers,
            search,
            warnings: walk.warnings,
        })
    }
}

/// A site description that passed validation.
///
/// Immutable; share it by reference or behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ValidSiteConfig {
    pub(crate) config: SiteConfig,
    /// Compiled `active_match` patterns keyed by source text
    pub(crate) matchers: HashMap<String, Regex>,
    pub(crate) search: SearchDescriptor,
    pub(crate) warnings: Vec<ConfigError>,
}

impl ValidSiteConfig {
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    /// Dead links downgraded to warnings during validation.
    pub fn warnings(&self) -> &[ConfigError] {
        &self.warnings
    }

    /// The validated search settings.
    pub fn search(&self) -> &SearchDescriptor {
        &self.search
    }

    /// Strip the base path from a served URL path.
    ///
    /// Returns `None` when the path lies outside the base path.
    pub fn site_path(&self, url_path: &str) -> Option<String> {
        let base = self.config.base_path.as_str();
        if base == "/" {
            return Some(url_path.to_string());
        }
        if let Some(rest) = url_path.strip_prefix(base) {
            return Some(format!("/{rest}"));
        }
        (url_path == base.trim_end_matches('/')).then(|| "/".to_string())
    }
}

impl Deref for ValidSiteConfig {
    type Target = SiteConfig;

    fn deref(&self) -> &SiteConfig {
        &self.config
    }
}

struct Walk<'a> {
    documents: &'a dyn DocumentIndex,
    allowlist: HostAllowlist,
    mode: DeadLinkMode,
    matchers: HashMap<String, Regex>,
    warnings: Vec<ConfigError>,
}

impl Walk<'_> {
    fn nav(&mut self, nav: &[NavEntry]) -> Result<(), ConfigError> {
        let root = FieldPath::root("nav");
        for (i, entry) in nav.iter().enumerate() {
            let field = root.index(i);
            match entry {
                NavEntry::Link(link) => self.nav_link(&field, link)?,
                NavEntry::Dropdown { label, items } => {
                    check_label(&field.field("label"), label)?;
                    for (j, link) in items.iter().enumerate() {
                        self.nav_link(&field.field("items").index(j), link)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn nav_link(&mut self, field: &FieldPath, link: &NavLink) -> Result<(), ConfigError> {
        check_label(&field.field("label"), &link.label)?;
        self.link(&field.field("link"), &link.link)?;

        if let Some(pattern) = &link.active_match {
            if !self.matchers.contains_key(pattern) {
                let regex = Regex::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                    field: field.field("active_match"),
                    value: pattern.clone(),
                    message: e.to_string(),
                })?;
                self.matchers.insert(pattern.clone(), regex);
            }
        }
        Ok(())
    }

    fn sidebar(&mut self, config: &SiteConfig) -> Result<(), ConfigError> {
        let root = FieldPath::root("sidebar");
        let mut seen: HashMap<&str, FieldPath> = HashMap::new();

        for (i, route) in config.sidebar.iter().enumerate() {
            let prefix_field = root.index(i).field("prefix");
            check_prefix(&prefix_field, &route.prefix)?;

            if let Some(first) = seen.get(route.prefix.as_str()) {
                return Err(ConfigError::DuplicateRoutePrefix {
                    field: prefix_field,
                    prefix: route.prefix.clone(),
                    first: first.clone(),
                });
            }
            seen.insert(&route.prefix, prefix_field);

            let keyed = root.key(&route.prefix);
            for (g, group) in route.groups.iter().enumerate() {
                self.group(&keyed.index(g), group)?;
            }
        }
        Ok(())
    }

    fn group(&mut self, field: &FieldPath, group: &SidebarGroup) -> Result<(), ConfigError> {
        check_label(&field.field("label"), &group.label)?;
        for (k, item) in group.items.iter().enumerate() {
            let item_field = field.field("items").index(k);
            match item {
                SidebarItem::Group(nested) => self.group(&item_field, nested)?,
                SidebarItem::Link(link) => {
                    check_label(&item_field.field("label"), &link.label)?;
                    self.link(&item_field.field("link"), &link.link)?;
                }
            }
        }
        Ok(())
    }

    fn social_links(&mut self, config: &SiteConfig) -> Result<(), ConfigError> {
        let root = FieldPath::root("social_links");
        for (i, social) in config.social_links.iter().enumerate() {
            let field = root.index(i);
            check_label(&field.field("icon"), &social.icon)?;

            let link_field = field.field("link");
            if let LinkTarget::Internal(_) = malformed(&link_field, &social.link, classify(&social.link))? {
                return Err(ConfigError::MalformedPath {
                    field: link_field,
                    value: social.link.clone(),
                    reason: "social links must be absolute URLs",
                });
            }
            self.link(&link_field, &social.link)?;
        }
        Ok(())
    }

    fn link(&mut self, field: &FieldPath, link: &str) -> Result<(), ConfigError> {
        match malformed(field, link, classify(link))? {
            LinkTarget::Internal(path) => {
                if !self.documents.document_exists(&path) {
                    return self.dead(field, link);
                }
            }
            LinkTarget::External(url) => {
                if is_local(&url) {
                    if self.allowlist.allows(&url) {
                        tracing::debug!("Allowing local link at {}: {}", field, link);
                    } else {
                        return self.dead(field, link);
                    }
                }
            }
        }
        Ok(())
    }

    fn dead(&mut self, field: &FieldPath, link: &str) -> Result<(), ConfigError> {
        let error = ConfigError::DeadLink {
            field: field.clone(),
            target: link.to_string(),
        };
        match self.mode {
            DeadLinkMode::Error => Err(error),
            DeadLinkMode::Warn => {
                self.warnings.push(error);
                Ok(())
            }
        }
    }
}

fn malformed(
    field: &FieldPath,
    value: &str,
    result: Result<LinkTarget, &'static str>,
) -> Result<LinkTarget, ConfigError> {
    result.map_err(|reason| ConfigError::MalformedPath {
        field: field.clone(),
        value: value.to_string(),
        reason,
    })
}

fn check_label(field: &FieldPath, label: &str) -> Result<(), ConfigError> {
    if label.trim().is_empty() {
        return Err(ConfigError::EmptyLabel {
            field: field.clone(),
        });
    }
    Ok(())
}

fn check_slashes(field: &FieldPath, value: &str) -> Result<(), ConfigError> {
    let reason = if !value.starts_with('/') {
        "must start with `/`"
    } else if !value.ends_with('/') {
        "must end with `/`"
    } else if value.contains("//") {
        "must not contain empty segments"
    } else if value.contains(['#', '?']) || value.chars().any(char::is_whitespace) {
        "must be a plain path"
    } else {
        return Ok(());
    };
    Err(ConfigError::MalformedPath {
        field: field.clone(),
        value: value.to_string(),
        reason,
    })
}

fn check_base_path(base: &str) -> Result<(), ConfigError> {
    check_slashes(&FieldPath::root("base_path"), base)
}

fn check_prefix(field: &FieldPath, prefix: &str) -> Result<(), ConfigError> {
    check_slashes(field, prefix)
}

fn check_locale(locale: &str) -> Result<(), ConfigError> {
    if LOCALE.is_match(locale) {
        Ok(())
    } else {
        Err(ConfigError::InvalidLocale {
            field: FieldPath::root("locale"),
            value: locale.to_string(),
        })
    }
}

/// Asset paths are checked for shape only; assets are not documents.
fn check_asset(field: &FieldPath, path: &str) -> Result<LinkTarget, ConfigError> {
    malformed(field, path, classify(path))
}

fn check_hostname(hostname: &str) -> Result<(), ConfigError> {
    let field = FieldPath::root("hostname");
    match malformed(&field, hostname, classify(hostname))? {
        LinkTarget::External(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::MalformedPath {
            field,
            value: hostname.to_string(),
            reason: "hostname must be an http(s) URL",
        }),
    }
}
