//! Site map builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use waymark_config::{DeadLinkMode, DiagramConfig, NavEntry, SiteConfig, SocialLink};
use waymark_resolver::{
    ConfigError, DocumentSet, PageDirectives, SearchDescriptor, SecretSource, ValidSiteConfig,
    Validator,
};

use crate::discover::{discover_documents, DiscoverError};
use crate::templates::{Furniture, TemplateEngine};

/// Configuration for building a site map.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Source docs directory
    pub docs_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Render per-page furniture partials
    pub partials: bool,

    /// Override the dead-link mode from the site description
    pub dead_links: Option<DeadLinkMode>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            output_dir: PathBuf::from("dist"),
            partials: true,
            dead_links: None,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of pages resolved
    pub pages: usize,

    /// Dead links reported as warnings
    pub warnings: Vec<ConfigError>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Discover(#[from] DiscoverError),

    #[error("Invalid site configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to render template: {0}")]
    TemplateError(String),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// One resolved page in the site map.
#[derive(Debug, Serialize)]
struct PageEntry<'a> {
    /// Source path relative to the docs directory
    source: &'a str,
    #[serde(flatten)]
    directives: PageDirectives<'a>,
}

/// The document written to `site-map.json`.
#[derive(Debug, Serialize)]
struct SiteMap<'a> {
    title: &'a str,
    description: &'a str,
    locale: &'a str,
    base_path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    logo: Option<&'a str>,
    nav: &'a [NavEntry],
    social_links: &'a [SocialLink],
    search: &'a SearchDescriptor,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagrams: Option<&'a DiagramConfig>,
    warnings: Vec<String>,
    pages: &'a [PageEntry<'a>],
}

/// Static site map builder.
pub struct SiteBuilder {
    site: SiteConfig,
    config: BuildConfig,
    templates: TemplateEngine,
}

impl SiteBuilder {
    /// Create a new builder for a site description.
    pub fn new(site: SiteConfig, config: BuildConfig) -> Self {
        Self {
            site,
            config,
            templates: TemplateEngine::new(),
        }
    }

    /// Validate the site against the docs tree and write the site map.
    pub fn build(&self, secrets: &dyn SecretSource) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        // Ensure output directory exists
        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let documents = discover_documents(&self.config.docs_dir)?;
        tracing::info!(
            "Found {} documents in {}",
            documents.len(),
            self.config.docs_dir.display()
        );

        let mut validator = Validator::new(&documents, secrets);
        if let Some(mode) = self.config.dead_links {
            validator = validator.dead_link_mode(mode);
        }
        let site = validator.validate(self.site.clone())?;

        // Resolve every page in parallel
        let routes: Vec<(&str, &str)> = documents.iter().collect();
        let pages: Vec<PageEntry<'_>> = routes
            .par_iter()
            .map(|&(route, source)| {
                site.resolve_page(route, Some(source))
                    .map(|directives| PageEntry { source, directives })
            })
            .collect::<Result<_, _>>()?;

        if self.config.partials {
            self.write_partials(&site, &pages)?;
        }

        self.write_site_map(&site, &pages)?;
        self.generate_sitemap(&site, &documents)?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: pages.len(),
            warnings: site.warnings().to_vec(),
            duration_ms: duration.as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Render furniture partials to `partials/<route>.html`.
    fn write_partials(&self, site: &ValidSiteConfig, pages: &[PageEntry<'_>]) -> Result<(), BuildError> {
        let partials_dir = self.config.output_dir.join("partials");

        pages.par_iter().try_for_each(|page| {
            let html = self
                .templates
                .render_furniture(&Furniture::new(site, &page.directives))
                .map_err(|e| BuildError::TemplateError(e.to_string()))?;

            let output_path = partials_dir.join(partial_path(&page.directives.path));
            if let Some(parent) = output_path.parent() {
                fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
            }
            fs::write(&output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))
        })
    }

    /// Write `site-map.json`.
    fn write_site_map(&self, site: &ValidSiteConfig, pages: &[PageEntry<'_>]) -> Result<(), BuildError> {
        let site_map = SiteMap {
            title: &site.title,
            description: &site.description,
            locale: &site.locale,
            base_path: &site.base_path,
            logo: site.logo.as_deref(),
            nav: &site.nav,
            social_links: &site.social_links,
            search: site.search(),
            diagrams: site.diagrams.as_ref(),
            warnings: site.warnings().iter().map(ToString::to_string).collect(),
            pages,
        };

        let json = serde_json::to_string_pretty(&site_map)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("site-map.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Generate sitemap.xml and robots.txt when a hostname is configured.
    fn generate_sitemap(&self, site: &ValidSiteConfig, documents: &DocumentSet) -> Result<(), BuildError> {
        let Some(hostname) = &site.hostname else {
            tracing::debug!("No hostname configured, skipping sitemap.xml");
            return Ok(());
        };
        let origin = format!(
            "{}{}",
            hostname.trim_end_matches('/'),
            site.base_path.trim_end_matches('/')
        );

        let urls: Vec<String> = documents
            .iter()
            .map(|(route, _)| {
                format!(
                    "  <url>\n    <loc>{}</loc>\n  </url>",
                    xml_escape(&format!("{origin}{route}"))
                )
            })
            .collect();

        let sitemap = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
            urls.join("\n")
        );

        fs::write(self.config.output_dir.join("sitemap.xml"), sitemap)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        // Also generate robots.txt
        let robots = format!("User-agent: *\nAllow: /\nSitemap: {}/sitemap.xml", origin);
        fs::write(self.config.output_dir.join("robots.txt"), robots)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        Ok(())
    }
}

/// Escape text for an XML element body.
fn xml_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Partial file for a route: `/` -> `index.html`, `/guide/` ->
/// `guide/index.html`, `/guide/intro` -> `guide/intro.html`.
fn partial_path(route: &str) -> PathBuf {
    let trimmed = route.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        Path::new(trimmed).join("index.html")
    } else {
        PathBuf::from(format!("{trimmed}.html"))
    }
}
