//! Config file discovery and parsing.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::IgnoredAny;
use serde::Deserialize;

use crate::site::SiteConfig;

/// File names searched for, in priority order.
const CONFIG_FILENAMES: [&str; 3] = ["docs.toml", "docs.yaml", "docs.yml"];

/// Configuration file structure.
///
/// The site description sits at the top level; build and serve settings
/// live in their own tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(flatten)]
    pub site: SiteConfig,

    #[serde(default)]
    pub build: BuildSettings,

    #[serde(default)]
    pub serve: ServeSettings,

    /// Top-level keys no other field claimed
    #[serde(flatten)]
    unknown: BTreeMap<String, IgnoredAny>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSettings {
    /// Source directory for documents
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,

    /// Output directory for the site map
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Render per-page furniture partials
    #[serde(default = "default_true")]
    pub partials: bool,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            output: default_output(),
            partials: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServeSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("docs")
}
fn default_output() -> PathBuf {
    PathBuf::from("dist")
}
fn default_true() -> bool {
    true
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    7777
}

/// Supported config file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Some(Format::Toml),
            Some("yaml" | "yml") => Some(Format::Yaml),
            _ => None,
        }
    }
}

/// Errors that can occur when loading a config file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid YAML in config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Unsupported config format: {0} (expected .toml, .yaml or .yml)")]
    UnsupportedFormat(PathBuf),

    #[error("Unknown config keys: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("No docs.toml, docs.yaml or docs.yml found in {0} or its parents")]
    NotFound(PathBuf),
}

/// Parse config file content in the given format.
pub fn parse(content: &str, format: Format) -> Result<ConfigFile, LoadError> {
    let config: ConfigFile = match format {
        Format::Toml => toml::from_str(content)?,
        Format::Yaml => serde_yaml::from_str(content)?,
    };
    if !config.unknown.is_empty() {
        let keys = config.unknown.into_keys().collect();
        return Err(LoadError::UnknownKeys(keys));
    }
    Ok(config)
}

/// Load and parse a config file.
pub fn load(path: &Path) -> Result<ConfigFile, LoadError> {
    let format =
        Format::from_path(path).ok_or_else(|| LoadError::UnsupportedFormat(path.to_path_buf()))?;

    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let config = parse(&content, format)?;
    tracing::debug!("Loaded config from {}", path.display());

    Ok(config)
}

/// Find a config file in `start` or the nearest parent directory.
pub fn find_config(start: &Path) -> Result<PathBuf, LoadError> {
    for dir in start.ancestors() {
        for name in CONFIG_FILENAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }
    Err(LoadError::NotFound(start.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::{NavEntry, SearchProvider, SidebarItem};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
title = "AdminCraft"
description = "Self-service admin framework"
locale = "ko-KR"
base_path = "/admincraft/"

[[nav]]
label = "Guide"
link = "/guide/what-is-admincraft"

[[nav]]
text = "Links"

[[nav.items]]
text = "GitHub"
link = "https://github.com/mkroo/admincraft"

[[sidebar]]
prefix = "/guide/"

[[sidebar.groups]]
label = "Introduction"

[[sidebar.groups.items]]
label = "What is AdminCraft?"
link = "/guide/what-is-admincraft"

[[sidebar.groups.items]]
label = "Advanced"
collapsed = true

[[sidebar.groups.items.items]]
label = "Hooks"
link = "/guide/hooks"

[search]
provider = "local"

[build]
docs_dir = "site"
"#;

    #[test]
    fn parses_toml_site_description() {
        let config = parse(SAMPLE, Format::Toml).unwrap();
        let site = &config.site;

        assert_eq!(site.title, "AdminCraft");
        assert_eq!(site.locale, "ko-KR");
        assert_eq!(site.base_path, "/admincraft/");
        assert_eq!(site.search.provider, SearchProvider::Local);
        assert_eq!(config.build.docs_dir, PathBuf::from("site"));
        assert_eq!(config.build.output, PathBuf::from("dist"));

        assert!(matches!(&site.nav[0], NavEntry::Link(link) if link.link == "/guide/what-is-admincraft"));
        assert!(matches!(&site.nav[1], NavEntry::Dropdown { items, .. } if items.len() == 1));

        let group = &site.sidebar[0].groups[0];
        assert_eq!(group.items.len(), 2);
        match &group.items[1] {
            SidebarItem::Group(nested) => {
                assert_eq!(nested.collapsed, Some(true));
                assert_eq!(nested.items.len(), 1);
            }
            other => panic!("expected nested group, got {other:?}"),
        }
    }

    #[test]
    fn parses_yaml_site_description() {
        let yaml = r#"
title: Docs
nav:
  - label: Home
    link: /
sidebar:
  - prefix: /api/
    groups:
      - label: API
        items:
          - label: Hooks
            link: /api/hooks
search:
  provider: elastic
"#;
        let config = parse(yaml, Format::Yaml).unwrap();

        assert_eq!(config.site.title, "Docs");
        assert_eq!(config.site.sidebar[0].prefix, "/api/");
        assert_eq!(
            config.site.search.provider,
            SearchProvider::Unrecognized("elastic".to_string())
        );
    }

    #[test]
    fn applies_defaults() {
        let config = parse("", Format::Toml).unwrap();

        assert_eq!(config.site.base_path, "/");
        assert_eq!(config.site.locale, "en-US");
        assert_eq!(config.site.search.provider, SearchProvider::None);
        assert_eq!(config.serve.port, 7777);
        assert!(config.build.partials);
    }

    #[test]
    fn errors_on_invalid_toml() {
        let result = parse("title = [", Format::Toml);
        assert!(matches!(result, Err(LoadError::Toml(_))));
    }

    #[test]
    fn rejects_unknown_top_level_keys() {
        let content = r#"
title = "Docs"

[editLink]
pattern = "https://example.com/edit/main/docs/"

[[socialLinks]]
icon = "github"
link = "/not/absolute"
"#;

        match parse(content, Format::Toml) {
            Err(LoadError::UnknownKeys(keys)) => {
                assert_eq!(keys, vec!["editLink".to_string(), "socialLinks".to_string()]);
            }
            other => panic!("expected unknown keys, got {other:?}"),
        }
    }

    #[test]
    fn rejects_link_on_sidebar_group() {
        let content = r#"
[[sidebar]]
prefix = "/guide/"

[[sidebar.groups]]
label = "Guide"
link = "/does/not/exist"

[[sidebar.groups.items]]
label = "Intro"
link = "/guide/intro"
"#;

        assert!(matches!(parse(content, Format::Toml), Err(LoadError::Toml(_))));
    }

    #[test]
    fn rejects_link_on_nested_sidebar_group() {
        let yaml = r#"
sidebar:
  - prefix: /guide/
    groups:
      - label: Guide
        items:
          - label: Advanced
            link: /does/not/exist
            items:
              - label: Hooks
                link: /guide/hooks
"#;

        assert!(matches!(parse(yaml, Format::Yaml), Err(LoadError::Yaml(_))));
    }

    #[test]
    fn rejects_misspelled_nested_keys() {
        let content = r#"
[edit_link]
pattern = "https://example.com/edit/main/docs/:path"
txt = "Edit"
"#;

        assert!(matches!(parse(content, Format::Toml), Err(LoadError::Toml(_))));
    }

    #[test]
    fn rejects_unknown_extension() {
        let result = load(Path::new("docs.json"));
        assert!(matches!(result, Err(LoadError::UnsupportedFormat(_))));
    }

    #[test]
    fn finds_config_in_parent_directory() {
        let temp = tempdir().unwrap();
        let nested = temp.path().join("docs").join("guide");
        fs::create_dir_all(&nested).unwrap();
        fs::write(temp.path().join("docs.yaml"), "title: Docs\n").unwrap();

        let found = find_config(&nested).unwrap();

        assert_eq!(found, temp.path().join("docs.yaml"));
        assert_eq!(load(&found).unwrap().site.title, "Docs");
    }
}
