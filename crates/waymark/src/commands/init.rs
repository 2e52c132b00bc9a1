//! Initialize a site description and docs tree.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Pages created alongside the starter config, relative to `docs/`.
const STARTER_PAGES: [(&str, &str); 5] = [
    ("index.md", DEFAULT_INDEX),
    ("guide/introduction.md", DEFAULT_INTRODUCTION),
    ("guide/getting-started.md", DEFAULT_GETTING_STARTED),
    ("configuration/options.md", DEFAULT_OPTIONS),
    ("configuration/search.md", DEFAULT_SEARCH),
];

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing waymark...");

    let root = match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let docs_dir = root.join("docs");

    // Check if docs already exists
    if docs_dir.exists() {
        if !yes {
            tracing::warn!("docs/ directory already exists. Use --yes to overwrite.");
            return Ok(());
        }
    } else {
        fs::create_dir_all(&docs_dir).context("Failed to create docs directory")?;
    }

    if !config_path.exists() || yes {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    }

    for (relative, content) in STARTER_PAGES {
        let path = docs_dir.join(relative);
        if path.exists() && !yes {
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", relative))?;
        tracing::info!("Created docs/{}", relative);
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'waymark check' to validate the navigation.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# Waymark site description

title = "My Documentation"
description = "Project documentation"
locale = "en-US"
base_path = "/"

# Top navigation, in render order
[[nav]]
label = "Guide"
link = "/guide/introduction"

[[nav]]
label = "Configuration"
link = "/configuration/options"

[[nav]]
label = "Links"

[[nav.items]]
label = "Changelog"
link = "https://example.com/changelog"

# One sidebar per route prefix; the longest matching prefix wins
[[sidebar]]
prefix = "/guide/"

[[sidebar.groups]]
label = "Introduction"

[[sidebar.groups.items]]
label = "What is this?"
link = "/guide/introduction"

[[sidebar.groups.items]]
label = "Getting Started"
link = "/guide/getting-started"

[[sidebar]]
prefix = "/configuration/"

[[sidebar.groups]]
label = "Configuration"

[[sidebar.groups.items]]
label = "Options"
link = "/configuration/options"

[[sidebar.groups.items]]
label = "Search"
link = "/configuration/search"

[footer]
message = "Released under the MIT License."

[search]
# none, local or external-indexed
provider = "local"

[dead_links]
# Local-host links that are allowed to stay in the docs
allow_hosts = []
mode = "error"

[build]
docs_dir = "docs"
output = "dist"

[serve]
port = 7777
"#;

const DEFAULT_INDEX: &str = r#"# Welcome

Start with the [introduction](/guide/introduction).
"#;

const DEFAULT_INTRODUCTION: &str = r#"# Introduction

Navigation for this site is described in `docs.toml`.
"#;

const DEFAULT_GETTING_STARTED: &str = r#"# Getting Started

Validate the navigation:

```bash
waymark check
```

Build the site map:

```bash
waymark build
```
"#;

const DEFAULT_OPTIONS: &str = r#"# Options

Every link in `nav` and `sidebar` must point at a document under `docs/`
or at an absolute URL.
"#;

const DEFAULT_SEARCH: &str = r#"# Search

Set `search.provider` to `none`, `local` or `external-indexed`.
"#;
