//! Single-page resolution command.

use std::path::Path;

use anyhow::{Context, Result};

use super::Project;

/// Run the resolve command.
pub async fn run(config: &Path, path: &str, source: Option<&str>) -> Result<()> {
    let project = Project::load(config)?;
    let (documents, site) = project.validate(None)?;

    let source = source.or_else(|| documents.source_for(path));
    if source.is_none() {
        tracing::warn!("No document found for {}", path);
    }

    let page = site.resolve_page(path, source)?;
    let json = serde_json::to_string_pretty(&page).context("Failed to serialize directives")?;
    println!("{json}");

    Ok(())
}
