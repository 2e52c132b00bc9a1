//! Config validation command.

use std::path::Path;

use anyhow::Result;
use waymark_config::DeadLinkMode;

use super::Project;

/// Run the check command.
pub async fn run(config: &Path, dead_links: Option<DeadLinkMode>) -> Result<()> {
    let project = Project::load(config)?;
    let (documents, site) = project.validate(dead_links)?;

    for warning in site.warnings() {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        "Site configuration is valid: {} documents, {} nav entries, {} sidebars",
        documents.len(),
        site.nav.len(),
        site.sidebar.len()
    );

    if !site.warnings().is_empty() {
        tracing::info!("{} dead links reported as warnings", site.warnings().len());
    }

    Ok(())
}
