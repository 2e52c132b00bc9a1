//! Site map build command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use waymark_config::DeadLinkMode;
use waymark_resolver::EnvSecrets;
use waymark_static::{BuildConfig, SiteBuilder};

use super::Project;

/// Run the build command.
pub async fn run(
    config: &Path,
    output: Option<PathBuf>,
    partials: bool,
    dead_links: Option<DeadLinkMode>,
) -> Result<()> {
    tracing::info!("Building site map...");

    let project = Project::load(config)?;

    let config = BuildConfig {
        docs_dir: project.docs_dir(),
        output_dir: output.unwrap_or_else(|| project.output_dir()),
        partials: partials && project.file.build.partials,
        dead_links,
    };

    let builder = SiteBuilder::new(project.file.site, config);
    let result = tokio::task::spawn_blocking(move || builder.build(&EnvSecrets)).await??;

    for warning in &result.warnings {
        tracing::warn!("{}", warning);
    }

    tracing::info!(
        "Resolved {} pages with {} warnings in {}ms",
        result.pages,
        result.warnings.len(),
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
