//! Resolution server command.

use std::path::Path;

use anyhow::Result;
use waymark_server::{NavServer, NavServerConfig};

use super::Project;

/// Run the resolution server.
pub async fn run(
    config: &Path,
    port: Option<u16>,
    host: Option<String>,
    watch: bool,
) -> Result<()> {
    let project = Project::load(config)?;

    let config = NavServerConfig {
        docs_dir: project.docs_dir(),
        port: port.unwrap_or(project.file.serve.port),
        host: host.unwrap_or_else(|| project.file.serve.host.clone()),
        watch,
        config_path: project.config_path,
        ..Default::default()
    };

    tracing::info!("Starting resolution server on port {}", config.port);

    NavServer::new(config).start().await?;

    Ok(())
}
