//! CLI subcommands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use waymark_config::{find_config, ConfigFile, DeadLinkMode};
use waymark_resolver::{DocumentSet, EnvSecrets, ValidSiteConfig, Validator};
use waymark_static::discover_documents;

pub mod build;
pub mod check;
pub mod init;
pub mod resolve;
pub mod serve;

/// A loaded config file and the directory its relative paths start from.
pub struct Project {
    pub config_path: PathBuf,
    pub root: PathBuf,
    pub file: ConfigFile,
}

impl Project {
    /// Load the config file, searching parent directories when the default
    /// `docs.toml` is not in the working directory.
    pub fn load(config: &Path) -> Result<Self> {
        let config_path = if config.exists() {
            config.to_path_buf()
        } else if config == Path::new("docs.toml") {
            let cwd = std::env::current_dir().context("Failed to read working directory")?;
            find_config(&cwd)?
        } else {
            anyhow::bail!("Config file not found: {}", config.display());
        };

        let file = waymark_config::load(&config_path)
            .with_context(|| format!("Failed to load {}", config_path.display()))?;
        tracing::info!("Loaded config from {}", config_path.display());

        let root = match config_path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(Self {
            config_path,
            root,
            file,
        })
    }

    pub fn docs_dir(&self) -> PathBuf {
        self.root.join(&self.file.build.docs_dir)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.file.build.output)
    }

    /// Discover documents and validate the site description against them.
    pub fn validate(
        &self,
        dead_links: Option<DeadLinkMode>,
    ) -> Result<(DocumentSet, ValidSiteConfig)> {
        let documents = discover_documents(&self.docs_dir())?;

        let mut validator = Validator::new(&documents, &EnvSecrets);
        if let Some(mode) = dead_links {
            validator = validator.dead_link_mode(mode);
        }
        let site = validator
            .validate(self.file.site.clone())
            .with_context(|| format!("Invalid site configuration in {}", self.config_path.display()))?;

        Ok((documents, site))
    }
}
