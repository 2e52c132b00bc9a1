//! Waymark CLI - navigation config validation and resolution for docs sites.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};
use waymark_config::DeadLinkMode;

mod commands;

#[derive(Parser)]
#[command(name = "waymark")]
#[command(about = "Navigation config validation and resolution for static docs sites")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to docs.toml config file
    #[arg(short, long, default_value = "docs.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter docs.toml and docs tree
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Validate the site description against the docs tree
    Check {
        /// How to treat dead links (defaults to the config)
        #[arg(long, value_enum)]
        dead_links: Option<DeadLinks>,
    },

    /// Print the resolved navigation for one page as JSON
    Resolve {
        /// Site-relative request path, e.g. /guide/getting-started
        path: String,

        /// Source document for the edit link (defaults to the discovered one)
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Build the site map
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip furniture partials
        #[arg(long)]
        no_partials: bool,

        /// How to treat dead links (defaults to the config)
        #[arg(long, value_enum)]
        dead_links: Option<DeadLinks>,
    },

    /// Serve resolved navigation over HTTP
    Serve {
        /// Port to listen on (defaults to config or 7777)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (defaults to config or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Do not reload on changes
        #[arg(long)]
        no_watch: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DeadLinks {
    Error,
    Warn,
}

impl From<DeadLinks> for DeadLinkMode {
    fn from(value: DeadLinks) -> Self {
        match value {
            DeadLinks::Error => DeadLinkMode::Error,
            DeadLinks::Warn => DeadLinkMode::Warn,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Check { dead_links } => {
            commands::check::run(&cli.config, dead_links.map(Into::into)).await?;
        }
        Commands::Resolve { path, source } => {
            commands::resolve::run(&cli.config, &path, source.as_deref()).await?;
        }
        Commands::Build {
            output,
            no_partials,
            dead_links,
        } => {
            commands::build::run(&cli.config, output, !no_partials, dead_links.map(Into::into))
                .await?;
        }
        Commands::Serve {
            port,
            host,
            no_watch,
        } => {
            commands::serve::run(&cli.config, port, host, !no_watch).await?;
        }
    }

    Ok(())
}
