//! Resolution server implementation.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use waymark_config::{Footer, LoadError, NavEntry, SocialLink};
use waymark_resolver::{
    ConfigError, DeadLinkMode, DocumentSet, EnvSecrets, PageDirectives, SearchDescriptor,
    ValidSiteConfig, Validator,
};
use waymark_static::{discover_documents, DiscoverError};

use crate::watcher::{FileWatcher, WatchEvent};

/// Configuration for the resolution server.
#[derive(Debug, Clone)]
pub struct NavServerConfig {
    /// Site description file
    pub config_path: PathBuf,

    /// Directory containing docs
    pub docs_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,

    /// Override the dead-link mode from the site description
    pub dead_links: Option<DeadLinkMode>,

    /// Reload when the config or docs tree changes
    pub watch: bool,
}

impl Default for NavServerConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("docs.toml"),
            docs_dir: PathBuf::from("docs"),
            port: 7777,
            host: "127.0.0.1".to_string(),
            dead_links: None,
            watch: true,
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),

    #[error("File watch error: {0}")]
    WatchError(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Discover(#[from] DiscoverError),

    #[error("Invalid site configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A validated site together with the documents it was validated against.
struct Snapshot {
    site: ValidSiteConfig,
    documents: DocumentSet,
}

/// The current snapshot; replaced wholesale on reload.
type SharedState = Arc<RwLock<Arc<Snapshot>>>;

/// Resolution server.
pub struct NavServer {
    config: NavServerConfig,
}

impl NavServer {
    /// Create a new resolution server.
    pub fn new(config: NavServerConfig) -> Self {
        Self { config }
    }

    /// Load the site and start serving.
    pub async fn start(self) -> Result<(), ServerError> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|_| {
                ServerError::InvalidAddress(format!("{}:{}", self.config.host, self.config.port))
            })?;

        let snapshot = load_snapshot(&self.config)?;
        for warning in snapshot.site.warnings() {
            tracing::warn!("{}", warning);
        }
        let state: SharedState = Arc::new(RwLock::new(Arc::new(snapshot)));

        if self.config.watch {
            let (watcher, mut rx) = FileWatcher::new(&self.config.config_path, &self.config.docs_dir)
                .map_err(|e| ServerError::WatchError(e.to_string()))?;

            let state_clone = Arc::clone(&state);
            let config = self.config.clone();
            tokio::spawn(async move {
                while let Some(event) = rx.recv().await {
                    match &event {
                        WatchEvent::ConfigModified(path) => {
                            tracing::info!("Config modified: {}", path.display());
                        }
                        WatchEvent::DocumentsChanged(path) => {
                            tracing::info!("Documents changed: {}", path.display());
                        }
                    }
                    // Changes that queued up while the last reload ran need one more pass
                    while rx.try_recv().is_ok() {}
                    reload(&state_clone, &config).await;
                }
                // Keep watcher alive
                drop(watcher);
            });
        }

        let app = router(state);

        tracing::info!("Starting resolution server at http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/page", get(page_handler))
        .route("/api/site", get(site_handler))
        .route("/api/search", get(search_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Load, discover and validate from scratch.
fn load_snapshot(config: &NavServerConfig) -> Result<Snapshot, ServerError> {
    let file = waymark_config::load(&config.config_path)?;
    let documents = discover_documents(&config.docs_dir)?;

    let mut validator = Validator::new(&documents, &EnvSecrets);
    if let Some(mode) = config.dead_links {
        validator = validator.dead_link_mode(mode);
    }
    let site = validator.validate(file.site)?;

    Ok(Snapshot { site, documents })
}

/// Rebuild the snapshot, keeping the current one if the new config is invalid.
async fn reload(state: &SharedState, config: &NavServerConfig) {
    let config = config.clone();
    let result = tokio::task::spawn_blocking(move || load_snapshot(&config)).await;

    match result {
        Ok(Ok(snapshot)) => {
            for warning in snapshot.site.warnings() {
                tracing::warn!("{}", warning);
            }
            tracing::info!("Reloaded site with {} documents", snapshot.documents.len());
            *state.write().await = Arc::new(snapshot);
        }
        Ok(Err(e)) => {
            tracing::warn!("Keeping previous site configuration: {}", e);
        }
        Err(e) => {
            tracing::warn!("Reload task failed: {}", e);
        }
    }
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    /// URL path as served, including the base path
    path: String,
}

#[derive(Serialize)]
struct PageResponse<'a> {
    source: Option<&'a str>,
    #[serde(flatten)]
    directives: PageDirectives<'a>,
}

/// Handler for per-page directives.
async fn page_handler(
    State(state): State<SharedState>,
    Query(query): Query<PageQuery>,
) -> Response {
    let snapshot = Arc::clone(&*state.read().await);

    let Some(path) = snapshot.site.site_path(&query.path) else {
        return (
            StatusCode::NOT_FOUND,
            format!("{} is outside {}", query.path, snapshot.site.base_path),
        )
            .into_response();
    };
    let source = snapshot.documents.source_for(&path);

    match snapshot.site.resolve_page(&path, source) {
        Ok(directives) => Json(PageResponse { source, directives }).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

#[derive(Serialize)]
struct SiteResponse<'a> {
    title: &'a str,
    description: &'a str,
    locale: &'a str,
    base_path: &'a str,
    nav: &'a [NavEntry],
    social_links: &'a [SocialLink],
    footer: Option<&'a Footer>,
    search: &'a SearchDescriptor,
    documents: usize,
    warnings: Vec<String>,
}

/// Handler for site-wide metadata.
async fn site_handler(State(state): State<SharedState>) -> Response {
    let snapshot = Arc::clone(&*state.read().await);
    let site = &snapshot.site;

    Json(SiteResponse {
        title: &site.title,
        description: &site.description,
        locale: &site.locale,
        base_path: &site.base_path,
        nav: &site.nav,
        social_links: &site.social_links,
        footer: site.footer.as_ref(),
        search: site.search(),
        documents: snapshot.documents.len(),
        warnings: site.warnings().iter().map(ToString::to_string).collect(),
    })
    .into_response()
}

/// Handler for the search descriptor.
async fn search_handler(State(state): State<SharedState>) -> Response {
    let snapshot = Arc::clone(&*state.read().await);
    Json(snapshot.site.search()).into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
