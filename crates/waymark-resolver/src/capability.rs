//! Capabilities injected by the build pipeline.

use std::collections::{BTreeMap, HashSet};

use crate::link::normalize_path;

/// Answers whether a document exists for an internal link path.
///
/// Results are assumed stable for the duration of one build.
pub trait DocumentIndex: Send + Sync {
    /// `path` is site-relative, starts with `/` and carries no fragment.
    fn document_exists(&self, path: &str) -> bool;
}

impl<F> DocumentIndex for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn document_exists(&self, path: &str) -> bool {
        self(path)
    }
}

/// Answers whether a named secret is available. Values are never read.
pub trait SecretSource: Send + Sync {
    fn contains(&self, key: &str) -> bool;
}

/// Secrets taken from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn contains(&self, key: &str) -> bool {
        std::env::var_os(key).is_some_and(|value| !value.is_empty())
    }
}

/// A source with no secrets at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecrets;

impl SecretSource for NoSecrets {
    fn contains(&self, _key: &str) -> bool {
        false
    }
}

impl SecretSource for HashSet<String> {
    fn contains(&self, key: &str) -> bool {
        HashSet::contains(self, key)
    }
}

/// In-memory document index built from source-relative file paths.
///
/// `guide/intro.md` is served at `/guide/intro`; `guide/index.md` at
/// `/guide/`.
#[derive(Debug, Clone, Default)]
pub struct DocumentSet {
    /// Route -> source path
    routes: BTreeMap<String, String>,
}

impl DocumentSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from source paths relative to the docs directory.
    pub fn from_sources<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        for source in sources {
            set.insert(source.as_ref());
        }
        set
    }

    /// Register a source file. Returns the route it is served at.
    pub fn insert(&mut self, source: &str) -> String {
        let source = source.replace('\\', "/");
        let source = source.trim_start_matches("./").trim_start_matches('/');
        let route = route_for_source(source);
        self.routes.insert(route.clone(), source.to_string());
        route
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in lexical order, paired with their source paths.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.routes.iter().map(|(r, s)| (r.as_str(), s.as_str()))
    }

    /// Source path of the document served at `route`.
    pub fn source_for(&self, route: &str) -> Option<&str> {
        let route = normalize_path(route);
        self.lookup(&route).map(String::as_str)
    }

    fn lookup(&self, route: &str) -> Option<&String> {
        self.routes.get(route).or_else(|| {
            if route.ends_with('/') {
                None
            } else {
                self.routes.get(&format!("{route}/"))
            }
        })
    }
}

impl DocumentIndex for DocumentSet {
    fn document_exists(&self, path: &str) -> bool {
        self.lookup(&normalize_path(path)).is_some()
    }
}

/// Route a source file is served at.
pub fn route_for_source(source: &str) -> String {
    let source = source.trim_start_matches('/');
    let stem = source
        .strip_suffix(".mdx")
        .or_else(|| source.strip_suffix(".md"))
        .unwrap_or(source);

    if stem == "index" {
        "/".to_string()
    } else if let Some(dir) = stem.strip_suffix("/index") {
        format!("/{dir}/")
    } else {
        format!("/{stem}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_sources_to_routes() {
        assert_eq!(route_for_source("index.md"), "/");
        assert_eq!(route_for_source("guide/index.mdx"), "/guide/");
        assert_eq!(route_for_source("guide/getting-started.md"), "/guide/getting-started");
    }

    #[test]
    fn resolves_links_against_documents() {
        let docs = DocumentSet::from_sources(["index.md", "guide/index.md", "guide/intro.md"]);

        assert!(docs.document_exists("/"));
        assert!(docs.document_exists("/guide/intro"));
        assert!(docs.document_exists("/guide/intro.html"));
        assert!(docs.document_exists("/guide/intro#install"));
        assert!(docs.document_exists("/guide"));
        assert!(docs.document_exists("/guide/index"));
        assert!(!docs.document_exists("/guide/missing"));
        assert_eq!(docs.source_for("/guide/"), Some("guide/index.md"));
    }

    #[test]
    fn normalizes_windows_separators() {
        let mut docs = DocumentSet::new();
        let route = docs.insert(r".\api\hooks.md");

        assert_eq!(route, "/api/hooks");
        assert_eq!(docs.source_for("/api/hooks"), Some("api/hooks.md"));
    }

    #[test]
    fn closures_are_document_indexes() {
        let index = |path: &str| path == "/only";

        assert!(index.document_exists("/only"));
        assert!(!index.document_exists("/other"));
    }

    #[test]
    fn secret_sets_report_presence() {
        let secrets: HashSet<String> = ["API_KEY".to_string()].into_iter().collect();

        assert!(SecretSource::contains(&secrets, "API_KEY"));
        assert!(!SecretSource::contains(&secrets, "APP_ID"));
        assert!(!NoSecrets.contains("API_KEY"));
    }
}
