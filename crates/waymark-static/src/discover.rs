//! Document discovery.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};
use waymark_resolver::DocumentSet;

/// Errors that can occur while scanning the docs directory.
#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("Docs directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to scan docs directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Collect every Markdown document under `docs_dir`.
///
/// Hidden files and directories (such as `.vitepress/`) are skipped.
pub fn discover_documents(docs_dir: &Path) -> Result<DocumentSet, DiscoverError> {
    if !docs_dir.is_dir() {
        return Err(DiscoverError::NotFound(docs_dir.to_path_buf()));
    }

    let mut documents = DocumentSet::new();

    for entry in WalkDir::new(docs_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
    {
        let entry = entry?;
        let path = entry.path();

        if !entry.file_type().is_file() {
            continue;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if ext != "md" && ext != "mdx" {
            continue;
        }

        let relative = path.strip_prefix(docs_dir).unwrap_or(path);
        let source = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let route = documents.insert(&source);
        tracing::debug!("Found document {} at {}", source, route);
    }

    Ok(documents)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;
    use waymark_resolver::DocumentIndex;

    #[test]
    fn discovers_markdown_documents() {
        let temp = tempdir().unwrap();
        let docs = temp.path();

        fs::create_dir_all(docs.join("guide")).unwrap();
        fs::create_dir_all(docs.join(".vitepress")).unwrap();
        fs::write(docs.join("index.md"), "# Home").unwrap();
        fs::write(docs.join("guide/getting-started.md"), "# Start").unwrap();
        fs::write(docs.join("guide/diagram.svg"), "<svg/>").unwrap();
        fs::write(docs.join(".vitepress/draft.md"), "# Draft").unwrap();

        let set = discover_documents(docs).unwrap();

        assert_eq!(set.len(), 2);
        assert!(set.document_exists("/"));
        assert!(set.document_exists("/guide/getting-started"));
        assert!(!set.document_exists("/.vitepress/draft"));
        assert_eq!(
            set.source_for("/guide/getting-started"),
            Some("guide/getting-started.md")
        );
    }

    #[test]
    fn errors_on_missing_directory() {
        let temp = tempdir().unwrap();

        let result = discover_documents(&temp.path().join("missing"));

        assert!(matches!(result, Err(DiscoverError::NotFound(_))));
    }
}
