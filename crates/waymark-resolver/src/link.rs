//! Link classification and host allowlists.

use regex::Regex;
use url::{Host, Url};

/// What a link points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkTarget {
    /// Site-relative path, normalized
    Internal(String),

    /// Absolute URL
    External(Url),
}

const EXTERNAL_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// Classify a link, or explain why it is malformed.
pub fn classify(link: &str) -> Result<LinkTarget, &'static str> {
    let link = link.trim();

    if link.is_empty() {
        return Err("link is empty");
    }
    if link.starts_with("//") {
        return Err("protocol-relative links are not supported");
    }
    if link.starts_with('/') {
        return Ok(LinkTarget::Internal(normalize_path(link)));
    }

    match Url::parse(link) {
        Ok(url) if EXTERNAL_SCHEMES.contains(&url.scheme()) => Ok(LinkTarget::External(url)),
        Ok(_) => Err("unsupported URL scheme"),
        Err(url::ParseError::RelativeUrlWithoutBase) => Err("internal links must start with `/`"),
        Err(_) => Err("not a valid URL"),
    }
}

/// Normalize a site path for comparison.
///
/// Drops the fragment and query, a trailing `.html`/`.md`/`.mdx`, and a
/// trailing `index` segment.
pub fn normalize_path(path: &str) -> String {
    let end = path.find(['#', '?']).unwrap_or(path.len());
    let mut path = &path[..end];

    for ext in [".html", ".mdx", ".md"] {
        if let Some(stripped) = path.strip_suffix(ext) {
            path = stripped;
            break;
        }
    }

    if path == "index" {
        path = "";
    } else if let Some(stripped) = path.strip_suffix("/index") {
        path = &path[..stripped.len() + 1];
    }

    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Whether the URL points at the author's own machine.
pub fn is_local(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Some(Host::Ipv4(ip)) => ip.is_loopback() || ip.is_unspecified(),
        Some(Host::Ipv6(ip)) => ip.is_loopback() || ip.is_unspecified(),
        None => false,
    }
}

/// Host patterns whose local links may be left unresolved.
///
/// `*` matches any run of characters; matching is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct HostAllowlist {
    patterns: Vec<Regex>,
}

impl HostAllowlist {
    /// Compile patterns. On failure returns the index of the bad pattern.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, (usize, regex::Error)> {
        let patterns = patterns
            .iter()
            .enumerate()
            .map(|(i, pattern)| compile_host_pattern(pattern.as_ref()).map_err(|e| (i, e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether the URL's host matches any pattern.
    pub fn allows(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.trim_start_matches('[').trim_end_matches(']');
        self.patterns.iter().any(|p| p.is_match(host))
    }
}

fn compile_host_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    let pattern = pattern.trim().trim_start_matches('[').trim_end_matches(']');
    if pattern.is_empty() {
        return Err(regex::Error::Syntax("host pattern is empty".to_string()));
    }
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("(?i)^{body}$"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_internal_links() {
        assert_eq!(
            classify("/guide/getting-started#install"),
            Ok(LinkTarget::Internal("/guide/getting-started".to_string()))
        );
        assert_eq!(
            classify("/guide/index.html"),
            Ok(LinkTarget::Internal("/guide/".to_string()))
        );
    }

    #[test]
    fn classifies_external_links() {
        let target = classify("https://github.com/mkroo/admincraft").unwrap();
        assert!(matches!(target, LinkTarget::External(url) if url.host_str() == Some("github.com")));
        assert!(matches!(classify("mailto:team@example.com"), Ok(LinkTarget::External(_))));
    }

    #[test]
    fn rejects_malformed_links() {
        assert_eq!(classify(""), Err("link is empty"));
        assert_eq!(classify("guide/intro"), Err("internal links must start with `/`"));
        assert_eq!(classify("//cdn.example.com/x"), Err("protocol-relative links are not supported"));
        assert_eq!(classify("ftp://example.com/file"), Err("unsupported URL scheme"));
        assert_eq!(classify("http://"), Err("not a valid URL"));
    }

    #[test]
    fn normalizes_paths() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/index"), "/");
        assert_eq!(normalize_path("/index.html"), "/");
        assert_eq!(normalize_path("/api/hooks.md"), "/api/hooks");
        assert_eq!(normalize_path("/api/hooks?tab=2"), "/api/hooks");
        assert_eq!(normalize_path("guide/"), "/guide/");
    }

    #[test]
    fn detects_local_hosts() {
        let local = [
            "http://localhost:3000/admin",
            "http://app.localhost/",
            "http://127.0.0.1:8080",
            "http://0.0.0.0/",
            "http://[::1]:5173/",
        ];
        for link in local {
            assert!(is_local(&Url::parse(link).unwrap()), "{link} should be local");
        }
        assert!(!is_local(&Url::parse("https://example.com").unwrap()));
    }

    #[test]
    fn allowlist_matches_host_patterns() {
        let allow = HostAllowlist::new(&["localhost", "*.localhost", "::1"]).unwrap();

        assert!(allow.allows(&Url::parse("http://LOCALHOST:3000").unwrap()));
        assert!(allow.allows(&Url::parse("http://admin.localhost/").unwrap()));
        assert!(allow.allows(&Url::parse("http://[::1]/").unwrap()));
        assert!(!allow.allows(&Url::parse("http://127.0.0.1/").unwrap()));
    }

    #[test]
    fn allowlist_rejects_empty_pattern() {
        let err = HostAllowlist::new(&["localhost", " "]).unwrap_err();
        assert_eq!(err.0, 1);
    }
}
