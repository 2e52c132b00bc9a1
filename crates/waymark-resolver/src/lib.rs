//! Navigation resolver for waymark sites.
//!
//! Validates a [`SiteConfig`](waymark_config::SiteConfig) against the set of
//! documents that exist at build time and answers per-page questions: which
//! top-nav entry is active, which sidebar applies, where the edit link
//! points and which pages come before and after the current one.
//!
//! Resolution is pure: the same validated config and request path always
//! produce the same directives.

pub mod capability;
pub mod error;
pub mod link;
pub mod resolve;
pub mod validate;

pub use capability::{DocumentIndex, DocumentSet, EnvSecrets, NoSecrets, SecretSource};
pub use error::{ConfigError, FieldPath};
pub use link::{classify, normalize_path, HostAllowlist, LinkTarget};
pub use resolve::{
    expand_edit_link, search_config, EditLinkView, PageDirectives, PageLink, PrevNext,
    SearchDescriptor,
};
pub use validate::{validate, ValidSiteConfig, Validator};

pub use waymark_config::DeadLinkMode;
