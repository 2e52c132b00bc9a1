//! Validation errors.

use std::fmt;

/// Location of a value inside the site description,
/// e.g. `sidebar["/guide/"][2].items[0].link`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath(String);

impl FieldPath {
    /// A top-level field.
    pub fn root(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Nested field access: `parent.name`.
    pub fn field(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    /// Sequence element: `parent[index]`.
    pub fn index(&self, index: usize) -> Self {
        Self(format!("{}[{}]", self.0, index))
    }

    /// Keyed element: `parent["key"]`.
    pub fn key(&self, key: &str) -> Self {
        Self(format!("{}[{:?}]", self.0, key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A violation found while validating a site description.
///
/// Every variant names the offending field and value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Malformed path at {field}: {value:?} ({reason})")]
    MalformedPath {
        field: FieldPath,
        value: String,
        reason: &'static str,
    },

    #[error("Duplicate route prefix at {field}: {prefix:?} is already declared at {first}")]
    DuplicateRoutePrefix {
        field: FieldPath,
        prefix: String,
        first: FieldPath,
    },

    #[error("Dead link at {field}: {target:?}")]
    DeadLink { field: FieldPath, target: String },

    #[error("Invalid search provider at {field}: {value:?} ({reason})")]
    InvalidSearchProvider {
        field: FieldPath,
        value: String,
        reason: String,
    },

    #[error("Missing `:path` placeholder at {field}: {template:?}")]
    MissingTemplatePlaceholder { field: FieldPath, template: String },

    #[error("Empty label at {field}")]
    EmptyLabel { field: FieldPath },

    #[error("Invalid locale at {field}: {value:?} is not a BCP-47 language tag")]
    InvalidLocale { field: FieldPath, value: String },

    #[error("Invalid pattern at {field}: {value:?}: {message}")]
    InvalidPattern {
        field: FieldPath,
        value: String,
        message: String,
    },
}

impl ConfigError {
    /// The field the violation was found at.
    pub fn field(&self) -> &FieldPath {
        match self {
            ConfigError::MalformedPath { field, .. }
            | ConfigError::DuplicateRoutePrefix { field, .. }
            | ConfigError::DeadLink { field, .. }
            | ConfigError::InvalidSearchProvider { field, .. }
            | ConfigError::MissingTemplatePlaceholder { field, .. }
            | ConfigError::EmptyLabel { field }
            | ConfigError::InvalidLocale { field, .. }
            | ConfigError::InvalidPattern { field, .. } => field,
        }
    }

    /// Whether a build should abort on this error.
    ///
    /// Dead links may be downgraded to warnings; everything else leaves the
    /// navigation model inconsistent.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ConfigError::DeadLink { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_field_paths() {
        let path = FieldPath::root("sidebar")
            .key("/guide/")
            .index(2)
            .field("items")
            .index(0)
            .field("link");

        assert_eq!(path.as_str(), r#"sidebar["/guide/"][2].items[0].link"#);
    }

    #[test]
    fn reports_field_and_value() {
        let err = ConfigError::DeadLink {
            field: FieldPath::root("nav").index(0).field("link"),
            target: "/nonexistent/page".to_string(),
        };

        assert_eq!(err.field().as_str(), "nav[0].link");
        assert_eq!(
            err.to_string(),
            r#"Dead link at nav[0].link: "/nonexistent/page""#
        );
        assert!(!err.is_fatal());
    }

    #[test]
    fn structural_errors_are_fatal() {
        let err = ConfigError::DuplicateRoutePrefix {
            field: FieldPath::root("sidebar").index(1).field("prefix"),
            prefix: "/guide/".to_string(),
            first: FieldPath::root("sidebar").index(0).field("prefix"),
        };

        assert!(err.is_fatal());
    }
}
