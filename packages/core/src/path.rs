//! Request path suffixes: `{kind}` or `{kind}/{name}`.
//!
//! The suffix is split on the first `/` only, so a name may itself contain
//! slashes. No other normalization happens: segments are neither trimmed
//! nor decoded, and an empty name after a trailing slash stays empty.

use crate::PathError;

/// The positional segments of a request path suffix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryPath {
    /// Nothing after the prefix.
    Empty,
    /// `{kind}`
    Kind(String),
    /// `{kind}/{name}`
    KindAndName { kind: String, name: String },
}

/// What a read should fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReadTarget {
    /// Every entry of a kind.
    List { kind: String },
    /// A single entry.
    Single { kind: String, name: String },
}

impl EntryPath {
    /// Split a suffix into at most two segments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use confentry_core::EntryPath;
    ///
    /// assert_eq!(EntryPath::parse(""), EntryPath::Empty);
    /// assert_eq!(EntryPath::parse("web"), EntryPath::Kind("web".to_string()));
    /// assert_eq!(
    ///     EntryPath::parse("web/api/v2"),
    ///     EntryPath::KindAndName { kind: "web".to_string(), name: "api/v2".to_string() }
    /// );
    /// ```
    pub fn parse(suffix: &str) -> Self {
        if suffix.is_empty() {
            return EntryPath::Empty;
        }
        match suffix.split_once('/') {
            Some((kind, name)) => EntryPath::KindAndName {
                kind: kind.to_string(),
                name: name.to_string(),
            },
            None => EntryPath::Kind(suffix.to_string()),
        }
    }

    /// Parse the part of `path` after `prefix`.
    ///
    /// Returns `None` when `path` does not start with `prefix`.
    pub fn from_request_path(path: &str, prefix: &str) -> Option<Self> {
        path.strip_prefix(prefix).map(Self::parse)
    }

    /// Number of segments (0, 1 or 2).
    pub fn len(&self) -> usize {
        match self {
            EntryPath::Empty => 0,
            EntryPath::Kind(_) => 1,
            EntryPath::KindAndName { .. } => 2,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, EntryPath::Empty)
    }

    /// Cardinality rule for reads: one segment lists, two fetch one entry.
    pub fn into_read_target(self) -> Result<ReadTarget, PathError> {
        match self {
            EntryPath::Empty => Err(PathError::KindOrKindAndName),
            EntryPath::Kind(kind) => Ok(ReadTarget::List { kind }),
            EntryPath::KindAndName { kind, name } => Ok(ReadTarget::Single { kind, name }),
        }
    }

    /// Cardinality rule for deletes: both kind and name are required.
    pub fn into_delete_target(self) -> Result<(String, String), PathError> {
        match self {
            EntryPath::KindAndName { kind, name } => Ok((kind, name)),
            _ => Err(PathError::KindAndNameForDelete),
        }
    }
}
