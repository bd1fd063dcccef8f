use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ProjectError;

/// A dotted field reference, e.g. `stock.status`, split into segments.
///
/// Invariant: at least one segment, every segment non-empty. Enforced at
/// construction; the only ways to build one are [`FieldPath::from_str`],
/// [`FieldPath::top`], and [`FieldPath::join`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Builds a single-segment path from a top-level field name.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty. Intended for static schema wiring where
    /// names are compile-time literals.
    #[must_use]
    pub fn top(name: &str) -> Self {
        assert!(!name.is_empty(), "top-level field name must be non-empty");
        Self(vec![name.to_string()])
    }

    /// Extends this path with one more segment.
    ///
    /// # Panics
    ///
    /// Panics if `segment` is empty. Intended for static schema wiring.
    #[must_use]
    pub fn join(&self, segment: &str) -> Self {
        assert!(!segment.is_empty(), "path segment must be non-empty");
        let mut segments = self.0.clone();
        segments.push(segment.to_string());
        Self(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The first segment: the top-level field this path addresses.
    #[must_use]
    pub fn head(&self) -> &str {
        &self.0[0]
    }

    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.0.len() == 1
    }

    /// Returns `true` when `self` is a segment-wise prefix of `other`,
    /// including exact equality. Requesting `stock` covers `stock.status`.
    #[must_use]
    pub fn is_ancestor_or_self(&self, other: &FieldPath) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = ProjectError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.is_empty() {
            return Err(ProjectError::InvalidFieldPath(raw.to_string()));
        }
        let segments: Vec<String> = raw.split('.').map(ToString::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ProjectError::InvalidFieldPath(raw.to_string()));
        }
        Ok(Self(segments))
    }
}

/// Result of parsing a comma-separated list of dotted paths.
///
/// Malformed tokens are collected in `rejected` instead of failing the whole
/// list; callers log them and carry on.
#[derive(Debug, Default)]
pub struct ParsedPaths {
    pub paths: BTreeSet<FieldPath>,
    pub rejected: Vec<String>,
}

impl ParsedPaths {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Parses a CSV of dotted paths, e.g. `"name,prices.price,stock"`.
///
/// Tokens are whitespace-trimmed and deduplicated. An empty or all-whitespace
/// input yields an empty set, meaning "no restriction". Tokens that fail to
/// parse land in [`ParsedPaths::rejected`] and never abort the request.
#[must_use]
pub fn parse_path_list(raw: &str) -> ParsedPaths {
    let mut parsed = ParsedPaths::default();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match token.parse::<FieldPath>() {
            Ok(path) => {
                parsed.paths.insert(path);
            }
            Err(_) => parsed.rejected.push(token.to_string()),
        }
    }
    parsed
}
