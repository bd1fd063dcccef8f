use std::collections::BTreeSet;

use crate::path::FieldPath;
use crate::profile::ResponseProfile;

/// One request's field selection: which paths the client asked for, which it
/// excluded, and which response profile applies when it did neither.
///
/// Built once at the HTTP boundary and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FieldSelection {
    requested: BTreeSet<FieldPath>,
    excluded: BTreeSet<FieldPath>,
    profile: ResponseProfile,
}

impl FieldSelection {
    #[must_use]
    pub fn new(
        requested: BTreeSet<FieldPath>,
        excluded: BTreeSet<FieldPath>,
        profile: ResponseProfile,
    ) -> Self {
        Self {
            requested,
            excluded,
            profile,
        }
    }

    /// A selection with no restriction: every field of the `default` profile.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn requested(&self) -> &BTreeSet<FieldPath> {
        &self.requested
    }

    #[must_use]
    pub fn excluded(&self) -> &BTreeSet<FieldPath> {
        &self.excluded
    }

    #[must_use]
    pub fn profile(&self) -> ResponseProfile {
        self.profile
    }
}

/// Key-level selection for the `meta_data` field's child entries, driven by
/// the `include_meta`/`exclude_meta` request parameters.
///
/// Same precedence rule as [`FieldSelection`]: a non-empty include list wins
/// outright and the exclude list is ignored.
#[derive(Debug, Clone, Default)]
pub struct MetaSelection {
    include_keys: BTreeSet<String>,
    exclude_keys: BTreeSet<String>,
}

impl MetaSelection {
    #[must_use]
    pub fn new(include_keys: BTreeSet<String>, exclude_keys: BTreeSet<String>) -> Self {
        Self {
            include_keys,
            exclude_keys,
        }
    }

    /// Whether a meta entry with this key survives the selection.
    #[must_use]
    pub fn admits(&self, key: &str) -> bool {
        if !self.include_keys.is_empty() {
            return self.include_keys.contains(key);
        }
        if !self.exclude_keys.is_empty() {
            return !self.exclude_keys.contains(key);
        }
        true
    }
}
