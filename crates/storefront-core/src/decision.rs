use std::collections::BTreeSet;

use crate::path::FieldPath;
use crate::profile::ProfileDefaults;
use crate::selection::FieldSelection;

/// The resolved inclusion function for one request: `included(path) -> bool`.
///
/// Pure function of a [`FieldSelection`] and the deployment's
/// [`ProfileDefaults`]; independent of entity data, so one decision is
/// resolved per request and reused across every entity in a collection.
///
/// Precedence, checked in order:
/// 1. `requested` non-empty: a path is included iff it or an ancestor of it
///    was requested. The exclusion list is ignored entirely in this tier —
///    observed behavior of the system this replaces, kept as-is even though
///    intersection semantics might be expected.
/// 2. `excluded` non-empty: a path is included iff neither it nor an
///    ancestor of it was excluded.
/// 3. Otherwise: the profile's default field set decides (an unrestricted
///    profile includes everything).
#[derive(Debug, Clone)]
pub struct FieldDecision {
    requested: BTreeSet<FieldPath>,
    excluded: BTreeSet<FieldPath>,
    defaults: Option<BTreeSet<FieldPath>>,
}

impl FieldDecision {
    #[must_use]
    pub fn resolve(selection: &FieldSelection, profiles: &ProfileDefaults) -> Self {
        Self {
            requested: selection.requested().clone(),
            excluded: selection.excluded().clone(),
            defaults: profiles.fields_for(selection.profile()).cloned(),
        }
    }

    #[must_use]
    pub fn included(&self, path: &FieldPath) -> bool {
        if !self.requested.is_empty() {
            return covers(&self.requested, path);
        }
        if !self.excluded.is_empty() {
            return !covers(&self.excluded, path);
        }
        match &self.defaults {
            None => true,
            Some(defaults) => covers(defaults, path),
        }
    }
}

/// Whether `path` or any ancestor of it is in `set`.
fn covers(set: &BTreeSet<FieldPath>, path: &FieldPath) -> bool {
    set.iter().any(|entry| entry.is_ancestor_or_self(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ResponseProfile;

    fn paths(raw: &[&str]) -> BTreeSet<FieldPath> {
        raw.iter().map(|s| s.parse().expect("test path")).collect()
    }

    fn path(raw: &str) -> FieldPath {
        raw.parse().expect("test path")
    }

    fn resolve(requested: &[&str], excluded: &[&str], profile: ResponseProfile) -> FieldDecision {
        let selection = FieldSelection::new(paths(requested), paths(excluded), profile);
        FieldDecision::resolve(&selection, &ProfileDefaults::default())
    }

    #[test]
    fn empty_selection_with_default_profile_includes_everything() {
        let decision = resolve(&[], &[], ResponseProfile::Default);
        assert!(decision.included(&path("name")));
        assert!(decision.included(&path("stock.status")));
    }

    #[test]
    fn requested_set_limits_inclusion() {
        let decision = resolve(&["name", "sku"], &[], ResponseProfile::Default);
        assert!(decision.included(&path("name")));
        assert!(decision.included(&path("sku")));
        assert!(!decision.included(&path("description")));
    }

    #[test]
    fn requesting_a_parent_includes_its_children() {
        let decision = resolve(&["stock"], &[], ResponseProfile::Default);
        assert!(decision.included(&path("stock")));
        assert!(decision.included(&path("stock.is_in_stock")));
        assert!(decision.included(&path("stock.stock_quantity")));
    }

    #[test]
    fn requesting_a_child_does_not_include_its_siblings() {
        let decision = resolve(&["stock.stock_status"], &[], ResponseProfile::Default);
        assert!(decision.included(&path("stock.stock_status")));
        assert!(!decision.included(&path("stock.stock_quantity")));
        // The bare parent path itself is not covered; the projector
        // materializes the parent from its included children.
        assert!(!decision.included(&path("stock")));
    }

    #[test]
    fn excluded_set_removes_paths_and_descendants() {
        let decision = resolve(&[], &["stock", "prices.sale_price"], ResponseProfile::Default);
        assert!(!decision.included(&path("stock")));
        assert!(!decision.included(&path("stock.stock_status")));
        assert!(!decision.included(&path("prices.sale_price")));
        assert!(decision.included(&path("prices.price")));
        assert!(decision.included(&path("name")));
    }

    #[test]
    fn requested_overrides_excluded_entirely() {
        // Literal property from the contract: the same path in both lists is
        // included, because a non-empty requested list ignores exclusions.
        let decision = resolve(&["name"], &["name"], ResponseProfile::Default);
        assert!(decision.included(&path("name")));
    }

    #[test]
    fn requested_ignores_exclusions_on_other_paths_too() {
        let decision = resolve(&["name", "stock"], &["stock.stock_quantity"], ResponseProfile::Default);
        assert!(decision.included(&path("stock.stock_quantity")));
    }

    #[test]
    fn profile_defaults_apply_only_when_no_explicit_selection() {
        let decision = resolve(&[], &[], ResponseProfile::QuickBrowse);
        assert!(decision.included(&path("id")));
        assert!(decision.included(&path("prices.price")));
        assert!(!decision.included(&path("description")));

        // An explicit request beats the profile.
        let decision = resolve(&["description"], &[], ResponseProfile::QuickBrowse);
        assert!(decision.included(&path("description")));
        assert!(!decision.included(&path("prices.price")));
    }

    #[test]
    fn profile_defaults_are_deterministic() {
        let a = resolve(&[], &[], ResponseProfile::QuickView);
        let b = resolve(&[], &[], ResponseProfile::QuickView);
        for raw in ["id", "name", "stock.stock_status", "description", "meta_data"] {
            assert_eq!(a.included(&path(raw)), b.included(&path(raw)), "{raw}");
        }
    }
}
