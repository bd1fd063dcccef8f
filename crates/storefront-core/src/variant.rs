use std::collections::BTreeSet;

use serde_json::Value;

use crate::project::ProjectedEntity;

/// Static subtraction spec deriving a variant entity shape from a base
/// projection: whole top-level fields to drop, plus `(parent, child)` keys to
/// drop from within retained composites.
///
/// Configuration, not runtime derivation — the catalog declares one spec per
/// (base kind, variant kind) pair.
#[derive(Debug, Clone, Default)]
pub struct VariantFieldSpec {
    drop_fields: BTreeSet<String>,
    drop_nested: BTreeSet<(String, String)>,
}

impl VariantFieldSpec {
    #[must_use]
    pub fn new(drop_fields: &[&str], drop_nested: &[(&str, &str)]) -> Self {
        Self {
            drop_fields: drop_fields.iter().map(ToString::to_string).collect(),
            drop_nested: drop_nested
                .iter()
                .map(|(parent, child)| ((*parent).to_string(), (*child).to_string()))
                .collect(),
        }
    }

    #[must_use]
    pub fn drop_fields(&self) -> &BTreeSet<String> {
        &self.drop_fields
    }

    #[must_use]
    pub fn drop_nested(&self) -> &BTreeSet<(String, String)> {
        &self.drop_nested
    }
}

/// Applies the subtraction spec to a projected entity, returning a new one.
///
/// The input is untouched. Dropping a nested key is a no-op when the parent
/// is absent (it may have been excluded upstream) or is not an object. No
/// field decisions are re-run; this is pure post-processing.
#[must_use]
pub fn specialize(projected: &ProjectedEntity, spec: &VariantFieldSpec) -> ProjectedEntity {
    let mut map = projected.as_map().clone();

    for field in spec.drop_fields() {
        map.remove(field);
    }

    for (parent, child) in spec.drop_nested() {
        if let Some(Value::Object(nested)) = map.get_mut(parent) {
            nested.remove(child);
        }
    }

    ProjectedEntity::from_map(map)
}
