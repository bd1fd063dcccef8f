use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::decision::FieldDecision;
use crate::error::{BoxError, ProjectError};
use crate::path::FieldPath;
use crate::schema::{EntitySchema, FieldKind};

/// A deferred field computation. Invoked at most once per projection, and
/// only when the field is included.
pub type FieldThunk<'a> = Box<dyn Fn() -> Result<Value, BoxError> + 'a>;

/// Per-field compute thunks for one entity, keyed by field path.
///
/// Scalar fields register a thunk at their own path; composite fields
/// register one thunk per child path. Thunks typically borrow the source
/// entity, hence the lifetime.
#[derive(Default)]
pub struct FieldComputers<'a> {
    thunks: HashMap<FieldPath, FieldThunk<'a>>,
}

impl<'a> FieldComputers<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<F>(&mut self, path: FieldPath, thunk: F)
    where
        F: Fn() -> Result<Value, BoxError> + 'a,
    {
        self.thunks.insert(path, Box::new(thunk));
    }

    fn compute(&self, path: &FieldPath) -> Result<Value, ProjectError> {
        let thunk = self
            .thunks
            .get(path)
            .ok_or_else(|| ProjectError::UnwiredField(path.clone()))?;
        thunk().map_err(|source| ProjectError::FieldComputation {
            path: path.clone(),
            source,
        })
    }
}

impl std::fmt::Debug for FieldComputers<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<String> = self.thunks.keys().map(ToString::to_string).collect();
        paths.sort();
        f.debug_struct("FieldComputers").field("paths", &paths).finish()
    }
}

/// The assembled response document: an insertion-ordered mapping from field
/// name to value. Excluded fields are entirely absent, never null.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProjectedEntity(Map<String, Value>);

impl ProjectedEntity {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Top-level keys in response order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_string(), value);
    }

    pub(crate) fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub(crate) fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Projects one entity: walks the schema in declaration order, consults the
/// decision per path, and invokes only the thunks of included fields.
///
/// A composite field materializes when at least one of its children is
/// included; the children of a non-included composite are never computed.
/// Mandatory fields bypass the decision.
///
/// # Errors
///
/// Returns [`ProjectError::FieldComputation`] when an included field's thunk
/// fails, and [`ProjectError::UnwiredField`] when the schema declares a field
/// no thunk was registered for.
pub fn project(
    schema: &EntitySchema,
    decision: &FieldDecision,
    computers: &FieldComputers<'_>,
) -> Result<ProjectedEntity, ProjectError> {
    let mut out = ProjectedEntity::new();

    for def in schema.fields() {
        let top = FieldPath::top(def.name());
        match def.kind() {
            FieldKind::Scalar => {
                if def.is_mandatory() || decision.included(&top) {
                    out.insert(def.name(), computers.compute(&top)?);
                }
            }
            FieldKind::Composite { children } => {
                let mut nested = Map::new();
                for child in children {
                    let child_path = top.join(child);
                    if def.is_mandatory() || decision.included(&child_path) {
                        nested.insert(child.clone(), computers.compute(&child_path)?);
                    }
                }
                // A composite with no surviving children is omitted outright,
                // same as an excluded scalar.
                if !nested.is_empty() {
                    out.insert(def.name(), Value::Object(nested));
                }
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::*;
    use crate::profile::{ProfileDefaults, ResponseProfile};
    use crate::schema::FieldDef;
    use crate::selection::FieldSelection;

    fn schema() -> EntitySchema {
        EntitySchema::new(
            "product",
            vec![
                FieldDef::mandatory("id"),
                FieldDef::scalar("name"),
                FieldDef::scalar("sku"),
                FieldDef::composite("stock", &["is_in_stock", "stock_quantity", "stock_status"]),
            ],
        )
    }

    fn computers() -> FieldComputers<'static> {
        let mut c = FieldComputers::new();
        c.insert(FieldPath::top("id"), || Ok(json!(42)));
        c.insert(FieldPath::top("name"), || Ok(json!("Blood Orange Soda")));
        c.insert(FieldPath::top("sku"), || Ok(json!("HI-BO-12")));
        c.insert(FieldPath::top("stock").join("is_in_stock"), || Ok(json!(true)));
        c.insert(FieldPath::top("stock").join("stock_quantity"), || Ok(json!(7)));
        c.insert(FieldPath::top("stock").join("stock_status"), || {
            Ok(json!("instock"))
        });
        c
    }

    fn decide(requested: &[&str], excluded: &[&str]) -> FieldDecision {
        let to_set = |raw: &[&str]| -> BTreeSet<FieldPath> {
            raw.iter().map(|s| s.parse().expect("test path")).collect()
        };
        let selection =
            FieldSelection::new(to_set(requested), to_set(excluded), ResponseProfile::Default);
        FieldDecision::resolve(&selection, &ProfileDefaults::default())
    }

    #[test]
    fn unrestricted_projection_emits_schema_order() {
        let projected = project(&schema(), &decide(&[], &[]), &computers()).expect("project");
        let keys: Vec<&String> = projected.keys().collect();
        assert_eq!(keys, ["id", "name", "sku", "stock"]);
    }

    #[test]
    fn requested_fields_bound_the_output_exactly() {
        let projected = project(&schema(), &decide(&["name"], &[]), &computers()).expect("project");
        // `id` is mandatory, so the key set is the requested set plus `id`.
        let keys: Vec<&String> = projected.keys().collect();
        assert_eq!(keys, ["id", "name"]);
    }

    #[test]
    fn requesting_a_composite_parent_yields_all_children() {
        let projected =
            project(&schema(), &decide(&["stock"], &[]), &computers()).expect("project");
        let stock = projected.get("stock").expect("stock object");
        assert_eq!(
            stock,
            &json!({"is_in_stock": true, "stock_quantity": 7, "stock_status": "instock"})
        );
    }

    #[test]
    fn requesting_a_nested_path_materializes_a_partial_parent() {
        let projected = project(&schema(), &decide(&["stock.stock_status"], &[]), &computers())
            .expect("project");
        assert_eq!(projected.get("stock"), Some(&json!({"stock_status": "instock"})));
    }

    #[test]
    fn excluding_a_parent_suppresses_every_child() {
        let projected =
            project(&schema(), &decide(&[], &["stock"]), &computers()).expect("project");
        assert!(!projected.contains_key("stock"));
    }

    #[test]
    fn excluding_one_child_keeps_the_rest() {
        let projected = project(&schema(), &decide(&[], &["stock.stock_quantity"]), &computers())
            .expect("project");
        let stock = projected.get("stock").expect("stock object");
        assert_eq!(
            stock,
            &json!({"is_in_stock": true, "stock_status": "instock"})
        );
    }

    #[test]
    fn excluded_field_thunk_is_never_invoked() {
        let calls = Cell::new(0u32);
        let mut c = FieldComputers::new();
        c.insert(FieldPath::top("id"), || Ok(json!(1)));
        c.insert(FieldPath::top("name"), || Ok(json!("n")));
        c.insert(FieldPath::top("sku"), || {
            calls.set(calls.get() + 1);
            Ok(json!("never"))
        });
        c.insert(FieldPath::top("stock").join("is_in_stock"), || {
            panic!("excluded composite child must not be computed")
        });
        c.insert(FieldPath::top("stock").join("stock_quantity"), || {
            panic!("excluded composite child must not be computed")
        });
        c.insert(FieldPath::top("stock").join("stock_status"), || {
            panic!("excluded composite child must not be computed")
        });

        let projected = project(&schema(), &decide(&["name"], &[]), &c).expect("project");
        assert_eq!(calls.get(), 0, "excluded thunk ran");
        assert!(!projected.contains_key("sku"));
        assert!(!projected.contains_key("stock"));
    }

    #[test]
    fn included_thunk_failure_surfaces_the_offending_path() {
        let mut c = computers();
        c.insert(FieldPath::top("name"), || Err("upstream lookup failed".into()));

        let err = project(&schema(), &decide(&["name"], &[]), &c).unwrap_err();
        match err {
            ProjectError::FieldComputation { path, .. } => {
                assert_eq!(path.to_string(), "name");
            }
            other => panic!("expected FieldComputation, got {other:?}"),
        }
    }

    #[test]
    fn unwired_schema_field_is_an_error() {
        let mut c = FieldComputers::new();
        c.insert(FieldPath::top("id"), || Ok(json!(1)));
        // `name` requested but never wired.
        let err = project(&schema(), &decide(&["name"], &[]), &c).unwrap_err();
        assert!(matches!(err, ProjectError::UnwiredField(_)));
    }

    #[test]
    fn projection_is_idempotent_for_a_fixed_selection() {
        let decision = decide(&["name", "stock"], &[]);
        let c = computers();
        let first = project(&schema(), &decision, &c).expect("project");
        let second = project(&schema(), &decision, &c).expect("project");
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).expect("serialize"),
            serde_json::to_string(&second).expect("serialize")
        );
    }
}
