use crate::path::FieldPath;

/// How a declared field shapes its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// A single value: scalar, array, or an opaque object computed whole.
    Scalar,
    /// A nested object whose children are individually selectable.
    Composite { children: Vec<String> },
}

/// One entry in an entity's declared field surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    name: String,
    kind: FieldKind,
    mandatory: bool,
}

impl FieldDef {
    /// A selectable scalar field.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty; field names are static wiring.
    #[must_use]
    pub fn scalar(name: &str) -> Self {
        assert!(!name.is_empty(), "field name must be non-empty");
        Self {
            name: name.to_string(),
            kind: FieldKind::Scalar,
            mandatory: false,
        }
    }

    /// A scalar field that is always included regardless of selection (`id`).
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    #[must_use]
    pub fn mandatory(name: &str) -> Self {
        let mut def = Self::scalar(name);
        def.mandatory = true;
        def
    }

    /// A composite field with individually selectable children, in response
    /// key order.
    ///
    /// # Panics
    ///
    /// Panics if `name` or any child name is empty.
    #[must_use]
    pub fn composite(name: &str, children: &[&str]) -> Self {
        assert!(!name.is_empty(), "field name must be non-empty");
        assert!(
            children.iter().all(|c| !c.is_empty()),
            "child field names must be non-empty"
        );
        Self {
            name: name.to_string(),
            kind: FieldKind::Composite {
                children: children.iter().map(ToString::to_string).collect(),
            },
            mandatory: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }
}

/// The ordered full field surface of one entity kind.
///
/// Declaration order is response key order; the projector iterates this, not
/// the entity, so absent source data never changes the shape of the output.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    kind: String,
    fields: Vec<FieldDef>,
}

impl EntitySchema {
    #[must_use]
    pub fn new(kind: &str, fields: Vec<FieldDef>) -> Self {
        Self {
            kind: kind.to_string(),
            fields,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Every addressable path in the schema: each top-level field plus each
    /// `parent.child` pair of composites. Useful for wiring checks and tests.
    #[must_use]
    pub fn all_paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        for def in &self.fields {
            let top = FieldPath::top(def.name());
            match def.kind() {
                FieldKind::Scalar => paths.push(top),
                FieldKind::Composite { children } => {
                    for child in children {
                        paths.push(top.join(child));
                    }
                    paths.push(top);
                }
            }
        }
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_order_is_preserved() {
        let schema = EntitySchema::new(
            "thing",
            vec![
                FieldDef::mandatory("id"),
                FieldDef::scalar("name"),
                FieldDef::composite("stock", &["is_in_stock", "stock_quantity"]),
            ],
        );
        let names: Vec<&str> = schema.fields().iter().map(FieldDef::name).collect();
        assert_eq!(names, ["id", "name", "stock"]);
    }

    #[test]
    fn all_paths_covers_children() {
        let schema = EntitySchema::new(
            "thing",
            vec![
                FieldDef::scalar("name"),
                FieldDef::composite("stock", &["is_in_stock"]),
            ],
        );
        let rendered: Vec<String> = schema.all_paths().iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["name", "stock.is_in_stock", "stock"]);
    }

    #[test]
    fn mandatory_flag_is_tracked() {
        assert!(FieldDef::mandatory("id").is_mandatory());
        assert!(!FieldDef::scalar("name").is_mandatory());
    }
}
