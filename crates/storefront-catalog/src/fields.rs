//! The product entity's declared field surface and its per-field compute
//! thunks. This is the glue between the domain model and the projector: the
//! schema fixes response key order, the thunks do the (sometimes expensive)
//! per-field work, and none of them run unless the field survives the
//! request's field decision.

use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde_json::{json, Value};

use storefront_core::{
    EntitySchema, FieldComputers, FieldDef, FieldPath, MetaSelection, VariantFieldSpec,
};

use crate::product::{Product, ProductKind};
use crate::store::MemoryCatalog;

/// The ordered full field surface of the `product` entity kind.
///
/// Declaration order here is response key order; tests assert on it.
pub fn product_schema() -> &'static EntitySchema {
    static SCHEMA: OnceLock<EntitySchema> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        EntitySchema::new(
            "product",
            vec![
                FieldDef::mandatory("id"),
                FieldDef::scalar("parent_id"),
                FieldDef::scalar("name"),
                FieldDef::scalar("slug"),
                FieldDef::scalar("permalink"),
                FieldDef::scalar("type"),
                FieldDef::scalar("description"),
                FieldDef::scalar("short_description"),
                FieldDef::scalar("sku"),
                FieldDef::composite(
                    "prices",
                    &[
                        "currency_code",
                        "price",
                        "regular_price",
                        "sale_price",
                        "price_range",
                    ],
                ),
                FieldDef::scalar("on_sale"),
                FieldDef::composite(
                    "stock",
                    &["is_in_stock", "stock_quantity", "stock_status", "backorders"],
                ),
                FieldDef::composite("add_to_cart", &["text", "minimum", "maximum", "has_options"]),
                FieldDef::scalar("images"),
                FieldDef::scalar("categories"),
                FieldDef::scalar("tags"),
                FieldDef::scalar("attributes"),
                FieldDef::scalar("variations"),
                FieldDef::scalar("average_rating"),
                FieldDef::scalar("review_count"),
                FieldDef::scalar("featured"),
                FieldDef::scalar("meta_data"),
                FieldDef::scalar("date_created"),
                FieldDef::scalar("date_modified"),
            ],
        )
    })
}

/// The fixed subtraction deriving a variation's response shape from the
/// product projection: fields that make no sense on a child row.
pub fn variation_spec() -> &'static VariantFieldSpec {
    static SPEC: OnceLock<VariantFieldSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        VariantFieldSpec::new(
            &[
                "type",
                "short_description",
                "variations",
                "average_rating",
                "review_count",
                "featured",
            ],
            &[("add_to_cart", "has_options"), ("prices", "price_range")],
        )
    })
}

/// Wires one product's compute thunks, one per schema path.
///
/// Thunks borrow the product and catalog; nothing is computed here. The
/// `variations` and `prices.price_range` thunks walk the catalog's variation
/// rows and only pay that cost when those fields are included.
#[must_use]
pub fn product_computers<'a>(
    product: &'a Product,
    catalog: &'a MemoryCatalog,
    meta: &'a MetaSelection,
) -> FieldComputers<'a> {
    let mut c = FieldComputers::new();

    c.insert(FieldPath::top("id"), move || Ok(json!(product.id)));
    c.insert(FieldPath::top("parent_id"), move || {
        Ok(json!(product.parent_id))
    });
    c.insert(FieldPath::top("name"), move || Ok(json!(product.name)));
    c.insert(FieldPath::top("slug"), move || Ok(json!(product.slug)));
    c.insert(FieldPath::top("permalink"), move || {
        Ok(json!(product.resolved_permalink()))
    });
    c.insert(FieldPath::top("type"), move || {
        Ok(json!(product.kind.to_string()))
    });
    c.insert(FieldPath::top("description"), move || {
        Ok(json!(product.description))
    });
    c.insert(FieldPath::top("short_description"), move || {
        Ok(json!(product.short_description))
    });
    c.insert(FieldPath::top("sku"), move || Ok(json!(product.sku)));

    let prices = FieldPath::top("prices");
    c.insert(prices.join("currency_code"), move || {
        Ok(json!(product.prices.currency_code))
    });
    c.insert(prices.join("price"), move || {
        Ok(money(product.prices.effective_price()))
    });
    c.insert(prices.join("regular_price"), move || {
        Ok(money(product.prices.regular_price))
    });
    c.insert(prices.join("sale_price"), move || {
        Ok(product.prices.sale_price.map_or(Value::Null, money))
    });
    c.insert(prices.join("price_range"), move || {
        Ok(price_range(product, catalog))
    });

    c.insert(FieldPath::top("on_sale"), move || {
        Ok(json!(product.prices.on_sale()))
    });

    let stock = FieldPath::top("stock");
    c.insert(stock.join("is_in_stock"), move || {
        Ok(json!(product.stock.is_in_stock()))
    });
    c.insert(stock.join("stock_quantity"), move || {
        Ok(json!(product.stock.stock_quantity))
    });
    c.insert(stock.join("stock_status"), move || {
        Ok(json!(product.stock.stock_status.as_str()))
    });
    c.insert(stock.join("backorders"), move || {
        Ok(json!(product.stock.backorders.as_str()))
    });

    let add_to_cart = FieldPath::top("add_to_cart");
    c.insert(add_to_cart.join("text"), move || {
        Ok(json!(add_to_cart_text(product)))
    });
    c.insert(add_to_cart.join("minimum"), move || Ok(json!(1)));
    c.insert(add_to_cart.join("maximum"), move || {
        Ok(json!(product.stock.stock_quantity))
    });
    c.insert(add_to_cart.join("has_options"), move || {
        Ok(json!(product.kind == ProductKind::Variable))
    });

    c.insert(FieldPath::top("images"), move || {
        serde_json::to_value(&product.images).map_err(Into::into)
    });
    c.insert(FieldPath::top("categories"), move || {
        serde_json::to_value(&product.categories).map_err(Into::into)
    });
    c.insert(FieldPath::top("tags"), move || {
        serde_json::to_value(&product.tags).map_err(Into::into)
    });
    c.insert(FieldPath::top("attributes"), move || {
        serde_json::to_value(&product.attributes).map_err(Into::into)
    });

    c.insert(FieldPath::top("variations"), move || {
        let ids: Vec<u64> = catalog
            .variations_of(product.id)
            .iter()
            .map(|v| v.id)
            .collect();
        Ok(json!(ids))
    });

    c.insert(FieldPath::top("average_rating"), move || {
        Ok(json!(product.average_rating.to_string()))
    });
    c.insert(FieldPath::top("review_count"), move || {
        Ok(json!(product.review_count))
    });
    c.insert(FieldPath::top("featured"), move || {
        Ok(json!(product.featured))
    });

    c.insert(FieldPath::top("meta_data"), move || {
        let entries: Vec<Value> = product
            .meta_data
            .iter()
            .filter(|entry| meta.admits(&entry.key))
            .map(|entry| json!({"key": entry.key, "value": entry.value}))
            .collect();
        Ok(Value::Array(entries))
    });

    c.insert(FieldPath::top("date_created"), move || {
        serde_json::to_value(product.date_created).map_err(Into::into)
    });
    c.insert(FieldPath::top("date_modified"), move || {
        serde_json::to_value(product.date_modified).map_err(Into::into)
    });

    c
}

fn money(amount: Decimal) -> Value {
    Value::String(amount.to_string())
}

fn add_to_cart_text(product: &Product) -> &'static str {
    if product.kind == ProductKind::Variable {
        "Select options"
    } else if product.stock.is_in_stock() {
        "Add to cart"
    } else {
        "Read more"
    }
}

/// Min/max effective price across a variable product's variations; `null`
/// for anything else. This walks the whole catalog, which is exactly why it
/// sits behind a lazy thunk.
fn price_range(product: &Product, catalog: &MemoryCatalog) -> Value {
    if product.kind != ProductKind::Variable {
        return Value::Null;
    }
    let prices: Vec<Decimal> = catalog
        .variations_of(product.id)
        .iter()
        .map(|v| v.prices.effective_price())
        .collect();
    match (prices.iter().min(), prices.iter().max()) {
        (Some(min), Some(max)) => json!({
            "min_price": min.to_string(),
            "max_price": max.to_string(),
        }),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use storefront_core::{project, FieldDecision, FieldSelection, ProfileDefaults};

    use super::*;
    use crate::store::MemoryCatalog;

    fn catalog() -> MemoryCatalog {
        let seed = r#"{
          "products": [
            {
              "id": 1, "name": "Blood Orange Soda", "slug": "blood-orange-soda",
              "type": "simple", "sku": "SODA-BO",
              "prices": {"currency_code": "USD", "regular_price": "12.99", "sale_price": "9.99"},
              "stock": {"stock_quantity": 10, "stock_status": "instock"},
              "meta_data": [
                {"key": "color", "value": "orange"},
                {"key": "_internal_rank", "value": 3}
              ],
              "date_created": "2026-01-01T00:00:00Z", "date_modified": "2026-01-02T00:00:00Z"
            },
            {
              "id": 2, "name": "Sampler Pack", "slug": "sampler-pack",
              "type": "variable", "sku": "SAMPLER",
              "prices": {"currency_code": "USD", "regular_price": "29.99", "sale_price": null},
              "stock": {"stock_quantity": null, "stock_status": "instock"},
              "date_created": "2026-01-01T00:00:00Z", "date_modified": "2026-01-01T00:00:00Z"
            },
            {
              "id": 3, "name": "Sampler Pack - 6 cans", "slug": "sampler-pack-6",
              "type": "variation", "parent_id": 2, "sku": "SAMPLER-6",
              "prices": {"currency_code": "USD", "regular_price": "29.99", "sale_price": null},
              "stock": {"stock_quantity": 4, "stock_status": "instock"},
              "date_created": "2026-01-01T00:00:00Z", "date_modified": "2026-01-01T00:00:00Z"
            },
            {
              "id": 4, "name": "Sampler Pack - 12 cans", "slug": "sampler-pack-12",
              "type": "variation", "parent_id": 2, "sku": "SAMPLER-12",
              "prices": {"currency_code": "USD", "regular_price": "54.99", "sale_price": "49.99"},
              "stock": {"stock_quantity": 2, "stock_status": "instock"},
              "date_created": "2026-01-01T00:00:00Z", "date_modified": "2026-01-01T00:00:00Z"
            }
          ]
        }"#;
        MemoryCatalog::from_json_str(seed).expect("seed catalog")
    }

    fn full_decision() -> FieldDecision {
        FieldDecision::resolve(&FieldSelection::all(), &ProfileDefaults::default())
    }

    #[test]
    fn every_schema_field_is_wired() {
        let catalog = catalog();
        let product = catalog.get(1).expect("product 1");
        let meta = MetaSelection::default();
        let computers = product_computers(product, &catalog, &meta);

        let projected =
            project(product_schema(), &full_decision(), &computers).expect("full projection");

        let expected: Vec<&str> = product_schema()
            .fields()
            .iter()
            .map(storefront_core::FieldDef::name)
            .collect();
        let actual: Vec<&str> = projected.keys().map(String::as_str).collect();
        assert_eq!(actual, expected, "response keys follow schema order");
    }

    #[test]
    fn money_fields_serialize_as_strings() {
        let catalog = catalog();
        let product = catalog.get(1).expect("product 1");
        let meta = MetaSelection::default();
        let computers = product_computers(product, &catalog, &meta);
        let projected =
            project(product_schema(), &full_decision(), &computers).expect("projection");

        let prices = projected.get("prices").expect("prices");
        assert_eq!(prices["price"], json!("9.99"));
        assert_eq!(prices["regular_price"], json!("12.99"));
        assert_eq!(prices["sale_price"], json!("9.99"));
        assert_eq!(projected.get("on_sale"), Some(&json!(true)));
    }

    #[test]
    fn price_range_spans_variations_of_a_variable_product() {
        let catalog = catalog();
        let product = catalog.get(2).expect("product 2");
        let meta = MetaSelection::default();
        let computers = product_computers(product, &catalog, &meta);
        let projected =
            project(product_schema(), &full_decision(), &computers).expect("projection");

        let prices = projected.get("prices").expect("prices");
        assert_eq!(
            prices["price_range"],
            json!({"min_price": "29.99", "max_price": "49.99"})
        );
        assert_eq!(projected.get("variations"), Some(&json!([3, 4])));
        let cart = projected.get("add_to_cart").expect("add_to_cart");
        assert_eq!(cart["text"], json!("Select options"));
        assert_eq!(cart["has_options"], json!(true));
    }

    #[test]
    fn price_range_is_null_for_simple_products() {
        let catalog = catalog();
        let product = catalog.get(1).expect("product 1");
        let meta = MetaSelection::default();
        let computers = product_computers(product, &catalog, &meta);
        let projected =
            project(product_schema(), &full_decision(), &computers).expect("projection");
        assert_eq!(projected.get("prices").expect("prices")["price_range"], Value::Null);
    }

    #[test]
    fn meta_selection_filters_meta_entries() {
        let catalog = catalog();
        let product = catalog.get(1).expect("product 1");
        let meta = MetaSelection::new(
            std::collections::BTreeSet::new(),
            ["_internal_rank".to_string()].into_iter().collect(),
        );
        let computers = product_computers(product, &catalog, &meta);
        let projected =
            project(product_schema(), &full_decision(), &computers).expect("projection");

        assert_eq!(
            projected.get("meta_data"),
            Some(&json!([{"key": "color", "value": "orange"}]))
        );
    }

    #[test]
    fn variation_projection_drops_the_configured_fields() {
        let catalog = catalog();
        let variation = catalog.get(4).expect("variation 4");
        let meta = MetaSelection::default();
        let computers = product_computers(variation, &catalog, &meta);
        let projected =
            project(product_schema(), &full_decision(), &computers).expect("projection");
        let specialized = storefront_core::specialize(&projected, variation_spec());

        for dropped in [
            "type",
            "short_description",
            "variations",
            "average_rating",
            "review_count",
            "featured",
        ] {
            assert!(!specialized.contains_key(dropped), "{dropped} should be dropped");
        }
        let cart = specialized.get("add_to_cart").expect("add_to_cart");
        assert!(cart.get("has_options").is_none());
        let prices = specialized.get("prices").expect("prices");
        assert!(prices.get("price_range").is_none());
        assert_eq!(specialized.get("parent_id"), Some(&json!(2)));
    }
}
