//! In-memory catalog store: seed-file loading, validation, lookup, and
//! filtered listing. Stands in for the external object store; nothing here is
//! a persistence design.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::product::{Product, ProductKind};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog file")]
    Parse(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Validation(String),
}

/// On-disk shape of the catalog seed: `{ "products": [ ... ] }`.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<Product>,
}

/// Listing sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    #[default]
    Id,
    Name,
    Date,
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "id" => Ok(OrderBy::Id),
            "name" => Ok(OrderBy::Name),
            "date" => Ok(OrderBy::Date),
            other => Err(format!("unknown orderby: {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown order: {other:?}")),
        }
    }
}

/// Collection-listing filters. All optional; an empty filter lists the whole
/// catalog (minus variation rows, which only appear under their parent).
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    /// Case-insensitive substring match against name and SKU.
    pub search: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    pub kind: Option<ProductKind>,
    pub on_sale: Option<bool>,
    pub orderby: OrderBy,
    pub order: SortOrder,
}

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
}

/// One page of results plus the totals the pagination headers need.
#[derive(Debug)]
pub struct Page<'a> {
    pub items: Vec<&'a Product>,
    pub total: usize,
    pub total_pages: usize,
}

/// The whole catalog held in memory, indexed by id and SKU.
#[derive(Debug)]
pub struct MemoryCatalog {
    products: Vec<Product>,
    by_id: HashMap<u64, usize>,
    by_sku: HashMap<String, usize>,
}

impl MemoryCatalog {
    /// Builds a catalog from already-deserialized products, validating
    /// referential integrity.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Validation`] on duplicate ids, duplicate
    /// SKUs, empty names, or variation rows without an existing `variable`
    /// parent.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        validate(&products)?;

        let mut by_id = HashMap::new();
        let mut by_sku = HashMap::new();
        for (index, product) in products.iter().enumerate() {
            by_id.insert(product.id, index);
            if let Some(sku) = &product.sku {
                by_sku.insert(sku.clone(), index);
            }
        }

        Ok(Self {
            products,
            by_id,
            by_sku,
        })
    }

    /// Parses a catalog from seed-file JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] on malformed JSON and
    /// [`CatalogError::Validation`] on integrity failures.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.products)
    }

    /// Loads and parses a catalog seed file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Io`] when the file cannot be read, plus the
    /// parse/validation errors of [`MemoryCatalog::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json_str(&content)
    }

    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Product> {
        self.by_id.get(&id).map(|&index| &self.products[index])
    }

    #[must_use]
    pub fn get_by_sku(&self, sku: &str) -> Option<&Product> {
        self.by_sku.get(sku).map(|&index| &self.products[index])
    }

    /// Variation rows of a variable product, in id order.
    #[must_use]
    pub fn variations_of(&self, parent_id: u64) -> Vec<&Product> {
        let mut variations: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| p.is_variation() && p.parent_id == Some(parent_id))
            .collect();
        variations.sort_by_key(|p| p.id);
        variations
    }

    /// Number of products, variation rows included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// All non-variation products, unordered. Taxonomy aggregation iterates
    /// this rather than `list` to avoid paying for sorting.
    pub(crate) fn listed_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| !p.is_variation())
    }

    /// Filtered, ordered, paginated listing of non-variation products.
    #[must_use]
    pub fn list(&self, filters: &ProductFilters, page: PageRequest) -> Page<'_> {
        let mut matched: Vec<&Product> = self
            .listed_products()
            .filter(|p| matches_filters(p, filters))
            .collect();

        match filters.orderby {
            OrderBy::Id => matched.sort_by_key(|p| p.id),
            OrderBy::Name => matched.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id))),
            OrderBy::Date => {
                matched.sort_by(|a, b| a.date_created.cmp(&b.date_created).then(a.id.cmp(&b.id)));
            }
        }
        if filters.order == SortOrder::Desc {
            matched.reverse();
        }

        let total = matched.len();
        let per_page = page.per_page.max(1);
        let total_pages = total.div_ceil(per_page);
        let start = page.page.saturating_sub(1).saturating_mul(per_page);
        let items = if start >= total {
            Vec::new()
        } else {
            matched[start..(start + per_page).min(total)].to_vec()
        };

        Page {
            items,
            total,
            total_pages,
        }
    }
}

fn matches_filters(product: &Product, filters: &ProductFilters) -> bool {
    if let Some(search) = &filters.search {
        let needle = search.to_lowercase();
        let in_name = product.name.to_lowercase().contains(&needle);
        let in_sku = product
            .sku
            .as_ref()
            .is_some_and(|sku| sku.to_lowercase().contains(&needle));
        if !in_name && !in_sku {
            return false;
        }
    }
    if let Some(category) = &filters.category {
        if !product.categories.iter().any(|c| &c.slug == category) {
            return false;
        }
    }
    if let Some(kind) = filters.kind {
        if product.kind != kind {
            return false;
        }
    }
    if let Some(on_sale) = filters.on_sale {
        if product.prices.on_sale() != on_sale {
            return false;
        }
    }
    true
}

fn validate(products: &[Product]) -> Result<(), CatalogError> {
    let mut seen_ids = HashSet::new();
    let mut seen_skus = HashSet::new();
    let ids: HashSet<u64> = products.iter().map(|p| p.id).collect();

    for product in products {
        if product.name.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "product {} has an empty name",
                product.id
            )));
        }
        if product.slug.trim().is_empty() {
            return Err(CatalogError::Validation(format!(
                "product {} has an empty slug",
                product.id
            )));
        }
        if !seen_ids.insert(product.id) {
            return Err(CatalogError::Validation(format!(
                "duplicate product id: {}",
                product.id
            )));
        }
        if let Some(sku) = &product.sku {
            if sku.trim().is_empty() {
                return Err(CatalogError::Validation(format!(
                    "product {} has an empty sku",
                    product.id
                )));
            }
            if !seen_skus.insert(sku.clone()) {
                return Err(CatalogError::Validation(format!(
                    "duplicate sku: {sku:?}"
                )));
            }
        }
        match (product.kind, product.parent_id) {
            (ProductKind::Variation, None) => {
                return Err(CatalogError::Validation(format!(
                    "variation {} has no parent_id",
                    product.id
                )));
            }
            (ProductKind::Variation, Some(parent_id)) => {
                if !ids.contains(&parent_id) {
                    return Err(CatalogError::Validation(format!(
                        "variation {} references missing parent {parent_id}",
                        product.id
                    )));
                }
            }
            (_, Some(parent_id)) => {
                return Err(CatalogError::Validation(format!(
                    "non-variation product {} must not set parent_id (got {parent_id})",
                    product.id
                )));
            }
            (_, None) => {}
        }
    }

    // A variation's parent must itself be variable.
    for product in products {
        if let (ProductKind::Variation, Some(parent_id)) = (product.kind, product.parent_id) {
            let parent_kind = products
                .iter()
                .find(|p| p.id == parent_id)
                .map(|p| p.kind);
            if parent_kind != Some(ProductKind::Variable) {
                return Err(CatalogError::Validation(format!(
                    "variation {} has non-variable parent {parent_id}",
                    product.id
                )));
            }
        }
    }

    Ok(())
}
