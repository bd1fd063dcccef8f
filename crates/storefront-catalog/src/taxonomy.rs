use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::TtlCache;
use crate::product::TermRef;
use crate::store::MemoryCatalog;

/// A taxonomy term with the number of listed products carrying it.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TermCount {
    pub id: u64,
    pub name: String,
    pub slug: String,
    pub count: u64,
}

/// Category/tag listings aggregated from the catalog and memoized through a
/// [`TtlCache`]. Aggregation walks every listed product, so it is one of the
/// expensive lookups the cache exists for.
#[derive(Debug)]
pub struct CachedTaxonomy {
    catalog: Arc<MemoryCatalog>,
    cache: TtlCache<&'static str, Vec<TermCount>>,
}

impl CachedTaxonomy {
    #[must_use]
    pub fn new(catalog: Arc<MemoryCatalog>, ttl: Duration) -> Self {
        Self {
            catalog,
            cache: TtlCache::new(ttl),
        }
    }

    /// All category terms in use, sorted by name, with product counts.
    #[must_use]
    pub fn categories(&self) -> Vec<TermCount> {
        self.cache
            .get_or_compute("categories", || aggregate(&self.catalog, |p| &p.categories))
    }

    /// All tag terms in use, sorted by name, with product counts.
    #[must_use]
    pub fn tags(&self) -> Vec<TermCount> {
        self.cache
            .get_or_compute("tags", || aggregate(&self.catalog, |p| &p.tags))
    }

    /// Drops both memoized listings; the next read re-aggregates.
    pub fn invalidate(&self) {
        self.cache.clear();
    }
}

fn aggregate<F>(catalog: &MemoryCatalog, terms_of: F) -> Vec<TermCount>
where
    F: Fn(&crate::product::Product) -> &Vec<TermRef>,
{
    let mut counts: HashMap<u64, TermCount> = HashMap::new();
    for product in catalog.listed_products() {
        for term in terms_of(product) {
            counts
                .entry(term.id)
                .or_insert_with(|| TermCount {
                    id: term.id,
                    name: term.name.clone(),
                    slug: term.slug.clone(),
                    count: 0,
                })
                .count += 1;
        }
    }
    let mut terms: Vec<TermCount> = counts.into_values().collect();
    terms.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<MemoryCatalog> {
        let seed = r#"{
          "products": [
            {
              "id": 1, "name": "Blood Orange Soda", "slug": "blood-orange-soda",
              "type": "simple", "sku": "SODA-BO",
              "prices": {"currency_code": "USD", "regular_price": "12.99", "sale_price": null},
              "stock": {"stock_quantity": 10, "stock_status": "instock"},
              "categories": [{"id": 11, "name": "Drinks", "slug": "drinks"}],
              "tags": [{"id": 21, "name": "citrus", "slug": "citrus"}],
              "date_created": "2026-01-01T00:00:00Z", "date_modified": "2026-01-01T00:00:00Z"
            },
            {
              "id": 2, "name": "Grapefruit Soda", "slug": "grapefruit-soda",
              "type": "simple", "sku": "SODA-GF",
              "prices": {"currency_code": "USD", "regular_price": "12.99", "sale_price": null},
              "stock": {"stock_quantity": 3, "stock_status": "instock"},
              "categories": [{"id": 11, "name": "Drinks", "slug": "drinks"}],
              "date_created": "2026-01-01T00:00:00Z", "date_modified": "2026-01-01T00:00:00Z"
            }
          ]
        }"#;
        Arc::new(MemoryCatalog::from_json_str(seed).expect("seed catalog"))
    }

    #[test]
    fn categories_carry_product_counts() {
        let taxonomy = CachedTaxonomy::new(catalog(), Duration::from_secs(60));
        let categories = taxonomy.categories();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].slug, "drinks");
        assert_eq!(categories[0].count, 2);
    }

    #[test]
    fn tags_are_aggregated_separately() {
        let taxonomy = CachedTaxonomy::new(catalog(), Duration::from_secs(60));
        let tags = taxonomy.tags();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].slug, "citrus");
        assert_eq!(tags[0].count, 1);
    }

    #[test]
    fn repeated_reads_hit_the_cache_and_match() {
        let taxonomy = CachedTaxonomy::new(catalog(), Duration::from_secs(60));
        assert_eq!(taxonomy.categories(), taxonomy.categories());
        taxonomy.invalidate();
        assert_eq!(taxonomy.categories().len(), 1);
    }
}
