//! Catalog domain: product/variation types, the in-memory store standing in
//! for the external object store, TTL-cached taxonomy lookups, and the
//! per-field compute-thunk wiring that feeds `storefront-core`'s projector.

mod app_config;
mod cache;
mod config;
mod fields;
mod product;
mod store;
mod taxonomy;

pub use app_config::{AppConfig, ConfigError, Environment};
pub use cache::TtlCache;
pub use config::{load_app_config, load_app_config_from_env};
pub use fields::{product_computers, product_schema, variation_spec};
pub use product::{
    Backorders, MetaEntry, Product, ProductAttribute, ProductImage, ProductKind, ProductPrices,
    ProductStock, StockStatus, TermRef,
};
pub use store::{
    CatalogError, MemoryCatalog, OrderBy, Page, PageRequest, ProductFilters, SortOrder,
};
pub use taxonomy::{CachedTaxonomy, TermCount};
