use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Catalog entity kind. `Variation` rows are child entities of a `Variable`
/// parent and are excluded from top-level listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Simple,
    Variable,
    Variation,
}

impl std::fmt::Display for ProductKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductKind::Simple => write!(f, "simple"),
            ProductKind::Variable => write!(f, "variable"),
            ProductKind::Variation => write!(f, "variation"),
        }
    }
}

impl std::str::FromStr for ProductKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "simple" => Ok(ProductKind::Simple),
            "variable" => Ok(ProductKind::Variable),
            "variation" => Ok(ProductKind::Variation),
            other => Err(format!("unknown product type: {other:?}")),
        }
    }
}

/// Stock availability state, in catalog wire vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    #[serde(rename = "instock")]
    InStock,
    #[serde(rename = "outofstock")]
    OutOfStock,
    #[serde(rename = "onbackorder")]
    OnBackorder,
}

impl StockStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StockStatus::InStock => "instock",
            StockStatus::OutOfStock => "outofstock",
            StockStatus::OnBackorder => "onbackorder",
        }
    }
}

/// Whether out-of-stock purchases queue as backorders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backorders {
    #[default]
    No,
    Notify,
    Yes,
}

impl Backorders {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Backorders::No => "no",
            Backorders::Notify => "notify",
            Backorders::Yes => "yes",
        }
    }
}

/// Monetary surface of a product. Money is decimal, serialized as strings to
/// avoid float drift on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPrices {
    /// ISO 4217 currency code (e.g., `"USD"`).
    pub currency_code: String,
    pub regular_price: Decimal,
    /// Discounted price, if a sale is active.
    pub sale_price: Option<Decimal>,
}

impl ProductPrices {
    /// The price a buyer currently pays.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match self.sale_price {
            Some(sale) if sale < self.regular_price => sale,
            _ => self.regular_price,
        }
    }

    /// A sale counts only when it actually undercuts the regular price.
    #[must_use]
    pub fn on_sale(&self) -> bool {
        matches!(self.sale_price, Some(sale) if sale < self.regular_price)
    }
}

/// Stock surface of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductStock {
    /// `None` when inventory is not tracked for this product.
    pub stock_quantity: Option<i64>,
    pub stock_status: StockStatus,
    #[serde(default)]
    pub backorders: Backorders,
}

impl ProductStock {
    /// Purchasable right now: in stock, or out of stock but backorderable.
    #[must_use]
    pub fn is_in_stock(&self) -> bool {
        match self.stock_status {
            StockStatus::InStock | StockStatus::OnBackorder => true,
            StockStatus::OutOfStock => !matches!(self.backorders, Backorders::No),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: u64,
    pub src: String,
    /// Scaled-down rendition; falls back to `src` upstream when absent.
    pub thumbnail: Option<String>,
    pub alt: Option<String>,
}

/// A taxonomy term attached to a product (category or tag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermRef {
    pub id: u64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    pub terms: Vec<String>,
}

/// One entry of a product's free-form metadata list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaEntry {
    pub key: String,
    pub value: Value,
}

/// A catalog product as loaded from the seed file.
///
/// This is the source-entity surface the projector reads through its thunks;
/// response shape is decided by the schema in `fields.rs`, not by this
/// struct's layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub slug: String,
    /// Canonical storefront URL; derived from `slug` when absent.
    pub permalink: Option<String>,
    #[serde(rename = "type")]
    pub kind: ProductKind,
    /// Parent product id; set on `variation` rows only.
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    pub sku: Option<String>,
    pub prices: ProductPrices,
    pub stock: ProductStock,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub categories: Vec<TermRef>,
    #[serde(default)]
    pub tags: Vec<TermRef>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub average_rating: Decimal,
    #[serde(default)]
    pub review_count: u64,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub meta_data: Vec<MetaEntry>,
    pub date_created: DateTime<Utc>,
    pub date_modified: DateTime<Utc>,
}

impl Product {
    /// Canonical product URL: explicit permalink, else derived from the slug.
    #[must_use]
    pub fn resolved_permalink(&self) -> String {
        self.permalink
            .clone()
            .unwrap_or_else(|| format!("/product/{}", self.slug))
    }

    #[must_use]
    pub fn is_variation(&self) -> bool {
        self.kind == ProductKind::Variation
    }
}
