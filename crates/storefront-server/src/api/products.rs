//! Product endpoints: paginated collection, item by id or SKU, and the
//! specialized variation listing. Query parameters are translated into a
//! `FieldSelection` here; projection itself is `storefront-core`'s job.

use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;

use storefront_catalog::{
    product_computers, product_schema, variation_spec, MemoryCatalog, OrderBy, PageRequest,
    Product, ProductFilters, ProductKind, SortOrder,
};
use storefront_core::{
    parse_path_list, project, specialize, FieldDecision, FieldPath, FieldSelection, MetaSelection,
    ProjectedEntity, ResponseProfile,
};

use crate::middleware::RequestId;

use super::{normalize_page, normalize_per_page, ApiError, AppState};

const TOTAL_HEADER: HeaderName = HeaderName::from_static("x-wp-total");
const TOTAL_PAGES_HEADER: HeaderName = HeaderName::from_static("x-wp-totalpages");

#[derive(Debug, Deserialize)]
pub(super) struct ProductQuery {
    pub page: Option<usize>,
    pub per_page: Option<usize>,
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub on_sale: Option<bool>,
    pub orderby: Option<String>,
    pub order: Option<String>,
    pub fields: Option<String>,
    pub exclude_fields: Option<String>,
    pub response: Option<String>,
    pub include_meta: Option<String>,
    pub exclude_meta: Option<String>,
}

/// Translates the projection query parameters into the request's selection
/// values. Never fails: malformed path tokens and unknown profiles are
/// logged and recovered locally.
fn parse_selection(query: &ProductQuery) -> (FieldSelection, MetaSelection) {
    let requested = parse_paths_param(query.fields.as_deref(), "fields");
    let excluded = parse_paths_param(query.exclude_fields.as_deref(), "exclude_fields");

    let profile = match query.response.as_deref() {
        None => ResponseProfile::default(),
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(response = raw, "unknown response profile, using default");
            ResponseProfile::default()
        }),
    };

    let selection = FieldSelection::new(requested, excluded, profile);
    let meta = MetaSelection::new(
        parse_keys_param(query.include_meta.as_deref()),
        parse_keys_param(query.exclude_meta.as_deref()),
    );
    (selection, meta)
}

fn parse_paths_param(raw: Option<&str>, param: &str) -> BTreeSet<FieldPath> {
    let parsed = parse_path_list(raw.unwrap_or(""));
    for token in &parsed.rejected {
        tracing::warn!(param, token = %token, "dropping malformed field path");
    }
    parsed.paths
}

fn parse_keys_param(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn build_filters(query: &ProductQuery, request_id: &str) -> Result<ProductFilters, ApiError> {
    let orderby = match query.orderby.as_deref() {
        None => OrderBy::default(),
        Some(raw) => raw.parse().map_err(|reason: String| {
            ApiError::new(request_id, "validation_error", reason)
        })?,
    };
    let order = match query.order.as_deref() {
        None => SortOrder::default(),
        Some(raw) => raw.parse().map_err(|reason: String| {
            ApiError::new(request_id, "validation_error", reason)
        })?,
    };
    let kind = match query.kind.as_deref() {
        None => None,
        Some(raw) => Some(raw.parse::<ProductKind>().map_err(|reason| {
            ApiError::new(request_id, "validation_error", reason)
        })?),
    };

    Ok(ProductFilters {
        search: query.search.clone(),
        category: query.category.clone(),
        kind,
        on_sale: query.on_sale,
        orderby,
        order,
    })
}

/// Projects one product with the request's decision; the caller chooses the
/// failure policy (abort for items, skip for collections).
fn project_product(
    product: &Product,
    catalog: &MemoryCatalog,
    decision: &FieldDecision,
    meta: &MetaSelection,
) -> Result<ProjectedEntity, storefront_core::ProjectError> {
    let computers = product_computers(product, catalog, meta);
    project(product_schema(), decision, &computers)
}

fn paginated(items: Vec<ProjectedEntity>, total: usize, total_pages: usize) -> Response {
    let mut response = Json(items).into_response();
    let headers = response.headers_mut();
    headers.insert(TOTAL_HEADER, HeaderValue::from(total));
    headers.insert(TOTAL_PAGES_HEADER, HeaderValue::from(total_pages));
    response
}

pub(super) async fn list_products(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ProductQuery>,
) -> Result<Response, ApiError> {
    let filters = build_filters(&query, &req_id.0)?;
    let page = state.catalog.list(
        &filters,
        PageRequest {
            page: normalize_page(query.page),
            per_page: normalize_per_page(query.per_page),
        },
    );

    let (selection, meta) = parse_selection(&query);
    let decision = FieldDecision::resolve(&selection, &state.profiles);

    // One failing product never takes down the page: skip it and keep going.
    let mut items = Vec::with_capacity(page.items.len());
    for product in page.items {
        match project_product(product, &state.catalog, &decision, &meta) {
            Ok(projected) => items.push(projected),
            Err(e) => {
                tracing::warn!(product_id = product.id, error = %e, "skipping product that failed projection");
            }
        }
    }

    Ok(paginated(items, page.total, page.total_pages))
}

pub(super) async fn get_product(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<u64>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProjectedEntity>, ApiError> {
    let product = state
        .catalog
        .get(id)
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "product not found"))?;

    project_item(&state, product, &query, &req_id.0)
}

pub(super) async fn get_product_by_sku(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(sku): Path<String>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<ProjectedEntity>, ApiError> {
    let product = state
        .catalog
        .get_by_sku(&sku)
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "product not found"))?;

    project_item(&state, product, &query, &req_id.0)
}

fn project_item(
    state: &AppState,
    product: &Product,
    query: &ProductQuery,
    request_id: &str,
) -> Result<Json<ProjectedEntity>, ApiError> {
    let (selection, meta) = parse_selection(query);
    let decision = FieldDecision::resolve(&selection, &state.profiles);

    // Item requests have no skip policy: a failed field is a failed request.
    project_product(product, &state.catalog, &decision, &meta)
        .map(Json)
        .map_err(|e| {
            tracing::error!(product_id = product.id, error = %e, "projection failed");
            ApiError::new(request_id, "internal_error", "failed to assemble product")
        })
}

pub(super) async fn list_variations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<u64>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<ProjectedEntity>>, ApiError> {
    let parent = state
        .catalog
        .get(id)
        .ok_or_else(|| ApiError::new(req_id.0.clone(), "not_found", "product not found"))?;

    let (selection, meta) = parse_selection(&query);
    let decision = FieldDecision::resolve(&selection, &state.profiles);

    let mut items = Vec::new();
    for variation in state.catalog.variations_of(parent.id) {
        match project_product(variation, &state.catalog, &decision, &meta) {
            Ok(projected) => items.push(specialize(&projected, variation_spec())),
            Err(e) => {
                tracing::warn!(variation_id = variation.id, error = %e, "skipping variation that failed projection");
            }
        }
    }

    Ok(Json(items))
}
