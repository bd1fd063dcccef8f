use axum::{extract::State, Json};

use storefront_catalog::TermCount;

use super::AppState;

/// Category listing, served from the TTL-cached taxonomy aggregation rather
/// than a fresh catalog walk per request.
pub(super) async fn list_categories(State(state): State<AppState>) -> Json<Vec<TermCount>> {
    Json(state.taxonomy.categories())
}
