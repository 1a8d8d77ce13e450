//! Public catalogue handlers. Hidden products are never returned.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use kiraa_core::types::DbId;

use crate::error::AppResult;
use crate::query::ProductListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/products
pub async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListParams>,
) -> AppResult<impl IntoResponse> {
    let products = state
        .store
        .list_products(&params.filter(), params.pagination())
        .await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/{id}
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let product = state.store.get_product(id).await?;
    Ok(Json(DataResponse { data: product }))
}
