use axum::routing::get;
use axum::Router;

use crate::handlers::product;
use crate::state::AppState;

/// Public catalogue routes mounted at `/products`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(product::list_products))
        .route("/{id}", get(product::get_product))
}
