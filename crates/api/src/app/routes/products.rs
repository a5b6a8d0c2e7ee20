use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use invoicepad_core::LineItemId;
use invoicepad_invoicing::LineItem;

use crate::app::errors::{self, method_not_allowed};
use crate::app::store::ProductStore;

pub fn router() -> Router {
    Router::new()
        .route(
            "/",
            get(list_products)
                .post(create_product)
                .fallback(method_not_allowed),
        )
        .route(
            "/:id",
            put(update_product)
                .delete(delete_product)
                .fallback(method_not_allowed),
        )
}

pub async fn list_products(Extension(store): Extension<Arc<ProductStore>>) -> Json<Vec<LineItem>> {
    Json(store.list())
}

pub async fn create_product(
    Extension(store): Extension<Arc<ProductStore>>,
    Json(body): Json<LineItem>,
) -> axum::response::Response {
    match store.create(body) {
        Ok(item) => {
            tracing::info!("Product {} created", item.id);
            (StatusCode::CREATED, Json(item)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_product(
    Extension(store): Extension<Arc<ProductStore>>,
    Path(id): Path<String>,
    Json(body): Json<LineItem>,
) -> axum::response::Response {
    let id: LineItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match store.update(&id, body) {
        Ok(item) => {
            tracing::info!("Product {} updated", item.id);
            (StatusCode::OK, Json(item)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(store): Extension<Arc<ProductStore>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: LineItemId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"),
    };

    match store.delete(&id) {
        Ok(item) => {
            tracing::info!("Product {} deleted", item.id);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
