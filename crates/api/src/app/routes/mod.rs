use axum::{routing::get, Router};

use crate::app::errors::method_not_allowed;

pub mod invoice;
pub mod products;
pub mod system;

/// Router for everything under `/api`.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router())
        .route(
            "/invoice",
            get(invoice::list_invoice_products)
                .post(invoice::receive_invoice)
                .fallback(method_not_allowed),
        )
}
