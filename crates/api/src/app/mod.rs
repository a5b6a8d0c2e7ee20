//! HTTP application wiring (Axum router + store wiring).
//!
//! - `store.rs`: in-memory product + invoice storage
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod store;

use store::ProductStore;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(store: Arc<ProductStore>, auth_token: Option<String>) -> Router {
    let auth_state = middleware::AuthState {
        token: auth_token.map(Arc::from),
    };

    // `/api/*` is guarded when a token is configured; `/health` never is.
    let api = routes::router()
        .layer(Extension(store))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route(
            "/health",
            get(routes::system::health).fallback(errors::method_not_allowed),
        )
        .nest("/api", api)
        .layer(ServiceBuilder::new())
}
