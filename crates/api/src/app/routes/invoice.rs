use std::sync::Arc;

use axum::{extract::Extension, Json};
use serde_json::{json, Value};

use invoicepad_invoicing::LineItem;

use crate::app::store::ProductStore;

/// Products offered for invoicing.
pub async fn list_invoice_products(
    Extension(store): Extension<Arc<ProductStore>>,
) -> Json<Vec<LineItem>> {
    Json(store.list())
}

/// Accept an invoice payload (header and/or line items) and acknowledge it.
///
/// No document is rendered, so `downloadUrl` is always null.
pub async fn receive_invoice(
    Extension(store): Extension<Arc<ProductStore>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    tracing::info!(invoice = %body, "Received invoice data");
    store.record_invoice(body);
    Json(json!({ "message": "Invoice received", "downloadUrl": null }))
}
