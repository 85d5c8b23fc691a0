//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::{auth_guard, post_log_in},
    category::get_categories_endpoint,
    endpoints,
    filter::get_filter_settings_endpoint,
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, edit_transaction_endpoint,
        search_transactions_endpoint, summarise_transactions_endpoint,
    },
};

/// Return a router with all the app's routes.
///
/// Every route except the root, log-in and the lookup routes requires a valid
/// bearer token.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::ROOT, get(get_status))
        .route(endpoints::LOG_IN, post(post_log_in))
        .route(endpoints::CATEGORIES, get(get_categories_endpoint))
        .route(endpoints::FILTERS, get(get_filter_settings_endpoint));

    let protected_routes = Router::new()
        .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
        .route(
            endpoints::TRANSACTION,
            put(edit_transaction_endpoint).delete(delete_transaction_endpoint),
        )
        .route(endpoints::SEARCH, post(search_transactions_endpoint))
        .route(endpoints::SUMMARY, post(summarise_transactions_endpoint))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    protected_routes
        .merge(unprotected_routes)
        .with_state(state)
}

/// The root path '/' reports that the server is up.
async fn get_status() -> Json<Value> {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
