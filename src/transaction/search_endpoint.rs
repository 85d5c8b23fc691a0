//! Defines the endpoints for searching and summarising a user's transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    filter::{FilterModel, compile_filters},
    pagination::{FilteredRequest, PaginationConfig, page_count},
    transaction::{
        Transaction,
        query::{CategorySummary, count_transactions, get_transaction_page, sum_by_category},
    },
    user::User,
};

/// The state needed for searching transactions.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for SearchState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPage {
    pub transactions: Vec<Transaction>,
    /// The number of matching transactions over all pages.
    pub total_count: u64,
    pub page_number: u64,
    pub page_size: u64,
    pub page_count: u64,
}

/// The body of a summary request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub filters: Vec<FilterModel>,
}

/// A route handler that returns one page of the user's transactions matching the filters.
///
/// An invalid filter rejects the whole request with `400 Bad Request`.
pub async fn search_transactions_endpoint(
    State(state): State<SearchState>,
    Extension(user): Extension<User>,
    Json(request): Json<FilteredRequest>,
) -> Result<Json<TransactionPage>, Error> {
    let filter = compile_filters(&request.filters)?;
    let page = state
        .pagination_config
        .resolve(request.page_number, request.page_size);

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let total_count = count_transactions(&filter, user.id, &connection)?;
    let transactions =
        get_transaction_page(&filter, user.id, page.size, page.offset(), &connection)?;

    Ok(Json(TransactionPage {
        transactions,
        total_count,
        page_number: page.number,
        page_size: page.size,
        page_count: page_count(total_count, page.size),
    }))
}

/// A route handler that sums the user's matching transactions per category.
pub async fn summarise_transactions_endpoint(
    State(state): State<SearchState>,
    Extension(user): Extension<User>,
    Json(request): Json<SummaryRequest>,
) -> Result<Json<Vec<CategorySummary>>, Error> {
    let filter = compile_filters(&request.filters)?;

    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    sum_by_category(&filter, user.id, &connection).map(Json)
}
