//! Spendon is a backend for tracking personal spending.
//!
//! This library provides a JSON REST API for recording transactions, searching
//! them with user supplied filters and summarising them per category. Requests
//! are authenticated with signed, expiring session tokens.

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod category;
pub mod config;
mod database_id;
mod db;
mod endpoints;
mod error;
mod filter;
mod logging;
mod pagination;
mod routing;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    AuthManager, Claims, Credentials, LogInResponse, PasswordHash, SessionToken, TOKEN_DURATION,
    USER_LOOKUP_TIMEOUT, ValidatedPassword, hash_password,
};
pub use category::{Category, create_category, get_categories};
pub use database_id::{DatabaseID, TransactionId};
pub use db::initialize as initialize_db;
pub use error::{AuthFailure, Error};
pub use filter::{
    CompiledFilter, FilterBatch, FilterCriterion, FilterError, FilterField, FilterModel,
    FilterOperator, FilterSettings, compile_filters, filter_settings,
};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::{FilteredRequest, PaginationConfig};
pub use routing::build_router;
pub use transaction::{
    CategorySummary, Transaction, TransactionData, TransactionPage, count_transactions,
    create_transaction, delete_transaction, get_transaction, get_transaction_page,
    sum_by_category, update_transaction,
};
pub use user::{SQLiteUserStore, User, UserID, UserStore, create_user};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
