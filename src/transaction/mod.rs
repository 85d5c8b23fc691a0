//! Transaction management for the budgeting application.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the per-user database functions
//! - Filtered page, count and per-category summary queries
//! - Route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod query;
mod search_endpoint;

pub use core::{
    Transaction, TransactionData, TransactionState, create_transaction, create_transaction_table,
    delete_transaction, get_transaction, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use query::{CategorySummary, count_transactions, get_transaction_page, sum_by_category};
pub use search_endpoint::{
    TransactionPage, search_transactions_endpoint, summarise_transactions_endpoint,
};
