//! Filtered read queries over a user's transactions.
//!
//! Every query appends its own placeholders after the ones used by the
//! [CompiledFilter], so the filter fragment can be spliced in unchanged.

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::{Deserialize, Serialize};

use crate::{Error, database_id::DatabaseID, filter::CompiledFilter, user::UserID};

use super::core::{Transaction, map_transaction_row};

/// The total amount spent in a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category_id: DatabaseID,
    pub sum: f64,
}

/// The filter arguments followed by `trailing`, ready for [params_from_iter].
fn query_parameters(filter: &CompiledFilter, trailing: &[Value]) -> Vec<Value> {
    filter
        .args
        .iter()
        .map(|arg| Value::Text(arg.clone()))
        .chain(trailing.iter().cloned())
        .collect()
}

/// Get one page of the user's transactions that match `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn get_transaction_page(
    filter: &CompiledFilter,
    user_id: UserID,
    limit: u64,
    offset: u64,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let user_placeholder = filter.next_placeholder();
    // Sort by ID after date to keep the order stable between pages.
    let query = format!(
        "SELECT id, amount, spent_at, note, category_id FROM \"transaction\" \
        WHERE {} user_id = ?{} \
        ORDER BY spent_at DESC, id DESC \
        LIMIT ?{} OFFSET ?{}",
        filter.fragment,
        user_placeholder,
        user_placeholder + 1,
        user_placeholder + 2
    );
    let parameters = query_parameters(
        filter,
        &[
            Value::Integer(user_id.as_i64()),
            Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)),
            Value::Integer(i64::try_from(offset).unwrap_or(i64::MAX)),
        ],
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters.iter()), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::SqlError))
        .collect()
}

/// Count the user's transactions that match `filter`.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn count_transactions(
    filter: &CompiledFilter,
    user_id: UserID,
    connection: &Connection,
) -> Result<u64, Error> {
    let query = format!(
        "SELECT COUNT(id) FROM \"transaction\" WHERE {} user_id = ?{}",
        filter.fragment,
        filter.next_placeholder()
    );
    let parameters = query_parameters(filter, &[Value::Integer(user_id.as_i64())]);

    let count: i64 =
        connection.query_row(&query, params_from_iter(parameters.iter()), |row| row.get(0))?;

    Ok(u64::try_from(count).unwrap_or_default())
}

/// Sum the amounts of the user's transactions that match `filter`, per category.
///
/// Categories without matching transactions are left out. The result is
/// ordered by category ID.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn sum_by_category(
    filter: &CompiledFilter,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<CategorySummary>, Error> {
    let query = format!(
        "SELECT category_id, SUM(amount) FROM \"transaction\" \
        WHERE {} user_id = ?{} \
        GROUP BY category_id \
        ORDER BY category_id",
        filter.fragment,
        filter.next_placeholder()
    );
    let parameters = query_parameters(filter, &[Value::Integer(user_id.as_i64())]);

    connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters.iter()), |row| {
            Ok(CategorySummary {
                category_id: row.get(0)?,
                sum: row.get(1)?,
            })
        })?
        .map(|maybe_summary| maybe_summary.map_err(Error::SqlError))
        .collect()
}
