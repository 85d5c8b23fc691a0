//! Defines the transaction model and the per-user write queries.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    AppState, Error,
    database_id::{DatabaseID, TransactionId},
    user::UserID,
};

// ============================================================================
// MODELS
// ============================================================================

/// An expense or income recorded by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The amount of money spent (negative amounts are income).
    pub amount: f64,
    /// The day the money was spent.
    pub spent_at: Date,
    /// A free text note about the transaction.
    pub note: String,
    /// The category the transaction is filed under.
    pub category_id: DatabaseID,
}

/// The client supplied fields of a transaction, used for both creating and editing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionData {
    pub amount: f64,
    pub spent_at: Date,
    #[serde(default)]
    pub note: String,
    pub category_id: DatabaseID,
}

/// The state needed by the transaction write routes.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the transaction table in the database.
///
/// Transactions belong to exactly one user and are removed along with that user.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                amount REAL NOT NULL,
                spent_at TEXT NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                category_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE RESTRICT,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_spent_at \
        ON \"transaction\"(user_id, spent_at);",
        (),
    )?;

    Ok(())
}

/// Create a new transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    data: TransactionData,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "INSERT INTO \"transaction\" (amount, spent_at, note, category_id, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, amount, spent_at, note, category_id",
        )?
        .query_row(
            (
                data.amount,
                data.spent_at,
                data.note,
                data.category_id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Overwrite the transaction `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the user has no transaction with `id`,
/// - [Error::InvalidCategory] if the category ID does not refer to a category,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    data: TransactionData,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "UPDATE \"transaction\"
             SET amount = ?1, spent_at = ?2, note = ?3, category_id = ?4
             WHERE id = ?5 AND user_id = ?6
             RETURNING id, amount, spent_at, note, category_id",
        )?
        .query_row(
            (
                data.amount,
                data.spent_at,
                data.note,
                data.category_id,
                id,
                user_id.as_i64(),
            ),
            map_transaction_row,
        )
        .map_err(|error| error.into())
}

/// Delete the transaction `id` if it belongs to `user_id`.
///
/// # Errors
/// Returns [Error::NotFound] if the user has no transaction with `id`, or
/// [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Retrieve the transaction `id` if it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the user has no transaction with `id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection
        .prepare(
            "SELECT id, amount, spent_at, note, category_id FROM \"transaction\" \
            WHERE id = ?1 AND user_id = ?2",
        )?
        .query_row((id, user_id.as_i64()), map_transaction_row)
        .map_err(|error| error.into())
}

/// Map a database row to a Transaction.
///
/// Expects the columns `id, amount, spent_at, note, category_id` in that order.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: row.get(1)?,
        spent_at: row.get(2)?,
        note: row.get(3)?,
        category_id: row.get(4)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================
