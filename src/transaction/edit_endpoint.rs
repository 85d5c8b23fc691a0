//! Defines the endpoint for editing a transaction.

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{Transaction, TransactionData, TransactionState, core::update_transaction},
    user::User,
};

/// A route handler for replacing the fields of one of the user's transactions.
///
/// Responds with `404 Not Found` if the transaction does not exist or belongs
/// to another user.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<TransactionId>,
    Json(data): Json<TransactionData>,
) -> Result<Json<Transaction>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    update_transaction(transaction_id, data, user.id, &connection).map(Json)
}
