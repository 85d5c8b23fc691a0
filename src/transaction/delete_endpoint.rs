//! Defines the endpoint for deleting a transaction.

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{TransactionState, core::delete_transaction},
    user::User,
};

/// A route handler for deleting one of the user's transactions.
///
/// Responds with `204 No Content` on success and `404 Not Found` if the
/// transaction does not exist or belongs to another user.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Path(transaction_id): Path<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    delete_transaction(transaction_id, user.id, &connection)?;
    tracing::debug!("User {} deleted transaction {transaction_id}", user.id);

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use axum::{Extension, Router, http::StatusCode, routing::delete};
    use axum_test::TestServer;
    use time::macros::date;

    use crate::{
        AppState, endpoints,
        test_utils::{create_test_category, create_test_user, get_test_app_state},
        transaction::{Transaction, TransactionData, create_transaction},
        user::User,
    };

    use super::delete_transaction_endpoint;

    fn get_test_server(state: AppState, user: User) -> TestServer {
        let app = Router::new()
            .route(endpoints::TRANSACTION, delete(delete_transaction_endpoint))
            .layer(Extension(user))
            .with_state(state);

        TestServer::new(app).expect("Could not create test server.")
    }

    fn insert_transaction(state: &AppState, user: &User) -> Transaction {
        let category = create_test_category(state, "Groceries");

        create_transaction(
            TransactionData {
                amount: 1.0,
                spent_at: date!(2025 - 03 - 14),
                note: String::new(),
                category_id: category.id,
            },
            user.id,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn deletes_own_transaction() {
        let state = get_test_app_state();
        let user = create_test_user(&state, "alice", "hunter2");
        let transaction = insert_transaction(&state, &user);
        let server = get_test_server(state, user);
        let path = endpoints::format_endpoint(endpoints::TRANSACTION, transaction.id);

        server
            .delete(&path)
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server.delete(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn cannot_delete_other_users_transaction() {
        let state = get_test_app_state();
        let alice = create_test_user(&state, "alice", "hunter2");
        let bob = create_test_user(&state, "bob", "hunter3");
        let transaction = insert_transaction(&state, &alice);
        let server = get_test_server(state, bob);

        server
            .delete(&endpoints::format_endpoint(
                endpoints::TRANSACTION,
                transaction.id,
            ))
            .await
            .assert_status_not_found();
    }
}
