//! Defines the endpoint for creating a new transaction.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    Error,
    transaction::{Transaction, TransactionData, TransactionState, core::create_transaction},
    user::User,
};

/// A route handler for creating a new transaction owned by the logged-in user.
///
/// Responds with `201 Created` and the stored transaction.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user): Extension<User>,
    Json(data): Json<TransactionData>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transaction = create_transaction(data, user.id, &connection)?;
    tracing::debug!("User {} created transaction {}", user.id, transaction.id);

    Ok((StatusCode::CREATED, Json(transaction)))
}

#[cfg(test)]
mod tests {
    use axum::{Extension, Router, http::StatusCode, routing::post};
    use axum_test::TestServer;
    use serde_json::json;
    use time::macros::date;

    use crate::{
        endpoints,
        test_utils::{create_test_category, create_test_user, get_test_app_state},
        transaction::Transaction,
    };

    use super::create_transaction_endpoint;

    #[tokio::test]
    async fn creates_transaction() {
        let state = get_test_app_state();
        let user = create_test_user(&state, "alice", "hunter2");
        let category = create_test_category(&state, "Groceries");
        let app = Router::new()
            .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
            .layer(Extension(user))
            .with_state(state);
        let server = TestServer::new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": 12.5,
                "spent_at": "2025-03-14",
                "note": "lunch",
                "category_id": category.id,
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction = response.json::<Transaction>();
        assert_eq!(transaction.amount, 12.5);
        assert_eq!(transaction.spent_at, date!(2025 - 03 - 14));
        assert_eq!(transaction.note, "lunch");
        assert_eq!(transaction.category_id, category.id);
    }

    #[tokio::test]
    async fn rejects_unknown_category() {
        let state = get_test_app_state();
        let user = create_test_user(&state, "alice", "hunter2");
        let app = Router::new()
            .route(endpoints::TRANSACTIONS, post(create_transaction_endpoint))
            .layer(Extension(user))
            .with_state(state);
        let server = TestServer::new(app).expect("Could not create test server.");

        server
            .post(endpoints::TRANSACTIONS)
            .json(&json!({
                "amount": 12.5,
                "spent_at": "2025-03-14",
                "category_id": 42,
            }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
