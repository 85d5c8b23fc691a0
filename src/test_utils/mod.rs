//! Shared fixtures for the unit tests.

use rusqlite::Connection;

use crate::{
    AppState,
    auth::hash_password,
    category::{Category, create_category},
    pagination::PaginationConfig,
    user::{User, create_user},
};

/// The signing secret used by [get_test_app_state].
pub(crate) const TEST_SIGNING_SECRET: &str = "averysecretsigningkey";

/// Create an app state backed by a fresh in-memory database.
pub(crate) fn get_test_app_state() -> AppState {
    let db_connection =
        Connection::open_in_memory().expect("Could not open database in memory.");

    AppState::new(
        db_connection,
        Some(TEST_SIGNING_SECRET),
        PaginationConfig::default(),
    )
    .expect("Could not create app state.")
}

/// Insert a user with the plain text `password`.
pub(crate) fn create_test_user(state: &AppState, username: &str, password: &str) -> User {
    let connection = state.db_connection.lock().unwrap();

    create_user(username, hash_password(password), &connection)
        .expect("Could not create test user")
}

pub(crate) fn create_test_category(state: &AppState, name: &str) -> Category {
    let connection = state.db_connection.lock().unwrap();

    create_category(name, &connection).expect("Could not create test category")
}
