//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error, auth::AuthManager, db::initialize, pagination::PaginationConfig,
    user::SQLiteUserStore,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Issues and validates session tokens.
    pub auth: AuthManager,

    /// The config that controls how to page search results.
    pub pagination_config: PaginationConfig,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The user lookup used for log-in and token validation.
    pub user_store: SQLiteUserStore,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// When `signing_secret` is `None` or empty the server still starts, but every
    /// request that needs a session token fails with [Error::MissingSigningSecret].
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        signing_secret: Option<&str>,
        pagination_config: PaginationConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        let connection = Arc::new(Mutex::new(db_connection));

        Ok(Self {
            auth: AuthManager::new(signing_secret),
            pagination_config,
            user_store: SQLiteUserStore::new(connection.clone()),
            db_connection: connection,
        })
    }
}
