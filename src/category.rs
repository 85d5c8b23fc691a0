//! Spending categories and the route for listing them.
//!
//! Categories are shared by all users and are created by the server operator.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, database_id::DatabaseID};

/// A category that transactions can be filed under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: DatabaseID,
    pub name: String,
}

/// The state needed for the category routes.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler that lists every category.
pub async fn get_categories_endpoint(
    State(state): State<CategoryState>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    get_categories(&connection).map(Json)
}

/// Create the category table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Insert a new category.
///
/// # Errors
///
/// Returns [Error::SqlError] if the name is taken or another SQL error occurred.
pub fn create_category(name: &str, connection: &Connection) -> Result<Category, Error> {
    connection
        .prepare("INSERT INTO category (name) VALUES (?1) RETURNING id, name")?
        .query_row((name,), |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })
        .map_err(|error| error.into())
}

/// Get all categories ordered by ID.
///
/// # Errors
///
/// Returns [Error::SqlError] if an SQL related error occurred.
pub fn get_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name FROM category ORDER BY id")?
        .query_map([], |row| {
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .map(|maybe_category| maybe_category.map_err(Error::SqlError))
        .collect()
}
