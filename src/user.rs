//! Code for creating the user table and fetching users from the database.

use std::{
    fmt::Display,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user of the application.
///
/// The caller should ensure that `id` and `username` are unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name the user logs in with.
    pub username: String,
    /// The user's password hash.
    pub password_hash: PasswordHash,
}

/// Looks up registered users.
pub trait UserStore {
    /// Get the user with `username`.
    ///
    /// Returns [Error::NotFound] if no such user exists.
    fn find_user_by_username(&self, username: &str) -> Result<User, Error>;

    /// Get the user with `username` whose stored password hash equals `password_hash`.
    ///
    /// Returns [Error::NotFound] if the username is unknown or the hash differs.
    fn find_user_by_credentials(
        &self,
        username: &str,
        password_hash: &PasswordHash,
    ) -> Result<User, Error>;
}

/// A [UserStore] backed by the application's SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteUserStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteUserStore {
    /// Create a new user store.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
        let raw_id = row.get(0)?;
        let username = row.get(1)?;
        let raw_password_hash: String = row.get(2)?;

        Ok(User {
            id: UserID::new(raw_id),
            username,
            password_hash: PasswordHash::new_unchecked(&raw_password_hash),
        })
    }
}

impl UserStore for SQLiteUserStore {
    /// # Errors
    ///
    /// Returns a [Error::NotFound] error if there is no user with the specified username,
    /// [Error::DatabaseLockError] if the connection lock is poisoned or [Error::SqlError]
    /// if there are SQL related errors.
    fn find_user_by_username(&self, username: &str) -> Result<User, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        connection
            .prepare("SELECT id, username, password FROM user WHERE username = :username")?
            .query_row(&[(":username", username)], Self::map_row)
            .map_err(|error| error.into())
    }

    fn find_user_by_credentials(
        &self,
        username: &str,
        password_hash: &PasswordHash,
    ) -> Result<User, Error> {
        let connection = self
            .connection
            .lock()
            .map_err(|_| Error::DatabaseLockError)?;

        connection
            .prepare(
                "SELECT id, username, password FROM user \
                WHERE username = :username AND password = :password",
            )?
            .query_row(
                &[(":username", username), (":password", password_hash.as_ref())],
                Self::map_row,
            )
            .map_err(|error| error.into())
    }
}

/// Create the user table.
///
/// Usernames are compared case-insensitively, so "Alice" and "alice" are the same user.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT UNIQUE NOT NULL COLLATE NOCASE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateUsername] if the username is taken or [Error::SqlError]
/// if another SQL related error occurred.
pub fn create_user(
    username: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (username, password) VALUES (?1, ?2)",
        (username, password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        username: username.to_owned(),
        password_hash,
    })
}

#[cfg(test)]
mod user_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{PasswordHash, hash_password},
    };

    use super::{SQLiteUserStore, UserStore, create_user, create_user_table};

    fn get_db_connection() -> Connection {
        let conn =
            Connection::open_in_memory().expect("Could not create in-memory SQLite database");
        create_user_table(&conn).expect("Could not create user table");

        conn
    }

    fn get_store(conn: Connection) -> SQLiteUserStore {
        SQLiteUserStore::new(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn insert_user_succeeds() {
        let conn = get_db_connection();
        let password_hash = PasswordHash::new_unchecked("hunter2");

        let inserted_user = create_user("alice", password_hash.clone(), &conn).unwrap();

        assert!(inserted_user.id.as_i64() > 0);
        assert_eq!(inserted_user.username, "alice");
        assert_eq!(inserted_user.password_hash, password_hash);
    }

    #[test]
    fn insert_user_fails_on_duplicate_username() {
        let conn = get_db_connection();
        create_user("alice", hash_password("hunter2"), &conn).unwrap();

        let duplicate = create_user("ALICE", hash_password("hunter3"), &conn);

        assert_eq!(duplicate, Err(Error::DuplicateUsername));
    }

    #[test]
    fn find_by_username_succeeds() {
        let conn = get_db_connection();
        let want = create_user("alice", hash_password("hunter2"), &conn).unwrap();
        let store = get_store(conn);

        let got = store.find_user_by_username("alice").unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn find_by_username_ignores_case_but_returns_stored_name() {
        let conn = get_db_connection();
        create_user("alice", hash_password("hunter2"), &conn).unwrap();
        let store = get_store(conn);

        let got = store.find_user_by_username("Alice").unwrap();

        assert_eq!(got.username, "alice");
    }

    #[test]
    fn find_by_username_fails_with_unknown_username() {
        let store = get_store(get_db_connection());

        assert_eq!(store.find_user_by_username("nobody"), Err(Error::NotFound));
    }

    #[test]
    fn find_by_credentials_succeeds_with_correct_hash() {
        let conn = get_db_connection();
        let want = create_user("alice", hash_password("hunter2"), &conn).unwrap();
        let store = get_store(conn);

        let got = store
            .find_user_by_credentials("alice", &hash_password("hunter2"))
            .unwrap();

        assert_eq!(want, got);
    }

    #[test]
    fn find_by_credentials_fails_with_wrong_hash() {
        let conn = get_db_connection();
        create_user("alice", hash_password("hunter2"), &conn).unwrap();
        let store = get_store(conn);

        let got = store.find_user_by_credentials("alice", &hash_password("hunter3"));

        assert_eq!(got, Err(Error::NotFound));
    }
}
