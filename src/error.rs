//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::filter::FilterError;

/// Why a session token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// The token was correctly signed but its expiry time has passed.
    Expired,
    /// The token signature does not match the server secret.
    BadSignature,
    /// The token could not be decoded at all.
    Malformed,
    /// The user named in the token does not exist (anymore).
    UserNotFound,
    /// The stored username differs from the username in the token.
    UsernameMismatch,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            AuthFailure::Expired => "expired",
            AuthFailure::BadSignature => "bad-signature",
            AuthFailure::Malformed => "malformed",
            AuthFailure::UserNotFound => "user-not-found",
            AuthFailure::UsernameMismatch => "mismatch",
        };

        f.write_str(reason)
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A filter in the request referred to an unknown field or operator.
    ///
    /// The whole filter batch is rejected, the client should fix the request.
    #[error("invalid filter: {0}")]
    InvalidFilter(#[from] FilterError),

    /// The username and password did not match a registered user.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// A session token was presented but could not be accepted.
    ///
    /// The reason should only be logged on the server, clients only learn that
    /// authorization failed.
    #[error("authentication failed: {0}")]
    Authentication(AuthFailure),

    /// The server was started without a signing secret, so tokens can be
    /// neither issued nor validated.
    #[error("the token signing secret is not configured")]
    MissingSigningSecret,

    /// The token could not be signed.
    #[error("could not sign token: {0}")]
    Signing(String),

    /// The username used to create a user is already taken.
    #[error("the username is already in use")]
    DuplicateUsername,

    /// The category ID used for a transaction does not refer to a category.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The user lookup for a token did not complete, e.g. it timed out.
    #[error("the user lookup failed: {0}")]
    UserLookup(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.contains("user.username") =>
            {
                Error::DuplicateUsername
            }
            // The only foreign key a client controls is the transaction's category.
            rusqlite::Error::SqliteFailure(sql_error, _)
                if sql_error.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Error::InvalidCategory
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::InvalidFilter(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            Error::InvalidCredentials => {
                tracing::debug!("log-in rejected: invalid credentials");
                (StatusCode::UNAUTHORIZED, "authorization failed".to_owned())
            }
            Error::Authentication(reason) => {
                tracing::debug!("token rejected: {reason}");
                (StatusCode::UNAUTHORIZED, "authorization failed".to_owned())
            }
            Error::MissingSigningSecret | Error::Signing(_) => {
                tracing::error!("token service unavailable: {self}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "authorization is not available, contact the server administrator".to_owned(),
                )
            }
            Error::InvalidCategory => (StatusCode::BAD_REQUEST, self.to_string()),
            Error::TooWeak(feedback) => (
                StatusCode::BAD_REQUEST,
                format!("password is too weak: {feedback}"),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                "the requested resource could not be found".to_owned(),
            ),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred, check the server logs for more details".to_owned(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
