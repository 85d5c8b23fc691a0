//! The route for handling log-in requests.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::{AuthState, Credentials},
};

/// The body returned from a successful log-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The session token to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// When the token stops being accepted.
    #[serde(with = "time::serde::rfc3339")]
    pub expire_date: OffsetDateTime,
}

/// Handler for log-in requests.
///
/// # Errors
///
/// This function will return an error in a few situations.
/// - The server has no signing secret.
/// - The username and password do not match a registered user.
/// - An internal error occurred when looking up the user.
pub async fn post_log_in(
    State(state): State<AuthState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<LogInResponse>, Error> {
    if !state.auth.is_configured() {
        return Err(Error::MissingSigningSecret);
    }

    let user = state
        .auth
        .check_credentials(&credentials, &state.user_store)?;
    let session = state
        .auth
        .issue_token(&user.username, OffsetDateTime::now_utc())?;

    tracing::info!("User {} logged in", user.id);

    Ok(Json(LogInResponse {
        token: session.token,
        expire_date: session.expires_at,
    }))
}
