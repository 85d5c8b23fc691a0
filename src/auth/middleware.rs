//! Authentication middleware that validates bearer tokens and resolves the user.

use std::time::Duration;

use axum::{
    RequestPartsExt,
    extract::{FromRef, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    auth::AuthManager,
    error::AuthFailure,
    user::{SQLiteUserStore, User},
};

/// The longest the middleware waits for the user store when validating a token.
pub const USER_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// The state needed for the auth middleware and the log-in endpoint.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub auth: AuthManager,
    pub user_store: SQLiteUserStore,
    /// How long [auth_guard] waits for the user lookup, [USER_LOOKUP_TIMEOUT] by default.
    pub lookup_timeout: Duration,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            auth: state.auth.clone(),
            user_store: state.user_store.clone(),
            lookup_timeout: USER_LOOKUP_TIMEOUT,
        }
    }
}

/// Middleware function that checks for a valid bearer token.
///
/// The resolved [User] is placed into the request extensions and the request
/// executed normally, otherwise the auth error is returned as the response.
///
/// **Note**: Route handlers can use the function argument `Extension(user): Extension<User>` to receive the user.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
        Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_owned(),
        Err(rejection) => {
            tracing::debug!("Missing or invalid authorization header: {rejection}");
            return Error::Authentication(AuthFailure::Malformed).into_response();
        }
    };

    let user = match resolve_user(state, token).await {
        Ok(user) => user,
        Err(error) => return error.into_response(),
    };

    tracing::debug!("Authenticated user {}", user.id);
    parts.extensions.insert(user);
    let request = Request::from_parts(parts, body);

    next.run(request).await
}

/// Validate `token` off the async runtime, giving up after `state.lookup_timeout`.
async fn resolve_user(state: AuthState, token: String) -> Result<User, Error> {
    let lookup_timeout = state.lookup_timeout;
    let lookup = tokio::task::spawn_blocking(move || {
        state
            .auth
            .validate_token(&token, OffsetDateTime::now_utc(), &state.user_store)
    });

    match tokio::time::timeout(lookup_timeout, lookup).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(Error::UserLookup(join_error.to_string())),
        Err(_) => Err(Error::UserLookup(format!("timed out after {lookup_timeout:?}"))),
    }
}
