//! Password hashing, session tokens, the log-in endpoint and the auth middleware.

mod log_in;
mod middleware;
mod password;
mod token;

use serde::{Deserialize, Serialize};

pub use log_in::{LogInResponse, post_log_in};
pub use middleware::{AuthState, USER_LOOKUP_TIMEOUT, auth_guard};
pub use password::{PasswordHash, ValidatedPassword, hash_password};
pub use token::{AuthManager, Claims, SessionToken, TOKEN_DURATION};

/// The username and password sent to the log-in endpoint.
///
/// The password is plain text and is only ever hashed, never stored.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
