//! Issues and validates the signed session tokens handed out at log-in.
//!
//! Tokens are stateless HS256 JSON Web Tokens carrying the username and an
//! expiry time. There is no server side session store and no revocation list:
//! a token stays valid until it expires.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    auth::Credentials,
    error::AuthFailure,
    user::{User, UserStore},
};

/// How long a session token is valid for after it has been issued.
pub const TOKEN_DURATION: Duration = Duration::days(7);

/// The contents of a session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// The username of the token holder.
    pub user: String,
    /// The expiry time of the token as a unix timestamp.
    pub exp: i64,
}

/// A freshly issued token and the time at which it expires.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

#[derive(Clone)]
struct SigningKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

/// Checks credentials and issues and validates session tokens.
///
/// The signing secret is read once at start-up. Without a secret every token
/// operation fails with [Error::MissingSigningSecret].
#[derive(Clone)]
pub struct AuthManager {
    keys: Option<SigningKeys>,
    token_duration: Duration,
}

impl std::fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthManager")
            .field("configured", &self.is_configured())
            .field("token_duration", &self.token_duration)
            .finish()
    }
}

impl AuthManager {
    /// Create an auth manager that signs tokens with `signing_secret`.
    ///
    /// An empty secret is treated the same as a missing one.
    pub fn new(signing_secret: Option<&str>) -> Self {
        let keys = signing_secret
            .filter(|secret| !secret.is_empty())
            .map(|secret| SigningKeys {
                encoding_key: EncodingKey::from_secret(secret.as_bytes()),
                decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            });

        Self {
            keys,
            token_duration: TOKEN_DURATION,
        }
    }

    /// Whether a signing secret was provided.
    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    fn keys(&self) -> Result<&SigningKeys, Error> {
        self.keys.as_ref().ok_or(Error::MissingSigningSecret)
    }

    /// Check a username and password against the user store.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCredentials] if no user has this username and
    /// password, or any error from the store.
    pub fn check_credentials(
        &self,
        credentials: &Credentials,
        user_store: &impl UserStore,
    ) -> Result<User, Error> {
        let password_hash = super::hash_password(&credentials.password);

        match user_store.find_user_by_credentials(&credentials.username, &password_hash) {
            Ok(user) => Ok(user),
            Err(Error::NotFound) => Err(Error::InvalidCredentials),
            Err(error) => Err(error),
        }
    }

    /// Issue a token for `username` that expires [TOKEN_DURATION] after `now`.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingSigningSecret] if there is no signing secret or
    /// [Error::Signing] if the token could not be encoded.
    pub fn issue_token(&self, username: &str, now: OffsetDateTime) -> Result<SessionToken, Error> {
        let keys = self.keys()?;
        let expires_at = now + self.token_duration;
        let claims = Claims {
            user: username.to_owned(),
            exp: expires_at.unix_timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding_key)
            .map_err(|error| Error::Signing(error.to_string()))?;

        Ok(SessionToken { token, expires_at })
    }

    /// Check the signature and expiry of `token` and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [Error::MissingSigningSecret] if there is no signing secret,
    /// otherwise an [Error::Authentication] describing why the token was rejected.
    pub fn decode_token(&self, token: &str, now: OffsetDateTime) -> Result<Claims, Error> {
        let keys = self.keys()?;

        // Expiry is checked against `now` below.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &keys.decoding_key, &validation)
            .map_err(|error| {
                let reason = match error.kind() {
                    ErrorKind::InvalidSignature => AuthFailure::BadSignature,
                    _ => AuthFailure::Malformed,
                };

                Error::Authentication(reason)
            })?
            .claims;

        if now.unix_timestamp() > claims.exp {
            return Err(Error::Authentication(AuthFailure::Expired));
        }

        Ok(claims)
    }

    /// Validate `token` and resolve the user it was issued to.
    ///
    /// The store is only queried once the signature and expiry have been checked.
    ///
    /// # Errors
    ///
    /// Returns the errors of [AuthManager::decode_token], or an
    /// [Error::Authentication] if the user no longer exists or their stored
    /// username differs from the token's.
    pub fn validate_token(
        &self,
        token: &str,
        now: OffsetDateTime,
        user_store: &impl UserStore,
    ) -> Result<User, Error> {
        let claims = self.decode_token(token, now)?;

        let user = match user_store.find_user_by_username(&claims.user) {
            Ok(user) => user,
            Err(Error::NotFound) => return Err(Error::Authentication(AuthFailure::UserNotFound)),
            Err(error) => return Err(error),
        };

        if user.username != claims.user {
            return Err(Error::Authentication(AuthFailure::UsernameMismatch));
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use jsonwebtoken::{EncodingKey, Header, encode};
    use time::{Duration, OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        auth::{Credentials, PasswordHash, hash_password},
        error::AuthFailure,
        user::{User, UserID, UserStore},
    };

    use super::{AuthManager, Claims, TOKEN_DURATION};

    /// A user store backed by a list that counts how often it was queried.
    struct FakeUserStore {
        users: Vec<User>,
        lookups: Cell<usize>,
    }

    impl FakeUserStore {
        fn with_user(username: &str, password: &str) -> Self {
            Self {
                users: vec![User {
                    id: UserID::new(1),
                    username: username.to_owned(),
                    password_hash: hash_password(password),
                }],
                lookups: Cell::new(0),
            }
        }
    }

    impl UserStore for FakeUserStore {
        fn find_user_by_username(&self, username: &str) -> Result<User, Error> {
            self.lookups.set(self.lookups.get() + 1);
            self.users
                .iter()
                .find(|user| user.username.eq_ignore_ascii_case(username))
                .cloned()
                .ok_or(Error::NotFound)
        }

        fn find_user_by_credentials(
            &self,
            username: &str,
            password_hash: &PasswordHash,
        ) -> Result<User, Error> {
            self.lookups.set(self.lookups.get() + 1);
            self.users
                .iter()
                .find(|user| user.username == username && &user.password_hash == password_hash)
                .cloned()
                .ok_or(Error::NotFound)
        }
    }

    const SECRET: &str = "averysecretsigningkey";

    fn manager() -> AuthManager {
        AuthManager::new(Some(SECRET))
    }

    #[test]
    fn issued_token_validates_to_same_user() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let now = datetime!(2025-06-01 12:00 UTC);

        let session = manager().issue_token("alice", now).unwrap();
        let user = manager().validate_token(&session.token, now, &store).unwrap();

        assert_eq!(user.username, "alice");
        assert_eq!(session.expires_at, now + TOKEN_DURATION);
    }

    #[test]
    fn token_expires_after_seven_days() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let now = datetime!(2025-06-01 12:00 UTC);
        let session = manager().issue_token("alice", now).unwrap();

        let just_before = now + Duration::days(7) - Duration::seconds(1);
        let just_after = now + Duration::days(7) + Duration::seconds(1);

        assert!(manager().validate_token(&session.token, just_before, &store).is_ok());
        assert_eq!(
            manager().validate_token(&session.token, just_after, &store),
            Err(Error::Authentication(AuthFailure::Expired))
        );
    }

    #[test]
    fn expiry_is_judged_against_given_time_not_wall_clock() {
        let issued_at = datetime!(2020-01-01 00:00 UTC);
        let session = manager().issue_token("alice", issued_at).unwrap();

        let claims = manager()
            .decode_token(&session.token, issued_at + Duration::days(1))
            .unwrap();

        assert_eq!(claims.exp, (issued_at + TOKEN_DURATION).unix_timestamp());
        assert_eq!(
            manager().decode_token(&session.token, OffsetDateTime::now_utc()),
            Err(Error::Authentication(AuthFailure::Expired))
        );
    }

    #[test]
    fn expired_token_is_rejected_before_user_lookup() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let issued_at = datetime!(2025-01-01 00:00 UTC);
        let session = manager().issue_token("alice", issued_at).unwrap();

        let result = manager().validate_token(
            &session.token,
            issued_at + Duration::days(30),
            &store,
        );

        assert_eq!(result, Err(Error::Authentication(AuthFailure::Expired)));
        assert_eq!(store.lookups.get(), 0);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let now = datetime!(2025-06-01 12:00 UTC);
        let session = AuthManager::new(Some("someothersecret"))
            .issue_token("alice", now)
            .unwrap();

        let result = manager().validate_token(&session.token, now, &store);

        assert_eq!(result, Err(Error::Authentication(AuthFailure::BadSignature)));
        assert_eq!(store.lookups.get(), 0);
    }

    #[test]
    fn garbage_token_is_malformed() {
        let store = FakeUserStore::with_user("alice", "hunter2");

        let result = manager().validate_token(
            "not.a.token",
            datetime!(2025-06-01 12:00 UTC),
            &store,
        );

        assert_eq!(result, Err(Error::Authentication(AuthFailure::Malformed)));
        assert_eq!(store.lookups.get(), 0);
    }

    #[test]
    fn token_for_unknown_user_is_rejected() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let now = datetime!(2025-06-01 12:00 UTC);
        let session = manager().issue_token("bob", now).unwrap();

        let result = manager().validate_token(&session.token, now, &store);

        assert_eq!(result, Err(Error::Authentication(AuthFailure::UserNotFound)));
    }

    #[test]
    fn token_with_differently_cased_username_is_rejected() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let now = datetime!(2025-06-01 12:00 UTC);
        let session = manager().issue_token("Alice", now).unwrap();

        let result = manager().validate_token(&session.token, now, &store);

        assert_eq!(
            result,
            Err(Error::Authentication(AuthFailure::UsernameMismatch))
        );
    }

    #[test]
    fn token_without_expiry_is_malformed() {
        #[derive(serde::Serialize)]
        struct NoExpiry {
            user: String,
        }

        let store = FakeUserStore::with_user("alice", "hunter2");
        let token = encode(
            &Header::default(),
            &NoExpiry {
                user: "alice".to_owned(),
            },
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = manager().validate_token(&token, datetime!(2025-06-01 12:00 UTC), &store);

        assert_eq!(result, Err(Error::Authentication(AuthFailure::Malformed)));
    }

    #[test]
    fn decode_gives_issued_claims() {
        let now = datetime!(2025-06-01 12:00 UTC);
        let session = manager().issue_token("alice", now).unwrap();

        let claims = manager().decode_token(&session.token, now).unwrap();

        assert_eq!(
            claims,
            Claims {
                user: "alice".to_owned(),
                exp: (now + TOKEN_DURATION).unix_timestamp(),
            }
        );
    }

    #[test]
    fn missing_secret_disables_tokens() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let now = datetime!(2025-06-01 12:00 UTC);
        let session = manager().issue_token("alice", now).unwrap();

        for unconfigured in [AuthManager::new(None), AuthManager::new(Some(""))] {
            assert!(!unconfigured.is_configured());
            assert_eq!(
                unconfigured.issue_token("alice", now),
                Err(Error::MissingSigningSecret)
            );
            assert_eq!(
                unconfigured.validate_token(&session.token, now, &store),
                Err(Error::MissingSigningSecret)
            );
        }
    }

    #[test]
    fn check_credentials_accepts_correct_password() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let credentials = Credentials {
            username: "alice".to_owned(),
            password: "hunter2".to_owned(),
        };

        let user = manager().check_credentials(&credentials, &store).unwrap();

        assert_eq!(user.username, "alice");
    }

    #[test]
    fn check_credentials_rejects_wrong_password() {
        let store = FakeUserStore::with_user("alice", "hunter2");
        let credentials = Credentials {
            username: "alice".to_owned(),
            password: "hunter3".to_owned(),
        };

        assert_eq!(
            manager().check_credentials(&credentials, &store),
            Err(Error::InvalidCredentials)
        );
    }
}
