//! Identity resolution: issuing and verifying signed credentials.
//!
//! A credential is an HS256 JWT embedding the user's id, email, name and
//! role. Resolving one always re-reads the user row, so a changed role or
//! a removed account takes effect before the token expires.

use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::Error as JwtError, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::{self, user, User, UserStore};

/// Name of the cookie carrying the credential.
pub const TOKEN_COOKIE: &str = "token";

pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expiration_time: Duration,
}

impl Keys {
    pub fn new(secret: &str, expiration_time: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expiration_time,
        }
    }

    pub fn expiration_time(&self) -> Duration {
        self.expiration_time
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Claims {
    pub id: user::Id,
    pub email: String,
    pub name: String,
    pub role: user::Role,
    pub exp: i64,
}

pub fn issue(keys: &Keys, user: &User) -> Result<String, JwtError> {
    let expires_at = OffsetDateTime::now_utc() + keys.expiration_time;
    encode(
        &Header::default(),
        &Claims {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            exp: expires_at.unix_timestamp(),
        },
        &keys.encoding,
    )
}

/// Recovers the user behind `token`.
///
/// Missing, malformed or expired tokens and vanished users all resolve to
/// `None`. So do store failures, which are logged.
pub async fn resolve(
    keys: &Keys,
    store: &(impl UserStore + ?Sized),
    token: Option<&str>,
) -> Option<User> {
    let token = token?;
    let claims = match decode::<Claims>(
        token,
        &keys.decoding,
        &Validation::default(),
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::debug!("rejected credential: {e}");
            return None;
        }
    };
    match store.get_user_by_id(claims.id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("failed to resolve user {}: {e}", claims.id);
            None
        }
    }
}

/// Looks up the account signing in with `email`.
///
/// The secret is only checked when `require_password` is set; otherwise
/// the email alone identifies the user.
pub async fn login(
    store: &(impl UserStore + ?Sized),
    email: &str,
    password: Option<&str>,
    require_password: bool,
) -> Result<Option<User>, db::Error> {
    let user = store.get_user_by_email(email.trim()).await?;
    if !require_password {
        return Ok(user);
    }
    let Some(password) = password else {
        return Ok(None);
    };
    let password_hash = user::PasswordHash::new(password);
    Ok(user.filter(|u| u.password_hash == password_hash))
}
