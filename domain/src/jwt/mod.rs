//! Issuing and verifying the HS256 bearer tokens that authenticate API requests and event
//! streams.
//!
//! The module also re-exports the `Jwt` struct from the `entity` module for convenience.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain::jwt::{generate_token, verify_token};
//!
//! let jwt = generate_token(&config, user.id, user.is_admin)?;
//! let identity = verify_token(&config, &jwt.token)?;
//! assert_eq!(identity.subject, user.id.to_string());
//! ```

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use chrono::Utc;
use claims::AuthClaims;
use entity::Id;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use service::config::Config;

// re-export the Jwt struct from the entity module
pub use entity::jwt::Jwt;

pub(crate) mod claims;

/// Who a verified token was issued to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub is_admin: bool,
}

fn signing_secret(config: &Config) -> Result<&str, Error> {
    config
        .jwt_secret()
        .ok_or_else(|| Error::config("no JWT secret configured"))
}

/// Issues a token for `user_id` that expires after the configured lifetime.
pub fn generate_token(config: &Config, user_id: Id, is_admin: bool) -> Result<Jwt, Error> {
    let secret = signing_secret(config)?;

    let issued_at = Utc::now().timestamp().max(0) as u64;
    let claims = AuthClaims {
        sub: user_id.to_string(),
        admin: is_admin,
        iat: issued_at,
        exp: issued_at + config.jwt_expiry_seconds,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        warn!("Failed to encode JWT: {e}");
        Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "JWT encoding related error".to_string(),
            )),
        }
    })?;

    Ok(Jwt {
        token,
        sub: claims.sub,
    })
}

/// Checks signature and expiry of `token` and returns the identity it carries.
pub fn verify_token(config: &Config, token: &str) -> Result<Identity, Error> {
    let secret = signing_secret(config)?;

    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<AuthClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    if data.claims.sub.is_empty() {
        debug!("Rejecting token without a subject");
        return Err(Error::unauthenticated());
    }

    Ok(Identity {
        subject: data.claims.sub,
        is_admin: data.claims.admin,
    })
}
