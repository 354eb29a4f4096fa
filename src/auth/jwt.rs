use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

/// JWT payload of a session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub email: String, // subject
    pub iat: i64,      // issued at (unix timestamp)
    pub exp: i64,      // expires at (unix timestamp)
}

#[derive(Debug, Error)]
pub enum SigningError {
    #[error("signing key is empty")]
    EmptyKey,
    #[error("token validity must be at least one second and keep expiry in range, got {0}")]
    InvalidValidity(Duration),
    #[error("token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token signature mismatch")]
    BadSignature,
    #[error("malformed token")]
    Malformed,
}

/// Session-token minting capability consumed by the login workflow.
pub trait TokenIssuer: Send + Sync {
    fn issue_token(&self, email: &str, key: &str) -> Result<String, SigningError>;
}

/// HS256 issuer with a fixed validity window.
#[derive(Debug, Clone, Copy)]
pub struct JwtIssuer {
    validity: Duration,
}

impl JwtIssuer {
    pub fn new(validity: Duration) -> Self {
        Self { validity }
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue_token(&self, email: &str, key: &str) -> Result<String, SigningError> {
        issue(email, key, self.validity)
    }
}

pub fn issue(email: &str, key: &str, validity: Duration) -> Result<String, SigningError> {
    issue_at(email, key, validity, OffsetDateTime::now_utc())
}

/// Signs a token for `email` that expires `validity` after `issued_at`.
pub fn issue_at(
    email: &str,
    key: &str,
    validity: Duration,
    issued_at: OffsetDateTime,
) -> Result<String, SigningError> {
    if key.is_empty() {
        return Err(SigningError::EmptyKey);
    }
    // claims hold whole seconds
    if validity < Duration::SECOND {
        return Err(SigningError::InvalidValidity(validity));
    }

    let exp = issued_at
        .checked_add(validity)
        .ok_or(SigningError::InvalidValidity(validity))?;
    let claims = Claims {
        email: email.to_owned(),
        iat: issued_at.unix_timestamp(),
        exp: exp.unix_timestamp(),
    };
    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(key.as_bytes()),
    )?;
    debug!(email = %email, exp = claims.exp, "jwt signed");
    Ok(token)
}

pub fn verify(token: &str, key: &str) -> Result<String, TokenError> {
    verify_at(token, key, OffsetDateTime::now_utc())
}

/// Checks signature and expiry against `now`, returning the subject email.
/// A token is expired from the instant `now` reaches `exp`; there is no leeway.
pub fn verify_at(token: &str, key: &str, now: OffsetDateTime) -> Result<String, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    // expiry is compared against `now` below
    validation.validate_exp = false;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(key.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::BadSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

    if now.unix_timestamp() >= data.claims.exp {
        return Err(TokenError::Expired);
    }
    debug!(email = %data.claims.email, "jwt verified");
    Ok(data.claims.email)
}
