//! Session tokens for voters and the election admin
//!
//! HS256 JWTs with a 24 hour expiry, carried in the `x-access-token`
//! header. Voter tokens name the voter id; admin tokens carry the `admin`
//! flag instead.

use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiState};

pub const TOKEN_HEADER: &str = "x-access-token";

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voter_id: Option<String>,
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
}

pub fn issue_voter_token(secret: &str, voter_id: &str) -> Result<String, ApiError> {
    issue(
        secret,
        &Claims {
            voter_id: Some(voter_id.to_string()),
            admin: false,
            exp: expiry(TOKEN_LIFETIME_HOURS),
        },
    )
}

pub fn issue_admin_token(secret: &str) -> Result<String, ApiError> {
    issue(
        secret,
        &Claims {
            voter_id: None,
            admin: true,
            exp: expiry(TOKEN_LIFETIME_HOURS),
        },
    )
}

/// Extract and verify a voter token, returning the voter id it names.
pub fn require_voter(state: &ApiState, headers: &HeaderMap) -> Result<String, ApiError> {
    let claims = verify(&state.jwt_secret, token_from_headers(headers)?)?;
    claims.voter_id.ok_or(ApiError::InvalidToken)
}

/// Extract and verify an admin token.
pub fn require_admin(state: &ApiState, headers: &HeaderMap) -> Result<(), ApiError> {
    let claims = verify(&state.jwt_secret, token_from_headers(headers)?)?;
    if !claims.admin {
        return Err(ApiError::AdminRequired);
    }
    Ok(())
}

pub fn verify(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::InvalidToken)
}

fn token_from_headers(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::MissingToken)
}

fn issue(secret: &str, claims: &Claims) -> Result<String, ApiError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.to_string()))
}

fn expiry(hours: i64) -> i64 {
    (Utc::now() + Duration::hours(hours)).timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn voter_token_round_trip() {
        let token = issue_voter_token(SECRET, "v-1").unwrap();
        let claims = verify(SECRET, &token).unwrap();
        assert_eq!(claims.voter_id.as_deref(), Some("v-1"));
        assert!(!claims.admin);
    }

    #[test]
    fn admin_token_round_trip() {
        let token = issue_admin_token(SECRET).unwrap();
        let claims = verify(SECRET, &token).unwrap();
        assert!(claims.admin);
        assert!(claims.voter_id.is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_voter_token(SECRET, "v-1").unwrap();
        assert_eq!(
            verify("other-secret", &token).unwrap_err(),
            ApiError::InvalidToken
        );
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(
            verify(SECRET, "not-a-jwt").unwrap_err(),
            ApiError::InvalidToken
        );
    }

    #[test]
    fn expired_token_is_rejected() {
        let stale = Claims {
            voter_id: Some("v-1".to_string()),
            admin: false,
            exp: (Utc::now() - Duration::hours(1)).timestamp(),
        };
        let token = issue(SECRET, &stale).unwrap();
        assert_eq!(verify(SECRET, &token).unwrap_err(), ApiError::InvalidToken);
    }
}
