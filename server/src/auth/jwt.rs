//! JWT Token Generation and Validation
//!
//! HS256 tokens signed with the configured server secret. Claims carry the
//! session's active role so every request knows which role the user is
//! currently operating as without an extra lookup.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::Role;

use super::error::{AuthError, AuthResult};

/// JWT claims for access and refresh tokens.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID as UUID string).
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
    /// Token type (access or refresh).
    pub typ: TokenType,
    /// The session's active role.
    pub role: Role,
    /// JWT ID for refresh token revocation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Token type discriminator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived access token.
    Access,
    /// Long-lived refresh token.
    Refresh,
}

/// Token pair returned after successful authentication.
#[derive(Debug)]
pub struct TokenPair {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiry in seconds.
    pub access_expires_in: i64,
    /// Refresh token ID for session tracking.
    pub refresh_token_id: Uuid,
}

/// Generate both access and refresh tokens.
///
/// # Arguments
/// * `user_id` - The user's UUID
/// * `active_role` - The role this session operates as
/// * `secret` - HS256 signing secret
/// * `access_expiry_seconds` - Access token validity (typically 900 = 15 min)
/// * `refresh_expiry_seconds` - Refresh token validity (typically 604800 = 7 days)
pub fn generate_token_pair(
    user_id: Uuid,
    active_role: Role,
    secret: &str,
    access_expiry_seconds: i64,
    refresh_expiry_seconds: i64,
) -> AuthResult<TokenPair> {
    let now = Utc::now();
    let refresh_token_id = Uuid::now_v7();
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    // Access token
    let access_claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(access_expiry_seconds)).timestamp(),
        iat: now.timestamp(),
        typ: TokenType::Access,
        role: active_role,
        jti: None,
    };

    let access_token = encode(&Header::new(Algorithm::HS256), &access_claims, &encoding_key)?;

    // Refresh token (includes jti for revocation tracking)
    let refresh_claims = Claims {
        sub: user_id.to_string(),
        exp: (now + Duration::seconds(refresh_expiry_seconds)).timestamp(),
        iat: now.timestamp(),
        typ: TokenType::Refresh,
        role: active_role,
        jti: Some(refresh_token_id.to_string()),
    };

    let refresh_token = encode(&Header::new(Algorithm::HS256), &refresh_claims, &encoding_key)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
        access_expires_in: access_expiry_seconds,
        refresh_token_id,
    })
}

fn decode_claims(token: &str, secret: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// Validate and decode an access token.
///
/// Returns an error if the token is invalid, expired, or is a refresh token.
pub fn validate_access_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let claims = decode_claims(token, secret)?;
    if claims.typ != TokenType::Access {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

/// Validate and decode a refresh token.
///
/// Returns an error if the token is invalid, expired, or is an access token.
pub fn validate_refresh_token(token: &str, secret: &str) -> AuthResult<Claims> {
    let claims = decode_claims(token, secret)?;
    if claims.typ != TokenType::Refresh {
        return Err(AuthError::InvalidToken);
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_token_pair_round_trip() {
        let user_id = Uuid::now_v7();
        let pair = generate_token_pair(user_id, Role::Professional, SECRET, 900, 3600).unwrap();

        let access = validate_access_token(&pair.access_token, SECRET).unwrap();
        assert_eq!(access.sub, user_id.to_string());
        assert_eq!(access.role, Role::Professional);
        assert_eq!(access.typ, TokenType::Access);
        assert!(access.jti.is_none());

        let refresh = validate_refresh_token(&pair.refresh_token, SECRET).unwrap();
        assert_eq!(refresh.role, Role::Professional);
        assert_eq!(refresh.jti, Some(pair.refresh_token_id.to_string()));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let pair = generate_token_pair(Uuid::now_v7(), Role::Client, SECRET, 900, 3600).unwrap();
        let err = validate_access_token(&pair.refresh_token, SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let pair = generate_token_pair(Uuid::now_v7(), Role::Client, SECRET, 900, 3600).unwrap();
        let err = validate_refresh_token(&pair.access_token, SECRET).unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_expired_token_rejected() {
        let pair = generate_token_pair(Uuid::now_v7(), Role::Client, SECRET, -60, -60).unwrap();
        let err = validate_access_token(&pair.access_token, SECRET).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let pair = generate_token_pair(Uuid::now_v7(), Role::Owner, SECRET, 900, 3600).unwrap();
        let err = validate_access_token(&pair.access_token, "other-secret").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }
}
