//! Authentication Service
//!
//! Handles local authentication, session management, and the per-session
//! active role.

mod error;
mod handlers;
pub mod jwt;
mod middleware;
mod password;

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sha2::{Digest, Sha256};

use crate::api::AppState;

pub use error::{AuthError, AuthResult};
pub use middleware::{require_auth, AuthUser};

/// SHA256 hex digest of a token, for session storage. Only hashes touch
/// the database; the raw refresh token never does.
#[must_use]
pub fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Create authentication router.
///
/// Public routes (no auth required):
/// - POST /register - Register a new account
/// - POST /login - Login with username/password
/// - POST /refresh - Refresh access token
///
/// Protected routes (auth required):
/// - POST /logout - Invalidate session
/// - GET /me - Get current profile and role picture
/// - POST /me - Update profile
/// - POST /role - Switch the session's active role
pub fn router(state: AppState) -> Router<AppState> {
    let public_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh_token));

    let protected_routes = Router::new()
        .route("/logout", post(handlers::logout))
        .route("/me", get(handlers::get_profile))
        .route("/me", post(handlers::update_profile))
        .route("/role", post(handlers::switch_role))
        .layer(axum_middleware::from_fn_with_state(state, require_auth));

    public_routes.merge(protected_routes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = hash_token("some-refresh-token");
        let b = hash_token("some-refresh-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_differs_per_token() {
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }
}
