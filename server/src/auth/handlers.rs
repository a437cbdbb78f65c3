//! Authentication HTTP Handlers

use axum::extract::State;
use axum::http::header::USER_AGENT;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use bk_common::UserProfile;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::error::{AuthError, AuthResult};
use super::hash_token;
use super::jwt::{generate_token_pair, validate_refresh_token, TokenPair};
use super::middleware::AuthUser;
use super::password::{hash_password, verify_password};
use crate::api::AppState;
use crate::db::{
    create_session, delete_session_by_token_hash, email_exists, find_session_by_token_hash,
    find_user_by_id, find_user_by_username, update_user_profile, username_exists, User,
};
use crate::permissions::{
    accessible_roles, describe_permissions, highest_role, list_granted_roles, Role,
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Username (3-32 lowercase alphanumeric + underscore).
    #[validate(length(min = 3, max = 32))]
    pub username: String,
    /// Email address (optional).
    #[validate(email)]
    pub email: Option<String>,
    /// Password (8-128 characters).
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Display name (optional, defaults to username).
    #[validate(length(max = 64))]
    pub display_name: Option<String>,
    /// Contact phone number (optional).
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Token refresh request.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Logout request.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    /// Refresh token to invalidate.
    pub refresh_token: String,
}

/// Active-role switch request.
#[derive(Debug, Deserialize)]
pub struct SwitchRoleRequest {
    /// The granted role to operate as from now on.
    pub role: Role,
}

/// Authentication response with tokens.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    /// Access token (short-lived).
    pub access_token: String,
    /// Refresh token (long-lived).
    pub refresh_token: String,
    /// Access token expiry in seconds.
    pub expires_in: i64,
    /// Token type (always "Bearer").
    pub token_type: String,
    /// The role this session operates as.
    pub active_role: Role,
}

/// Current-user response.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// Public profile.
    pub profile: UserProfile,
    /// Every role granted to the account.
    pub granted_roles: Vec<Role>,
    /// The session's active role.
    pub active_role: Role,
    /// Roles the active role may act as, highest first.
    pub accessible_roles: Vec<Role>,
    /// Presentational summary of the active role's reach.
    pub permissions_summary: String,
}

/// Update profile request.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name (1-64 characters).
    #[validate(length(min = 1, max = 64))]
    pub display_name: Option<String>,
    /// New email address.
    #[validate(email)]
    pub email: Option<String>,
    /// New contact phone number.
    #[validate(length(max = 32))]
    pub phone: Option<String>,
}

// ============================================================================
// Regex for validation
// ============================================================================

/// Username validation regex (matches DB constraint).
static USERNAME_REGEX: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"^[a-z0-9_]{3,32}$").unwrap());

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract User-Agent from headers (sanitized and truncated to 512 chars
/// for DB storage).
fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| {
            s.chars()
                .filter(|c| !c.is_control() || c.is_whitespace())
                .take(512)
                .collect()
        })
}

/// Store the refresh token's session row.
async fn persist_session(
    state: &AppState,
    pair: &TokenPair,
    user_id: uuid::Uuid,
    user_agent: Option<&str>,
) -> AuthResult<()> {
    let token_hash = hash_token(&pair.refresh_token);
    let expires_at = Utc::now() + Duration::seconds(state.config.jwt_refresh_expiry);
    create_session(
        &state.db,
        pair.refresh_token_id,
        user_id,
        &token_hash,
        expires_at,
        user_agent,
    )
    .await?;
    Ok(())
}

fn auth_response(pair: TokenPair, active_role: Role) -> AuthResponse {
    AuthResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        expires_in: pair.access_expires_in,
        token_type: "Bearer".to_string(),
        active_role,
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Register a new account.
///
/// Every account starts with the `client` role; further roles arrive
/// through business creation and staff linking. The user row and the
/// initial grant are written in one transaction.
///
/// POST /auth/register
#[tracing::instrument(skip(state, body), fields(username = %body.username))]
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> AuthResult<Json<AuthResponse>> {
    // Validate input first
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;
    if !USERNAME_REGEX.is_match(&body.username) {
        return Err(AuthError::Validation(
            "Username must be 3-32 lowercase alphanumeric or underscore characters".to_string(),
        ));
    }

    // Check username uniqueness (outside transaction - UNIQUE constraint will catch races)
    if username_exists(&state.db, &body.username).await? {
        return Err(AuthError::UserAlreadyExists);
    }

    // Check email uniqueness (if provided)
    if let Some(ref email) = body.email {
        if email_exists(&state.db, email).await? {
            return Err(AuthError::UserAlreadyExists);
        }
    }

    // Hash password
    let password_hash = hash_password(&body.password)?;

    // Set display name (default to username if not provided)
    let display_name = body.display_name.as_deref().unwrap_or(&body.username);

    // User row + initial client grant, atomically
    let mut tx = state.db.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r"
        INSERT INTO users (username, display_name, email, phone, password_hash)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(&body.username)
    .bind(display_name)
    .bind(body.email.as_deref())
    .bind(body.phone.as_deref())
    .bind(&password_hash)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO role_grants (user_id, role) VALUES ($1, 'client')")
        .bind(user.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, "Account registered");

    let pair = generate_token_pair(
        user.id,
        Role::Client,
        &state.config.jwt_secret,
        state.config.jwt_access_expiry,
        state.config.jwt_refresh_expiry,
    )?;
    persist_session(&state, &pair, user.id, extract_user_agent(&headers).as_deref()).await?;

    Ok(Json(auth_response(pair, Role::Client)))
}

/// Login with username and password.
///
/// The session's initial active role is the most privileged granted role;
/// the resolver decides which one that is.
///
/// POST /auth/login
#[tracing::instrument(skip(state, body), fields(username = %body.username))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>> {
    let user = find_user_by_username(&state.db, &body.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials);
    }

    let granted = list_granted_roles(&state.db, user.id).await?;
    let active_role = highest_role(&granted)?;

    let pair = generate_token_pair(
        user.id,
        active_role,
        &state.config.jwt_secret,
        state.config.jwt_access_expiry,
        state.config.jwt_refresh_expiry,
    )?;
    persist_session(&state, &pair, user.id, extract_user_agent(&headers).as_deref()).await?;

    tracing::info!(user_id = %user.id, active_role = %active_role, "Login succeeded");

    Ok(Json(auth_response(pair, active_role)))
}

/// Exchange a refresh token for a new token pair (rotation).
///
/// POST /auth/refresh
#[tracing::instrument(skip(state, body))]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RefreshRequest>,
) -> AuthResult<Json<AuthResponse>> {
    let claims = validate_refresh_token(&body.refresh_token, &state.config.jwt_secret)?;
    let user_id: uuid::Uuid = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

    // The token must map to a live session row
    let token_hash = hash_token(&body.refresh_token);
    let session = find_session_by_token_hash(&state.db, &token_hash)
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if session.expires_at < Utc::now() {
        delete_session_by_token_hash(&state.db, &token_hash).await?;
        return Err(AuthError::TokenExpired);
    }

    // A role revoked since issue invalidates the claim; the client must
    // log in again and pick a still-granted role.
    let granted = list_granted_roles(&state.db, user_id).await?;
    if !granted.contains(&claims.role) {
        delete_session_by_token_hash(&state.db, &token_hash).await?;
        return Err(AuthError::RoleNotGranted(claims.role));
    }

    // Rotate: old session out, new session in
    delete_session_by_token_hash(&state.db, &token_hash).await?;

    let pair = generate_token_pair(
        user_id,
        claims.role,
        &state.config.jwt_secret,
        state.config.jwt_access_expiry,
        state.config.jwt_refresh_expiry,
    )?;
    persist_session(&state, &pair, user_id, extract_user_agent(&headers).as_deref()).await?;

    Ok(Json(auth_response(pair, claims.role)))
}

/// Invalidate a refresh token.
///
/// POST /auth/logout
#[tracing::instrument(skip(state, body))]
pub async fn logout(
    State(state): State<AppState>,
    Json(body): Json<LogoutRequest>,
) -> AuthResult<StatusCode> {
    delete_session_by_token_hash(&state.db, &hash_token(&body.refresh_token)).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Switch the session's active role.
///
/// The target role must already be granted; switching never escalates.
/// Issues a fresh token pair carrying the new role.
///
/// POST /auth/role
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn switch_role(
    State(state): State<AppState>,
    auth: AuthUser,
    headers: HeaderMap,
    Json(body): Json<SwitchRoleRequest>,
) -> AuthResult<Json<AuthResponse>> {
    if !auth.roles.holds(body.role) {
        return Err(AuthError::RoleNotGranted(body.role));
    }

    let pair = generate_token_pair(
        auth.id,
        body.role,
        &state.config.jwt_secret,
        state.config.jwt_access_expiry,
        state.config.jwt_refresh_expiry,
    )?;
    persist_session(&state, &pair, auth.id, extract_user_agent(&headers).as_deref()).await?;

    tracing::info!(user_id = %auth.id, active_role = %body.role, "Active role switched");

    Ok(Json(auth_response(pair, body.role)))
}

/// Get the current user's profile and role picture.
///
/// GET /auth/me
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AuthResult<Json<MeResponse>> {
    let user = find_user_by_id(&state.db, auth.id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let active = auth.roles.active;
    Ok(Json(MeResponse {
        profile: UserProfile::from(user),
        granted_roles: auth.roles.granted,
        active_role: active,
        accessible_roles: accessible_roles(active).to_vec(),
        permissions_summary: describe_permissions(active),
    }))
}

/// Update the current user's profile.
///
/// POST /auth/me
#[tracing::instrument(skip(state, body), fields(user_id = %auth.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserProfile>> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;

    if let Some(ref email) = body.email {
        if email_exists(&state.db, email).await? {
            return Err(AuthError::UserAlreadyExists);
        }
    }

    let user = update_user_profile(
        &state.db,
        auth.id,
        body.display_name.as_deref(),
        body.email.as_deref(),
        body.phone.as_deref(),
    )
    .await?;

    Ok(Json(UserProfile::from(user)))
}
