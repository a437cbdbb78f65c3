//! Business management handlers.
//!
//! A business is the tenant unit: one owner, any number of linked
//! professionals. Role grants ride on the lifecycle events here: creating
//! a business grants `owner`, linking staff grants `professional`.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use crate::api::AppState;
use crate::auth::AuthUser;
use crate::db::find_user_by_id;
use crate::permissions::{revoke_professional_if_unstaffed, InsufficientRole, Role};

use super::queries::{find_business, is_staff, list_businesses, list_staff, remove_staff_link};
use super::types::{
    AddStaffRequest, Business, CreateBusinessRequest, StaffMember, UpdateBusinessRequest,
};

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum BusinessError {
    #[error("Business not found")]
    NotFound,

    #[error("User not found")]
    UserNotFound,

    #[error("Only the business owner can do this")]
    NotOwner,

    #[error("User is already staff at this business")]
    AlreadyStaff,

    #[error("User is not staff at this business")]
    NotStaff,

    #[error(transparent)]
    Forbidden(#[from] InsufficientRole),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for BusinessError {
    fn into_response(self) -> Response {
        let (status, error) = match &self {
            Self::NotFound => (StatusCode::NOT_FOUND, "not_found"),
            Self::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            Self::NotOwner => (StatusCode::FORBIDDEN, "not_owner"),
            Self::AlreadyStaff => (StatusCode::CONFLICT, "already_staff"),
            Self::NotStaff => (StatusCode::NOT_FOUND, "not_staff"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "insufficient_role"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "validation"),
            Self::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database"),
        };
        let body = serde_json::json!({"error": error, "message": self.to_string()});
        (status, Json(body)).into_response()
    }
}

/// Load a business and require that `auth` owns it and is operating as
/// owner. Both gates apply: the role hierarchy and the tenant boundary.
async fn require_owned_business(
    state: &AppState,
    auth: &AuthUser,
    business_id: Uuid,
) -> Result<Business, BusinessError> {
    auth.roles.require(Role::Owner)?;

    let business = find_business(&state.db, business_id)
        .await?
        .ok_or(BusinessError::NotFound)?;

    if business.owner_user_id != auth.id {
        return Err(BusinessError::NotOwner);
    }

    Ok(business)
}

// ============================================================================
// Handlers
// ============================================================================

/// Create a business. The creator becomes its owner and receives the
/// `owner` role in the same transaction.
///
/// `POST /api/businesses`
#[tracing::instrument(skip(state, body), fields(user_id = %auth.id))]
pub async fn create_business(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(body): Json<CreateBusinessRequest>,
) -> Result<(StatusCode, Json<Business>), BusinessError> {
    body.validate()
        .map_err(|e| BusinessError::Validation(e.to_string()))?;

    let mut tx = state.db.begin().await?;

    let business = sqlx::query_as::<_, Business>(
        r"
        INSERT INTO businesses (owner_user_id, name, description, address)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        ",
    )
    .bind(auth.id)
    .bind(&body.name)
    .bind(body.description.as_deref())
    .bind(body.address.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query(
        r"
        INSERT INTO role_grants (user_id, role, granted_by)
        VALUES ($1, 'owner', $1)
        ON CONFLICT (user_id, role) DO NOTHING
        ",
    )
    .bind(auth.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(business_id = %business.id, owner = %auth.id, "Business created");

    Ok((StatusCode::CREATED, Json(business)))
}

/// List all businesses.
///
/// `GET /api/businesses`
#[tracing::instrument(skip(state))]
pub async fn list_all(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Business>>, BusinessError> {
    Ok(Json(list_businesses(&state.db).await?))
}

/// Get a single business.
///
/// `GET /api/businesses/{business_id}`
#[tracing::instrument(skip(state))]
pub async fn get_business(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<Business>, BusinessError> {
    let business = find_business(&state.db, business_id)
        .await?
        .ok_or(BusinessError::NotFound)?;
    Ok(Json(business))
}

/// Update a business. Owner only.
///
/// `PUT /api/businesses/{business_id}`
#[tracing::instrument(skip(state, body), fields(user_id = %auth.id))]
pub async fn update_business(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(business_id): Path<Uuid>,
    Json(body): Json<UpdateBusinessRequest>,
) -> Result<Json<Business>, BusinessError> {
    body.validate()
        .map_err(|e| BusinessError::Validation(e.to_string()))?;
    require_owned_business(&state, &auth, business_id).await?;

    let business = sqlx::query_as::<_, Business>(
        r"
        UPDATE businesses
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            address = COALESCE($4, address),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(business_id)
    .bind(body.name.as_deref())
    .bind(body.description.as_deref())
    .bind(body.address.as_deref())
    .fetch_one(&state.db)
    .await?;

    Ok(Json(business))
}

/// List the staff roster of a business.
///
/// `GET /api/businesses/{business_id}/staff`
#[tracing::instrument(skip(state))]
pub async fn get_staff(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(business_id): Path<Uuid>,
) -> Result<Json<Vec<StaffMember>>, BusinessError> {
    if find_business(&state.db, business_id).await?.is_none() {
        return Err(BusinessError::NotFound);
    }
    Ok(Json(list_staff(&state.db, business_id).await?))
}

/// Link a professional to a business. The `professional` role is granted
/// in the same transaction as the link.
///
/// `POST /api/businesses/{business_id}/staff`
#[tracing::instrument(skip(state, body), fields(user_id = %auth.id))]
pub async fn add_staff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(business_id): Path<Uuid>,
    Json(body): Json<AddStaffRequest>,
) -> Result<(StatusCode, Json<Vec<StaffMember>>), BusinessError> {
    require_owned_business(&state, &auth, business_id).await?;

    if find_user_by_id(&state.db, body.user_id).await?.is_none() {
        return Err(BusinessError::UserNotFound);
    }
    if is_staff(&state.db, business_id, body.user_id).await? {
        return Err(BusinessError::AlreadyStaff);
    }

    let mut tx = state.db.begin().await?;

    sqlx::query(
        r"
        INSERT INTO business_staff (business_id, user_id, added_by)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(business_id)
    .bind(body.user_id)
    .bind(auth.id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r"
        INSERT INTO role_grants (user_id, role, granted_by)
        VALUES ($1, 'professional', $2)
        ON CONFLICT (user_id, role) DO NOTHING
        ",
    )
    .bind(body.user_id)
    .bind(auth.id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(business_id = %business_id, staff_user = %body.user_id, "Staff linked");

    Ok((
        StatusCode::CREATED,
        Json(list_staff(&state.db, business_id).await?),
    ))
}

/// Unlink a professional. The `professional` role is revoked only when
/// the user staffs no other business.
///
/// `DELETE /api/businesses/{business_id}/staff/{user_id}`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn remove_staff(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((business_id, staff_user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, BusinessError> {
    require_owned_business(&state, &auth, business_id).await?;

    if !remove_staff_link(&state.db, business_id, staff_user_id).await? {
        return Err(BusinessError::NotStaff);
    }

    // The revoke statement re-checks the link table, so a concurrent
    // re-link elsewhere keeps the grant.
    let revoked = revoke_professional_if_unstaffed(&state.db, staff_user_id).await?;
    tracing::info!(
        business_id = %business_id,
        staff_user = %staff_user_id,
        role_revoked = revoked,
        "Staff unlinked"
    );

    Ok(StatusCode::NO_CONTENT)
}
