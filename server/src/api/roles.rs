//! Account role overview endpoint.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::AppState;
use crate::auth::{AuthResult, AuthUser};
use crate::permissions::{
    accessible_roles, can_access_route, describe_permissions, list_role_grants, Role, RoleGrant,
};

/// Whether the active role may enter the route area gated by `role`.
#[derive(Debug, Serialize)]
pub struct RouteAccess {
    pub role: Role,
    pub allowed: bool,
}

/// Everything a client needs to render the role picture.
#[derive(Debug, Serialize)]
pub struct RoleOverview {
    /// Grant rows, oldest first, with provenance.
    pub grants: Vec<RoleGrant>,
    /// The session's active role.
    pub active_role: Role,
    /// Closure of the active role, highest first.
    pub accessible_roles: Vec<Role>,
    /// Route areas and whether the active role may enter them.
    pub route_access: Vec<RouteAccess>,
    /// Presentational summary of the active role's reach.
    pub summary: String,
}

/// The caller's granted roles, active role, and what it can reach.
///
/// `GET /api/me/roles`
#[tracing::instrument(skip(state), fields(user_id = %auth.id))]
pub async fn get_role_overview(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AuthResult<Json<RoleOverview>> {
    let grants = list_role_grants(&state.db, auth.id).await?;
    let active = auth.roles.active;

    let route_access = Role::all()
        .iter()
        .map(|role| RouteAccess {
            role: *role,
            allowed: can_access_route(active, *role),
        })
        .collect();

    Ok(Json(RoleOverview {
        grants,
        active_role: active,
        accessible_roles: accessible_roles(active).to_vec(),
        route_access,
        summary: describe_permissions(active),
    }))
}
