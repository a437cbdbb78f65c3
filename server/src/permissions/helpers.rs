//! Role helpers for API handlers.
//!
//! Loads a user's granted roles once per request and answers hierarchy
//! checks against the session's active role.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use super::queries::list_granted_roles;
use super::resolver::{self, RoleError};
use super::role::Role;

/// The active role does not dominate the role a gate requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("active role '{active}' does not satisfy required role '{required}'")]
pub struct InsufficientRole {
    pub active: Role,
    pub required: Role,
}

/// Per-request role context: the granted set plus the session's active
/// role. All hierarchy decisions go through the resolver.
#[derive(Debug, Clone)]
pub struct RoleContext {
    /// The user this context belongs to.
    pub user_id: Uuid,
    /// Every role granted to the user.
    pub granted: Vec<Role>,
    /// The role the session is currently operating as.
    pub active: Role,
}

impl RoleContext {
    /// Whether the active role dominates `required`.
    #[must_use]
    pub const fn has_permission(&self, required: Role) -> bool {
        resolver::has_permission(self.active, required)
    }

    /// Require that the active role dominates `required`.
    pub const fn require(&self, required: Role) -> Result<(), InsufficientRole> {
        if self.has_permission(required) {
            Ok(())
        } else {
            Err(InsufficientRole {
                active: self.active,
                required,
            })
        }
    }

    /// Whether the user holds `role` in their granted set (ignores the
    /// active role).
    #[must_use]
    pub fn holds(&self, role: Role) -> bool {
        self.granted.contains(&role)
    }

    /// The most privileged granted role. Every account holds at least
    /// `client`, so an empty set signals a data bug upstream.
    pub fn highest_granted(&self) -> Result<Role, RoleError> {
        resolver::highest_role(&self.granted)
    }
}

/// Load the role context for a user with a known active role.
#[tracing::instrument(skip(pool))]
pub async fn load_role_context(
    pool: &PgPool,
    user_id: Uuid,
    active: Role,
) -> sqlx::Result<RoleContext> {
    let granted = list_granted_roles(pool, user_id).await?;
    Ok(RoleContext {
        user_id,
        granted,
        active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(granted: Vec<Role>, active: Role) -> RoleContext {
        RoleContext {
            user_id: Uuid::now_v7(),
            granted,
            active,
        }
    }

    #[test]
    fn test_active_role_drives_permission_checks() {
        // Owner account operating as client: client-rank checks only.
        let c = ctx(vec![Role::Client, Role::Owner], Role::Client);
        assert!(c.has_permission(Role::Client));
        assert!(!c.has_permission(Role::Professional));
        assert!(!c.has_permission(Role::Owner));
    }

    #[test]
    fn test_require_passes_and_fails_by_rank() {
        let c = ctx(vec![Role::Client, Role::Professional], Role::Professional);
        assert!(c.require(Role::Client).is_ok());
        assert!(c.require(Role::Professional).is_ok());

        let err = c.require(Role::Owner).unwrap_err();
        assert_eq!(err.active, Role::Professional);
        assert_eq!(err.required, Role::Owner);
    }

    #[test]
    fn test_holds_checks_grants_not_active_role() {
        let c = ctx(vec![Role::Client, Role::Owner], Role::Client);
        assert!(c.holds(Role::Owner));
        assert!(!c.holds(Role::Professional));
    }

    #[test]
    fn test_highest_granted() {
        let c = ctx(vec![Role::Client, Role::Professional], Role::Client);
        assert_eq!(c.highest_granted().unwrap(), Role::Professional);

        let empty = ctx(vec![], Role::Client);
        assert_eq!(empty.highest_granted().unwrap_err(), RoleError::EmptyRoleSet);
    }

    #[test]
    fn test_insufficient_role_display() {
        let err = InsufficientRole {
            active: Role::Client,
            required: Role::Owner,
        };
        assert!(err.to_string().contains("client"));
        assert!(err.to_string().contains("owner"));
    }
}
