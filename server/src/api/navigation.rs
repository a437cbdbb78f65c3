//! Role-gated navigation manifest.
//!
//! The client renders whatever this returns; the filtering happens here,
//! against the session's active role, so a client switched to a lower
//! role sees the lower role's app.

use axum::Json;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::permissions::{filter_by_access, Role, RoleGated};

/// One navigation entry, tagged with the role required to see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub required_role: Role,
}

impl RoleGated for NavItem {
    fn required_role(&self) -> Role {
        self.required_role
    }
}

/// Full manifest, in display order.
const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        label: "Book an appointment",
        path: "/book",
        required_role: Role::Client,
    },
    NavItem {
        label: "My appointments",
        path: "/appointments",
        required_role: Role::Client,
    },
    NavItem {
        label: "My calendar",
        path: "/calendar",
        required_role: Role::Professional,
    },
    NavItem {
        label: "Record payment",
        path: "/payments/new",
        required_role: Role::Professional,
    },
    NavItem {
        label: "Staff",
        path: "/staff",
        required_role: Role::Owner,
    },
    NavItem {
        label: "Finances",
        path: "/finances",
        required_role: Role::Owner,
    },
];

/// The navigation entries visible to the session's active role, in the
/// manifest's original order.
///
/// `GET /api/me/navigation`
pub async fn get_navigation(auth: AuthUser) -> Json<Vec<NavItem>> {
    Json(filter_by_access(NAV_ITEMS.to_vec(), auth.roles.active))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_sees_only_client_entries() {
        let visible = filter_by_access(NAV_ITEMS.to_vec(), Role::Client);
        assert!(visible
            .iter()
            .all(|item| item.required_role == Role::Client));
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_owner_sees_the_full_manifest() {
        let visible = filter_by_access(NAV_ITEMS.to_vec(), Role::Owner);
        assert_eq!(visible.len(), NAV_ITEMS.len());
    }

    #[test]
    fn test_professional_filtering_preserves_order() {
        let visible = filter_by_access(NAV_ITEMS.to_vec(), Role::Professional);
        let paths: Vec<&str> = visible.iter().map(|i| i.path).collect();
        assert_eq!(
            paths,
            vec!["/book", "/appointments", "/calendar", "/payments/new"]
        );
    }
}
