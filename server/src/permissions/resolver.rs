//! Role hierarchy resolution.
//!
//! Pure decision functions over the fixed role lattice. Higher-ranked
//! roles subsume everything a lower-ranked role may do, so every check
//! reduces to a rank comparison. No state, no I/O; safe from any number
//! of concurrent callers.

use thiserror::Error;

use super::role::Role;

/// Errors from the role resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoleError {
    /// A role name outside the closed role set.
    #[error("unknown role: {0}")]
    UnknownRole(String),

    /// An operation that needs at least one role received none.
    #[error("role set is empty")]
    EmptyRoleSet,
}

/// Anything gated behind a single required role.
///
/// Presentation code tags items (navigation entries, dashboard sections)
/// with the role needed to see them; [`filter_by_access`] does the rest.
pub trait RoleGated {
    /// The minimum role required to access this item.
    fn required_role(&self) -> Role;
}

/// True iff `subject` is at least as privileged as `required`.
#[must_use]
pub const fn has_permission(subject: Role, required: Role) -> bool {
    subject.rank() >= required.rank()
}

/// Route-guard entry point. Identical contract to [`has_permission`];
/// kept separately named for call-site clarity.
#[must_use]
pub const fn can_access_route(subject: Role, route_role: Role) -> bool {
    has_permission(subject, route_role)
}

/// The closure of `subject`: every role it is entitled to act as,
/// ordered from its own rank downward.
#[must_use]
pub const fn accessible_roles(subject: Role) -> &'static [Role] {
    match subject {
        Role::Owner => &[Role::Owner, Role::Professional, Role::Client],
        Role::Professional => &[Role::Professional, Role::Client],
        Role::Client => &[Role::Client],
    }
}

/// The maximum-rank element of a granted-role set.
///
/// Ranks are unique per role, so ties cannot occur. An empty set is a
/// caller bug and fails with [`RoleError::EmptyRoleSet`].
pub fn highest_role(roles: &[Role]) -> Result<Role, RoleError> {
    roles
        .iter()
        .copied()
        .max_by_key(|r| r.rank())
        .ok_or(RoleError::EmptyRoleSet)
}

/// Human-readable summary of what `subject` may access. Presentational
/// only; nothing decides on this string.
#[must_use]
pub fn describe_permissions(subject: Role) -> String {
    let reachable: Vec<&str> = accessible_roles(subject)
        .iter()
        .map(|r| r.as_str())
        .collect();
    format!(
        "{} (rank {}): can act as {}",
        subject,
        subject.rank(),
        reachable.join(", ")
    )
}

/// Keep the items `subject` may access, preserving the original order.
#[must_use]
pub fn filter_by_access<T: RoleGated>(items: Vec<T>, subject: Role) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| has_permission(subject, item.required_role()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Gated {
        label: &'static str,
        role: Role,
    }

    impl RoleGated for Gated {
        fn required_role(&self) -> Role {
            self.role
        }
    }

    #[test]
    fn test_has_permission_matches_rank_comparison() {
        for a in Role::all() {
            for b in Role::all() {
                assert_eq!(
                    has_permission(*a, *b),
                    a.rank() >= b.rank(),
                    "has_permission({a}, {b}) disagrees with rank order"
                );
            }
        }
    }

    #[test]
    fn test_owner_dominates_client() {
        assert!(has_permission(Role::Owner, Role::Client));
    }

    #[test]
    fn test_client_cannot_act_as_professional() {
        assert!(!has_permission(Role::Client, Role::Professional));
    }

    #[test]
    fn test_professional_dominates_client() {
        assert!(has_permission(Role::Professional, Role::Client));
    }

    #[test]
    fn test_client_cannot_act_as_owner() {
        assert!(!has_permission(Role::Client, Role::Owner));
    }

    #[test]
    fn test_every_role_dominates_itself() {
        for role in Role::all() {
            assert!(has_permission(*role, *role));
        }
    }

    #[test]
    fn test_can_access_route_is_has_permission() {
        for a in Role::all() {
            for b in Role::all() {
                assert_eq!(can_access_route(*a, *b), has_permission(*a, *b));
            }
        }
    }

    #[test]
    fn test_accessible_roles_owner() {
        assert_eq!(
            accessible_roles(Role::Owner),
            &[Role::Owner, Role::Professional, Role::Client]
        );
    }

    #[test]
    fn test_accessible_roles_professional() {
        assert_eq!(
            accessible_roles(Role::Professional),
            &[Role::Professional, Role::Client]
        );
    }

    #[test]
    fn test_accessible_roles_client() {
        assert_eq!(accessible_roles(Role::Client), &[Role::Client]);
    }

    #[test]
    fn test_closure_is_exactly_roles_at_or_below_rank_descending() {
        for subject in Role::all() {
            let closure = accessible_roles(*subject);

            // Exactly the roles with rank <= rank(subject).
            let mut expected: Vec<Role> = Role::all()
                .iter()
                .copied()
                .filter(|r| r.rank() <= subject.rank())
                .collect();
            expected.sort_by_key(|r| std::cmp::Reverse(r.rank()));

            assert_eq!(closure, expected.as_slice());
        }
    }

    #[test]
    fn test_highest_role_picks_max_rank() {
        assert_eq!(
            highest_role(&[Role::Client, Role::Professional]).unwrap(),
            Role::Professional
        );
        assert_eq!(
            highest_role(&[Role::Client, Role::Owner]).unwrap(),
            Role::Owner
        );
        assert_eq!(highest_role(&[Role::Owner]).unwrap(), Role::Owner);
    }

    #[test]
    fn test_highest_role_is_order_independent() {
        assert_eq!(
            highest_role(&[Role::Owner, Role::Client]).unwrap(),
            highest_role(&[Role::Client, Role::Owner]).unwrap()
        );
    }

    #[test]
    fn test_highest_role_rejects_empty_set() {
        assert_eq!(highest_role(&[]).unwrap_err(), RoleError::EmptyRoleSet);
    }

    #[test]
    fn test_filter_by_access_keeps_dominated_items_in_order() {
        let items = vec![
            Gated { label: "finances", role: Role::Owner },
            Gated { label: "book", role: Role::Client },
            Gated { label: "calendar", role: Role::Professional },
            Gated { label: "profile", role: Role::Client },
        ];

        let visible = filter_by_access(items, Role::Professional);
        let labels: Vec<&str> = visible.iter().map(|i| i.label).collect();
        assert_eq!(labels, vec!["book", "calendar", "profile"]);
    }

    #[test]
    fn test_filter_by_access_owner_sees_everything() {
        let items = vec![
            Gated { label: "finances", role: Role::Owner },
            Gated { label: "book", role: Role::Client },
        ];
        assert_eq!(filter_by_access(items.clone(), Role::Owner), items);
    }

    #[test]
    fn test_filter_by_access_client_sees_only_client_items() {
        let items = vec![
            Gated { label: "finances", role: Role::Owner },
            Gated { label: "calendar", role: Role::Professional },
        ];
        assert!(filter_by_access(items, Role::Client).is_empty());
    }

    #[test]
    fn test_describe_permissions_lists_the_closure() {
        let summary = describe_permissions(Role::Owner);
        assert!(summary.contains("owner"));
        assert!(summary.contains("professional"));
        assert!(summary.contains("client"));

        let client_summary = describe_permissions(Role::Client);
        assert!(client_summary.contains("client"));
        assert!(!client_summary.contains("owner"));
    }

    #[test]
    fn test_operations_are_idempotent() {
        // Pure functions: identical inputs, identical outputs, every time.
        for a in Role::all() {
            for b in Role::all() {
                assert_eq!(has_permission(*a, *b), has_permission(*a, *b));
            }
            assert_eq!(accessible_roles(*a), accessible_roles(*a));
            assert_eq!(describe_permissions(*a), describe_permissions(*a));
        }
        let set = [Role::Client, Role::Owner];
        assert_eq!(highest_role(&set), highest_role(&set));
    }

    #[test]
    fn test_role_error_display() {
        assert_eq!(
            RoleError::UnknownRole("admin".into()).to_string(),
            "unknown role: admin"
        );
        assert_eq!(RoleError::EmptyRoleSet.to_string(), "role set is empty");
    }
}
