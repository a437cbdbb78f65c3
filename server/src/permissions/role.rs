//! The account role lattice.
//!
//! Three roles, totally ordered by privilege:
//! client (1) < professional (2) < owner (3).
//!
//! The rank table is an exhaustive `match` over the closed enum. Adding a
//! role is a compile error until every mapping below is updated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::resolver::RoleError;

/// An account role. Stored as the `role_kind` enum in PostgreSQL.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "role_kind", rename_all = "lowercase")]
pub enum Role {
    /// Books appointments.
    Client,
    /// Performs services; linked to a business as staff.
    Professional,
    /// Runs one or more businesses.
    Owner,
}

impl Role {
    /// Ordinal privilege rank, strictly increasing with privilege.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Client => 1,
            Self::Professional => 2,
            Self::Owner => 3,
        }
    }

    /// All roles, ascending by rank.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Client, Self::Professional, Self::Owner]
    }

    /// Wire/database name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Professional => "professional",
            Self::Owner => "owner",
        }
    }

    /// Human-readable summary of what the role is for.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Client => "Book appointments and manage own bookings",
            Self::Professional => "Run a service calendar and record payments",
            Self::Owner => "Manage businesses, staff, and finances",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleError;

    /// Parse a role name. Unknown names fail fast; they never default to
    /// some access level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Self::Client),
            "professional" => Ok(Self::Professional),
            "owner" => Ok(Self::Owner),
            other => Err(RoleError::UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks_strictly_increase_with_privilege() {
        assert_eq!(Role::Client.rank(), 1);
        assert_eq!(Role::Professional.rank(), 2);
        assert_eq!(Role::Owner.rank(), 3);
    }

    #[test]
    fn test_ranks_are_unique() {
        let ranks: Vec<u8> = Role::all().iter().map(|r| r.rank()).collect();
        let mut deduped = ranks.clone();
        deduped.dedup();
        assert_eq!(ranks, deduped);
    }

    #[test]
    fn test_all_is_ascending_by_rank() {
        let ranks: Vec<u8> = Role::all().iter().map(|r| r.rank()).collect();
        assert!(ranks.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_parse_round_trip() {
        for role in Role::all() {
            let parsed: Role = role.as_str().parse().unwrap();
            assert_eq!(parsed, *role);
        }
    }

    #[test]
    fn test_parse_unknown_role_fails_fast() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err, RoleError::UnknownRole("admin".to_string()));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Owner".parse::<Role>().is_err());
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(Role::Professional.to_string(), "professional");
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Role::Owner).unwrap();
        assert_eq!(json, "\"owner\"");

        let role: Role = serde_json::from_str("\"client\"").unwrap();
        assert_eq!(role, Role::Client);
    }

    #[test]
    fn test_serde_rejects_unknown_names() {
        assert!(serde_json::from_str::<Role>("\"manager\"").is_err());
    }

    #[test]
    fn test_descriptions_are_not_empty() {
        for role in Role::all() {
            assert!(!role.description().is_empty());
        }
    }
}
