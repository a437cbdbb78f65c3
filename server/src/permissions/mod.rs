//! Role system types and utilities.
//!
//! One ordinal role lattice gates everything:
//! - `role` defines the closed role enum and its rank table
//! - `resolver` answers pure hierarchy queries over it
//! - `helpers`/`queries` connect the lattice to accounts in the database

pub mod helpers;
pub mod models;
pub mod queries;
pub mod resolver;
pub mod role;

pub use helpers::{load_role_context, InsufficientRole, RoleContext};
pub use models::RoleGrant;
pub use queries::*;
pub use resolver::{
    accessible_roles, can_access_route, describe_permissions, filter_by_access, has_permission,
    highest_role, RoleError, RoleGated,
};
pub use role::Role;
