//! Bookline Common Library
//!
//! Shared domain types used across the booking platform services.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
