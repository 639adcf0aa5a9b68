//! Core types for Bistro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod role;
pub mod status;

pub use id::*;
pub use role::{DELIVERY_CREW_GROUP, MANAGER_GROUP, Role};
pub use status::OrderStatus;
