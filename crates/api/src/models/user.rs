//! User domain types.

use serde::Serialize;

use bistro_core::{Role, UserId};

/// A registered user (domain type).
///
/// Identity provisioning happens outside this service; rows are read through
/// the token and group tables populated by the auth collaborator.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name; unique.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Superuser flag, orthogonal to group membership.
    pub is_admin: bool,
}

/// The authenticated caller of the current request.
///
/// Carries the role resolved once from the admin flag and group memberships,
/// so handlers never re-query membership by name.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

/// Group-membership listing shape: `{id, username, email}`.
#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<User> for MemberView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}
