//! Access roles derived from group membership.
//!
//! The identity collaborator hands us a superuser flag and a set of named
//! group memberships. Rather than re-querying membership by name string at
//! every check site, the role is resolved once per request into a closed
//! enum and matched exhaustively by the policy table.

use serde::{Deserialize, Serialize};

/// Group name granting the [`Role::Manager`] role.
pub const MANAGER_GROUP: &str = "Manager";

/// Group name granting the [`Role::DeliveryCrew`] role.
pub const DELIVERY_CREW_GROUP: &str = "Delivery crew";

/// The access tier of an authenticated user.
///
/// Resolution precedence is Admin > Manager > Delivery crew > Customer:
/// the superuser flag wins over any group, and a user in both groups is
/// evaluated as a Manager. A user in neither group is a Customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    DeliveryCrew,
    Manager,
    Admin,
}

impl Role {
    /// Resolve a role from the superuser flag and group membership names.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(is_admin: bool, groups: &[S]) -> Self {
        if is_admin {
            return Self::Admin;
        }
        let in_group = |name: &str| groups.iter().any(|g| g.as_ref() == name);
        if in_group(MANAGER_GROUP) {
            Self::Manager
        } else if in_group(DELIVERY_CREW_GROUP) {
            Self::DeliveryCrew
        } else {
            Self::Customer
        }
    }

    /// Whether this role carries manager-level catalog privileges.
    #[must_use]
    pub const fn is_manager_or_admin(self) -> bool {
        matches!(self, Self::Manager | Self::Admin)
    }

    /// Whether this role is staff (Manager or Delivery crew).
    ///
    /// Used where either employee class may act, e.g. order status updates.
    #[must_use]
    pub const fn is_employee(self) -> bool {
        matches!(self, Self::Manager | Self::DeliveryCrew)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_groups_is_customer() {
        assert_eq!(Role::resolve(false, &[] as &[&str]), Role::Customer);
    }

    #[test]
    fn test_manager_group() {
        assert_eq!(Role::resolve(false, &["Manager"]), Role::Manager);
    }

    #[test]
    fn test_delivery_crew_group() {
        assert_eq!(Role::resolve(false, &["Delivery crew"]), Role::DeliveryCrew);
    }

    #[test]
    fn test_manager_takes_precedence_over_crew() {
        assert_eq!(
            Role::resolve(false, &["Delivery crew", "Manager"]),
            Role::Manager
        );
    }

    #[test]
    fn test_admin_flag_wins_over_groups() {
        assert_eq!(Role::resolve(true, &["Delivery crew"]), Role::Admin);
        assert_eq!(Role::resolve(true, &[] as &[&str]), Role::Admin);
    }

    #[test]
    fn test_unknown_groups_ignored() {
        assert_eq!(Role::resolve(false, &["Waitstaff"]), Role::Customer);
    }

    #[test]
    fn test_employee_union() {
        assert!(Role::Manager.is_employee());
        assert!(Role::DeliveryCrew.is_employee());
        assert!(!Role::Customer.is_employee());
        assert!(!Role::Admin.is_employee());
    }

    #[test]
    fn test_manager_or_admin() {
        assert!(Role::Manager.is_manager_or_admin());
        assert!(Role::Admin.is_manager_or_admin());
        assert!(!Role::DeliveryCrew.is_manager_or_admin());
        assert!(!Role::Customer.is_manager_or_admin());
    }
}
