//! Access control policy.
//!
//! Every endpoint×verb pair maps to one [`Action`]; [`permitted`] is the
//! whole decision table as a pure function over `Option<Role>` (`None` is an
//! anonymous caller), so the matrix is testable in isolation. Handlers call
//! [`authorize`] before touching storage; checks that depend on a specific
//! record (order ownership, crew assignment) live in the handlers because
//! they need the instance.
//!
//! Order listings are additionally narrowed to a row set via [`order_scope`]:
//! managers see everything, delivery crew see their assigned orders, and
//! customers see their own.

use bistro_core::{Role, UserId};

use crate::error::AppError;
use crate::models::CurrentUser;

/// One guarded operation of the HTTP surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListMenuItems,
    CreateMenuItem,
    RetrieveMenuItem,
    UpdateMenuItem,
    DeleteMenuItem,
    ListCategories,
    CreateCategory,
    RetrieveCategory,
    DeleteCategory,
    ViewManagerGroup,
    ModifyManagerGroup,
    ViewCrewGroup,
    ModifyCrewGroup,
    ViewCart,
    AddToCart,
    ClearCart,
    ListOrders,
    PlaceOrder,
    RetrieveOrder,
    PatchOrder,
    ReplaceOrder,
    DeleteOrder,
}

/// The verb×role decision table. `None` is an anonymous caller.
#[must_use]
pub fn permitted(action: Action, role: Option<Role>) -> bool {
    match action {
        // Catalog reads are public.
        Action::ListMenuItems | Action::RetrieveMenuItem => true,

        // Catalog writes are manager-level.
        Action::CreateMenuItem | Action::UpdateMenuItem | Action::DeleteMenuItem => {
            role.is_some_and(Role::is_manager_or_admin)
        }

        // Category reads belong to customers; writes to admins.
        Action::ListCategories | Action::RetrieveCategory => role == Some(Role::Customer),
        Action::CreateCategory | Action::DeleteCategory => role == Some(Role::Admin),

        // Manager group management: managers or admins.
        Action::ViewManagerGroup | Action::ModifyManagerGroup => {
            role.is_some_and(Role::is_manager_or_admin)
        }

        // Delivery crew group management: managers only.
        Action::ViewCrewGroup | Action::ModifyCrewGroup => role == Some(Role::Manager),

        // Carts belong to customers.
        Action::ViewCart | Action::AddToCart | Action::ClearCart | Action::PlaceOrder => {
            role == Some(Role::Customer)
        }

        // Any authenticated user may list orders (row-set scoped).
        Action::ListOrders => role.is_some(),

        // Single order: customers read (ownership re-checked in the handler),
        // employees patch (crew assignment re-checked), managers replace/delete.
        Action::RetrieveOrder => role == Some(Role::Customer),
        Action::PatchOrder => role.is_some_and(Role::is_employee),
        Action::ReplaceOrder | Action::DeleteOrder => role == Some(Role::Manager),
    }
}

/// Gate an action, failing fast before any storage access.
///
/// # Errors
///
/// Returns `AppError::Unauthenticated` when the action requires an identity
/// and none is present, `AppError::Forbidden` when the identity's role is
/// not in the allow set.
pub fn authorize(action: Action, identity: Option<&CurrentUser>) -> Result<(), AppError> {
    let role = identity.map(|user| user.role);
    if permitted(action, role) {
        return Ok(());
    }
    match identity {
        None => Err(AppError::Unauthenticated),
        Some(_) => Err(AppError::Forbidden(
            "you do not have permission to perform this action".to_string(),
        )),
    }
}

/// Row-set narrowing for order listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// All orders (managers and admins).
    All,
    /// Orders assigned to this delivery crew member.
    AssignedTo(UserId),
    /// Orders placed by this customer.
    OwnedBy(UserId),
}

/// Determine which orders a caller may list.
#[must_use]
pub fn order_scope(role: Role, user_id: UserId) -> OrderScope {
    match role {
        Role::Manager | Role::Admin => OrderScope::All,
        Role::DeliveryCrew => OrderScope::AssignedTo(user_id),
        Role::Customer => OrderScope::OwnedBy(user_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_ROLES: [Option<Role>; 5] = [
        None,
        Some(Role::Customer),
        Some(Role::DeliveryCrew),
        Some(Role::Manager),
        Some(Role::Admin),
    ];

    /// Assert the exact allow set for an action across every role.
    fn assert_allowed(action: Action, allowed: &[Option<Role>]) {
        for role in ALL_ROLES {
            assert_eq!(
                permitted(action, role),
                allowed.contains(&role),
                "action {action:?} role {role:?}"
            );
        }
    }

    #[test]
    fn test_menu_item_reads_are_public() {
        assert_allowed(Action::ListMenuItems, &ALL_ROLES);
        assert_allowed(Action::RetrieveMenuItem, &ALL_ROLES);
    }

    #[test]
    fn test_menu_item_writes_are_manager_level() {
        let allowed = [Some(Role::Manager), Some(Role::Admin)];
        assert_allowed(Action::CreateMenuItem, &allowed);
        assert_allowed(Action::UpdateMenuItem, &allowed);
        assert_allowed(Action::DeleteMenuItem, &allowed);
    }

    #[test]
    fn test_category_reads_are_customer_only() {
        assert_allowed(Action::ListCategories, &[Some(Role::Customer)]);
        assert_allowed(Action::RetrieveCategory, &[Some(Role::Customer)]);
    }

    #[test]
    fn test_category_writes_are_admin_only() {
        assert_allowed(Action::CreateCategory, &[Some(Role::Admin)]);
        assert_allowed(Action::DeleteCategory, &[Some(Role::Admin)]);
    }

    #[test]
    fn test_manager_group_management() {
        let allowed = [Some(Role::Manager), Some(Role::Admin)];
        assert_allowed(Action::ViewManagerGroup, &allowed);
        assert_allowed(Action::ModifyManagerGroup, &allowed);
    }

    #[test]
    fn test_crew_group_management_is_manager_only() {
        assert_allowed(Action::ViewCrewGroup, &[Some(Role::Manager)]);
        assert_allowed(Action::ModifyCrewGroup, &[Some(Role::Manager)]);
    }

    #[test]
    fn test_cart_is_customer_only() {
        assert_allowed(Action::ViewCart, &[Some(Role::Customer)]);
        assert_allowed(Action::AddToCart, &[Some(Role::Customer)]);
        assert_allowed(Action::ClearCart, &[Some(Role::Customer)]);
    }

    #[test]
    fn test_order_listing_requires_authentication() {
        assert_allowed(
            Action::ListOrders,
            &[
                Some(Role::Customer),
                Some(Role::DeliveryCrew),
                Some(Role::Manager),
                Some(Role::Admin),
            ],
        );
    }

    #[test]
    fn test_order_placement_is_customer_only() {
        assert_allowed(Action::PlaceOrder, &[Some(Role::Customer)]);
    }

    #[test]
    fn test_single_order_verbs() {
        assert_allowed(Action::RetrieveOrder, &[Some(Role::Customer)]);
        assert_allowed(
            Action::PatchOrder,
            &[Some(Role::Manager), Some(Role::DeliveryCrew)],
        );
        assert_allowed(Action::ReplaceOrder, &[Some(Role::Manager)]);
        assert_allowed(Action::DeleteOrder, &[Some(Role::Manager)]);
    }

    #[test]
    fn test_authorize_distinguishes_401_from_403() {
        let anonymous = authorize(Action::CreateMenuItem, None);
        assert!(matches!(anonymous, Err(AppError::Unauthenticated)));

        let customer = CurrentUser {
            id: UserId::new(1),
            username: "alice".to_string(),
            role: Role::Customer,
        };
        let denied = authorize(Action::CreateMenuItem, Some(&customer));
        assert!(matches!(denied, Err(AppError::Forbidden(_))));

        let manager = CurrentUser {
            id: UserId::new(2),
            username: "mia".to_string(),
            role: Role::Manager,
        };
        assert!(authorize(Action::CreateMenuItem, Some(&manager)).is_ok());
    }

    #[test]
    fn test_order_scope_by_role() {
        let me = UserId::new(9);
        assert_eq!(order_scope(Role::Manager, me), OrderScope::All);
        assert_eq!(order_scope(Role::Admin, me), OrderScope::All);
        assert_eq!(order_scope(Role::DeliveryCrew, me), OrderScope::AssignedTo(me));
        assert_eq!(order_scope(Role::Customer, me), OrderScope::OwnedBy(me));
    }
}
