//! Order route handlers.
//!
//! Checkout converts the caller's cart into an order inside one repository
//! transaction. Listing is row-set scoped by role; single-order access
//! layers instance checks (ownership, crew assignment) on top of the
//! generic policy gate, because those depend on the record itself.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Deserializer};

use bistro_core::{DELIVERY_CREW_GROUP, OrderId, OrderStatus, Role, UserId};

use crate::db::RepositoryError;
use crate::db::orders::OrderRepository;
use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Order, OrderForDeliveryCrew, OrderFull, OrderItem};
use crate::policy::{self, Action};
use crate::state::AppState;

/// Replace payload: both assignment and status are set.
#[derive(Debug, Deserialize)]
pub struct OrderReplaceInput {
    #[serde(default)]
    pub delivery_crew: Option<UserId>,
    pub status: OrderStatus,
}

/// Partial-update payload.
///
/// `delivery_crew` distinguishes "absent" (leave unchanged) from an explicit
/// `null` (unassign), hence the double `Option`.
#[derive(Debug, Deserialize)]
pub struct OrderPatchInput {
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "explicit_option")]
    pub delivery_crew: Option<Option<UserId>>,
}

fn explicit_option<'de, D>(deserializer: D) -> std::result::Result<Option<Option<UserId>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<UserId>::deserialize(deserializer).map(Some)
}

async fn full_view(state: &AppState, order: Order) -> Result<OrderFull> {
    let items = OrderRepository::new(state.pool())
        .items_for(order.id)
        .await?;
    Ok(OrderFull::new(order, items))
}

async fn get_order(state: &AppState, id: OrderId) -> Result<Order> {
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))
}

/// Reject an assignee who is not a member of the Delivery crew group.
async fn require_crew_member(state: &AppState, crew_id: UserId) -> Result<()> {
    let is_crew = UserRepository::new(state.pool())
        .is_in_group(crew_id, DELIVERY_CREW_GROUP)
        .await?;
    if is_crew {
        Ok(())
    } else {
        Err(AppError::Validation(
            "user is not a member of the Delivery crew group".to_string(),
        ))
    }
}

/// `GET /orders/` - list orders visible to the caller.
///
/// Managers see all orders, delivery crew their assigned orders, customers
/// their own.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<OrderFull>>> {
    policy::authorize(Action::ListOrders, Some(&user))?;

    let scope = policy::order_scope(user.role, user.id);
    let repo = OrderRepository::new(state.pool());
    let orders = repo.list(scope).await?;

    let mut views = Vec::with_capacity(orders.len());
    for order in orders {
        let items = repo.items_for(order.id).await?;
        views.push(OrderFull::new(order, items));
    }

    Ok(Json(views))
}

/// `POST /orders/` - checkout: convert the caller's cart into an order.
///
/// Returns the created order items. An empty cart yields an empty order
/// with total 0.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<(StatusCode, Json<Vec<OrderItem>>)> {
    policy::authorize(Action::PlaceOrder, Some(&user))?;

    let items = OrderRepository::new(state.pool())
        .create_from_cart(user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(items)))
}

/// `GET /orders/{id}/` - order detail, customers only, own orders only.
pub async fn retrieve(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderFull>> {
    policy::authorize(Action::RetrieveOrder, Some(&user))?;

    let order = get_order(&state, id).await?;
    if order.user != user.id {
        return Err(AppError::Forbidden(
            "this order doesn't belong to you".to_string(),
        ));
    }

    Ok(Json(full_view(&state, order).await?))
}

/// `PATCH /orders/{id}/` - update assignment and/or status (manager/crew).
///
/// Delivery crew may only flip the status of orders assigned to them, and
/// their response is the narrowed status-only projection.
pub async fn patch(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(input): Json<OrderPatchInput>,
) -> Result<Response> {
    policy::authorize(Action::PatchOrder, Some(&user))?;

    let order = get_order(&state, id).await?;

    if user.role == Role::DeliveryCrew {
        if order.delivery_crew != Some(user.id) {
            return Err(AppError::Forbidden(
                "this order is not assigned to you".to_string(),
            ));
        }
        if input.delivery_crew.is_some() {
            return Err(AppError::Forbidden(
                "delivery crew may only update the delivery status".to_string(),
            ));
        }
    }

    let delivery_crew = match input.delivery_crew {
        Some(change) => {
            if let Some(crew_id) = change {
                require_crew_member(&state, crew_id).await?;
            }
            change
        }
        None => order.delivery_crew,
    };
    let status = input.status.unwrap_or(order.status);

    let updated = OrderRepository::new(state.pool())
        .update(id, delivery_crew, status)
        .await
        .map_err(not_found_as_order)?;

    if user.role == Role::DeliveryCrew {
        Ok(Json(OrderForDeliveryCrew::from(&updated)).into_response())
    } else {
        Ok(Json(full_view(&state, updated).await?).into_response())
    }
}

/// `PUT /orders/{id}/` - replace assignment and status (manager).
pub async fn replace(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
    Json(input): Json<OrderReplaceInput>,
) -> Result<Json<OrderFull>> {
    policy::authorize(Action::ReplaceOrder, Some(&user))?;

    // 404 before validation, matching the patch path.
    let _ = get_order(&state, id).await?;

    if let Some(crew_id) = input.delivery_crew {
        require_crew_member(&state, crew_id).await?;
    }

    let updated = OrderRepository::new(state.pool())
        .update(id, input.delivery_crew, input.status)
        .await
        .map_err(not_found_as_order)?;

    Ok(Json(full_view(&state, updated).await?))
}

/// `DELETE /orders/{id}/` - delete an order (manager).
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<StatusCode> {
    policy::authorize(Action::DeleteOrder, Some(&user))?;

    let deleted = OrderRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("order not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn not_found_as_order(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("order not found".to_string()),
        other => AppError::Database(other),
    }
}
