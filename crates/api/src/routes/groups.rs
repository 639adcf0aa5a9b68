//! Role-group membership route handlers.
//!
//! Managers and delivery crew are plain named groups; membership is a set,
//! so adds and removes are idempotent. Members are added by username (404
//! if it doesn't resolve) and removed by id (404 if missing).

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use bistro_core::{DELIVERY_CREW_GROUP, MANAGER_GROUP, UserId};

use crate::db::users::UserRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, MemberView};
use crate::policy::{self, Action};
use crate::state::AppState;

/// Add-by-username payload.
#[derive(Debug, Deserialize)]
pub struct GroupAddInput {
    pub username: String,
}

async fn list_members(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    group: &str,
) -> Result<Json<Vec<MemberView>>> {
    policy::authorize(action, Some(user))?;

    let members = UserRepository::new(state.pool())
        .list_group_members(group)
        .await?;

    Ok(Json(members.into_iter().map(MemberView::from).collect()))
}

async fn add_member(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    group: &str,
    username: &str,
) -> Result<(StatusCode, Json<Value>)> {
    policy::authorize(action, Some(user))?;

    let repo = UserRepository::new(state.pool());
    let member = repo
        .get_by_username(username)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    repo.add_to_group(member.id, group).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": format!("user added to the {group} group") })),
    ))
}

async fn remove_member(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    group: &str,
    member_id: UserId,
) -> Result<Json<Value>> {
    policy::authorize(action, Some(user))?;

    let repo = UserRepository::new(state.pool());
    let member = repo
        .get_by_id(member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;
    repo.remove_from_group(member.id, group).await?;

    Ok(Json(
        json!({ "message": format!("user removed from the {group} group") }),
    ))
}

/// `GET /groups/manager/users/` - list managers (manager/admin).
pub async fn list_managers(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<MemberView>>> {
    list_members(&state, &user, Action::ViewManagerGroup, MANAGER_GROUP).await
}

/// `POST /groups/manager/users/` - add a manager by username (manager/admin).
pub async fn add_manager(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<GroupAddInput>,
) -> Result<(StatusCode, Json<Value>)> {
    add_member(
        &state,
        &user,
        Action::ModifyManagerGroup,
        MANAGER_GROUP,
        &input.username,
    )
    .await
}

/// `DELETE /groups/manager/users/{id}/` - remove a manager (manager/admin).
pub async fn remove_manager(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(member_id): Path<UserId>,
) -> Result<Json<Value>> {
    remove_member(
        &state,
        &user,
        Action::ModifyManagerGroup,
        MANAGER_GROUP,
        member_id,
    )
    .await
}

/// `GET /groups/delivery-crew/users/` - list delivery crew (manager).
pub async fn list_crew(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<MemberView>>> {
    list_members(&state, &user, Action::ViewCrewGroup, DELIVERY_CREW_GROUP).await
}

/// `POST /groups/delivery-crew/users/` - add a crew member by username (manager).
pub async fn add_crew(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<GroupAddInput>,
) -> Result<(StatusCode, Json<Value>)> {
    add_member(
        &state,
        &user,
        Action::ModifyCrewGroup,
        DELIVERY_CREW_GROUP,
        &input.username,
    )
    .await
}

/// `DELETE /groups/delivery-crew/users/{id}/` - remove a crew member (manager).
pub async fn remove_crew(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(member_id): Path<UserId>,
) -> Result<Json<Value>> {
    remove_member(
        &state,
        &user,
        Action::ModifyCrewGroup,
        DELIVERY_CREW_GROUP,
        member_id,
    )
    .await
}
