//! Authentication extractors.
//!
//! The identity collaborator issues opaque bearer tokens; here a token is
//! resolved to a [`CurrentUser`] carrying the role derived once from the
//! admin flag and group memberships. Handlers take [`RequireAuth`] where an
//! identity is mandatory and [`OptionalAuth`] where anonymous callers are
//! acceptable (e.g. the public catalog).

use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};

use bistro_core::Role;

use crate::db::users::UserRepository;
use crate::error::AppError;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Extractor that requires an authenticated caller.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that optionally resolves the caller.
///
/// Unlike `RequireAuth`, a missing `Authorization` header is not rejected.
/// A header that is present but carries an unknown token still fails with
/// 401 rather than downgrading the caller to anonymous.
pub struct OptionalAuth(pub Option<CurrentUser>);

/// Resolve the request's bearer token to a user, if a header is present.
async fn resolve_identity(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<CurrentUser>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthenticated)?;

    let repo = UserRepository::new(state.pool());
    let user = repo
        .get_by_token(token)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    let groups = repo.groups_for(user.id).await?;
    let role = Role::resolve(user.is_admin, &groups);

    Ok(Some(CurrentUser {
        id: user.id,
        username: user.username,
        role,
    }))
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_identity(parts, state).await? {
            Some(user) => Ok(Self(user)),
            None => Err(AppError::Unauthenticated),
        }
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_identity(parts, state).await?))
    }
}
