//! Category route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use bistro_core::CategoryId;

use crate::db::menu::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Category;
use crate::policy::{self, Action};
use crate::state::AppState;

/// Create payload for a category.
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub slug: String,
    pub title: String,
}

/// `GET /categories/` - list categories (customer).
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Category>>> {
    policy::authorize(Action::ListCategories, Some(&user))?;

    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// `POST /categories/` - create a category (admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    policy::authorize(Action::CreateCategory, Some(&user))?;

    if input.slug.trim().is_empty() || input.title.trim().is_empty() {
        return Err(AppError::Validation(
            "slug and title must not be empty".to_string(),
        ));
    }

    let category = CategoryRepository::new(state.pool())
        .create(&input.slug, &input.title)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /categories/{id}/` - category detail (customer).
pub async fn retrieve(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    policy::authorize(Action::RetrieveCategory, Some(&user))?;

    let category = CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("category not found".to_string()))?;

    Ok(Json(category))
}

/// `DELETE /categories/{id}/` - delete a category (admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    policy::authorize(Action::DeleteCategory, Some(&user))?;

    let deleted = CategoryRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("category not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}
