//! Menu-item route handlers.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bistro_core::{CategoryId, MenuItemId};

use crate::db::RepositoryError;
use crate::db::menu::{CategoryRepository, MenuItemFilter, MenuItemOrdering, MenuItemRepository};
use crate::error::{AppError, Result};
use crate::middleware::rate_limit::client_ip;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::MenuItem;
use crate::policy::{self, Action};
use crate::state::AppState;

const DEFAULT_PER_PAGE: u32 = 10;
const MAX_PER_PAGE: u32 = 100;

/// Paged listing envelope.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub page: u32,
    pub per_page: u32,
    pub results: Vec<T>,
}

/// Query parameters for the menu-item listing.
#[derive(Debug, Deserialize, Default)]
pub struct ListQuery {
    pub category: Option<CategoryId>,
    pub search: Option<String>,
    /// `price` or `-price`; anything else is ignored.
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListQuery {
    fn filter(&self) -> MenuItemFilter {
        let ordering = match self.ordering.as_deref() {
            Some("price") => Some(MenuItemOrdering::PriceAsc),
            Some("-price") => Some(MenuItemOrdering::PriceDesc),
            _ => None,
        };
        MenuItemFilter {
            category: self.category,
            search: self.search.clone(),
            ordering,
        }
    }

    fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

/// Create/replace payload for a menu item.
#[derive(Debug, Deserialize)]
pub struct MenuItemInput {
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub featured: bool,
    pub category: CategoryId,
}

/// Partial-update payload for a menu item.
#[derive(Debug, Deserialize)]
pub struct MenuItemPatch {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub featured: Option<bool>,
    pub category: Option<CategoryId>,
}

fn validate_input(title: &str, price: Decimal) -> Result<()> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }
    if price.is_sign_negative() {
        return Err(AppError::Validation(
            "price must not be negative".to_string(),
        ));
    }
    Ok(())
}

async fn require_category(state: &AppState, category: CategoryId) -> Result<()> {
    CategoryRepository::new(state.pool())
        .get(category)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::Validation("unknown category".to_string()))
}

/// `GET /menu-items/` - public listing with filters, search, ordering, paging.
///
/// Anonymous and authenticated callers are throttled against separate
/// ceilings.
pub async fn list(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<MenuItem>>> {
    policy::authorize(Action::ListMenuItems, identity.as_ref())?;

    match &identity {
        Some(user) => state.menu_throttle().check_user(user.id)?,
        None => state
            .menu_throttle()
            .check_anonymous(&client_ip(&headers))?,
    }

    let repo = MenuItemRepository::new(state.pool());
    let filter = query.filter();
    let page = query.page();
    let per_page = query.per_page();
    let offset = i64::from(page - 1) * i64::from(per_page);

    let count = repo.count(&filter).await?;
    let results = repo.list(&filter, i64::from(per_page), offset).await?;

    Ok(Json(Page {
        count,
        page,
        per_page,
        results,
    }))
}

/// `POST /menu-items/` - create a menu item (manager/admin).
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<MenuItemInput>,
) -> Result<(StatusCode, Json<MenuItem>)> {
    policy::authorize(Action::CreateMenuItem, Some(&user))?;
    validate_input(&input.title, input.price)?;
    require_category(&state, input.category).await?;

    let item = MenuItemRepository::new(state.pool())
        .create(&input.title, input.price, input.featured, input.category)
        .await?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /menu-items/{id}/` - public detail.
pub async fn retrieve(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
    Path(id): Path<MenuItemId>,
) -> Result<Json<MenuItem>> {
    policy::authorize(Action::RetrieveMenuItem, identity.as_ref())?;

    let item = MenuItemRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("menu item not found".to_string()))?;

    Ok(Json(item))
}

/// `PUT /menu-items/{id}/` - replace a menu item (manager/admin).
pub async fn replace(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<MenuItemId>,
    Json(input): Json<MenuItemInput>,
) -> Result<Json<MenuItem>> {
    policy::authorize(Action::UpdateMenuItem, Some(&user))?;
    validate_input(&input.title, input.price)?;
    require_category(&state, input.category).await?;

    let item = MenuItemRepository::new(state.pool())
        .update(id, &input.title, input.price, input.featured, input.category)
        .await
        .map_err(not_found_as_menu_item)?;

    Ok(Json(item))
}

/// `PATCH /menu-items/{id}/` - update selected fields (manager/admin).
pub async fn patch(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<MenuItemId>,
    Json(input): Json<MenuItemPatch>,
) -> Result<Json<MenuItem>> {
    policy::authorize(Action::UpdateMenuItem, Some(&user))?;

    let repo = MenuItemRepository::new(state.pool());
    let existing = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("menu item not found".to_string()))?;

    let title = input.title.unwrap_or(existing.title);
    let price = input.price.unwrap_or(existing.price);
    let featured = input.featured.unwrap_or(existing.featured);
    let category = input.category.unwrap_or(existing.category);

    validate_input(&title, price)?;
    if let Some(changed) = input.category {
        require_category(&state, changed).await?;
    }

    let item = repo
        .update(id, &title, price, featured, category)
        .await
        .map_err(not_found_as_menu_item)?;

    Ok(Json(item))
}

/// `DELETE /menu-items/{id}/` - delete a menu item (manager/admin).
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<MenuItemId>,
) -> Result<StatusCode> {
    policy::authorize(Action::DeleteMenuItem, Some(&user))?;

    let deleted = MenuItemRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound("menu item not found".to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

fn not_found_as_menu_item(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("menu item not found".to_string()),
        other => AppError::Database(other),
    }
}
