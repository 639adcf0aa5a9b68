//! Shared harness for integration tests.
//!
//! Builds the full router over an in-memory SQLite database and drives it
//! with `tower::ServiceExt::oneshot`, so no socket is bound.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::{Layer, ServiceExt};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use bistro_api::config::ApiConfig;
use bistro_api::db::menu::{CategoryRepository, MenuItemRepository};
use bistro_api::db::users::UserRepository;
use bistro_api::routes;
use bistro_api::state::AppState;
use bistro_core::{CategoryId, MenuItemId, UserId};

/// A router plus direct pool access for seeding and assertions.
pub struct TestApp {
    pub app: NormalizePath<Router>,
    pub pool: SqlitePool,
}

/// Create an app over a fresh in-memory database with migrations applied.
pub async fn spawn() -> TestApp {
    // A single connection keeps the in-memory database alive and shared.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory database");

    bistro_api::migrator()
        .run(&pool)
        .await
        .expect("run migrations");

    let config = ApiConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().expect("valid addr"),
        port: 0,
    };
    let state = AppState::new(config, pool.clone());
    let router = Router::new().merge(routes::routes()).with_state(state);
    let app = NormalizePathLayer::trim_trailing_slash().layer(router);

    TestApp { app, pool }
}

impl TestApp {
    /// Create a user in the named groups and issue a bearer token.
    pub async fn seed_user(
        &self,
        username: &str,
        is_admin: bool,
        groups: &[&str],
    ) -> (UserId, String) {
        let repo = UserRepository::new(&self.pool);
        let user = repo
            .create(username, &format!("{username}@example.com"), is_admin)
            .await
            .expect("create user");
        for group in groups {
            repo.add_to_group(user.id, group).await.expect("add group");
        }
        let token = repo.create_token(user.id).await.expect("create token");
        (user.id, token)
    }

    /// Create a category for menu items to hang off.
    pub async fn seed_category(&self, slug: &str, title: &str) -> CategoryId {
        CategoryRepository::new(&self.pool)
            .create(slug, title)
            .await
            .expect("create category")
            .id
    }

    /// Create a menu item with a decimal price given as text.
    pub async fn seed_menu_item(
        &self,
        title: &str,
        price: &str,
        category: CategoryId,
    ) -> MenuItemId {
        let price: Decimal = price.parse().expect("valid price");
        MenuItemRepository::new(&self.pool)
            .create(title, price, false, category)
            .await
            .expect("create menu item")
            .id
    }

    /// Send one request and return (status, parsed JSON body or null).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json).expect("serialize body")))
                .expect("build request"),
            None => builder.body(Body::empty()).expect("build request"),
        };

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON body")
        };

        (status, json)
    }
}
