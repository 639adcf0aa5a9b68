//! User, group-membership, and token repository.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use bistro_core::UserId;

use super::RepositoryError;
use crate::models::User;

/// Repository for user and group-membership operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

fn map_user(row: &SqliteRow) -> Result<User, RepositoryError> {
    Ok(User {
        id: UserId::new(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        is_admin: row.try_get("is_admin")?,
    })
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, email, is_admin FROM user WHERE id = ?")
            .bind(id.as_i32())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Get a user by their username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, username, email, is_admin FROM user WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Resolve a bearer token to its user.
    ///
    /// Returns `None` for unknown tokens.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT u.id, u.username, u.email, u.is_admin
            FROM user u
            JOIN auth_token t ON t.user_id = u.id
            WHERE t.token = ?
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(map_user).transpose()
    }

    /// Get the group names a user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn groups_for(&self, user_id: UserId) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query("SELECT group_name FROM user_group WHERE user_id = ?")
            .bind(user_id.as_i32())
            .fetch_all(self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("group_name").map_err(Into::into))
            .collect()
    }

    /// Whether a user belongs to a named group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_in_group(&self, user_id: UserId, group: &str) -> Result<bool, RepositoryError> {
        let row =
            sqlx::query("SELECT 1 FROM user_group WHERE user_id = ? AND group_name = ?")
                .bind(user_id.as_i32())
                .bind(group)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.is_some())
    }

    /// List the members of a named group, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_group_members(&self, group: &str) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT u.id, u.username, u.email, u.is_admin
            FROM user u
            JOIN user_group g ON g.user_id = u.id
            WHERE g.group_name = ?
            ORDER BY u.id ASC
            ",
        )
        .bind(group)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }

    /// Add a user to a named group.
    ///
    /// Membership is a set: adding an existing member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_to_group(&self, user_id: UserId, group: &str) -> Result<(), RepositoryError> {
        sqlx::query("INSERT OR IGNORE INTO user_group (user_id, group_name) VALUES (?, ?)")
            .bind(user_id.as_i32())
            .bind(group)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Remove a user from a named group.
    ///
    /// Removing an absent member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_from_group(
        &self,
        user_id: UserId,
        group: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM user_group WHERE user_id = ? AND group_name = ?")
            .bind(user_id.as_i32())
            .bind(group)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Create a new user.
    ///
    /// Used by seeding and tests; registration is handled by the external
    /// identity collaborator.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query(
            r"
            INSERT INTO user (username, email, is_admin)
            VALUES (?, ?, ?)
            RETURNING id, username, email, is_admin
            ",
        )
        .bind(username)
        .bind(email)
        .bind(is_admin)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        map_user(&row)
    }

    /// Issue an opaque bearer token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_token(&self, user_id: UserId) -> Result<String, RepositoryError> {
        let token = Uuid::new_v4().simple().to_string();

        sqlx::query("INSERT INTO auth_token (token, user_id) VALUES (?, ?)")
            .bind(&token)
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(token)
    }
}
