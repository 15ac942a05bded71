use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;

use crate::{
    error::{AppError, Result},
    models::user::{NewUser, User},
};

const USER_COLUMNS: &str = "id, username, password, name, token, created_at, updated_at";

/// Storage for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user. Fails with a conflict if the username is taken.
    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Finds a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Finds the user currently holding `token`.
    async fn find_by_token(&self, token: &str) -> Result<Option<User>>;

    /// Replaces or clears a user's token.
    async fn set_token(&self, user_id: i64, token: Option<&str>) -> Result<()>;

    /// Updates whichever of name and password hash are given.
    async fn update_profile(
        &self,
        user_id: i64,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User>;
}

/// PostgreSQL-backed [`UserRepository`].
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                "INSERT INTO users (username, password, name) VALUES ($1, $2, $3) RETURNING {}",
                USER_COLUMNS
            ))
            .await?;

        let row = client
            .query_one(
                &statement,
                &[&new_user.username, &new_user.password_hash, &new_user.name],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::username_taken()
                } else {
                    AppError::Database(e)
                }
            })?;

        Ok(User::try_from(&row)?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS))
            .await?;
        let row = client.query_opt(&statement, &[&username]).await?;
        Ok(row.as_ref().map(User::try_from).transpose()?)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!("SELECT {} FROM users WHERE token = $1", USER_COLUMNS))
            .await?;
        let row = client.query_opt(&statement, &[&token]).await?;
        Ok(row.as_ref().map(User::try_from).transpose()?)
    }

    async fn set_token(&self, user_id: i64, token: Option<&str>) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("UPDATE users SET token = $2, updated_at = NOW() WHERE id = $1")
            .await?;
        let updated = client.execute(&statement, &[&user_id, &token]).await?;
        if updated == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(&format!(
                r#"
                UPDATE users
                SET
                    name = COALESCE($2, name),
                    password = COALESCE($3, password),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING {}
                "#,
                USER_COLUMNS
            ))
            .await?;
        let row = client
            .query_opt(&statement, &[&user_id, &name, &password_hash])
            .await?
            .ok_or(AppError::NotFound)?;
        Ok(User::try_from(&row)?)
    }
}
