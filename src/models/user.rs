use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;

/// Represents a user in the system.
#[derive(Clone, Debug)]
pub struct User {
    /// The unique identifier for the user.
    pub id: i64,
    /// The user's login name. Unique.
    pub username: String,
    /// The user's Argon2 password hash.
    pub password: String,
    /// The user's display name.
    pub name: String,
    /// The current bearer token, if the user is logged in.
    pub token: Option<String>,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Row> for User {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            password: row.try_get("password")?,
            name: row.try_get("name")?,
            token: row.try_get("token")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Values needed to insert a user.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub name: String,
}

/// Public view of a user. The token is only present on login.
#[derive(Debug, Serialize)]
pub struct UserResource {
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl From<&User> for UserResource {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            name: user.name.clone(),
            token: None,
        }
    }
}

impl UserResource {
    /// Includes the user's current token in the response.
    pub fn with_token(user: &User) -> Self {
        Self {
            token: user.token.clone(),
            ..Self::from(user)
        }
    }
}
