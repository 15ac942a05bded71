use garde::Validate;
use serde::Deserialize;

use super::rules::{max_chars, required};

/// Body of `POST /api/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[garde(custom(required), custom(max_chars::<100, _>))]
    pub username: Option<String>,
    #[serde(default)]
    #[garde(custom(required), custom(max_chars::<100, _>))]
    pub password: Option<String>,
    #[serde(default)]
    #[garde(custom(required), custom(max_chars::<100, _>))]
    pub name: Option<String>,
}

/// Body of `POST /api/users/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[garde(custom(required), custom(max_chars::<100, _>))]
    pub username: Option<String>,
    #[serde(default)]
    #[garde(custom(required), custom(max_chars::<100, _>))]
    pub password: Option<String>,
}

/// Body of `PATCH /api/users/current`. Blank fields are ignored.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[garde(custom(max_chars::<100, _>))]
    pub name: Option<String>,
    #[serde(default)]
    #[garde(custom(max_chars::<100, _>))]
    pub password: Option<String>,
}
