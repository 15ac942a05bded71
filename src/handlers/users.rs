use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    Extension,
};

use crate::{
    error::Result,
    models::user::{User, UserResource},
    response,
    services::auth as auth_service,
    state::AppState,
    validation::{
        rules::{non_blank, Valid},
        users::{LoginRequest, RegisterRequest, UpdateProfileRequest},
    },
};

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Valid(payload): Valid<RegisterRequest>,
) -> Result<Response> {
    let user = auth_service::register(
        &state,
        non_blank(payload.username).unwrap_or_default(),
        payload.password.unwrap_or_default(),
        non_blank(payload.name).unwrap_or_default(),
    )
    .await?;

    Ok(response::data(StatusCode::CREATED, UserResource::from(&user)))
}

/// Handles user login. The response carries the new token.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Valid(payload): Valid<LoginRequest>,
) -> Result<Response> {
    tracing::debug!("🔐 Login attempt for: {:?}", payload.username);

    let user = auth_service::login(
        &state,
        payload.username.as_deref().map(str::trim).unwrap_or_default(),
        payload.password.as_deref().unwrap_or_default(),
    )
    .await?;

    Ok(response::data(StatusCode::OK, UserResource::with_token(&user)))
}

/// Returns the authenticated user's profile.
#[axum::debug_handler]
pub async fn current(Extension(user): Extension<User>) -> Result<Response> {
    Ok(response::data(StatusCode::OK, UserResource::from(&user)))
}

/// Updates the authenticated user's name and/or password.
#[axum::debug_handler]
pub async fn update_current(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(payload): Valid<UpdateProfileRequest>,
) -> Result<Response> {
    let updated = auth_service::update_profile(
        &state,
        &user,
        non_blank(payload.name),
        payload.password.filter(|p| !p.is_empty()),
    )
    .await?;

    Ok(response::data(StatusCode::OK, UserResource::from(&updated)))
}

/// Handles user logout.
#[axum::debug_handler]
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Response> {
    auth_service::logout(&state, &user).await?;
    Ok(response::data(StatusCode::OK, true))
}
