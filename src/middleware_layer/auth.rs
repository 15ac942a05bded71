use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, services::auth as auth_service, state::AppState};

/// A middleware that requires a valid token in the `Authorization` header.
///
/// The header carries the raw token, without a scheme prefix. On success the
/// resolved `User` is placed in the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);

    let user = auth_service::authenticate(&state, token.as_deref()).await?;
    tracing::debug!("🔐 Authenticated user: {}", user.id);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
