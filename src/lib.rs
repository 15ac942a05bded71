//! Contacts API: user accounts with token login, and per-user contact books.
//!
//! Every contact route runs behind [`middleware_layer::auth::require_auth`],
//! and every contact lookup is scoped to the authenticated owner.

use std::time::Duration;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use http::{header, HeaderValue, Method};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod config;
pub mod db;
pub mod error;
pub mod response;
pub mod state;

pub mod models {
    pub mod contact;
    pub mod page;
    pub mod user;
}

pub mod repositories {
    pub mod contact;
    pub mod memory;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod contacts;
}

pub mod handlers {
    pub mod contacts;
    pub mod users;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod contacts;
    pub mod rules;
    pub mod users;
}

use state::AppState;

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(86400))
}

/// Builds the application router.
pub fn app(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/api/users", post(handlers::users::register))
        .route("/api/users/login", post(handlers::users::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route(
            "/api/users/current",
            get(handlers::users::current).patch(handlers::users::update_current),
        )
        .route(
            "/api/users/logout",
            axum::routing::delete(handlers::users::logout),
        )
        .route(
            "/api/contacts",
            post(handlers::contacts::create_contact).get(handlers::contacts::list_contacts),
        )
        .route(
            "/api/contacts/{id}",
            get(handlers::contacts::get_contact)
                .put(handlers::contacts::update_contact)
                .delete(handlers::contacts::delete_contact),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .layer(cors_layer(&state.config.cors_allowed_origins))
}
