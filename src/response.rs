use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{error::AppError, models::page::{Page, PageMeta}};

/// The `{"data": ...}` envelope every successful response uses.
#[derive(Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// A list page with its pagination metadata.
#[derive(Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        let meta = page.meta();
        Self { data: page.items, meta }
    }
}

/// Serializes `body` with sonic-rs under the given status.
pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match sonic_rs::to_string(body) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => AppError::Internal(format!("Response serialization failed: {}", e)).into_response(),
    }
}

/// Wraps `value` in the data envelope.
pub fn data<T: Serialize>(status: StatusCode, value: T) -> Response {
    json(status, &Data { data: value })
}
