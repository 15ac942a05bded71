use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Response,
    Extension,
};

use crate::{
    error::{AppError, Result},
    models::{
        contact::{ContactFields, ContactResource},
        user::User,
    },
    response::{self, Paginated},
    services::contacts as contact_service,
    state::AppState,
    validation::{
        contacts::{CreateContactRequest, ListContactsQuery, UpdateContactRequest},
        rules::Valid,
    },
};

/// Parses a path id. Anything that is not a number cannot name a contact.
fn contact_id(raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| AppError::NotFound)
}

/// Creates a new contact.
#[axum::debug_handler]
pub async fn create_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(payload): Valid<CreateContactRequest>,
) -> Result<Response> {
    let contact = contact_service::create(&state, &user, ContactFields::from(payload)).await?;
    Ok(response::data(StatusCode::CREATED, ContactResource::from(contact)))
}

/// Gets one of the user's contacts.
#[axum::debug_handler]
pub async fn get_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response> {
    let contact = contact_service::find_owned(&state, &user, contact_id(&id)?).await?;
    Ok(response::data(StatusCode::OK, ContactResource::from(contact)))
}

/// Updates one of the user's contacts.
#[axum::debug_handler]
pub async fn update_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    Valid(payload): Valid<UpdateContactRequest>,
) -> Result<Response> {
    let contact =
        contact_service::update(&state, &user, contact_id(&id)?, payload.into()).await?;
    Ok(response::data(StatusCode::OK, ContactResource::from(contact)))
}

/// Deletes one of the user's contacts.
#[axum::debug_handler]
pub async fn delete_contact(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<Response> {
    contact_service::delete(&state, &user, contact_id(&id)?).await?;
    Ok(response::data(StatusCode::OK, true))
}

/// Lists the user's contacts, filtered and paginated.
#[axum::debug_handler]
pub async fn list_contacts(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    query: std::result::Result<Query<ListContactsQuery>, QueryRejection>,
) -> Result<Response> {
    let Query(query) = query.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let (filter, page) = query.into_parts();

    let page = contact_service::search(&state, &user, filter, page).await?;
    Ok(response::json(
        StatusCode::OK,
        &Paginated::from(page.map(ContactResource::from)),
    ))
}
