use crate::{
    error::{AppError, Result},
    models::{
        contact::{Contact, ContactChanges, ContactFields, ContactFilter},
        page::{Page, PageRequest},
        user::User,
    },
    state::AppState,
};

/// Creates a contact owned by `owner`.
pub async fn create(state: &AppState, owner: &User, fields: ContactFields) -> Result<Contact> {
    let contact = state.contacts.create(owner.id, fields).await?;
    tracing::info!(user_id = owner.id, contact_id = contact.id, "Contact created");
    Ok(contact)
}

/// Fetches a contact only if `owner` owns it.
///
/// A missing id and another user's id both yield `NotFound`, so callers
/// cannot tell the two apart.
pub async fn find_owned(state: &AppState, owner: &User, id: i64) -> Result<Contact> {
    state
        .contacts
        .find_owned(owner.id, id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Applies `changes` to a contact owned by `owner` in a single write.
pub async fn update(
    state: &AppState,
    owner: &User,
    id: i64,
    changes: ContactChanges,
) -> Result<Contact> {
    let contact = state
        .contacts
        .update_owned(owner.id, id, &changes)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(user_id = owner.id, contact_id = id, "Contact updated");
    Ok(contact)
}

/// Deletes a contact owned by `owner`.
pub async fn delete(state: &AppState, owner: &User, id: i64) -> Result<()> {
    if !state.contacts.delete_owned(owner.id, id).await? {
        return Err(AppError::NotFound);
    }
    tracing::info!(user_id = owner.id, contact_id = id, "Contact deleted");
    Ok(())
}

/// Searches the contacts of `owner`.
pub async fn search(
    state: &AppState,
    owner: &User,
    filter: ContactFilter,
    page: PageRequest,
) -> Result<Page<Contact>> {
    state.contacts.search(owner.id, &filter, page).await
}
