//! Process-local storage implementing both repository traits.
//!
//! Used by the test-suite and by `STORAGE=memory` for running without a
//! database. Each operation takes the lock once, so every write is atomic
//! with respect to other requests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::{AppError, Result},
    models::{
        contact::{Contact, ContactChanges, ContactFields, ContactFilter},
        page::{Page, PageRequest},
        user::{NewUser, User},
    },
    repositories::{contact::ContactRepository, user::UserRepository},
};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    contacts: BTreeMap<i64, Contact>,
    next_user_id: i64,
    next_contact_id: i64,
}

/// In-memory user and contact tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|value| value.to_lowercase().contains(&needle.to_lowercase()))
}

fn matches_filter(contact: &Contact, filter: &ContactFilter) -> bool {
    let name = filter.name.as_deref().is_none_or(|needle| {
        contains_ignore_case(Some(&contact.first_name), needle)
            || contains_ignore_case(contact.last_name.as_deref(), needle)
    });
    let email = filter
        .email
        .as_deref()
        .is_none_or(|needle| contains_ignore_case(contact.email.as_deref(), needle));
    let phone = filter
        .phone
        .as_deref()
        .is_none_or(|needle| contact.phone.as_deref().is_some_and(|p| p.contains(needle)));
    name && email && phone
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == new_user.username) {
            return Err(AppError::username_taken());
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            username: new_user.username,
            password: new_user.password_hash,
            name: new_user.name,
            token: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.token.as_deref() == Some(token))
            .cloned())
    }

    async fn set_token(&self, user_id: i64, token: Option<&str>) -> Result<()> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or(AppError::NotFound)?;
        user.token = token.map(String::from);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables.users.get_mut(&user_id).ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            user.name = name.to_string();
        }
        if let Some(hash) = password_hash {
            user.password = hash.to_string();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

#[async_trait]
impl ContactRepository for MemoryStore {
    async fn create(&self, user_id: i64, fields: ContactFields) -> Result<Contact> {
        let mut tables = self.tables.write().await;
        tables.next_contact_id += 1;
        let now = Utc::now();
        let contact = Contact {
            id: tables.next_contact_id,
            user_id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            email: fields.email,
            phone: fields.phone,
            created_at: now,
            updated_at: now,
        };
        tables.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn find_owned(&self, user_id: i64, id: i64) -> Result<Option<Contact>> {
        let tables = self.tables.read().await;
        Ok(tables
            .contacts
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn update_owned(
        &self,
        user_id: i64,
        id: i64,
        changes: &ContactChanges,
    ) -> Result<Option<Contact>> {
        let mut tables = self.tables.write().await;
        let Some(contact) = tables.contacts.get_mut(&id).filter(|c| c.user_id == user_id) else {
            return Ok(None);
        };
        changes.apply_to(contact);
        contact.updated_at = Utc::now();
        Ok(Some(contact.clone()))
    }

    async fn delete_owned(&self, user_id: i64, id: i64) -> Result<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables.contacts.get(&id).is_some_and(|c| c.user_id == user_id);
        if owned {
            tables.contacts.remove(&id);
        }
        Ok(owned)
    }

    async fn search(
        &self,
        user_id: i64,
        filter: &ContactFilter,
        page: PageRequest,
    ) -> Result<Page<Contact>> {
        let tables = self.tables.read().await;
        let matching: Vec<&Contact> = tables
            .contacts
            .values()
            .filter(|c| c.user_id == user_id && matches_filter(c, filter))
            .collect();

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.size).unwrap_or(0))
            .cloned()
            .collect();

        Ok(Page { items, total, request: page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(first: &str, last: Option<&str>, email: Option<&str>, phone: Option<&str>) -> ContactFields {
        ContactFields {
            first_name: first.to_string(),
            last_name: last.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
        }
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..20 {
            ContactRepository::create(
                &store,
                1,
                fields(
                    &format!("First {}", i),
                    Some(format!("Last {}", i).as_str()),
                    Some(format!("Test{}@Example.com", i).as_str()),
                    Some(format!("628{:04}", i).as_str()),
                ),
            )
            .await
            .unwrap();
        }
        ContactRepository::create(&store, 2, fields("first other", None, None, None))
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn search_is_scoped_to_owner() {
        let store = seeded().await;
        let page = store
            .search(2, &ContactFilter::default(), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].first_name, "first other");
    }

    #[tokio::test]
    async fn name_filter_matches_first_or_last_ignoring_case() {
        let store = seeded().await;
        let filter = ContactFilter { name: Some("LAST".into()), ..Default::default() };
        let page = store.search(1, &filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.items.len(), 10);
    }

    #[tokio::test]
    async fn filters_combine_with_and() {
        let store = seeded().await;
        let filter = ContactFilter {
            name: Some("first 1".into()),
            email: Some("test1@".into()),
            phone: Some("0001".into()),
        };
        let page = store.search(1, &filter, PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].first_name, "First 1");
    }

    #[tokio::test]
    async fn pages_past_the_end_are_empty() {
        let store = seeded().await;
        let page = store
            .search(1, &ContactFilter::default(), PageRequest::new(Some(5), Some(5)))
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 20);
    }

    #[tokio::test]
    async fn foreign_contacts_cannot_be_deleted() {
        let store = seeded().await;
        assert!(!store.delete_owned(2, 1).await.unwrap());
        assert!(store.find_owned(1, 1).await.unwrap().is_some());
        assert!(store.delete_owned(1, 1).await.unwrap());
        assert!(store.find_owned(1, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_updates_to_different_fields_both_persist() {
        let store = seeded().await;
        let rename = ContactChanges { first_name: Some("Budi".into()), ..Default::default() };
        let clear_phone = ContactChanges { phone: Some(None), ..Default::default() };

        let (first, second) = tokio::join!(
            store.update_owned(1, 3, &rename),
            store.update_owned(1, 3, &clear_phone),
        );
        assert!(first.unwrap().is_some());
        assert!(second.unwrap().is_some());

        let contact = store.find_owned(1, 3).await.unwrap().unwrap();
        assert_eq!(contact.first_name, "Budi");
        assert_eq!(contact.phone, None);
        assert_eq!(contact.last_name.as_deref(), Some("Last 2"));
    }

    #[tokio::test]
    async fn foreign_contacts_cannot_be_updated() {
        let store = seeded().await;
        let rename = ContactChanges { first_name: Some("Hacked".into()), ..Default::default() };
        assert!(store.update_owned(2, 1, &rename).await.unwrap().is_none());
        assert_eq!(store.find_owned(1, 1).await.unwrap().unwrap().first_name, "First 0");
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let store = MemoryStore::new();
        let new_user = || NewUser {
            username: "julian".into(),
            password_hash: "hash".into(),
            name: "Julian".into(),
        };
        UserRepository::create(&store, new_user()).await.unwrap();
        let err = UserRepository::create(&store, new_user()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict { field: "username", .. }));
    }
}
