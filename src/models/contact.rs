use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio_postgres::Row;

/// Represents a contact owned by a user.
#[derive(Clone, Debug)]
pub struct Contact {
    /// The unique identifier for the contact.
    pub id: i64,
    /// The ID of the user who owns the contact. Never reassigned.
    pub user_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// The timestamp when the contact was created.
    pub created_at: DateTime<Utc>,
    /// The timestamp when the contact was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<&Row> for Contact {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// The writable fields of a contact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Changes requested by a contact update. `None` leaves a field untouched,
/// `Some(None)` clears an optional field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactChanges {
    pub first_name: Option<String>,
    pub last_name: Option<Option<String>>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
}

impl ContactChanges {
    /// Writes the present fields into `contact`.
    pub fn apply_to(&self, contact: &mut Contact) {
        if let Some(first_name) = &self.first_name {
            contact.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &self.last_name {
            contact.last_name.clone_from(last_name);
        }
        if let Some(email) = &self.email {
            contact.email.clone_from(email);
        }
        if let Some(phone) = &self.phone {
            contact.phone.clone_from(phone);
        }
    }
}

/// Search filters for listing contacts. Absent filters match everything.
#[derive(Clone, Debug, Default)]
pub struct ContactFilter {
    /// Case-insensitive substring of first or last name.
    pub name: Option<String>,
    /// Case-insensitive substring of email.
    pub email: Option<String>,
    /// Substring of phone.
    pub phone: Option<String>,
}

/// Public view of a contact.
#[derive(Debug, Serialize)]
pub struct ContactResource {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<Contact> for ContactResource {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone: contact.phone,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            id: 7,
            user_id: 1,
            first_name: "Julian".into(),
            last_name: Some("Reza".into()),
            email: Some("julian@example.com".into()),
            phone: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn absent_changes_keep_current_values() {
        let mut updated = contact();
        ContactChanges::default().apply_to(&mut updated);
        assert_eq!(updated.first_name, "Julian");
        assert_eq!(updated.last_name.as_deref(), Some("Reza"));
        assert_eq!(updated.email.as_deref(), Some("julian@example.com"));
        assert_eq!(updated.phone, None);
    }

    #[test]
    fn present_changes_replace_or_clear() {
        let changes = ContactChanges {
            first_name: Some("Budi".into()),
            last_name: Some(None),
            phone: Some(Some("0812".into())),
            ..Default::default()
        };
        let mut updated = contact();
        changes.apply_to(&mut updated);
        assert_eq!(updated.first_name, "Budi");
        assert_eq!(updated.last_name, None);
        assert_eq!(updated.email.as_deref(), Some("julian@example.com"));
        assert_eq!(updated.phone.as_deref(), Some("0812"));
    }
}
