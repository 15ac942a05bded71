use garde::Validate;
use serde::Deserialize;

use super::rules::{email_address, filled, max_chars, non_blank, required};
use crate::models::{
    contact::{ContactChanges, ContactFields, ContactFilter},
    page::PageRequest,
};

/// Body of `POST /api/contacts`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContactRequest {
    #[serde(default)]
    #[garde(custom(required), custom(max_chars::<100, _>))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[garde(custom(max_chars::<100, _>))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[garde(custom(max_chars::<200, _>), custom(email_address))]
    pub email: Option<String>,
    #[serde(default)]
    #[garde(custom(max_chars::<20, _>))]
    pub phone: Option<String>,
}

impl From<CreateContactRequest> for ContactFields {
    fn from(request: CreateContactRequest) -> Self {
        Self {
            first_name: non_blank(request.first_name).unwrap_or_default(),
            last_name: non_blank(request.last_name),
            email: non_blank(request.email),
            phone: non_blank(request.phone),
        }
    }
}

/// Body of `PUT /api/contacts/{id}`. Absent fields keep their value,
/// blank optional fields are cleared.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateContactRequest {
    #[serde(default)]
    #[garde(custom(filled), custom(max_chars::<100, _>))]
    pub first_name: Option<String>,
    #[serde(default)]
    #[garde(custom(max_chars::<100, _>))]
    pub last_name: Option<String>,
    #[serde(default)]
    #[garde(custom(max_chars::<200, _>), custom(email_address))]
    pub email: Option<String>,
    #[serde(default)]
    #[garde(custom(max_chars::<20, _>))]
    pub phone: Option<String>,
}

impl From<UpdateContactRequest> for ContactChanges {
    fn from(request: UpdateContactRequest) -> Self {
        Self {
            first_name: non_blank(request.first_name),
            last_name: request.last_name.map(|v| non_blank(Some(v))),
            email: request.email.map(|v| non_blank(Some(v))),
            phone: request.phone.map(|v| non_blank(Some(v))),
        }
    }
}

/// Query string of `GET /api/contacts`.
#[derive(Debug, Default, Deserialize)]
pub struct ListContactsQuery {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl ListContactsQuery {
    pub fn into_parts(self) -> (ContactFilter, PageRequest) {
        let filter = ContactFilter {
            name: non_blank(self.name),
            email: non_blank(self.email),
            phone: non_blank(self.phone),
        };
        (filter, PageRequest::new(self.page, self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::field_errors;

    #[test]
    fn create_reports_field_messages() {
        let request: CreateContactRequest = serde_json::from_str(
            r#"{"first_name": "", "last_name": "Reza", "email": "julianreza", "phone": "6280123456789"}"#,
        )
        .unwrap();
        let errors = field_errors(&request.validate().unwrap_err());
        assert_eq!(errors["first_name"], vec!["The first name field is required."]);
        assert_eq!(errors["email"], vec!["The email field must be a valid email address."]);
        assert!(!errors.contains_key("phone"));
    }

    #[test]
    fn create_trims_and_drops_blank_optionals() {
        let request: CreateContactRequest =
            serde_json::from_str(r#"{"first_name": " Julian ", "email": ""}"#).unwrap();
        assert!(request.validate().is_ok());
        let fields = ContactFields::from(request);
        assert_eq!(fields.first_name, "Julian");
        assert_eq!(fields.email, None);
    }

    #[test]
    fn update_distinguishes_absent_from_blank() {
        let request: UpdateContactRequest =
            serde_json::from_str(r#"{"last_name": "", "phone": "0812"}"#).unwrap();
        assert!(request.validate().is_ok());
        let changes = ContactChanges::from(request);
        assert_eq!(changes.first_name, None);
        assert_eq!(changes.last_name, Some(None));
        assert_eq!(changes.email, None);
        assert_eq!(changes.phone, Some(Some("0812".into())));
    }

    #[test]
    fn update_rejects_blank_first_name() {
        let request: UpdateContactRequest =
            serde_json::from_str(r#"{"first_name": ""}"#).unwrap();
        let errors = field_errors(&request.validate().unwrap_err());
        assert_eq!(errors["first_name"], vec!["The first name field is required."]);
    }

    #[test]
    fn list_query_defaults() {
        let (filter, page) = ListContactsQuery::default().into_parts();
        assert!(filter.name.is_none() && filter.email.is_none() && filter.phone.is_none());
        assert_eq!(page, PageRequest { page: 1, size: 10 });
    }
}
