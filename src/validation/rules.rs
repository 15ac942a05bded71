//! Field rules shared by the request schemas, plus the extractor that runs them.
//!
//! Rules return a message fragment ("field is required"); the field label is
//! prepended when the report is rendered, giving
//! "The first name field is required."

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use garde::{rules::email::Email, Validate};
use serde::de::DeserializeOwned;

use crate::error::{AppError, FieldErrors};

/// Read access to the text of a request field, whether or not it is optional.
pub trait FieldValue {
    fn text(&self) -> Option<&str>;
}

impl FieldValue for str {
    fn text(&self) -> Option<&str> {
        Some(self)
    }
}

impl FieldValue for String {
    fn text(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn text(&self) -> Option<&str> {
        self.as_ref().and_then(FieldValue::text)
    }
}

fn is_blank<T: FieldValue + ?Sized>(value: &T) -> bool {
    value.text().is_none_or(|text| text.trim().is_empty())
}

/// The field must be present and not blank.
pub fn required<T: FieldValue + ?Sized>(value: &T, _ctx: &()) -> garde::Result {
    if is_blank(value) {
        return Err(garde::Error::new("field is required"));
    }
    Ok(())
}

/// The field may be absent, but if sent it must not be blank.
pub fn filled(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value {
        Some(text) if text.trim().is_empty() => Err(garde::Error::new("field is required")),
        _ => Ok(()),
    }
}

/// At most `N` characters (not bytes).
pub fn max_chars<const N: usize, T: FieldValue + ?Sized>(value: &T, _ctx: &()) -> garde::Result {
    match value.text() {
        Some(text) if text.chars().count() > N => Err(garde::Error::new(format!(
            "field must not be greater than {} characters",
            N
        ))),
        _ => Ok(()),
    }
}

/// A syntactically valid address, when present.
pub fn email_address<T: FieldValue + ?Sized>(value: &T, _ctx: &()) -> garde::Result {
    match value.text().map(str::trim) {
        Some(text) if !text.is_empty() && text.validate_email().is_err() => {
            Err(garde::Error::new("field must be a valid email address"))
        }
        _ => Ok(()),
    }
}

/// Turns empty or whitespace-only input into `None`.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Renders a garde report as field -> messages.
pub fn field_errors(report: &garde::Report) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (path, error) in report.iter() {
        let field = path.to_string();
        let message = format!("The {} {}.", field.replace('_', " "), error);
        errors.entry(field).or_default().push(message);
    }
    errors
}

/// JSON body that has been deserialized and validated.
pub struct Valid<T>(pub T);

impl<S, T> FromRequest<S> for Valid<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
    <T as Validate>::Context: Default,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        value
            .validate()
            .map_err(|report| AppError::Validation(field_errors(&report)))?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_blank() {
        assert!(required(&None::<String>, &()).is_err());
        assert!(required(&Some("  ".to_string()), &()).is_err());
        assert!(required(&Some("x".to_string()), &()).is_ok());
    }

    #[test]
    fn filled_allows_absence() {
        assert!(filled(&None, &()).is_ok());
        assert!(filled(&Some(String::new()), &()).is_err());
    }

    #[test]
    fn max_chars_counts_characters() {
        let exactly = Some("é".repeat(100));
        let over = Some("a".repeat(101));
        assert!(max_chars::<100, _>(&exactly, &()).is_ok());
        assert!(max_chars::<100, _>(&over, &()).is_err());
        assert!(max_chars::<100, _>(&None::<String>, &()).is_ok());
    }

    #[test]
    fn email_address_follows_garde() {
        for ok in ["julian@example.com", "julian@localhost", "a@b", ""] {
            assert!(email_address(ok, &()).is_ok(), "{ok}");
        }
        for bad in ["julianreza", "@example.com", "a(b)@example.com", "a b@c.com"] {
            assert!(email_address(bad, &()).is_err(), "{bad}");
        }
    }

    #[test]
    fn blank_optional_input_becomes_none() {
        assert_eq!(non_blank(Some("   ".into())), None);
        assert_eq!(non_blank(Some(" 0812 ".into())), Some("0812".into()));
    }
}
