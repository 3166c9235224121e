//! Contact form payload and its validation.

use serde_json::{Map, Value};

/// A validated contact form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactFormData {
    pub email: String,
    pub name: String,
    pub message: String,
    pub phone: Option<String>,
}

/// The first requirement a submission failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("body must be a JSON object")]
    NotAnObject,

    #[error("`{0}` must be a string")]
    NotAString(&'static str),

    #[error("`{0}` must not be empty")]
    Empty(&'static str),

    #[error("`email` must contain '@'")]
    InvalidEmail,

    #[error("`phone` must be a non-empty string when present")]
    InvalidPhone,
}

impl ContactFormData {
    /// Validate a parsed request body.
    ///
    /// `email`, `name` and `message` must be strings, `name` and `message`
    /// non-empty, and `email` must contain an `@`. `phone` may be absent; if
    /// the key is present (including `null`) it must be a non-empty string.
    pub fn from_json(value: &Value) -> Result<Self, FormError> {
        let object = value.as_object().ok_or(FormError::NotAnObject)?;

        let email = string_field(object, "email")?;
        let name = string_field(object, "name")?;
        let message = string_field(object, "message")?;

        if !email.contains('@') {
            return Err(FormError::InvalidEmail);
        }
        if name.is_empty() {
            return Err(FormError::Empty("name"));
        }
        if message.is_empty() {
            return Err(FormError::Empty("message"));
        }

        let phone = match object.get("phone") {
            None => None,
            Some(Value::String(p)) if !p.is_empty() => Some(p.clone()),
            Some(_) => return Err(FormError::InvalidPhone),
        };

        Ok(Self {
            email: email.to_string(),
            name: name.to_string(),
            message: message.to_string(),
            phone,
        })
    }
}

fn string_field<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a str, FormError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .ok_or(FormError::NotAString(field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accepts_minimal_form() {
        let form = ContactFormData::from_json(&json!({
            "email": "a@b.com", "name": "X", "message": "hi"
        }))
        .unwrap();
        assert_eq!(form.email, "a@b.com");
        assert_eq!(form.phone, None);
    }

    #[test]
    fn test_accepts_phone() {
        let form = ContactFormData::from_json(&json!({
            "email": "a@b.com", "name": "X", "message": "hi", "phone": "+1 555 0100"
        }))
        .unwrap();
        assert_eq!(form.phone.as_deref(), Some("+1 555 0100"));
    }

    #[test]
    fn test_rejects_non_objects() {
        for value in [json!(null), json!([]), json!("text"), json!(42)] {
            assert_eq!(ContactFormData::from_json(&value), Err(FormError::NotAnObject));
        }
    }

    #[test]
    fn test_rejects_missing_or_non_string_fields() {
        assert_eq!(
            ContactFormData::from_json(&json!({ "name": "X", "message": "hi" })),
            Err(FormError::NotAString("email"))
        );
        assert_eq!(
            ContactFormData::from_json(&json!({ "email": "a@b.com", "name": 5, "message": "hi" })),
            Err(FormError::NotAString("name"))
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(
            ContactFormData::from_json(&json!({ "email": "ab.com", "name": "X", "message": "hi" })),
            Err(FormError::InvalidEmail)
        );
        assert_eq!(
            ContactFormData::from_json(&json!({ "email": "a@b.com", "name": "", "message": "hi" })),
            Err(FormError::Empty("name"))
        );
        assert_eq!(
            ContactFormData::from_json(&json!({ "email": "a@b.com", "name": "X", "message": "" })),
            Err(FormError::Empty("message"))
        );
    }

    #[test]
    fn test_rejects_empty_or_null_phone() {
        for phone in [json!(""), json!(null), json!(123)] {
            assert_eq!(
                ContactFormData::from_json(&json!({
                    "email": "a@b.com", "name": "X", "message": "hi", "phone": phone
                })),
                Err(FormError::InvalidPhone)
            );
        }
    }
}
