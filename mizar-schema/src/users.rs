use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validate::{FieldError, Validate, finish};

pub const NAME_MAX_LEN: usize = 128;
pub const EMAIL_MAX_LEN: usize = 254;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        check_name(&self.name, "name", &mut errors);
        check_email(&self.email, "email", &mut errors);
        finish(errors)
    }
}

/// `None` => do not change; `Some(v)` => update
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Validate for UserPatch {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_name(name, "name", &mut errors);
        }
        if let Some(email) = &self.email {
            check_email(email, "email", &mut errors);
        }
        finish(errors)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserOut {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn check_name(name: &str, field: &str, errors: &mut Vec<FieldError>) {
    if name.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if name.chars().count() > NAME_MAX_LEN {
        errors.push(FieldError::new(
            field,
            format!("must be at most {NAME_MAX_LEN} characters"),
        ));
    }
}

pub(crate) fn check_email(email: &str, field: &str, errors: &mut Vec<FieldError>) {
    if email.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
        return;
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        errors.push(FieldError::new(
            field,
            format!("must be at most {EMAIL_MAX_LEN} characters"),
        ));
    }
    // Deliberately shallow: one '@' with something on both sides. Full
    // address verification belongs to a confirmation mail, not a regex.
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => errors.push(FieldError::new(field, "must be a valid email address")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_create_passes() {
        let input = UserCreate {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn create_collects_every_violation() {
        let input = UserCreate {
            name: "   ".to_string(),
            email: "not-an-address".to_string(),
        };
        let errors = input.validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email"]);
    }

    #[test]
    fn email_needs_both_sides_of_the_at_sign() {
        for bad in ["@example.com", "alice@", "alice"] {
            let mut errors = Vec::new();
            check_email(bad, "email", &mut errors);
            assert_eq!(errors.len(), 1, "expected rejection for {bad:?}");
        }
    }

    #[test]
    fn empty_patch_is_valid() {
        assert!(UserPatch::default().validate().is_ok());
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let patch = UserPatch {
            name: None,
            email: Some("broken".to_string()),
        };
        let errors = patch.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "email");
    }
}
