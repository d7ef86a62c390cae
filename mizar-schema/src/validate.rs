use serde::{Deserialize, Serialize};

/// A single violated constraint, named by the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Structural validation of an inbound payload.
///
/// Implementations report every violated field, not only the first one,
/// so one response can carry the complete list.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

pub(crate) fn finish(errors: Vec<FieldError>) -> Result<(), Vec<FieldError>> {
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
