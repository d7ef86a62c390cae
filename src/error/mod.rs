mod api;

pub use api::{ApiError, ApiErrorBody, ApiErrorObject};
