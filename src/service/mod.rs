//! Domain services: one public method per use case.
//!
//! Services receive their stores through the constructor, translate
//! repository errors into the domain taxonomy, and enforce the invariants
//! a single repository call cannot (todo ownership).

mod todos;
mod users;

pub use todos::TodoService;
pub use users::UserService;
