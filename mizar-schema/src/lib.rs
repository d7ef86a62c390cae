pub mod common;
pub mod todos;
pub mod users;
pub mod validate;

pub use common::{Page, PageQuery};
pub use todos::{TodoBulkCreate, TodoCreate, TodoListQuery, TodoOut, TodoPatch};
pub use users::{UserCreate, UserOut, UserPatch};
pub use validate::{FieldError, Validate};
