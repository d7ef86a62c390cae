use std::sync::Arc;

use mizar_schema::{Page, TodoBulkCreate, TodoCreate, TodoListQuery, TodoOut, TodoPatch};

use crate::error::ApiError;
use crate::repo::{PageSpec, TodoFilter, TodoStore, UserStore};

#[derive(Clone)]
pub struct TodoService {
    todos: Arc<dyn TodoStore>,
    users: Arc<dyn UserStore>,
}

impl TodoService {
    pub fn new(todos: Arc<dyn TodoStore>, users: Arc<dyn UserStore>) -> Self {
        Self { todos, users }
    }

    pub async fn create(&self, input: TodoCreate) -> Result<TodoOut, ApiError> {
        self.ensure_owner(input.owner_id).await?;
        Ok(self.todos.create(&input).await?.into())
    }

    pub async fn create_many(&self, input: TodoBulkCreate) -> Result<Vec<TodoOut>, ApiError> {
        // Every distinct owner must exist before the batch transaction
        // opens; the foreign key remains as a backstop for lost races.
        let mut owners: Vec<i64> = input.0.iter().map(|t| t.owner_id).collect();
        owners.sort_unstable();
        owners.dedup();
        for owner_id in owners {
            self.ensure_owner(owner_id).await?;
        }

        let created = self.todos.create_many(&input.0).await?;
        Ok(created.into_iter().map(TodoOut::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<TodoOut, ApiError> {
        Ok(self.todos.get_by_id(id).await?.into())
    }

    pub async fn list(&self, query: TodoListQuery) -> Result<Page<TodoOut>, ApiError> {
        let page = PageSpec::resolve(query.limit, query.offset)?;
        let filter = TodoFilter {
            owner_id: query.owner_id,
            done: query.done,
        };

        // Filtering by an unknown user is a miss, not an empty page.
        if let Some(owner_id) = filter.owner_id {
            if !self.users.exists(owner_id).await? {
                return Err(ApiError::NotFound("user"));
            }
        }

        let items = self.todos.list(filter, page).await?;
        let total = self.todos.count(filter).await?;
        Ok(Page {
            items: items.into_iter().map(TodoOut::from).collect(),
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    pub async fn update(&self, id: i64, patch: TodoPatch) -> Result<TodoOut, ApiError> {
        Ok(self.todos.update(id, &patch).await?.into())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.todos.delete(id).await
    }

    async fn ensure_owner(&self, owner_id: i64) -> Result<(), ApiError> {
        if self.users.exists(owner_id).await? {
            Ok(())
        } else {
            Err(ApiError::invalid_field(
                "owner_id",
                format!("user {owner_id} does not exist"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use mizar_schema::{UserCreate, UserPatch};

    use crate::db::{DbTodo, DbUser};
    use crate::repo::PageSpec;

    /// User store double: knows a single fixed id.
    struct OneUser(i64);

    #[async_trait]
    impl UserStore for OneUser {
        async fn create(&self, _input: &UserCreate) -> Result<DbUser, ApiError> {
            unimplemented!("not exercised by these tests")
        }
        async fn get_by_id(&self, _id: i64) -> Result<DbUser, ApiError> {
            unimplemented!("not exercised by these tests")
        }
        async fn list(&self, _page: PageSpec) -> Result<Vec<DbUser>, ApiError> {
            unimplemented!("not exercised by these tests")
        }
        async fn count(&self) -> Result<i64, ApiError> {
            unimplemented!("not exercised by these tests")
        }
        async fn update(&self, _id: i64, _patch: &UserPatch) -> Result<DbUser, ApiError> {
            unimplemented!("not exercised by these tests")
        }
        async fn delete(&self, _id: i64) -> Result<(), ApiError> {
            unimplemented!("not exercised by these tests")
        }
        async fn exists(&self, id: i64) -> Result<bool, ApiError> {
            Ok(id == self.0)
        }
    }

    /// Todo store double: echoes inserts back as rows.
    struct EchoTodos;

    fn row(id: i64, input: &TodoCreate) -> DbTodo {
        let now = Utc::now();
        DbTodo {
            id,
            owner_id: input.owner_id,
            title: input.title.clone(),
            done: input.done,
            created_at: now,
            updated_at: now,
        }
    }

    #[async_trait]
    impl TodoStore for EchoTodos {
        async fn create(&self, input: &TodoCreate) -> Result<DbTodo, ApiError> {
            Ok(row(1, input))
        }
        async fn create_many(&self, inputs: &[TodoCreate]) -> Result<Vec<DbTodo>, ApiError> {
            Ok(inputs
                .iter()
                .enumerate()
                .map(|(i, input)| row(i as i64 + 1, input))
                .collect())
        }
        async fn get_by_id(&self, _id: i64) -> Result<DbTodo, ApiError> {
            Err(ApiError::NotFound("todo"))
        }
        async fn list(&self, _f: TodoFilter, _p: PageSpec) -> Result<Vec<DbTodo>, ApiError> {
            Ok(Vec::new())
        }
        async fn count(&self, _f: TodoFilter) -> Result<i64, ApiError> {
            Ok(0)
        }
        async fn update(&self, _id: i64, _patch: &TodoPatch) -> Result<DbTodo, ApiError> {
            Err(ApiError::NotFound("todo"))
        }
        async fn delete(&self, _id: i64) -> Result<(), ApiError> {
            Err(ApiError::NotFound("todo"))
        }
    }

    fn service() -> TodoService {
        TodoService::new(Arc::new(EchoTodos), Arc::new(OneUser(7)))
    }

    #[tokio::test]
    async fn create_rejects_a_missing_owner() {
        let err = service()
            .create(TodoCreate {
                title: "t".to_string(),
                owner_id: 99,
                done: false,
            })
            .await
            .unwrap_err();

        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "owner_id");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_passes_through_for_a_known_owner() {
        let out = service()
            .create(TodoCreate {
                title: "t".to_string(),
                owner_id: 7,
                done: true,
            })
            .await
            .unwrap();
        assert_eq!(out.owner_id, 7);
        assert!(out.done);
    }

    #[tokio::test]
    async fn bulk_create_checks_every_distinct_owner() {
        let input = TodoBulkCreate(vec![
            TodoCreate {
                title: "a".to_string(),
                owner_id: 7,
                done: false,
            },
            TodoCreate {
                title: "b".to_string(),
                owner_id: 8,
                done: false,
            },
        ]);
        let err = service().create_many(input).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn list_by_unknown_owner_is_not_found() {
        let err = service()
            .list(TodoListQuery {
                owner_id: Some(99),
                ..TodoListQuery::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound("user")));
    }
}
