use std::sync::Arc;

use mizar_schema::{Page, PageQuery, UserCreate, UserOut, UserPatch};

use crate::error::ApiError;
use crate::repo::{PageSpec, UserStore};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserStore>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: UserCreate) -> Result<UserOut, ApiError> {
        Ok(self.repo.create(&input).await?.into())
    }

    pub async fn get(&self, id: i64) -> Result<UserOut, ApiError> {
        Ok(self.repo.get_by_id(id).await?.into())
    }

    pub async fn list(&self, query: PageQuery) -> Result<Page<UserOut>, ApiError> {
        let page = PageSpec::resolve(query.limit, query.offset)?;
        let items = self.repo.list(page).await?;
        let total = self.repo.count().await?;
        Ok(Page {
            items: items.into_iter().map(UserOut::from).collect(),
            total,
            limit: page.limit,
            offset: page.offset,
        })
    }

    pub async fn update(&self, id: i64, patch: UserPatch) -> Result<UserOut, ApiError> {
        Ok(self.repo.update(id, &patch).await?.into())
    }

    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.repo.delete(id).await
    }
}
