use crate::error::ApiError;
use crate::server::extract::ValidJson;
use crate::server::router::AppState;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use mizar_schema::{
    FieldError, Page, TodoBulkCreate, TodoCreate, TodoListQuery, TodoOut, TodoPatch,
};

use super::users::resolve_id;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos:bulk", post(create_todos_bulk))
        .route(
            "/todos/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
}

async fn create_todo(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<TodoCreate>,
) -> Result<(StatusCode, Json<TodoOut>), ApiError> {
    let todo = state.todos.create(body).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

/// POST /todos:bulk
///
/// Accepts a bare JSON array of todo bodies and creates them atomically:
/// either every element persists or none does.
async fn create_todos_bulk(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<TodoBulkCreate>,
) -> Result<(StatusCode, Json<Vec<TodoOut>>), ApiError> {
    let todos = state.todos.create_many(body).await?;
    Ok((StatusCode::CREATED, Json(todos)))
}

async fn list_todos(
    State(state): State<AppState>,
    query: Result<Query<TodoListQuery>, QueryRejection>,
) -> Result<Json<Page<TodoOut>>, ApiError> {
    let Query(query) = query
        .map_err(|r| ApiError::validation(vec![FieldError::new("query", r.body_text())]))?;
    Ok(Json(state.todos.list(query).await?))
}

async fn get_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<TodoOut>, ApiError> {
    let id = resolve_id(path)?;
    Ok(Json(state.todos.get(id).await?))
}

async fn update_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    ValidJson(body): ValidJson<TodoPatch>,
) -> Result<Json<TodoOut>, ApiError> {
    let id = resolve_id(path)?;
    Ok(Json(state.todos.update(id, body).await?))
}

async fn delete_todo(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = resolve_id(path)?;
    state.todos.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
