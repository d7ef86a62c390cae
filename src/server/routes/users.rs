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
    routing::get,
};
use mizar_schema::{FieldError, Page, PageQuery, UserCreate, UserOut, UserPatch};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub(crate) fn resolve_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = path
        .map_err(|r| ApiError::validation(vec![FieldError::new("id", r.body_text())]))?;
    Ok(id)
}

async fn create_user(
    State(state): State<AppState>,
    ValidJson(body): ValidJson<UserCreate>,
) -> Result<(StatusCode, Json<UserOut>), ApiError> {
    let user = state.users.create(body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(
    State(state): State<AppState>,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<UserOut>>, ApiError> {
    let Query(query) = query
        .map_err(|r| ApiError::validation(vec![FieldError::new("query", r.body_text())]))?;
    Ok(Json(state.users.list(query).await?))
}

async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<UserOut>, ApiError> {
    let id = resolve_id(path)?;
    Ok(Json(state.users.get(id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    ValidJson(body): ValidJson<UserPatch>,
) -> Result<Json<UserOut>, ApiError> {
    let id = resolve_id(path)?;
    Ok(Json(state.users.update(id, body).await?))
}

async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = resolve_id(path)?;
    state.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
