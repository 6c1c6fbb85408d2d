use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::info;

use warbler_types::api::UserListResponse;
use warbler_types::context::RequestContext;

use crate::auth::AppState;
use crate::error::store_status;
use crate::middleware::current_user;

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = state
        .db
        .get_user(user_id)
        .map_err(store_status)?
        .ok_or(StatusCode::NOT_FOUND)?
        .into_user();

    Ok(Json(user))
}

/// Delete the requesting user's own account. Cascades to their messages,
/// follow edges and likes.
pub async fn delete_own_account(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    state.db.delete_user(user.id).map_err(store_status)?;
    info!("user {} deleted their account", user.username);

    Ok(StatusCode::NO_CONTENT)
}

pub async fn follow(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    state.db.follow(user.id, user_id).map_err(store_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stop_following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    state.db.unfollow(user.id, user_id).map_err(store_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let users = state
        .db
        .followers_of(user_id)
        .map_err(store_status)?
        .into_iter()
        .map(|row| row.into_user())
        .collect();

    Ok(Json(UserListResponse { users }))
}

pub async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let users = state
        .db
        .following_of(user_id)
        .map_err(store_status)?
        .into_iter()
        .map(|row| row.into_user())
        .collect();

    Ok(Json(UserListResponse { users }))
}
