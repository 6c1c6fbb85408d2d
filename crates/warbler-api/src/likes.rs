use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use warbler_types::api::{LikeCountResponse, MessageListResponse};
use warbler_types::context::RequestContext;

use crate::auth::AppState;
use crate::error::store_status;
use crate::middleware::current_user;

pub async fn like_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    state.db.like(user.id, message_id).map_err(store_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unlike_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    state.db.unlike(user.id, message_id).map_err(store_status)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn like_count(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    // 404 for a message that does not exist, 0 for one nobody has liked
    state
        .db
        .get_message(message_id)
        .map_err(store_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    let likes = state
        .db
        .likes_for_message(message_id)
        .map_err(store_status)?;

    Ok(Json(LikeCountResponse { message_id, likes }))
}

pub async fn liked_messages(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let messages = state
        .db
        .liked_by(user_id)
        .map_err(store_status)?
        .into_iter()
        .map(|row| row.into_message())
        .collect();

    Ok(Json(MessageListResponse { messages }))
}
