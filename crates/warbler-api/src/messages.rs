use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use warbler_types::api::{MessageListResponse, NewMessageRequest};
use warbler_types::context::RequestContext;

use crate::auth::AppState;
use crate::error::store_status;
use crate::middleware::current_user;

#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    100
}

pub async fn create_message(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequestContext>,
    Json(req): Json<NewMessageRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    let row = state
        .db
        .create_message(user.id, &req.text)
        .map_err(store_status)?;

    Ok((StatusCode::CREATED, Json(row.into_message())))
}

pub async fn get_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let row = state
        .db
        .get_message(message_id)
        .map_err(store_status)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(row.into_message()))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    state
        .db
        .delete_message(message_id, user.id)
        .map_err(store_status)?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn user_messages(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, StatusCode> {
    let messages = state
        .db
        .list_messages_for_user(user_id)
        .map_err(store_status)?
        .into_iter()
        .map(|row| row.into_message())
        .collect();

    Ok(Json(MessageListResponse { messages }))
}

/// The requesting user's home feed: their own messages plus those of
/// everyone they follow.
pub async fn timeline(
    State(state): State<AppState>,
    Query(query): Query<TimelineQuery>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, StatusCode> {
    let user = current_user(&ctx)?;

    let messages = state
        .db
        .home_timeline(user.id, query.limit)
        .map_err(store_status)?
        .into_iter()
        .map(|row| row.into_message())
        .collect();

    Ok(Json(MessageListResponse { messages }))
}
