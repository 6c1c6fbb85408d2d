use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;

use warbler_db::Database;
use warbler_types::api::{Claims, LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use warbler_types::models::User;

use crate::error::store_status;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    let row = state
        .db
        .signup(
            &req.username,
            &req.email,
            &req.password,
            req.image_url.as_deref(),
        )
        .map_err(store_status)?;

    let user = row.into_user();
    info!("new signup: {}", user.username);

    let token =
        create_token(&state.jwt_secret, &user).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok((StatusCode::CREATED, Json(SignupResponse { user, token })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, StatusCode> {
    // Wrong credentials are a normal negative result from the store;
    // only here do they become a 401.
    let row = state
        .db
        .authenticate(&req.username, &req.password)
        .map_err(store_status)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user = row.into_user();
    let token =
        create_token(&state.jwt_secret, &user).map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(LoginResponse { user, token }))
}

pub fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
