use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use warbler_types::api::Claims;
use warbler_types::context::RequestContext;

use crate::auth::AppState;

/// Validate the bearer token, load the current user, and hand it to the
/// handler as an explicit `RequestContext` extension. Handlers never
/// consult ambient session state.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| StatusCode::UNAUTHORIZED)?;

    // A valid token for a since-deleted user is still unauthorized.
    let user = state
        .db
        .get_user(token_data.claims.sub)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::UNAUTHORIZED)?
        .into_user();

    req.extensions_mut().insert(RequestContext::for_user(user));
    Ok(next.run(req).await)
}

/// Pull the authenticated user out of the request context.
pub fn current_user(
    ctx: &RequestContext,
) -> Result<&warbler_types::models::User, StatusCode> {
    ctx.current_user.as_ref().ok_or(StatusCode::UNAUTHORIZED)
}
