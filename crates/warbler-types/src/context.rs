use crate::models::User;

/// Explicit per-request context. Handlers receive the authenticated user
/// through this value instead of consulting any ambient session state.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub current_user: Option<User>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { current_user: None }
    }

    pub fn for_user(user: User) -> Self {
        Self {
            current_user: Some(user),
        }
    }
}
